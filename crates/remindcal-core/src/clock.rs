//! The single source of "now".
//!
//! Validation and reminder scheduling never call `Utc::now()` directly; they
//! ask a [`Clock`]. Every clock is bound to the reference time zone so calendar
//! dates are derived consistently.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Supplies the current instant and the reference time zone.
pub trait Clock: Send + Sync {
    /// The reference zone used for every instant-to-date conversion.
    fn zone(&self) -> Tz;

    /// Current instant.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current instant expressed in the reference zone.
    fn now(&self) -> DateTime<Tz> {
        self.now_utc().with_timezone(&self.zone())
    }

    /// Today's calendar date in the reference zone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn zone(&self) -> Tz {
        self.zone
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. For tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    zone: Tz,
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(zone: Tz, now: DateTime<Utc>) -> Self {
        Self {
            zone,
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid instant.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn zone(&self) -> Tz {
        self.zone
    }

    fn now_utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// Clock anchored to tokio's time source.
///
/// Reports `anchor + elapsed tokio time`, so a runtime with paused time
/// (`tokio::time::pause` / `advance`) moves this clock in lockstep with the
/// reminder driver's sleeps.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    zone: Tz,
    anchor: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(zone: Tz, anchor: DateTime<Utc>) -> Self {
        Self {
            zone,
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn zone(&self) -> Tz {
        self.zone
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now().duration_since(self.started);
        let elapsed = Duration::from_std(elapsed).unwrap_or(Duration::zero());
        self.anchor + elapsed
    }
}
