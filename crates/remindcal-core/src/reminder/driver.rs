//! Async loop that turns scheduler deadlines into fired reminders.
//!
//! The driver owns no timer state. It sleeps until the scheduler's earliest
//! deadline, or until the scheduler signals that its table changed, then takes
//! the store lock and fires whatever is due. Because firing needs the same lock
//! as every store mutation, a cancel or reschedule that wins the lock first
//! always preempts the firing it replaces.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::event::EventStore;

/// Store handle shared between the command surface and the driver.
pub type SharedStore = Arc<Mutex<EventStore>>;

/// Handle to the running reminder loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct ReminderDriver {
    handle: JoinHandle<()>,
}

impl ReminderDriver {
    /// Spawn the loop on the current tokio runtime.
    pub async fn start(store: SharedStore) -> Self {
        let wake = store.lock().await.reminders().waker();
        let handle = tokio::spawn(run(store, wake));
        tracing::debug!("reminder driver started");
        Self { handle }
    }

    /// Stop the loop and cancel every pending timer, so nothing fires once the
    /// owner is gone.
    pub async fn shutdown(self, store: &SharedStore) {
        self.handle.abort();
        let cancelled = store.lock().await.shutdown_reminders();
        tracing::info!(cancelled, "reminder driver stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ReminderDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(store: SharedStore, wake: Arc<Notify>) {
    loop {
        let wait = {
            let guard = store.lock().await;
            let now = guard.clock().now_utc();
            guard
                .reminders()
                .next_deadline()
                .map(|at| (at - now).to_std().unwrap_or(StdDuration::ZERO))
        };

        match wait {
            Some(wait) => {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        store.lock().await.fire_due_reminders();
                    }
                    _ = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
}
