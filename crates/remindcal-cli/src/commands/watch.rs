//! Long-running reminder delivery.
//!
//! Loads every stored event, arms its reminder, and prints each fired
//! reminder to stdout as one JSON line until interrupted. The database is
//! rescanned periodically so events added by other invocations are picked up.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use remindcal_core::{
    Config, NotificationSink, ReminderDriver, ReminderNotification, SharedStore, SinkError,
};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::{open_store, CliResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between database rescans
    #[arg(long, default_value = "60")]
    rescan: u64,
}

/// Prints each reminder as one JSON line.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn notify(&self, n: &ReminderNotification) -> Result<(), SinkError> {
        let line = serde_json::to_string(n).map_err(|e| SinkError::Delivery(e.to_string()))?;
        println!("{line}");
        Ok(())
    }
}

pub fn run(args: WatchArgs) -> CliResult {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(config, args))
}

async fn watch(config: Config, args: WatchArgs) -> CliResult {
    let mut store = open_store(&config, StdoutSink)?;
    if !store.reminders().is_enabled() {
        tracing::warn!("reminders are disabled (reminders.enabled = false)");
    }
    let pending = store.rearm_all()?;
    eprintln!("watching {pending} reminder(s), press Ctrl-C to stop");

    let store: SharedStore = Arc::new(Mutex::new(store));
    let driver = ReminderDriver::start(store.clone()).await;

    let mut rescan = tokio::time::interval(Duration::from_secs(args.rescan.max(1)));
    rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);
    rescan.tick().await;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res?;
                break;
            }
            _ = rescan.tick() => {
                if let Err(e) = store.lock().await.rearm_all() {
                    tracing::warn!(error = %e, "rescan failed");
                }
            }
        }
    }

    driver.shutdown(&store).await;
    eprintln!("stopped");
    Ok(())
}
