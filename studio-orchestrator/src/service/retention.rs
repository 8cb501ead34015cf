//! Job retention sweeper

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, info};

use crate::ledger::Ledger;

/// Evicts terminal jobs older than `retention`, once per `interval`
pub fn spawn_sweeper(
    ledger: Arc<Ledger>,
    retention: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        "Starting retention sweeper (retention: {:?}, interval: {:?})",
        retention, interval
    );

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);

        loop {
            ticker.tick().await;
            sweep_once(&ledger, retention);
        }
    })
}

pub fn sweep_once(ledger: &Ledger, retention: Duration) -> usize {
    let Some(cutoff) = chrono::Duration::from_std(retention)
        .ok()
        .and_then(|retention| chrono::Utc::now().checked_sub_signed(retention))
    else {
        return 0;
    };

    let removed = ledger.sweep(cutoff);
    if removed > 0 {
        info!("Evicted {} finished job(s)", removed);
    } else {
        debug!("Retention sweep found nothing to evict");
    }
    removed
}
