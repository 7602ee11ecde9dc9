//! Periodic removal of expired sessions.
//!
//! The sweep goes through the same [`Vault`](crate::store::Vault) lock as
//! every request, so its read-modify-write never interleaves with one.

use crate::manager::KeyServer;
use crate::session::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Run one sweep, logging instead of propagating failures.
///
/// Returns the number of sessions removed; 0 on failure.
pub fn sweep_once(sessions: &SessionManager) -> usize {
    match sessions.sweep_expired() {
        Ok(removed) => {
            if removed > 0 {
                tracing::info!(removed, "Removed expired sessions");
            }
            removed
        }
        Err(e) => {
            tracing::error!(error = %e, "Session sweep failed; retrying next tick");
            0
        }
    }
}

/// Sweep immediately, then once per `period`, until the task is aborted.
pub fn spawn(server: Arc<KeyServer>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            sweep_once(server.sessions());
        }
    })
}
