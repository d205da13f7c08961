//! Timer task that turns scheduled inputs into recomputes

use crate::session::Session;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Spawn the task that fires pending recomputes when their deadline passes.
///
/// The task sleeps until the session is signalled, waits out the throttle
/// window, then polls. It exits once [`Session::close`] is called.
pub fn spawn_driver(session: Arc<Session>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while !session.is_closed() {
            match session.deadline() {
                Some(due) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(due) => {
                            session.poll(Instant::now());
                        }
                        _ = session.notified() => {}
                    }
                }
                None => session.notified().await,
            }
        }
        let (fired, coalesced) = session.scheduler_counts();
        debug!("Session driver stopped after {} recomputes ({} inputs coalesced)", fired, coalesced);
    })
}
