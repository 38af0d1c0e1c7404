//! Accept loop and shutdown sequencing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ffremote_config::ServerConfig;
use ffremote_core::Listener;

use crate::registry::ProcessRegistry;
use crate::session::handle_connection;

/// How long shutdown waits for cancelled sessions to kill and reap their
/// subprocesses.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Accept connections until the token is cancelled, running each session as
/// an independent task with its own child cancellation scope.
pub async fn serve(
    listener: Listener,
    config: Arc<ServerConfig>,
    registry: Arc<ProcessRegistry>,
    token: CancellationToken,
) {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((conn, remote)) => {
                    sessions.spawn(handle_connection(
                        conn,
                        remote,
                        config.clone(),
                        registry.clone(),
                        token.child_token(),
                    ));
                }
                Err(e) => {
                    error!(error = %e, "error accepting connection");
                }
            },
            Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
        }
    }

    // Cancellation has already propagated to every session; give them a
    // moment to kill and reap their subprocesses.
    if !sessions.is_empty() {
        info!(active = sessions.len(), "waiting for active sessions");
        let drain = async {
            while sessions.join_next().await.is_some() {}
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            warn!("sessions did not finish within the shutdown grace period");
        }
    }

    for (id, record) in registry.snapshot() {
        warn!(
            id = %id,
            remote = %record.remote,
            pid = ?record.pid,
            args = ?record.args,
            "process still registered at shutdown"
        );
    }

    info!("server stopped");
}
