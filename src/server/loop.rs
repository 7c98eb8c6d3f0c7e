// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop.
///
/// Returns once `signals` requests shutdown. Connections already being served
/// keep running in their own tasks until they finish or time out.
#[allow(clippy::unnecessary_wraps)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Created before the loop: notify_waiters() reaches it even before its first poll
    let shutdown = signals.shutdown.notified();
    tokio::pin!(shutdown);

    loop {
        if signals.shutdown_requested.load(Ordering::SeqCst) {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                break;
            }
        }
    }

    logger::log_shutdown(&format!(
        "Shutdown requested with {} active connection(s)",
        active_connections.load(Ordering::SeqCst)
    ));
    Ok(())
}
