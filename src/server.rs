//! The acceptor: binds the listening socket and spawns one worker task per
//! accepted connection, bounded by a semaphore-backed pool so the server
//! never runs unboundedly many sessions at once.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::board::Board;
use crate::session;

/// Lower bound on concurrent sessions, regardless of core count.
const MIN_POOL_SIZE: usize = 8;

/// Binds `addr` and serves connections forever, spawning a task per session.
/// Runs until the process is killed or the bind itself fails.
pub async fn run(addr: SocketAddr, board: Arc<Board>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    serve(listener, board).await
}

/// Serves connections on an already-bound listener forever, spawning a task
/// per session. Split out from [`run`] so tests can bind to `127.0.0.1:0`,
/// read back the OS-assigned port, and only then start serving.
pub async fn serve(listener: TcpListener, board: Arc<Board>) -> std::io::Result<()> {
    let pool_size = MIN_POOL_SIZE.max(2 * available_parallelism());
    let permits = Arc::new(Semaphore::new(pool_size));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed, continuing");
                continue;
            }
        };

        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .expect("the worker pool semaphore is never closed");
        let board = board.clone();

        tokio::spawn(async move {
            session::run(stream, board, peer).await;
            drop(permit);
        });
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
