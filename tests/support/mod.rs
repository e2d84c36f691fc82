//! Shared helpers for the end-to-end protocol tests: spin up a real server
//! on an OS-assigned port and drive it as a plain line-oriented TCP client.

use std::net::SocketAddr;
use std::sync::Arc;

use corkboard::{server, Board, BoardConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

/// Waits until `$condition` becomes true, polling every 10ms, panicking if
/// `$limit_secs` elapses first. Useful for asserting on state mutated by a
/// concurrently-running session.
#[macro_export]
macro_rules! wait_until {
    ($limit_secs:expr, $condition:expr) => {
        let start = std::time::Instant::now();
        loop {
            if $condition {
                break;
            }
            if start.elapsed() > std::time::Duration::from_secs($limit_secs) {
                panic!("timed out waiting for: {}", stringify!($condition));
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    };
}

pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "connection closed unexpectedly while reading a line");
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    pub async fn read_handshake(&mut self) -> [String; 4] {
        [
            self.read_line().await,
            self.read_line().await,
            self.read_line().await,
            self.read_line().await,
        ]
    }

    pub async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Reads one `DATA BEGIN` ... `DATA END` envelope, returning the lines
    /// in between.
    pub async fn read_block(&mut self) -> Vec<String> {
        let first = self.read_line().await;
        assert_eq!(first, "DATA BEGIN");
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            if line == "DATA END" {
                break;
            }
            lines.push(line);
        }
        lines
    }
}

/// Starts a server on `127.0.0.1:0` with the given board configuration
/// arguments (port is ignored; the OS assigns one). Returns the bound
/// address and a handle to the shared board for direct inspection.
pub async fn start_board(config_args: &[&str]) -> (SocketAddr, Arc<Board>) {
    let args: Vec<String> = config_args.iter().map(|s| s.to_string()).collect();
    let (config, _) = BoardConfig::from_args(&args).expect("valid test board config");
    let board = Arc::new(Board::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving_board = board.clone();
    tokio::spawn(async move {
        let _ = server::serve(listener, serving_board).await;
    });

    (addr, board)
}

/// The 10x10 board, 2x2 notes, {RED, BLUE, WHITE} setup used throughout
/// the scenario tests.
pub async fn start_default_board() -> (SocketAddr, Arc<Board>) {
    start_board(&["0", "10", "10", "2", "2", "red", "blue", "white"]).await
}
