//! A thin launcher: parse the positional launch arguments, initialize
//! tracing, and run the server. Contains no protocol or board logic.

use std::process::ExitCode;
use std::sync::Arc;

use corkboard::{server, Board, BoardConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, addr) = match BoardConfig::from_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("corkboard-server: {e}");
            eprintln!("usage: corkboard-server <port> <boardW> <boardH> <noteW> <noteH> <color> [color...]");
            return ExitCode::FAILURE;
        }
    };

    let board = Arc::new(Board::new(config));
    if let Err(e) = server::run(addr, board).await {
        eprintln!("corkboard-server: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
