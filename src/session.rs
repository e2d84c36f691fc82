//! One session per accepted connection: handshake, then a
//! read-line/dispatch/write-reply loop until disconnect.
//!
//! `Handshaking -> Ready -> (Closed)`. The handler never initiates
//! unsolicited output; every reply is either a single `OK ...` / `ERROR ...`
//! line or a `DATA BEGIN` ... `DATA END` block.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::{debug, info, warn, Span};

use crate::board::Board;
use crate::command::{self, Command};
use crate::error::ReplyError;
use crate::wire;

/// Drives one connection to completion. Never panics on client input; only
/// an unrecoverable socket error ends the session early.
pub async fn run(stream: TcpStream, board: Arc<Board>, peer: SocketAddr) {
    let span = tracing::info_span!("session", %peer);
    info!(parent: &span, "connected");

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    if write_lines(&mut writer, &wire::handshake_lines(board.config()))
        .await
        .is_err()
    {
        warn!(parent: &span, "failed to write handshake, dropping connection");
        return;
    }

    loop {
        let raw = match lines.next_line().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(parent: &span, "disconnected (eof)");
                break;
            }
            Err(e) => {
                warn!(parent: &span, error = %e, "read error, closing session");
                break;
            }
        };

        let line = raw.trim_end_matches('\r');
        let (reply, should_close) = dispatch(&board, line, &span);

        if write_lines(&mut writer, &reply).await.is_err() {
            warn!(parent: &span, "write error, closing session");
            break;
        }
        if should_close {
            info!(parent: &span, "disconnected (client request)");
            break;
        }
    }
}

/// Parses and executes one command line, returning the reply lines and
/// whether the session should close after sending them.
fn dispatch(board: &Board, line: &str, span: &Span) -> (Vec<String>, bool) {
    match command::parse(line) {
        Ok(Command::Disconnect) => (vec![wire::ok_bye().to_string()], true),
        Ok(cmd) => (execute(board, cmd, span), false),
        Err(e) => {
            let err = ReplyError::from(e);
            debug!(parent: span, error = %err, "rejected malformed command");
            (vec![wire::error_line(&err)], false)
        }
    }
}

fn execute(board: &Board, cmd: Command, span: &Span) -> Vec<String> {
    match cmd {
        Command::Post {
            x,
            y,
            color,
            message,
        } => match board.post(x, y, &color, message) {
            Ok(id) => {
                info!(parent: span, id, "posted note");
                vec![wire::ok_posted(id)]
            }
            Err(e) => reject(span, e),
        },
        Command::Pin { x, y } => match board.pin(x, y) {
            Ok(()) => vec![wire::ok_pinned(x, y)],
            Err(e) => reject(span, e),
        },
        Command::Unpin { x, y } => match board.unpin(x, y) {
            Ok(()) => vec![wire::ok_unpinned(x, y)],
            Err(e) => reject(span, e),
        },
        Command::Shake => {
            let removed = board.shake();
            info!(parent: span, removed, "shook board");
            vec![wire::ok_shaken(removed)]
        }
        Command::Clear => {
            board.clear();
            info!(parent: span, "cleared board");
            vec![wire::ok_cleared().to_string()]
        }
        Command::GetPins => wire::pins_block(&board.get_pins_sorted()),
        Command::Get(filter) => match board.get_notes_filtered(&filter) {
            Ok(views) => wire::notes_block(&views),
            Err(e) => reject(span, e),
        },
        Command::Disconnect => unreachable!("DISCONNECT is handled in dispatch"),
    }
}

fn reject(span: &Span, err: impl Into<ReplyError>) -> Vec<String> {
    let err = err.into();
    debug!(parent: span, error = %err, "command rejected");
    vec![wire::error_line(&err)]
}

async fn write_lines(writer: &mut OwnedWriteHalf, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await
}
