// src/exec/output.rs

//! Forwarding of child output to the operator's terminal.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Which of our own streams a child stream is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Echo every line from `reader` to our own `stream` as it arrives and return
/// everything that was read.
///
/// Bytes are decoded lossily so one bad byte doesn't stall the pipe.
pub async fn tee_lines<R>(reader: Option<R>, stream: Stream) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                match stream {
                    Stream::Stdout => println!("{line}"),
                    Stream::Stderr => eprintln!("{line}"),
                }
                captured.push_str(line);
                captured.push('\n');
            }
            Err(err) => {
                debug!(?stream, error = %err, "output stream closed with error");
                break;
            }
        }
    }

    captured
}
