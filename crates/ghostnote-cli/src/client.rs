use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::protocol::{Request, Response};

/// Blocking connection to a running daemon.
pub struct Client {
    writer: UnixStream,
    reader: BufReader<UnixStream>,
}

impl Client {
    pub fn connect(socket_path: &Path) -> anyhow::Result<Self> {
        let stream = match UnixStream::connect(socket_path) {
            Ok(stream) => stream,
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
                ) =>
            {
                return Err(anyhow::anyhow!(missing_daemon_message(socket_path)));
            }
            Err(err) => return Err(anyhow::anyhow!("Daemon connect failed: {}", err)),
        };
        let timeout = Some(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;

        let reader = BufReader::new(
            stream
                .try_clone()
                .map_err(|e| anyhow::anyhow!("Daemon connect failed: {}", e))?,
        );
        Ok(Self {
            writer: stream,
            reader,
        })
    }

    /// Send one request and wait for its response.
    pub fn request(&mut self, request: &Request) -> anyhow::Result<Response> {
        send_line(&mut self.writer, &request.to_line())?;
        let line = read_response(&mut self.reader)?;
        Response::parse(&line).map_err(|e| anyhow::anyhow!("Malformed daemon response: {}", e))
    }
}

pub fn missing_daemon_message(socket_path: &Path) -> String {
    format!(
        "No ghostnote daemon at {}\n\nHint: Start one with:\n  ghostnote serve",
        socket_path.display()
    )
}

fn send_line(stream: &mut UnixStream, line: &str) -> anyhow::Result<()> {
    stream
        .write_all(format!("{}\n", line).as_bytes())
        .map_err(|e| anyhow::anyhow!("Daemon write failed: {}", e))
}

fn read_response(reader: &mut BufReader<UnixStream>) -> anyhow::Result<String> {
    let mut response = String::new();
    let read = reader
        .read_line(&mut response)
        .map_err(|e| anyhow::anyhow!("Daemon read failed: {}", e))?;
    if read == 0 {
        return Err(anyhow::anyhow!("Daemon closed the connection"));
    }
    Ok(response.trim().to_string())
}
