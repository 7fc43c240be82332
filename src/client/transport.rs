//! Line-oriented TCP transport for the builder port.
//!
//! Moves text lines across the socket and nothing else: CRLF framing on
//! send, LF-or-CRLF on receive, lossy UTF-8 decoding. Protocol semantics
//! live in [`crate::client::Session`].

use log::trace;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::client::errors::{BuilderPortError, Result};
use crate::logutil::escape_log;

/// Buffered line transport over a connected TCP socket.
#[derive(Debug)]
pub struct LineTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl LineTransport {
    /// Open a TCP connection to the builder port.
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(LineTransport {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one line, appending CRLF, and flush.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        trace!("-> {}", escape_log(line));
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one line, stripping the trailing CR/LF. Bytes that are not
    /// valid UTF-8 decode with the replacement character. Returns the
    /// empty string for a bare newline; EOF maps to `NotConnected`.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(BuilderPortError::NotConnected);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        while buf.last() == Some(&b'\r') {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        trace!("<- {}", escape_log(&line));
        Ok(line)
    }

    /// Shut down the write half and let the socket drop. Best-effort.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::TcpListener;

    async fn pair() -> (LineTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = LineTransport::connect("127.0.0.1", addr.port());
        let server = listener.accept();
        let (client, server) = tokio::join!(client, server);
        (client.unwrap(), server.unwrap().0)
    }

    #[tokio::test]
    async fn strips_crlf_and_lf_endings() {
        let (mut transport, mut peer) = pair().await;
        peer.write_all(b"first\r\nsecond\n\r\n").await.unwrap();
        assert_eq!(transport.read_line().await.unwrap(), "first");
        assert_eq!(transport.read_line().await.unwrap(), "second");
        assert_eq!(transport.read_line().await.unwrap(), "");
    }

    #[tokio::test]
    async fn invalid_utf8_decodes_with_replacement() {
        let (mut transport, mut peer) = pair().await;
        peer.write_all(b"caf\xe9 latin-1\n").await.unwrap();
        let line = transport.read_line().await.unwrap();
        assert_eq!(line, "caf\u{fffd} latin-1");
    }

    #[tokio::test]
    async fn eof_maps_to_not_connected() {
        let (mut transport, peer) = pair().await;
        drop(peer);
        match transport.read_line().await {
            Err(BuilderPortError::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_line_appends_crlf() {
        let (mut transport, peer) = pair().await;
        transport.send_line("wld_list").await.unwrap();
        let mut reader = BufReader::new(peer);
        let mut buf = Vec::new();
        tokio::io::AsyncBufReadExt::read_until(&mut reader, b'\n', &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"wld_list\r\n");
    }
}
