//! Scripted fake builder port server for integration tests.
//!
//! Each test spawns a listener with a fixed script of lines to send and
//! commands to expect, in order. Assertion failures inside the server task
//! surface when the test joins it via [`FakeServer::finish`].

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Write these lines to the client, CRLF-terminated.
    Send(&'static [&'static str]),
    /// Read one line and assert it is exactly this command.
    Recv(&'static str),
}

pub struct FakeServer {
    pub port: u16,
    handle: JoinHandle<()>,
}

pub async fn spawn(script: Vec<Step>) -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        for step in script {
            match step {
                Step::Send(lines) => {
                    for line in lines {
                        write_half.write_all(line.as_bytes()).await.unwrap();
                        write_half.write_all(b"\r\n").await.unwrap();
                    }
                    write_half.flush().await.unwrap();
                }
                Step::Recv(expected) => {
                    let mut buf = String::new();
                    let n = reader.read_line(&mut buf).await.unwrap();
                    assert!(n > 0, "client closed before sending {expected:?}");
                    assert_eq!(buf.trim_end_matches(['\r', '\n']), expected);
                }
            }
        }
    });
    FakeServer { port, handle }
}

impl FakeServer {
    /// Join the server task, propagating any assertion failure.
    pub async fn finish(self) {
        self.handle.await.unwrap();
    }
}
