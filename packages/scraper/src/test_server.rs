//! Tiny in-process HTTP/1.1 server for fetch tests.
//!
//! Routes:
//! * [`ECHO_UA`] answers 200 with the request's `User-Agent` as the body.
//! * [`SERVER_ERROR`] answers 500.
//! * [`STALL`] never answers.
//! * any path containing `missing` or `gone` answers 404.
//! * everything else answers 200 with [`OK_BODY`].

use std::time::Duration;

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::{TcpListener, TcpStream};

pub const OK_BODY: &str = "<html><body>ok</body></html>";
pub const ECHO_UA: &str = "/echo-user-agent";
pub const SERVER_ERROR: &str = "/players/error.html";
pub const STALL: &str = "/players/stall.html";

/// Starts the server on an ephemeral port and returns its base URL.
pub async fn spawn() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(handle(socket));
        }
    });

    format!("http://{addr}")
}

async fn handle(mut socket: TcpStream) {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    loop {
        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
            break;
        }
    }
    let request = String::from_utf8_lossy(&buf[..read]).into_owned();

    let path = request.split_whitespace().nth(1).unwrap_or("/").to_owned();
    let user_agent = request
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, value)| value.trim().to_owned())
        .unwrap_or_default();

    let (status, body) = match path.as_str() {
        ECHO_UA => ("200 OK", user_agent),
        SERVER_ERROR => ("500 Internal Server Error", "boom".to_owned()),
        STALL => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            return;
        }
        p if p.contains("missing") || p.contains("gone") => {
            ("404 Not Found", "not here".to_owned())
        }
        _ => ("200 OK", OK_BODY.to_owned()),
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    socket.write_all(response.as_bytes()).await.ok();
    socket.shutdown().await.ok();
}
