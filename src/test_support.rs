//! Throwaway HTTP responders for tests that exercise real sockets.

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A canned response served once per accepted connection.
pub struct CannedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String
}

impl CannedResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self { status, content_type: "application/json", body: body.into() }
    }

    pub fn event_stream(body: impl Into<String>) -> Self {
        Self { status: 200, content_type: "text/event-stream", body: body.into() }
    }
}

/// Serves `response` to the first connection and hands back the raw request head.
pub async fn serve_once(response: CannedResponse) -> Result<(String, oneshot::Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let (sender, receiver) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let request = read_request(&mut socket).await;
        let _ = sender.send(String::from_utf8_lossy(&request).to_string());

        let head = format!(
            "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response.status,
            response.content_type,
            response.body.len()
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(response.body.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    Ok((format!("http://{address}"), receiver))
}

/// Reads the request head plus `Content-Length` bytes of body so the client never sees a reset.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let Ok(read) = socket.read(&mut chunk).await else {
            break;
        };

        if read == 0 {
            break;
        }

        request.extend_from_slice(&chunk[..read]);

        let Some(head_end) = request.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };

        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let content_length = head.lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if request.len() >= head_end + 4 + content_length {
            break;
        }
    }

    request
}
