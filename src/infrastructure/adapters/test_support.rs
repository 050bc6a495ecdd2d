//! 适配器测试用的本地 HTTP 服务
//!
//! 每个连接只处理一个请求，响应后关闭连接，连接数即请求数

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// 预设响应
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// 启动服务，`route` 根据请求行（如 `GET /a.ass HTTP/1.1`）给出响应
    pub async fn start<F>(route: F) -> TestServer
    where
        F: Fn(&str) -> CannedResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let route = Arc::new(route);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let route = route.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let request_line = request.lines().next().unwrap_or_default().to_string();
                    let response = (*route)(&request_line);
                    let head = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        response.status,
                        if response.status < 400 { "OK" } else { "Error" },
                        response.content_type,
                        response.body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&response.body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        TestServer { base_url, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// 读完请求头和请求体；没有 Content-Length 时读到连接空闲为止
async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let idle = Duration::from_millis(200);

    loop {
        if let Some(end) = header_end(&data) {
            let head = String::from_utf8_lossy(&data[..end]).to_string();
            if let Some(len) = content_length(&head) {
                if data.len() >= end + len {
                    break;
                }
            }
        }
        match timeout(idle, socket.read(&mut buf)).await {
            Ok(Ok(0)) | Ok(Err(_)) | Err(_) => break,
            Ok(Ok(n)) => data.extend_from_slice(&buf[..n]),
        }
    }

    String::from_utf8_lossy(&data).to_string()
}
