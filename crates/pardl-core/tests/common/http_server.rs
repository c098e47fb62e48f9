//! Minimal HTTP/1.1 server for integration tests: plain GET, fixed status.
//!
//! Serves a single static body on every request and counts hits. No
//! keep-alive, no ranges; each connection gets one response and is closed.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub struct TestServer {
    /// Resource URL, e.g. "http://127.0.0.1:12345/item.png".
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Number of connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server answering every GET with 200 and `body`. Runs in a
/// background thread until the process exits.
pub fn start(body: Vec<u8>) -> TestServer {
    start_with_status("200 OK", body)
}

/// Like `start` but with a fixed status line (e.g. "404 Not Found").
pub fn start_with_status(status: &'static str, body: Vec<u8>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            server_hits.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            thread::spawn(move || handle(stream, status, &body));
        }
    });
    TestServer {
        url: format!("http://127.0.0.1:{}/item.png", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, status: &str, body: &[u8]) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    // Drain the request; the response does not depend on it.
    let mut buf = [0u8; 4096];
    let _ = stream.read(&mut buf);
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
}
