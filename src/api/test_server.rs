//! Canned HTTP/1.1 responder on a loopback port, for exercising the fetch
//! layer and engines without touching the network.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

pub struct TestServer {
    addr: String,
    requests: mpsc::Receiver<String>,
}

impl TestServer {
    /// Serves each response once, in order, one connection per response.
    pub fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&raw);
                let line = request.lines().next().unwrap_or_default().to_string();
                let _ = tx.send(line);
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { addr, requests: rx }
    }

    /// Accepts every connection and never answers. Each accepted connection
    /// is reported as an empty request line.
    pub fn stall() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut open = Vec::new();
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    return;
                };
                open.push(stream);
                if tx.send(String::new()).is_err() {
                    return;
                }
            }
        });

        Self { addr, requests: rx }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request lines (`GET /path?query HTTP/1.1`) seen so far.
    pub fn finish(self) -> Vec<String> {
        self.requests.try_iter().collect()
    }
}

pub fn http_response(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}
