#![allow(dead_code)]

use ref_audio_gen::error::{GenerateError, Result};
use ref_audio_gen::tts::AudioFetcher;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

/// In-memory fetcher that records every URL and returns fixed audio, or a
/// status error for URLs containing `fail_on`.
pub struct RecordingFetcher {
    pub audio: Vec<u8>,
    pub fail_on: Option<(String, u16)>,
    pub urls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            fail_on: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(audio: &[u8], needle: &str, status: u16) -> Self {
        Self {
            fail_on: Some((needle.to_string(), status)),
            ..Self::new(audio)
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl AudioFetcher for RecordingFetcher {
    fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        if let Some((needle, status)) = &self.fail_on {
            if url.contains(needle.as_str()) {
                return Err(GenerateError::RemoteFetch {
                    url: url.to_string(),
                    status: Some(*status),
                    message: format!("server responded with status code {status}"),
                });
            }
        }
        Ok(self.audio.clone())
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub target: String,
    pub body: Vec<u8>,
}

/// Minimal HTTP/1.1 server answering every request with the same response.
/// Request bodies are read by `Content-Length` only; chunked bodies are not
/// supported.
pub struct TestServer {
    pub addr: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TestServer {
    pub fn start(status: u16, body: &[u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let body = body.to_vec();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Ok(request) = read_request(&mut stream) else { continue };
                seen.lock().unwrap().push(request);

                let head = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    reason(status),
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.target).collect()
    }
}

fn read_request(stream: &mut std::net::TcpStream) -> std::io::Result<SeenRequest> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(SeenRequest {
        method,
        target,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
