use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{GenerateError, Result};

pub trait AudioFetcher: Send + Sync {
    fn fetch_audio(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking GET against the TTS API. No retries; a missing timeout means
/// a stalled server blocks the calling worker.
#[derive(Debug, Clone)]
pub struct HttpAudioFetcher {
    client: Client,
}

impl HttpAudioFetcher {
    pub fn new(timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("ref-audio-gen/", env!("CARGO_PKG_VERSION")));
        builder = match timeout_seconds {
            Some(secs) if secs > 0 => builder.timeout(Duration::from_secs(secs)),
            _ => builder.timeout(None::<Duration>),
        };

        let client = builder
            .build()
            .map_err(|err| GenerateError::config(format!("build http client: {err}")))?;
        Ok(Self { client })
    }
}

impl AudioFetcher for HttpAudioFetcher {
    fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().map_err(|err| GenerateError::RemoteFetch {
            url: url.to_string(),
            status: None,
            message: transport_message(&err),
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GenerateError::RemoteFetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("server responded with status code {}", status.as_u16()),
            });
        }

        let body = response.bytes().map_err(|err| GenerateError::RemoteFetch {
            url: url.to_string(),
            status: None,
            message: format!("read response body: {err}"),
        })?;

        Ok(body.to_vec())
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}
