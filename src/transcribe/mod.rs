pub mod manifest;

use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use walkdir::WalkDir;

use manifest::ManifestEntry;

pub trait Transcriber {
    fn transcribe(&self, path: &Path) -> anyhow::Result<String>;
}

/// Sends each file to a remote ASR endpoint as the raw request body.
pub struct HttpTranscriber {
    client: Client,
    endpoint: String,
    language: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>, timeout_seconds: Option<u64>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        builder = match timeout_seconds {
            Some(secs) if secs > 0 => builder.timeout(Duration::from_secs(secs)),
            _ => builder.timeout(None::<Duration>),
        };

        Ok(Self {
            client: builder.build().context("build asr http client")?,
            endpoint: endpoint.into(),
            language: language.into(),
        })
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, path: &Path) -> anyhow::Result<String> {
        let audio = fs::read(path).with_context(|| format!("read audio {}", path.display()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("language", self.language.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio)
            .send()
            .with_context(|| format!("asr request for {}", path.display()))?;

        let status = response.status();
        if !status.is_success() {
            bail!("asr service responded with status {status}");
        }

        let body = response.text().context("read asr response")?;
        Ok(extract_text(&body))
    }
}

/// Accepts either `{"text": "..."}` or a plain-text body.
pub fn extract_text(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(text) = value.get("text").and_then(|v| v.as_str()) {
            return text.trim().to_string();
        }
    }
    body.trim().to_string()
}

/// Transcribes every `.wav` under `input_dir`. The label of an entry is the
/// name of the directory holding the file. Files that fail are logged and
/// left out.
pub fn build_manifest(
    input_dir: &Path,
    transcriber: &dyn Transcriber,
    language: &str,
) -> anyhow::Result<Vec<ManifestEntry>> {
    if !input_dir.is_dir() {
        bail!("input directory not found: {}", input_dir.display());
    }

    let language = language.to_uppercase();
    let mut entries = Vec::new();

    let walker = WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .map_err(|err| tracing::warn!(error = %err, "skipping unreadable directory entry"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("wav"));

    for entry in walker {
        match transcribe_entry(entry.path(), transcriber, &language) {
            Ok(item) => entries.push(item),
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = ?err, "transcription failed; skipping file")
            }
        }
    }

    tracing::info!(files = entries.len(), "transcription finished");
    Ok(entries)
}

fn transcribe_entry(path: &Path, transcriber: &dyn Transcriber, language: &str) -> anyhow::Result<ManifestEntry> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("resolve {}", path.display()))?;
    let label = absolute
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let text = transcriber.transcribe(&absolute)?;

    Ok(ManifestEntry {
        path: absolute.display().to_string(),
        label,
        language: language.to_string(),
        text,
    })
}
