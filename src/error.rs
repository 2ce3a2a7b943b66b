use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Failures of the generation core. Everything above the core (CLI glue,
/// config loading, manifests) reports through `anyhow` instead.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{}", remote_fetch_message(.url, .status, .message))]
    RemoteFetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

impl GenerateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a remote fetch failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteFetch { status, .. } => *status,
            _ => None,
        }
    }
}

fn remote_fetch_message(url: &str, status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("failed to fetch audio from {url}: server responded with status {status}"),
        None => format!("failed to fetch audio from {url}: {message}"),
    }
}

/// Wire form of a [`GenerateError`] sent from a worker process to the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFailure {
    pub kind: FailureKind,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Config,
    RemoteFetch,
    Io,
    Worker,
}

impl From<&GenerateError> for WorkerFailure {
    fn from(err: &GenerateError) -> Self {
        match err {
            GenerateError::Config(message) => Self {
                kind: FailureKind::Config,
                status: None,
                url: None,
                path: None,
                message: message.clone(),
            },
            GenerateError::RemoteFetch {
                url,
                status,
                message,
            } => Self {
                kind: FailureKind::RemoteFetch,
                status: *status,
                url: Some(url.clone()),
                path: None,
                message: message.clone(),
            },
            GenerateError::Io { path, source } => Self {
                kind: FailureKind::Io,
                status: None,
                url: None,
                path: Some(path.clone()),
                message: source.to_string(),
            },
            GenerateError::Worker(message) => Self {
                kind: FailureKind::Worker,
                status: None,
                url: None,
                path: None,
                message: message.clone(),
            },
        }
    }
}

impl From<WorkerFailure> for GenerateError {
    fn from(failure: WorkerFailure) -> Self {
        match failure.kind {
            FailureKind::Config => GenerateError::Config(failure.message),
            FailureKind::RemoteFetch => GenerateError::RemoteFetch {
                url: failure.url.unwrap_or_default(),
                status: failure.status,
                message: failure.message,
            },
            FailureKind::Io => GenerateError::Io {
                path: failure.path.unwrap_or_default(),
                source: std::io::Error::other(failure.message),
            },
            FailureKind::Worker => GenerateError::Worker(failure.message),
        }
    }
}
