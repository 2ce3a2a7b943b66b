use anyhow::{bail, Context};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generate::partition::default_workers;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub asr: AsrConfig,
}

/// TTS endpoint and the query parameter names it expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_text_param")]
    pub text_param: String,
    #[serde(default)]
    pub emotion_param: Option<String>,
    #[serde(default)]
    pub ref_path_param: Option<String>,
    #[serde(default)]
    pub ref_text_param: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_text_dir")]
    pub text_dir: String,
    #[serde(default = "default_emotion_dir")]
    pub emotion_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_asr_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::project_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        if let Ok(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn init_default() -> anyhow::Result<PathBuf> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config = Self::default();
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        Ok(path)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.config_dir().join("ref-audio-gen").join("config.json"))
    }

    /// Configured worker count, or the host's available parallelism.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == Some(0) {
            bail!("workers must be greater than 0");
        }

        if self.output.text_dir.trim().is_empty() {
            bail!("output.text_dir must not be empty");
        }

        if self.output.emotion_dir.trim().is_empty() {
            bail!("output.emotion_dir must not be empty");
        }

        if self.output.text_dir == self.output.emotion_dir {
            bail!("output.text_dir and output.emotion_dir must differ");
        }

        if self.asr.language.trim().is_empty() {
            bail!("asr.language must not be empty");
        }

        if self.asr.manifest_name.trim().is_empty() {
            bail!("asr.manifest_name must not be empty");
        }

        Ok(())
    }

    fn project_path() -> Option<PathBuf> {
        Some(PathBuf::from("ref-audio-gen.json"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            text_param: default_text_param(),
            emotion_param: None,
            ref_path_param: None,
            ref_text_param: None,
            timeout_seconds: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            text_dir: default_text_dir(),
            emotion_dir: default_emotion_dir(),
        }
    }
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            language: default_language(),
            output_dir: default_asr_output_dir(),
            manifest_name: default_manifest_name(),
            timeout_seconds: None,
        }
    }
}

fn default_text_param() -> String {
    "text".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output").join("inference")
}

fn default_text_dir() -> String {
    "text".to_string()
}

fn default_emotion_dir() -> String {
    "emotion".to_string()
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_asr_output_dir() -> PathBuf {
    PathBuf::from("output").join("asr_opt")
}

fn default_manifest_name() -> String {
    "asr_result".to_string()
}
