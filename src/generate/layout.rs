use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{GenerateError, Result};
use crate::profile::{path_segment, VoiceProfile};

/// Where generated audio lands: every artifact exists twice, once under the
/// text root and once under the emotion root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub text_dir: String,
    pub emotion_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTargets {
    /// `{text_root}/{text}/{emotion_name}.wav`
    pub by_text: PathBuf,
    /// `{emotion_root}/{emotion_name}/{text}.wav`
    pub by_emotion: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, text_dir: impl Into<String>, emotion_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            text_dir: text_dir.into(),
            emotion_dir: emotion_dir.into(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.dir.clone(), output.text_dir.clone(), output.emotion_dir.clone())
    }

    pub fn text_root(&self) -> PathBuf {
        self.root.join(&self.text_dir)
    }

    pub fn emotion_root(&self) -> PathBuf {
        self.root.join(&self.emotion_dir)
    }

    /// Creates the output dir and both aggregation roots. Safe to call from
    /// several workers at once.
    pub fn prepare(&self) -> Result<()> {
        for dir in [self.root.clone(), self.text_root(), self.emotion_root()] {
            fs::create_dir_all(&dir).map_err(|err| GenerateError::io(&dir, err))?;
        }
        Ok(())
    }

    pub fn targets(&self, text: &str, profile: &VoiceProfile) -> PairTargets {
        let text_segment = path_segment(text);
        let emotion_segment = path_segment(&profile.emotion_name);

        PairTargets {
            by_text: self
                .text_root()
                .join(&text_segment)
                .join(format!("{emotion_segment}.wav")),
            by_emotion: self
                .emotion_root()
                .join(&emotion_segment)
                .join(format!("{text_segment}.wav")),
        }
    }
}

/// Fails when two different texts, or two different profiles, would be
/// written to the same file once turned into path segments.
pub fn check_unique_targets(texts: &[String], profiles: &[VoiceProfile]) -> Result<()> {
    let mut seen_texts: HashMap<String, &str> = HashMap::new();
    for text in texts {
        let segment = path_segment(text);
        match seen_texts.get(&segment) {
            Some(other) if *other != text.as_str() => {
                return Err(GenerateError::config(format!(
                    "texts {other:?} and {text:?} map to the same file name {segment:?}"
                )));
            }
            Some(_) => {}
            None => {
                seen_texts.insert(segment, text);
            }
        }
    }

    let mut seen_profiles: HashMap<String, &VoiceProfile> = HashMap::new();
    for profile in profiles {
        let segment = path_segment(&profile.emotion_name);
        match seen_profiles.get(&segment) {
            Some(other) if *other != profile => {
                return Err(GenerateError::config(format!(
                    "profiles {:?} and {:?} map to the same file name {segment:?}",
                    other.emotion_name, profile.emotion_name
                )));
            }
            Some(_) => {}
            None => {
                seen_profiles.insert(segment, profile);
            }
        }
    }

    Ok(())
}

impl PairTargets {
    pub fn both_exist(&self) -> bool {
        self.by_text.exists() && self.by_emotion.exists()
    }

    pub fn write(&self, audio: &[u8]) -> Result<()> {
        write_atomic(&self.by_text, audio)?;
        write_atomic(&self.by_emotion, audio)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| GenerateError::io(parent, err))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|err| GenerateError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| GenerateError::io(path, err))
}
