use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::transcribe::manifest::ManifestEntry;

/// One voice to render every text with. `emotion_name` names the output
/// files; `voice` is what gets sent to the TTS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub emotion_name: String,
    #[serde(flatten)]
    pub voice: Voice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Voice {
    Reference { ref_path: String, ref_text: String },
    Emotion { emotion: String },
}

impl VoiceProfile {
    pub fn emotion(emotion: impl Into<String>) -> Self {
        let emotion = emotion.into();
        Self {
            emotion_name: emotion.clone(),
            voice: Voice::Emotion { emotion },
        }
    }

    pub fn reference(
        emotion_name: impl Into<String>,
        ref_path: impl Into<String>,
        ref_text: impl Into<String>,
    ) -> Self {
        Self {
            emotion_name: emotion_name.into(),
            voice: Voice::Reference {
                ref_path: ref_path.into(),
                ref_text: ref_text.into(),
            },
        }
    }

    pub fn is_emotion(&self) -> bool {
        matches!(self.voice, Voice::Emotion { .. })
    }
}

impl From<&ManifestEntry> for VoiceProfile {
    fn from(entry: &ManifestEntry) -> Self {
        // Nested inputs reuse file names across labels, so the label is part
        // of the name.
        let stem = Path::new(&entry.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let name = match (entry.label.is_empty(), stem.is_empty()) {
            (false, false) => format!("{}_{stem}", entry.label),
            (true, _) => stem.to_string(),
            (false, true) => entry.label.clone(),
        };
        Self::reference(name, entry.path.clone(), entry.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    emotion_name: Option<String>,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default)]
    ref_path: Option<String>,
    #[serde(default)]
    ref_text: Option<String>,
}

impl ProfileRecord {
    fn into_profile(self, index: usize) -> anyhow::Result<VoiceProfile> {
        match (self.emotion, self.ref_path, self.ref_text) {
            (Some(emotion), None, None) => Ok(VoiceProfile {
                emotion_name: self.emotion_name.unwrap_or_else(|| emotion.clone()),
                voice: Voice::Emotion { emotion },
            }),
            (None, Some(ref_path), Some(ref_text)) => {
                let name = self
                    .emotion_name
                    .with_context(|| format!("profile {index}: emotion_name is required for reference profiles"))?;
                Ok(VoiceProfile::reference(name, ref_path, ref_text))
            }
            _ => bail!("profile {index}: expected either `emotion` or both `ref_path` and `ref_text`"),
        }
    }
}

pub fn load_profiles(path: &Path) -> anyhow::Result<Vec<VoiceProfile>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read profiles at {}", path.display()))?;
    let records: Vec<ProfileRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parse profiles at {}", path.display()))?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_profile(index))
        .collect()
}

/// Reads one text per line, trimming and dropping blank lines.
pub fn load_texts(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read texts at {}", path.display()))?;
    Ok(parse_texts(&raw))
}

pub fn parse_texts(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns an arbitrary label into a single path segment.
pub fn path_segment(value: &str) -> String {
    const INVALID: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    let replaced: String = value
        .chars()
        .map(|c| {
            if INVALID.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_end_matches(['.', ' ']);

    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
