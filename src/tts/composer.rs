use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{GenerateError, Result};
use crate::profile::{Voice, VoiceProfile};

/// Builds TTS request URLs from a base URL and configured parameter names.
///
/// Exactly one of two modes is active: emotion mode when `emotion_param`
/// is set, reference mode otherwise (which then needs both reference
/// parameter names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlComposer {
    base_url: String,
    emotion_param: Option<String>,
    text_param: String,
    ref_path_param: Option<String>,
    ref_text_param: Option<String>,
}

impl UrlComposer {
    pub fn new(
        base_url: impl Into<String>,
        emotion_param: Option<String>,
        text_param: impl Into<String>,
        ref_path_param: Option<String>,
        ref_text_param: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            emotion_param: non_empty(emotion_param),
            text_param: text_param.into(),
            ref_path_param: non_empty(ref_path_param),
            ref_text_param: non_empty(ref_text_param),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_valid(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(GenerateError::config("base url is required"));
        }

        if self.text_param.trim().is_empty() {
            return Err(GenerateError::config("text parameter name is required"));
        }

        if self.emotion_param.is_none()
            && self.ref_path_param.is_none()
            && self.ref_text_param.is_none()
        {
            return Err(GenerateError::config(
                "at least one of the emotion or reference parameter names is required",
            ));
        }

        Ok(())
    }

    pub fn is_emotion_mode(&self) -> bool {
        self.emotion_param.is_some()
    }

    /// Full preflight for a batch: the composer is valid, the active mode is
    /// complete, the base URL parses, and every profile has the shape of
    /// the active mode.
    pub fn ensure_ready(&self, profiles: &[VoiceProfile]) -> Result<()> {
        self.is_valid()?;

        if !self.is_emotion_mode() && (self.ref_path_param.is_none() || self.ref_text_param.is_none()) {
            return Err(GenerateError::config(
                "reference mode requires both the ref path and ref text parameter names",
            ));
        }

        Url::parse(&self.base_url)
            .map_err(|err| GenerateError::config(format!("invalid base url {}: {err}", self.base_url)))?;

        let emotion_mode = self.is_emotion_mode();
        if let Some(profile) = profiles.iter().find(|p| p.is_emotion() != emotion_mode) {
            let expected = if emotion_mode { "emotion" } else { "reference" };
            return Err(GenerateError::config(format!(
                "profile {} does not match {expected} mode",
                profile.emotion_name
            )));
        }

        Ok(())
    }

    /// Picks the emotion or reference branch for `profile`.
    pub fn build_for(&self, text: &str, profile: &VoiceProfile) -> Result<String> {
        match (&profile.voice, self.is_emotion_mode()) {
            (Voice::Emotion { emotion }, true) => self.build_with_emotion(text, emotion, true),
            (Voice::Reference { ref_path, ref_text }, false) => {
                self.build_with_reference(text, ref_path, ref_text, true)
            }
            _ => Err(GenerateError::config(format!(
                "profile {} does not match the composer mode",
                profile.emotion_name
            ))),
        }
    }

    pub fn build_with_emotion(&self, text: &str, emotion: &str, encode: bool) -> Result<String> {
        let emotion_param = self
            .emotion_param
            .as_deref()
            .ok_or_else(|| GenerateError::config("emotion parameter name is not set"))?;

        self.append_params(&[(self.text_param.as_str(), text), (emotion_param, emotion)], encode)
    }

    pub fn build_with_reference(
        &self,
        text: &str,
        ref_path: &str,
        ref_text: &str,
        encode: bool,
    ) -> Result<String> {
        if self.is_emotion_mode() {
            return Err(GenerateError::config(
                "reference parameters cannot be used while the emotion parameter is set",
            ));
        }

        let ref_path_param = self
            .ref_path_param
            .as_deref()
            .ok_or_else(|| GenerateError::config("ref path parameter name is not set"))?;
        let ref_text_param = self
            .ref_text_param
            .as_deref()
            .ok_or_else(|| GenerateError::config("ref text parameter name is not set"))?;

        self.append_params(
            &[
                (self.text_param.as_str(), text),
                (ref_path_param, ref_path),
                (ref_text_param, ref_text),
            ],
            encode,
        )
    }

    fn append_params(&self, params: &[(&str, &str)], encode: bool) -> Result<String> {
        if encode {
            self.append_encoded(params)
        } else {
            Ok(self.append_raw(params))
        }
    }

    fn append_raw(&self, params: &[(&str, &str)]) -> String {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.base_url.ends_with('?') || self.base_url.ends_with('&') {
            ""
        } else if self.base_url.contains('?') {
            "&"
        } else {
            "?"
        };

        format!("{}{separator}{query}", self.base_url)
    }

    // Existing query pairs on the base are kept (empty ones dropped) and
    // every value is encoded exactly once.
    fn append_encoded(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| GenerateError::config(format!("invalid base url {}: {err}", self.base_url)))?;

        let existing: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(existing)
            .extend_pairs(params.iter().copied());

        let built = url.to_string();
        tracing::debug!(url = %built, "built request url");
        Ok(built)
    }
}

impl From<&ApiConfig> for UrlComposer {
    fn from(api: &ApiConfig) -> Self {
        Self::new(
            api.base_url.clone(),
            api.emotion_param.clone(),
            api.text_param.clone(),
            api.ref_path_param.clone(),
            api.ref_text_param.clone(),
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
