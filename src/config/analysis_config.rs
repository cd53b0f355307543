//! Analysis collaborator configuration.

use crate::infrastructure::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct AnalysisEnvConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for AnalysisEnvConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AnalysisEnvConfig {
    pub(crate) fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: var("GEMINI_API_KEY")
                .or_else(|| var("API_KEY"))
                .map(|key| key.trim().to_string())
                .unwrap_or_default(),
            model: var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    /// Analysis is enabled only when an API key is present.
    pub fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}
