//! Gemini `generateContent` client for the advantage score and narrative.

use crate::domain::errors::AnalysisError;
use crate::domain::ports::{AdvantageAnalyzer, NarrativeAnalyzer};
use crate::domain::signal::{AnalysisInput, RawAdvantage};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvantageResponse {
    advantage_percentage: f64,
    reason: String,
}

pub struct GeminiAnalyzer {
    client: Client,
    base_url: Url,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid GEMINI_BASE_URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("GEMINI_BASE_URL cannot carry a path: {}", base_url);
        }

        Ok(Self {
            client: HttpClientFactory::create_client(ANALYSIS_TIMEOUT),
            base_url,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("models")
                .push(&format!("{}:generateContent", self.model));
        }
        url
    }

    async fn generate(
        &self,
        prompt: String,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String, AnalysisError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        debug!("GeminiAnalyzer: calling {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(unavailable(format!(
                "Gemini returned status {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("unexpected response: {}", e)))?;

        extract_text(body)
    }
}

#[async_trait]
impl AdvantageAnalyzer for GeminiAnalyzer {
    async fn score_advantage(&self, input: &AnalysisInput) -> Result<RawAdvantage, AnalysisError> {
        let config = GenerationConfig {
            response_mime_type: "application/json",
            response_schema: advantage_schema(),
        };
        let text = self.generate(advantage_prompt(input), Some(config)).await?;
        let raw = parse_advantage(&text)?;
        info!("GeminiAnalyzer: raw advantage score {}", raw.score);
        Ok(raw)
    }
}

#[async_trait]
impl NarrativeAnalyzer for GeminiAnalyzer {
    async fn narrate(&self, input: &AnalysisInput) -> Result<String, AnalysisError> {
        self.generate(narrative_prompt(input), None).await
    }
}

fn unavailable(reason: String) -> AnalysisError {
    AnalysisError::AnalysisUnavailable { reason }
}

fn extract_text(body: GenerateContentResponse) -> Result<String, AnalysisError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(unavailable("Gemini returned no text".to_string()));
    }
    Ok(text)
}

fn advantage_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "advantagePercentage": {
                "type": "NUMBER",
                "description": "How advantageous buying the base currency now is (0-100)."
            },
            "reason": {
                "type": "STRING",
                "description": "A concise reason for the score."
            }
        },
        "required": ["advantagePercentage", "reason"]
    })
}

fn advantage_prompt(input: &AnalysisInput) -> String {
    format!(
        "You are a financial analyst. The USD/KRW exchange rates for the last {} days are: {}.\n\
         The current rate is {} KRW.\n\n\
         Based on this data, rate how advantageous it is to buy US dollars right now as a \
         percentage from 0 to 100, where values near 100 mean very favorable and values near 0 \
         mean very unfavorable. Explain the reason in one concise sentence.\n\n\
         Respond strictly in the requested JSON format.",
        input.points.len(),
        input.rate_list(),
        input.current_rate
    )
}

fn narrative_prompt(input: &AnalysisInput) -> String {
    format!(
        "Here are the USD/KRW exchange rates for the last {} days:\n{}\n\n\
         The current rate is {} KRW.\n\n\
         From an expert's perspective, analyze the main drivers of the recent movement. Cover:\n\
         1. The overall trend (rising, falling, flat)\n\
         2. Economic or political factors that may have contributed (e.g. US and Korean \
         economic indicators, global market conditions, central bank policy)\n\
         3. A brief outlook for the rate.\n\n\
         Write the answer naturally in Markdown.",
        input.points.len(),
        input.dated_lines(),
        input.current_rate
    )
}

fn parse_advantage(text: &str) -> Result<RawAdvantage, AnalysisError> {
    let parsed: AdvantageResponse = serde_json::from_str(text.trim())
        .map_err(|e| unavailable(format!("unparseable advantage JSON: {}", e)))?;
    Ok(RawAdvantage {
        score: parsed.advantage_percentage,
        reason: parsed.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rates::{SeriesNormalizer, SparseSeries, Window};
    use crate::domain::signal::SignalDerivation;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn input() -> AnalysisInput {
        let d = |n| NaiveDate::from_ymd_opt(2026, 6, n).unwrap();
        let sparse: SparseSeries = vec![(d(1), dec!(1380.5)), (d(3), dec!(1391.25))]
            .into_iter()
            .collect();
        let series =
            SeriesNormalizer::default().normalize(&sparse, Window::new(d(1), d(3)).unwrap());
        SignalDerivation::analysis_input(&series).unwrap()
    }

    #[test]
    fn test_endpoint_includes_model() {
        let analyzer = GeminiAnalyzer::new(DEFAULT_BASE_URL, DEFAULT_MODEL, "key").unwrap();
        assert_eq!(
            analyzer.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_prompts_carry_series() {
        let input = input();
        let advantage = advantage_prompt(&input);
        assert!(advantage.contains("1380.5, 1380.5, 1391.25"));
        assert!(advantage.contains("current rate is 1391.25 KRW"));

        let narrative = narrative_prompt(&input);
        assert!(narrative.contains("6/1: 1380.5\n6/2: 1380.5\n6/3: 1391.25"));
    }

    #[test]
    fn test_parse_advantage_keeps_raw_score() {
        let raw = parse_advantage(r#"{"advantagePercentage": 137, "reason": "Dip"}"#).unwrap();
        assert_eq!(raw.score, 137.0);
        assert_eq!(raw.reason, "Dip");

        assert!(parse_advantage(r#"{"reason": "missing score"}"#).is_err());
        assert!(parse_advantage("I think 60%").is_err());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Trend is "}, {"text": "rising."}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(body).unwrap(), "Trend is rising.");

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_text(empty).is_err());
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: advantage_schema(),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"][1],
            "reason"
        );
    }
}
