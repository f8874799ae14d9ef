use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;

use crate::config::GeneratorConfig;
use crate::error::{ForgeError, Result};
use crate::planner::Platform;
use crate::{clamp_score, normalize_hashtags};

pub const EXPECTED_VARIATIONS: usize = 3;
pub const MIN_HASHTAGS: usize = 10;
pub const MAX_HASHTAGS: usize = 15;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub brand: String,
    pub niche: String,
    pub tone: String,
    pub copy_mode: String,
    pub platform: Platform,
    pub message: String,
    pub extra_context: Option<String>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            brand: String::new(),
            niche: "general".to_string(),
            tone: "casual".to_string(),
            copy_mode: "engagement".to_string(),
            platform: Platform::Instagram,
            message: String::new(),
            extra_context: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelScores {
    pub overall: f64,
    pub engagement: f64,
    pub conversion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationCandidate {
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub model: ModelScores,
    pub source_recommended: bool,
}

#[derive(Clone)]
pub struct CaptionGenerator {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f64,
}

impl CaptionGenerator {
    pub fn new(config: &GeneratorConfig, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn from_env(config: &GeneratorConfig, model_override: Option<String>) -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let mut config = config.clone();
        if let Some(model) = model_override {
            config.model = model;
        }
        Some(Self::new(&config, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<VariationCandidate>> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let payload = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: persona_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(request),
                },
            ],
        };

        tracing::debug!(model = %self.model, platform = %request.platform, "requesting caption variations");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|err| ForgeError::Upstream {
                message: format!("request failed: {}", err),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            let message = if detail.is_empty() {
                format!("{}", status)
            } else {
                format!("{} {}", status, detail)
            };
            return Err(ForgeError::Upstream { message });
        }

        let body: ChatResponse = response.json().await.map_err(|err| ForgeError::UpstreamParse {
            message: format!("invalid completion payload: {}", err),
        })?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| ForgeError::UpstreamParse {
                message: "completion has no choices".to_string(),
            })?
            .message
            .content
            .trim()
            .to_string();

        parse_variations(&content)
    }
}

pub fn parse_variations(content: &str) -> Result<Vec<VariationCandidate>> {
    let json = extract_json_array(content).ok_or_else(|| ForgeError::UpstreamParse {
        message: "no JSON array in completion".to_string(),
    })?;

    let wire: Vec<WireVariation> =
        serde_json::from_str(&json).map_err(|err| ForgeError::UpstreamParse {
            message: format!("variation list parse failed: {}", err),
        })?;

    if wire.len() != EXPECTED_VARIATIONS {
        return Err(ForgeError::UpstreamParse {
            message: format!(
                "expected {} variations, got {}",
                EXPECTED_VARIATIONS,
                wire.len()
            ),
        });
    }

    Ok(wire.into_iter().map(WireVariation::into_candidate).collect())
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct WireVariation {
    #[serde(rename = "titulo_planner")]
    title: String,
    #[serde(rename = "legenda")]
    caption: String,
    hashtags: Vec<String>,
    #[serde(rename = "score_final")]
    overall: f64,
    #[serde(rename = "engajamento")]
    engagement: f64,
    #[serde(rename = "conversao")]
    conversion: f64,
    #[serde(rename = "recomendado")]
    recommended: bool,
}

impl WireVariation {
    fn into_candidate(self) -> VariationCandidate {
        VariationCandidate {
            title: self.title.trim().to_string(),
            caption: self.caption.trim().to_string(),
            hashtags: normalize_hashtags(self.hashtags),
            model: ModelScores {
                overall: clamp_score(self.overall),
                engagement: clamp_score(self.engagement),
                conversion: clamp_score(self.conversion),
            },
            source_recommended: self.recommended,
        }
    }
}

fn persona_prompt() -> String {
    let prompt = r#"You are a senior social media copywriter for direct-response brands.
Return a single JSON array with exactly 3 caption variations.
Each element must be an object with these fields:
- titulo_planner: short label for the content planner (string)
- legenda: the full caption, ready to post (string)
- hashtags: array of 10-15 hashtag strings
- score_final: overall quality estimate (0-10)
- engajamento: engagement estimate (0-10)
- conversao: conversion estimate (0-10)
- recomendado: true for the single strongest variation, false otherwise
Rules:
- Output the JSON array only, no markdown or commentary.
- Differentiate the 3 variations with distinct hooks and angles.
- Keep every caption consistent with the requested tone and platform.
"#;
    prompt.to_string()
}

fn build_user_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::new();
    push_field(&mut prompt, "Brand", &request.brand);
    push_field(&mut prompt, "Niche", &request.niche);
    push_field(&mut prompt, "Tone", &request.tone);
    push_field(&mut prompt, "Copy mode", &request.copy_mode);
    push_field(&mut prompt, "Platform", request.platform.as_str());
    if let Some(context) = request.extra_context.as_deref() {
        push_field(&mut prompt, "Extra context", context);
    }
    prompt.push_str(&format!("Core message:\n{}", request.message));
    prompt
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        prompt.push_str(&format!("{}: {}\n", label, value));
    }
}

fn extract_json_array(text: &str) -> Option<String> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}
