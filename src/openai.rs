//! Minimal OpenAI client for question generation.
//!
//! We only call chat.completions and request a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::{OpenAiSettings, Prompts};
use crate::domain::GeneratedQuestion;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(settings: &OpenAiSettings) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    Self::with_key(&api_key, settings)
  }

  /// Client for a caller-supplied key (e.g. entered in the form). Blank keys yield None.
  pub fn with_key(api_key: &str, settings: &OpenAiSettings) -> Option<Self> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
      return None;
    }
    Self::new(api_key.to_string(), settings.base_url.clone(), settings.model.clone())
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string(), model })
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "h5p-forge/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = first_message_text(&body);
    debug!(response_len = text.len(), preview = %trunc_for_log(&text, 120), "OpenAI raw response");

    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  /// Ask the model for one multiple-choice question about `prompt_text`.
  /// The result is not validated here; see `logic::ensure_single_correct`.
  #[instrument(level = "info", skip(self, prompts, prompt_text), fields(prompt_len = prompt_text.len(), model = %self.model))]
  pub async fn generate_question(
    &self,
    prompts: &Prompts,
    prompt_text: &str,
    temperature: f32,
  ) -> Result<GeneratedQuestion, String> {
    let user = fill_template(&prompts.generate_user_template, &[("prompt", prompt_text)]);
    let start = std::time::Instant::now();
    let result = self.chat_json::<GeneratedQuestion>(&prompts.generate_system, &user, temperature).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(q) => info!(?elapsed, answers = q.answers.len(), "Model response received successfully"),
      Err(e) => error!(?elapsed, error = %e, "Model call failed during question generation"),
    }
    result
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

fn first_message_text(body: &ChatCompletionResponse) -> String {
  body.choices.first()
    .and_then(|c| c.message.content.clone())
    .unwrap_or_default().trim().to_string()
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
