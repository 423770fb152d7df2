//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Multipart, State},
  http::{header, StatusCode},
  response::IntoResponse,
  Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::MultiChoiceContent;
use crate::error::{Error, Result};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::util::package_file_name;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    openai: state.openai.is_some(),
    builtin_template: state.has_builtin_template(),
  })
}

#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<Json<GenerateOut>> {
  let content = generate_content(
    &state,
    &body.prompt,
    body.title.as_deref(),
    &body.options,
    body.api_key.as_deref(),
  )
  .await?;
  let id = Uuid::new_v4().to_string();
  info!(target: "h5p_forge", %id, title = %content.question_title, "HTTP generate served");
  Ok(Json(GenerateOut { id, content }))
}

#[instrument(level = "info", skip(state, body), fields(answers = body.answers.len()))]
pub async fn http_post_content(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ContentIn>,
) -> Result<Json<ContentOut>> {
  let content = build_content(&state, &body.question_text, &body.answers, body.title.as_deref(), &body.options)?;
  Ok(Json(ContentOut { content }))
}

#[instrument(level = "info", skip(state, body), fields(uploaded = body.template_base64.is_some()))]
pub async fn http_post_build(
  State(state): State<Arc<AppState>>,
  Json(body): Json<BuildIn>,
) -> Result<impl IntoResponse> {
  let template = body
    .template_base64
    .as_deref()
    .map(|b64| STANDARD.decode(b64.trim()))
    .transpose()
    .map_err(|e| Error::BadRequest(format!("templateBase64 is not valid base64: {}", e)))?;

  let file_name = package_file_name(&body.content.question_title);
  let bytes = build_package(&state, template, body.content, body.pretty).await?;
  Ok(package_response(&file_name, bytes))
}

/// Multipart variant of `/build`: `template` (file, optional), `content` (JSON text), `pretty` (optional).
#[instrument(level = "info", skip(state, multipart))]
pub async fn http_post_build_upload(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse> {
  let mut template = None;
  let mut content: Option<MultiChoiceContent> = None;
  let mut pretty = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.to_string()))?
  {
    let field_name = field.name().unwrap_or_default().to_string();
    match field_name.as_str() {
      "template" => {
        let name = field.file_name().unwrap_or("template.h5p").to_string();
        let data = field.bytes().await.map_err(|e| Error::BadRequest(e.to_string()))?;
        info!(target: "h5p_forge", %name, len = data.len(), "Template uploaded");
        if !data.is_empty() {
          template = Some(data.to_vec());
        }
      }
      "content" => {
        let text = field.text().await.map_err(|e| Error::BadRequest(e.to_string()))?;
        let parsed = serde_json::from_str(&text)
          .map_err(|e| Error::BadRequest(format!("content is not valid MultiChoice JSON: {}", e)))?;
        content = Some(parsed);
      }
      "pretty" => {
        let text = field.text().await.map_err(|e| Error::BadRequest(e.to_string()))?;
        pretty = Some(matches!(text.trim(), "true" | "1" | "on"));
      }
      other => warn!(target: "h5p_forge", field = %other, "Ignoring unknown multipart field"),
    }
  }

  let content = content.ok_or_else(|| Error::BadRequest("Missing 'content' field; generate the question first".into()))?;
  let file_name = package_file_name(&content.question_title);
  let bytes = build_package(&state, template, content, pretty).await?;
  Ok(package_response(&file_name, bytes))
}

/// Download the built-in base package.
#[instrument(level = "info", skip(state))]
pub async fn http_get_template(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
  let bytes = state.builtin_template().await?;
  Ok(package_response("template.h5p", bytes))
}

fn package_response(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
  let disposition = format!("attachment; filename=\"{}\"", file_name);
  (
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, "application/zip".to_string()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    bytes,
  )
}
