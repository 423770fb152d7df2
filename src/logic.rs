//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Generating a question via OpenAI, validating it, and building content.json
//!   - Building content.json directly from client-supplied answers
//!   - Splicing content into a template package (blocking, off the async runtime)

use tracing::{error, info, instrument};

use crate::domain::{BuildOptions, MultiChoiceContent, RawAnswer};
use crate::error::{Error, Result};
use crate::splice::splice_content;
use crate::state::AppState;

/// Reject unless exactly one answer is marked correct.
pub fn ensure_single_correct(answers: &[RawAnswer]) -> Result<()> {
  let correct = answers.iter().filter(|a| a.correct).count();
  if correct == 1 { Ok(()) } else { Err(Error::Validation { correct }) }
}

/// First non-blank of: model title, requested title, configured default.
pub fn resolve_title<'a>(generated: Option<&'a str>, requested: Option<&'a str>, default: &'a str) -> &'a str {
  [generated, requested]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .unwrap_or(default)
}

/// `api_key` is a caller-supplied OpenAI key; without one the server-wide client is used.
#[instrument(level = "info", skip(state, prompt, api_key), fields(prompt_len = prompt.len(), user_key = api_key.is_some()))]
pub async fn generate_content(
  state: &AppState,
  prompt: &str,
  title: Option<&str>,
  options: &BuildOptions,
  api_key: Option<&str>,
) -> Result<MultiChoiceContent> {
  if prompt.trim().is_empty() {
    return Err(Error::BadRequest("Prompt must not be empty".into()));
  }
  let oa = state
    .openai_for(api_key)
    .ok_or_else(|| Error::Config("OpenAI disabled: no OPENAI_API_KEY configured and no API key supplied".into()))?;

  let generated = oa
    .generate_question(&state.prompts, prompt, state.defaults.temperature)
    .await
    .map_err(Error::Upstream)?;

  if let Err(e) = ensure_single_correct(&generated.answers) {
    error!(target: "h5p_forge", error = %e, answers = generated.answers.len(), "Generated question rejected");
    return Err(e);
  }

  let title = resolve_title(generated.question_title.as_deref(), title, &state.defaults.title);
  let content = state.builder.build(&generated.question_text, &generated.answers, title, options);
  info!(target: "h5p_forge", %title, answers = content.answers.len(), "Question generated");
  Ok(content)
}

/// Build content.json from client-supplied answers, with the same validation rule as generation.
#[instrument(level = "info", skip(state, question_text, answers), fields(answers = answers.len()))]
pub fn build_content(
  state: &AppState,
  question_text: &str,
  answers: &[RawAnswer],
  title: Option<&str>,
  options: &BuildOptions,
) -> Result<MultiChoiceContent> {
  if answers.is_empty() {
    return Err(Error::BadRequest("At least one answer is required".into()));
  }
  ensure_single_correct(answers)?;
  let title = resolve_title(None, title, &state.defaults.title);
  Ok(state.builder.build(question_text, answers, title, options))
}

/// Splice `content` into `template` (or the built-in template when `None`).
#[instrument(level = "info", skip(state, template, content), fields(uploaded = template.is_some()))]
pub async fn build_package(
  state: &AppState,
  template: Option<Vec<u8>>,
  content: MultiChoiceContent,
  pretty: Option<bool>,
) -> Result<Vec<u8>> {
  let template = match template {
    Some(bytes) if !bytes.is_empty() => bytes,
    Some(_) => return Err(Error::BadRequest("Uploaded template is empty".into())),
    None => state.builtin_template().await?,
  };
  let pretty = pretty.unwrap_or(state.defaults.pretty);

  let bytes = tokio::task::spawn_blocking(move || splice_content(&template, &content, pretty))
    .await
    .map_err(|e| Error::Internal(format!("Splice task failed: {}", e)))??;

  info!(target: "h5p_forge", out_len = bytes.len(), %pretty, "Package built");
  Ok(bytes)
}
