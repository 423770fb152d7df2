//! Loading forge configuration (prompts + defaults) from TOML.
//!
//! See `ForgeConfig`, `Prompts` and `Defaults` for the expected schema:
//!
//! ```toml
//! [prompts]
//! generate_system = "..."
//! generate_user_template = "{prompt}"
//!
//! [defaults]
//! title = "AI-generated exercise"
//! template_path = "templates/basisMC.h5p"
//! pretty = true
//!
//! [openai]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::content::DEFAULT_OVERALL_FEEDBACK;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ForgeConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub defaults: Defaults,
  #[serde(default)]
  pub openai: OpenAiSettings,
}

/// Where chat completions go. The API key is never part of the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
  pub base_url: String,
  pub model: String,
}

impl Default for OpenAiSettings {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".into(),
      model: "gpt-4o-mini".into(),
    }
  }
}

/// Prompts used by the OpenAI client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub generate_system: String,
  /// `{prompt}` is replaced by the user's text.
  pub generate_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generate_system: concat!(
        "You are an assistant that writes multiple-choice questions for H5P. ",
        "Answer ONLY with a single JSON object with exactly these fields:\n",
        "{ \"question_text\": \"…\", \"answers\":[{\"text\":\"…\",\"correct\":true|false}], \"question_title\":\"…\"}\n",
        "Rules:\n",
        "- Exactly one correct answer (one item with correct=true).\n",
        "- No explanation, no code blocks, only JSON.",
      ).into(),
      generate_user_template: "{prompt}".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Defaults {
  /// Used when neither the request nor the model supplies a title.
  pub title: String,
  /// Built-in base package used when the client sends no template.
  pub template_path: String,
  pub pretty: bool,
  pub overall_feedback: String,
  pub temperature: f32,
  pub max_upload_bytes: usize,
}

impl Default for Defaults {
  fn default() -> Self {
    Self {
      title: "AI-generated exercise".into(),
      template_path: "templates/basisMC.h5p".into(),
      pretty: true,
      overall_feedback: DEFAULT_OVERALL_FEEDBACK.into(),
      temperature: 0.7,
      max_upload_bytes: 64 * 1024 * 1024,
    }
  }
}

/// Load `ForgeConfig` from FORGE_CONFIG_PATH (falls back to defaults on any error),
/// then apply the H5P_TEMPLATE_PATH, OPENAI_BASE_URL and OPENAI_MODEL overrides.
pub fn load_forge_config_from_env() -> ForgeConfig {
  let mut cfg = std::env::var("FORGE_CONFIG_PATH")
    .ok()
    .and_then(|path| read_config(&path))
    .unwrap_or_default();

  for (var, slot) in [
    ("H5P_TEMPLATE_PATH", &mut cfg.defaults.template_path),
    ("OPENAI_BASE_URL", &mut cfg.openai.base_url),
    ("OPENAI_MODEL", &mut cfg.openai.model),
  ] {
    if let Ok(v) = std::env::var(var) {
      if !v.trim().is_empty() {
        *slot = v;
      }
    }
  }
  cfg
}

fn read_config(path: &str) -> Option<ForgeConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<ForgeConfig>(&s) {
      Ok(cfg) => {
        info!(target: "h5p_forge", %path, "Loaded forge config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "h5p_forge", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "h5p_forge", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
