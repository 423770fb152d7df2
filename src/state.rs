//! Application state: prompts, defaults, content builder, and the optional OpenAI client.
//!
//! Nothing here is mutated after startup. The generate/build flow keeps its
//! intermediate results on the client, so requests share no session data.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::config::{load_forge_config_from_env, Defaults, ForgeConfig, OpenAiSettings, Prompts};
use crate::content::ContentBuilder;
use crate::error::{Error, Result};
use crate::openai::OpenAI;

#[derive(Clone)]
pub struct AppState {
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub defaults: Defaults,
    pub openai_settings: OpenAiSettings,
    pub builder: ContentBuilder,
}

impl AppState {
    /// Build state from env: load config, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_forge_config_from_env();

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env(&cfg.openai);
        if let Some(oa) = &openai {
            info!(target: "h5p_forge", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            warn!(target: "h5p_forge", "OpenAI disabled (no OPENAI_API_KEY). Generation needs a key from the client.");
        }

        let state = Self::from_parts(cfg, openai);
        if state.has_builtin_template() {
            info!(target: "h5p_forge", path = %state.defaults.template_path, "Built-in template found");
        } else {
            warn!(target: "h5p_forge", path = %state.defaults.template_path, "Built-in template missing; clients must upload one");
        }
        state
    }

    pub fn from_parts(cfg: ForgeConfig, openai: Option<OpenAI>) -> Self {
        let builder = ContentBuilder::new(cfg.defaults.overall_feedback.clone());
        Self {
            openai,
            prompts: cfg.prompts,
            defaults: cfg.defaults,
            openai_settings: cfg.openai,
            builder,
        }
    }

    /// Client for one request: a caller-supplied key wins, else the server-wide client.
    pub fn openai_for(&self, api_key: Option<&str>) -> Option<OpenAI> {
        api_key
            .and_then(|k| OpenAI::with_key(k, &self.openai_settings))
            .or_else(|| self.openai.clone())
    }

    pub fn has_builtin_template(&self) -> bool {
        Path::new(&self.defaults.template_path).is_file()
    }

    /// Read the configured base package from disk.
    #[instrument(level = "debug", skip(self), fields(path = %self.defaults.template_path))]
    pub async fn builtin_template(&self) -> Result<Vec<u8>> {
        let path = &self.defaults.template_path;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::BadRequest(format!(
                "No template available: built-in template '{}' not found; upload one instead",
                path
            ))),
            Err(e) => Err(Error::Resource(e)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_parts(ForgeConfig::default(), None)
    }
}
