//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{BuildOptions, MultiChoiceContent, RawAnswer};

/// No `Debug`: the body may carry the caller's OpenAI key.
#[derive(Deserialize)]
pub struct GenerateIn {
    pub prompt: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub options: BuildOptions,
    /// Optional per-request OpenAI key, used instead of the server's.
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub id: String,
    pub content: MultiChoiceContent,
}

/// Manual authoring: same shape the model returns, plus options.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIn {
    pub question_text: String,
    pub answers: Vec<RawAnswer>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub options: BuildOptions,
}

#[derive(Debug, Serialize)]
pub struct ContentOut {
    pub content: MultiChoiceContent,
}

/// Second step of the flow: the client sends back the content it got from `/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildIn {
    pub content: MultiChoiceContent,
    /// Base package; the built-in template is used when absent.
    #[serde(default)]
    pub template_base64: Option<String>,
    #[serde(default)]
    pub pretty: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub openai: bool,
    pub builtin_template: bool,
}
