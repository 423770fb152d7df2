//! Domain models: raw answer input, build options, the model's question record,
//! and the H5P MultiChoice `content.json` shape.
//!
//! Field names of `MultiChoiceContent` and its children are the H5P wire contract.

use serde::{Deserialize, Serialize};

/// Loose answer record as it arrives from the model or a client.
/// Every field is optional on the wire and defaults when missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawAnswer {
  #[serde(default)] pub text: String,
  #[serde(default)] pub correct: bool,
  #[serde(default)] pub tip: Option<String>,
}

/// Record returned by the generation model.
#[derive(Clone, Debug, Deserialize)]
pub struct GeneratedQuestion {
  pub question_text: String,
  #[serde(default)] pub answers: Vec<RawAnswer>,
  #[serde(default)] pub question_title: Option<String>,
}

/// Display options for the MultiChoice runtime. All default to `true`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
  pub randomize: bool,
  pub single_choice: bool,
  pub show_solution_button: bool,
  pub show_check_button: bool,
  pub show_retry_button: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      randomize: true,
      single_choice: true,
      show_solution_button: true,
      show_check_button: true,
      show_retry_button: true,
    }
  }
}

// --- H5P.MultiChoice content.json ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceContent {
  pub question_title: String,
  pub question: String,
  pub answers: Vec<AnswerItem>,
  pub behaviour: Behaviour,
  pub media: Media,
  pub overall_feedback: Vec<FeedbackRange>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerItem {
  pub text: String,
  pub correct: bool,
  pub tips_and_feedback: TipsAndFeedback,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TipsAndFeedback {
  pub tip: String,
  pub chosen_feedback: String,
  pub not_chosen_feedback: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Behaviour {
  pub show_solutions_requires_input: bool,
  pub single_choice: bool,
  pub random_answers: bool,
  pub enable_solutions_button: bool,
  pub enable_retry: bool,
  pub enable_check_button: bool,
  pub auto_check: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Media {
  #[serde(rename = "type")]
  pub kind: String,
  pub params: MediaParams,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaParams {
  pub file: MediaFile,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
  pub path: String,
}

/// Score band (percent) mapped to a feedback string. `@score`/`@total` are H5P placeholders.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackRange {
  pub from: u8,
  pub to: u8,
  pub feedback: String,
}
