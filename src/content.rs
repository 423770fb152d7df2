//! Builds the H5P.MultiChoice `content.json` object from question text, answers and options.
//!
//! Pure transform: no IO and no failure path. Malformed answers are defaulted, not rejected.

use crate::domain::{
  AnswerItem, Behaviour, BuildOptions, FeedbackRange, Media, MediaFile, MediaParams,
  MultiChoiceContent, RawAnswer, TipsAndFeedback,
};

pub const DEFAULT_OVERALL_FEEDBACK: &str = "You scored @score out of @total points.";

#[derive(Clone, Debug)]
pub struct ContentBuilder {
  overall_feedback: String,
}

impl Default for ContentBuilder {
  fn default() -> Self {
    Self { overall_feedback: DEFAULT_OVERALL_FEEDBACK.to_string() }
  }
}

impl ContentBuilder {
  /// Builder whose single 0–100 feedback band uses `overall_feedback`.
  pub fn new(overall_feedback: impl Into<String>) -> Self {
    Self { overall_feedback: overall_feedback.into() }
  }

  pub fn build(
    &self,
    question_text: &str,
    answers: &[RawAnswer],
    title: &str,
    options: &BuildOptions,
  ) -> MultiChoiceContent {
    let answers = answers
      .iter()
      .map(|a| AnswerItem {
        text: wrap_markup(&a.text),
        correct: a.correct,
        tips_and_feedback: TipsAndFeedback {
          tip: a.tip.clone().unwrap_or_default(),
          ..TipsAndFeedback::default()
        },
      })
      .collect();

    MultiChoiceContent {
      question_title: title.to_string(),
      question: paragraph(question_text),
      answers,
      behaviour: Behaviour {
        show_solutions_requires_input: false,
        single_choice: options.single_choice,
        random_answers: options.randomize,
        enable_solutions_button: options.show_solution_button,
        enable_retry: options.show_retry_button,
        enable_check_button: options.show_check_button,
        auto_check: false,
      },
      media: Media {
        kind: "image".into(),
        params: MediaParams { file: MediaFile { path: String::new() } },
      },
      overall_feedback: vec![FeedbackRange {
        from: 0,
        to: 100,
        feedback: self.overall_feedback.clone(),
      }],
    }
  }
}

/// Trim and wrap in `<p>` unless the text already looks like markup.
///
/// Only the first and last character are inspected: `"<b>x</b> y"` stays as is
/// even though it is not a single element.
// TODO: replace the first/last-char check with a real fragment check (e.g. a root-element parse).
pub fn wrap_markup(text: &str) -> String {
  let text = text.trim();
  if looks_like_markup(text) { text.to_string() } else { paragraph(text) }
}

fn looks_like_markup(text: &str) -> bool {
  text.starts_with('<') && text.ends_with('>')
}

fn paragraph(text: &str) -> String {
  format!("<p>{}</p>", text)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(text: &str, correct: bool) -> RawAnswer {
    RawAnswer { text: text.into(), correct, tip: None }
  }

  #[test]
  fn capital_of_france_scenario() {
    let answers = vec![raw("Paris", true), raw("Lyon", false)];
    let c = ContentBuilder::default().build(
      "What is the capital of France?",
      &answers,
      "Capitals",
      &BuildOptions::default(),
    );

    assert_eq!(c.question_title, "Capitals");
    assert_eq!(c.question, "<p>What is the capital of France?</p>");
    assert_eq!(c.answers.len(), 2);
    assert_eq!(c.answers[0].text, "<p>Paris</p>");
    assert!(c.answers[0].correct);
    assert_eq!(c.answers[1].text, "<p>Lyon</p>");
    assert!(!c.answers[1].correct);
  }

  #[test]
  fn wrapping_skips_existing_markup() {
    assert_eq!(wrap_markup("<p>Paris</p>"), "<p>Paris</p>");
    assert_eq!(wrap_markup("  <em>x</em> "), "<em>x</em>");
    assert_eq!(wrap_markup("a < b"), "<p>a < b</p>");
    let once = wrap_markup("Lyon");
    assert_eq!(wrap_markup(&once), once);
  }

  #[test]
  fn preserves_order_flags_and_tips() {
    let answers = vec![
      RawAnswer { text: "one".into(), correct: false, tip: Some("think".into()) },
      raw("two", true),
      raw("three", false),
    ];
    let c = ContentBuilder::default().build("Q", &answers, "T", &BuildOptions::default());

    let texts: Vec<_> = c.answers.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, ["<p>one</p>", "<p>two</p>", "<p>three</p>"]);
    let flags: Vec<_> = c.answers.iter().map(|a| a.correct).collect();
    assert_eq!(flags, [false, true, false]);
    assert_eq!(c.answers[0].tips_and_feedback.tip, "think");
    assert_eq!(c.answers[1].tips_and_feedback.tip, "");
    assert_eq!(c.answers[0].tips_and_feedback.chosen_feedback, "");
  }

  #[test]
  fn options_map_onto_behaviour() {
    let options = BuildOptions {
      randomize: false,
      single_choice: false,
      show_solution_button: false,
      show_check_button: true,
      show_retry_button: false,
    };
    let b = ContentBuilder::default().build("Q", &[raw("a", true)], "T", &options).behaviour;

    assert!(!b.random_answers);
    assert!(!b.single_choice);
    assert!(!b.enable_solutions_button);
    assert!(b.enable_check_button);
    assert!(!b.enable_retry);
    assert!(!b.auto_check);
    assert!(!b.show_solutions_requires_input);
  }

  #[test]
  fn fixed_media_and_feedback_band() {
    let c = ContentBuilder::new("Score: @score/@total").build("Q", &[raw("a", true)], "T", &BuildOptions::default());
    assert_eq!(c.media.kind, "image");
    assert_eq!(c.media.params.file.path, "");
    assert_eq!(c.overall_feedback.len(), 1);
    assert_eq!((c.overall_feedback[0].from, c.overall_feedback[0].to), (0, 100));
    assert_eq!(c.overall_feedback[0].feedback, "Score: @score/@total");
  }

  #[test]
  fn serializes_with_h5p_field_names() {
    let c = ContentBuilder::default().build("Q", &[raw("a", true)], "T", &BuildOptions::default());
    let v = serde_json::to_value(&c).unwrap();

    assert_eq!(v["questionTitle"], "T");
    assert_eq!(v["answers"][0]["tipsAndFeedback"]["notChosenFeedback"], "");
    assert_eq!(v["behaviour"]["enableSolutionsButton"], true);
    assert_eq!(v["behaviour"]["randomAnswers"], true);
    assert_eq!(v["media"]["type"], "image");
    assert_eq!(v["media"]["params"]["file"]["path"], "");
    assert_eq!(v["overallFeedback"][0]["to"], 100);
  }
}
