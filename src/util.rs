//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings (counted in chars, not bytes).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}

/// Download file name derived from a quiz title: ASCII alphanumerics, `-` and `_` only.
pub fn package_file_name(title: &str) -> String {
  let stem: String = title
    .trim()
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
    .collect();
  let stem = stem.trim_matches('_');
  if stem.is_empty() { "updated.h5p".into() } else { format!("{}.h5p", stem) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_keys() {
    let out = fill_template("Q: {prompt} / {prompt} ({lang})", &[("prompt", "fries"), ("lang", "nl")]);
    assert_eq!(out, "Q: fries / fries (nl)");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert_eq!(trunc_for_log("ééééé", 2), "éé… (10 bytes total)");
  }

  #[test]
  fn package_file_name_is_ascii_safe() {
    assert_eq!(package_file_name("Capitals of Europe"), "Capitals_of_Europe.h5p");
    assert_eq!(package_file_name("  "), "updated.h5p");
    assert_eq!(package_file_name("¿?"), "updated.h5p");
    assert_eq!(package_file_name("Quiz: één"), "Quiz____n.h5p");
  }
}
