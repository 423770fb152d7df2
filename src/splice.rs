//! Replace one member of a zip archive (an `.h5p` package) and repackage it.
//!
//! Flow:
//! 1) Write the input bytes into a scratch directory and extract every entry there.
//! 2) Overwrite (or create) the target member.
//! 3) Walk the extracted tree and deflate every file into a new archive.
//!
//! The scratch directory is a `TempDir`, removed on drop on every exit path.
//! Callers get complete output bytes or an error, never a partial archive.

use std::{
  fs::{self, File},
  io::{self, Read, Write},
  path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, instrument, warn};
use zip::{result::ZipError, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Member holding the content parameters inside an H5P package.
pub const CONTENT_ENTRY: &str = "content/content.json";

/// Serialize `content` and splice it into `archive` at `content/content.json`.
/// `pretty` selects 2-space indented JSON; otherwise compact.
pub fn splice_content<T: Serialize>(archive: &[u8], content: &T, pretty: bool) -> Result<Vec<u8>> {
  let json = if pretty {
    serde_json::to_string_pretty(content)?
  } else {
    serde_json::to_string(content)?
  };
  replace_entry(archive, CONTENT_ENTRY, json.as_bytes())
}

/// Return a new archive equal to `archive` except that `entry` holds `data`.
/// Missing parent directories of `entry` are created. Output entries are sorted by path.
#[instrument(level = "debug", skip(archive, data), fields(archive_len = archive.len(), %entry, data_len = data.len()))]
pub fn replace_entry(archive: &[u8], entry: &str, data: &[u8]) -> Result<Vec<u8>> {
  let scratch = tempfile::Builder::new().prefix("h5p-splice-").tempdir()?;

  let src_path = scratch.path().join("src.h5p");
  fs::write(&src_path, archive)?;

  let extract_dir = scratch.path().join("extract");
  fs::create_dir_all(&extract_dir)?;
  extract_all(&src_path, &extract_dir)?;

  let target = member_path(&extract_dir, entry)?;
  if let Some(parent) = target.parent() {
    create_member_dir(&extract_dir, parent)?;
  }
  write_member(&extract_dir, &target, data)?;

  let out_path = scratch.path().join("updated.h5p");
  let count = pack_dir(&extract_dir, &out_path)?;
  let bytes = fs::read(&out_path)?;
  debug!(entries = count, out_len = bytes.len(), "Archive repackaged");

  // Explicit close so a failed cleanup is reported instead of ignored by Drop.
  scratch.close()?;
  Ok(bytes)
}

fn extract_all(src: &Path, dest: &Path) -> Result<()> {
  let mut archive = ZipArchive::new(File::open(src)?)?;

  for i in 0..archive.len() {
    let mut member = archive.by_index(i)?;
    // Windows zippers may store `\` separators; fold them so `content\content.json` lands in `content/`.
    let name = member.name().replace('\\', "/");
    let Some(rel) = enclosed_path(&name) else {
      warn!(name = %member.name(), "Skipping archive entry outside the package root");
      continue;
    };
    let out = dest.join(rel);

    if name.ends_with('/') || member.is_dir() {
      create_member_dir(dest, &out)?;
      continue;
    }

    // Read errors here mean a corrupt member (bad CRC, truncated stream), not a scratch failure.
    let mut buf = Vec::with_capacity(member.size() as usize);
    member.read_to_end(&mut buf).map_err(|e| Error::Extraction(ZipError::Io(e)))?;

    if let Some(parent) = out.parent() {
      create_member_dir(dest, parent)?;
    }
    write_member(dest, &out, &buf)?;
  }
  Ok(())
}

/// Relative path for a `/`-separated member name, or `None` if it is absolute,
/// carries a drive prefix, or climbs out with `..`.
fn enclosed_path(name: &str) -> Option<PathBuf> {
  if name.starts_with('/') {
    return None;
  }
  let mut rel = PathBuf::new();
  for part in name.split('/').filter(|p| !p.is_empty() && *p != ".") {
    if part == ".." || part.contains(':') {
      return None;
    }
    rel.push(part);
  }
  if rel.as_os_str().is_empty() { None } else { Some(rel) }
}

/// `create_dir_all` that blames the archive when a member file already sits where a directory must go.
fn create_member_dir(root: &Path, dir: &Path) -> Result<()> {
  fs::create_dir_all(dir).map_err(|e| match blocking_file(root, dir) {
    Some(file) => layout_conflict(root, &file),
    None => Error::Resource(e),
  })
}

fn write_member(root: &Path, path: &Path, data: &[u8]) -> Result<()> {
  if path.is_dir() {
    return Err(layout_conflict(root, path));
  }
  fs::write(path, data).map_err(Error::Resource)
}

/// First existing non-directory between `root` (exclusive) and `dir`.
fn blocking_file(root: &Path, dir: &Path) -> Option<PathBuf> {
  let rel = dir.strip_prefix(root).ok()?;
  let mut cur = root.to_path_buf();
  for part in rel.components() {
    cur.push(part);
    if cur.exists() && !cur.is_dir() {
      return Some(cur);
    }
  }
  None
}

fn layout_conflict(root: &Path, path: &Path) -> Error {
  let name = path.strip_prefix(root).map(archive_name).unwrap_or_default();
  Error::Extraction(ZipError::Io(io::Error::new(
    io::ErrorKind::AlreadyExists,
    format!("archive member '{}' is both a file and a directory", name),
  )))
}

fn pack_dir(root: &Path, out_path: &Path) -> Result<usize> {
  let mut files = Vec::new();
  collect_files(root, root, &mut files)?;
  files.sort();

  let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
  let mut writer = ZipWriter::new(File::create(out_path)?);
  for (name, path) in &files {
    writer.start_file(name.as_str(), options).map_err(write_error)?;
    writer.write_all(&fs::read(path)?)?;
  }
  writer.finish().map_err(write_error)?;
  Ok(files.len())
}

/// Recursively gather `(archive name, fs path)` pairs. Names always use `/`.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
  for item in fs::read_dir(dir)? {
    let item = item?;
    let path = item.path();
    if item.file_type()?.is_dir() {
      collect_files(root, &path, out)?;
    } else {
      let rel = path
        .strip_prefix(root)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
      out.push((archive_name(rel), path));
    }
  }
  Ok(())
}

fn archive_name(rel: &Path) -> String {
  rel.components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect::<Vec<_>>()
    .join("/")
}

/// Resolve a `/`-separated member name under `root`, refusing anything that could escape it.
fn member_path(root: &Path, entry: &str) -> Result<PathBuf> {
  let mut path = root.to_path_buf();
  for part in entry.split('/').filter(|p| !p.is_empty()) {
    if part == "." || part == ".." || part.contains('\\') {
      return Err(Error::BadRequest(format!("Invalid archive member name: {}", entry)));
    }
    path.push(part);
  }
  if path == root {
    return Err(Error::BadRequest("Empty archive member name".into()));
  }
  Ok(path)
}

/// Writer-side zip failures are scratch/IO failures, not extraction failures.
fn write_error(e: ZipError) -> Error {
  match e {
    ZipError::Io(io) => Error::Resource(io),
    other => Error::Resource(io::Error::new(io::ErrorKind::Other, other)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  use crate::content::ContentBuilder;
  use crate::domain::{BuildOptions, MultiChoiceContent, RawAnswer};

  const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d, 0xff, 0x00];

  fn make_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut w = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
      w.start_file(*name, FileOptions::default()).unwrap();
      w.write_all(data).unwrap();
    }
    w.finish().unwrap().into_inner()
  }

  fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut a = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..a.len())
      .map(|i| {
        let mut f = a.by_index(i).unwrap();
        let mut buf = Vec::new();
        f.read_to_end(&mut buf).unwrap();
        (f.name().to_string(), buf)
      })
      .collect()
  }

  fn entry<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    entries.iter().find(|(n, _)| n == name).map(|(_, b)| b.as_slice())
  }

  fn sample_content() -> MultiChoiceContent {
    let answers = vec![
      RawAnswer { text: "Paris".into(), correct: true, tip: None },
      RawAnswer { text: "Lyon".into(), correct: false, tip: None },
    ];
    ContentBuilder::default().build("What is the capital of France?", &answers, "Capitals", &BuildOptions::default())
  }

  #[test]
  fn replaces_content_and_keeps_media_bytes() {
    let template = make_zip(&[
      ("content/content.json", br#"{"old":true}"#),
      ("media/img.png", PNG),
    ]);
    let content = sample_content();

    let out = splice_content(&template, &content, true).unwrap();
    let entries = read_entries(&out);

    assert_eq!(entries.len(), 2);
    assert_eq!(entry(&entries, "media/img.png"), Some(PNG));
    let json = entry(&entries, CONTENT_ENTRY).unwrap();
    let parsed: MultiChoiceContent = serde_json::from_slice(json).unwrap();
    assert_eq!(parsed, content);
  }

  #[test]
  fn round_trip_preserves_every_other_entry() {
    let template = make_zip(&[
      ("h5p.json", br#"{"mainLibrary":"H5P.MultiChoice"}"#),
      ("content/content.json", b"{}"),
      ("content/images/a.jpg", b"\x00\x01\x02jpeg"),
      ("H5P.MultiChoice-1.16/library.json", b"{\"x\":1}"),
    ]);
    let original = read_entries(&template);

    let out = splice_content(&template, &sample_content(), false).unwrap();
    let spliced = read_entries(&out);

    assert_eq!(spliced.len(), original.len());
    for (name, bytes) in original.iter().filter(|(n, _)| n != CONTENT_ENTRY) {
      assert_eq!(entry(&spliced, name), Some(bytes.as_slice()), "entry {name} changed");
    }
  }

  #[test]
  fn creates_content_dir_when_missing() {
    let template = make_zip(&[("h5p.json", b"{}")]);
    let out = splice_content(&template, &sample_content(), false).unwrap();
    let entries = read_entries(&out);

    assert_eq!(entries.len(), 2);
    assert!(entry(&entries, CONTENT_ENTRY).is_some());
    assert_eq!(entry(&entries, "h5p.json"), Some(&b"{}"[..]));
  }

  #[test]
  fn pretty_flag_controls_indentation() {
    let template = make_zip(&[("content/content.json", b"{}")]);
    let content = sample_content();

    let pretty = read_entries(&splice_content(&template, &content, true).unwrap());
    let compact = read_entries(&splice_content(&template, &content, false).unwrap());

    let pretty = String::from_utf8(entry(&pretty, CONTENT_ENTRY).unwrap().to_vec()).unwrap();
    let compact = String::from_utf8(entry(&compact, CONTENT_ENTRY).unwrap().to_vec()).unwrap();
    assert!(pretty.contains("\n  \"questionTitle\": \"Capitals\""));
    assert!(!compact.contains('\n'));
    assert!(compact.starts_with(r#"{"questionTitle":"Capitals""#));
  }

  #[test]
  fn non_ascii_is_written_as_utf8() {
    let template = make_zip(&[("content/content.json", b"{}")]);
    let answers = vec![RawAnswer { text: "Frietjes bakken in één keer".into(), correct: true, tip: None }];
    let content = ContentBuilder::default().build("Hoe bak ik frietjes?", &answers, "Frietjes", &BuildOptions::default());

    let entries = read_entries(&splice_content(&template, &content, false).unwrap());
    let json = std::str::from_utf8(entry(&entries, CONTENT_ENTRY).unwrap()).unwrap();
    assert!(json.contains("één"));
  }

  #[test]
  fn output_names_are_sorted_and_slash_separated() {
    let template = make_zip(&[("z/b.txt", b"b"), ("a.txt", b"a"), ("content/content.json", b"{}")]);
    let entries = read_entries(&replace_entry(&template, CONTENT_ENTRY, b"{}").unwrap());
    let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["a.txt", "content/content.json", "z/b.txt"]);
  }

  #[test]
  fn backslash_member_names_are_folded_into_directories() {
    let template = make_zip(&[
      ("content\\content.json", br#"{"stale":true}"#),
      ("content\\images\\a.jpg", b"jpeg"),
    ]);
    let entries = read_entries(&replace_entry(&template, CONTENT_ENTRY, b"{}").unwrap());
    let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();

    assert_eq!(names, ["content/content.json", "content/images/a.jpg"]);
    assert_eq!(entry(&entries, CONTENT_ENTRY), Some(&b"{}"[..]));
    assert_eq!(entry(&entries, "content/images/a.jpg"), Some(&b"jpeg"[..]));
  }

  #[test]
  fn file_where_content_dir_belongs_is_an_archive_error() {
    let template = make_zip(&[("content", b"not a directory"), ("h5p.json", b"{}")]);
    let err = splice_content(&template, &sample_content(), false).unwrap_err();
    assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
    assert!(err.to_string().contains("'content'"));
  }

  #[test]
  fn member_file_and_directory_with_same_name_is_an_archive_error() {
    let template = make_zip(&[("media", b"file"), ("media/img.png", PNG)]);
    let err = replace_entry(&template, CONTENT_ENTRY, b"{}").unwrap_err();
    assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
  }

  #[test]
  fn enclosed_path_rejects_escapes() {
    assert_eq!(enclosed_path("content/./a.json"), Some(Path::new("content").join("a.json")));
    assert_eq!(enclosed_path("../evil"), None);
    assert_eq!(enclosed_path("/etc/passwd"), None);
    assert_eq!(enclosed_path("C:/evil"), None);
    assert_eq!(enclosed_path("dir/"), Some(PathBuf::from("dir")));
  }

  #[test]
  fn invalid_bytes_fail_with_extraction_error() {
    let err = splice_content(b"definitely not a zip", &sample_content(), true).unwrap_err();
    assert!(matches!(err, Error::Extraction(_)), "got {err:?}");
  }

  #[test]
  fn rejects_member_names_that_escape_root() {
    let template = make_zip(&[("a.txt", b"a")]);
    assert!(matches!(replace_entry(&template, "../evil.txt", b"x"), Err(Error::BadRequest(_))));
    assert!(matches!(replace_entry(&template, "", b"x"), Err(Error::BadRequest(_))));
  }

  #[test]
  fn archive_name_joins_with_forward_slashes() {
    let rel = Path::new("content").join("images").join("a.jpg");
    assert_eq!(archive_name(&rel), "content/images/a.jpg");
  }
}
