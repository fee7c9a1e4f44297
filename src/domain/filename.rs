//! File name checks for uploads and downloads.
//!
//! Uploaded names are allow-listed: only the last path component is kept,
//! characters outside `[A-Za-z0-9._-]` are replaced and leading dots dropped.
//! Download names are chosen by the processor, so they are only required to
//! stay inside the directory they are served from.

use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static pattern"));

/// Turn a client supplied file name into one that is safe to store.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = DISALLOWED.replace_all(last, "_");
    let trimmed = cleaned.trim_start_matches('.');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether `name` is a single plain path component.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_kept() {
        assert_eq!(sanitize_file_name("clip_01.mp4"), Some("clip_01.mp4".to_string()));
    }

    #[test]
    fn test_directories_are_stripped() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), Some("passwd".to_string()));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\font.ttf"), Some("font.ttf".to_string()));
    }

    #[test]
    fn test_disallowed_characters_are_replaced() {
        assert_eq!(
            sanitize_file_name("my song (final).mp3"),
            Some("my_song__final_.mp3".to_string())
        );
        assert_eq!(sanitize_file_name("a\"; rm -rf ~"), Some("a___rm_-rf__".to_string()));
    }

    #[test]
    fn test_dot_names_are_rejected() {
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("dir/"), None);
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name(".env"), Some("env".to_string()));
    }

    #[test]
    fn test_plain_name_check() {
        assert!(is_plain_file_name("output_1.mp4"));
        assert!(is_plain_file_name("scene 1.mp4"));
        assert!(is_plain_file_name("out(final).mp4"));
        assert!(is_plain_file_name("szene_ü.mp4"));
        assert!(is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name("../secret"));
        assert!(!is_plain_file_name("sub/out.mp4"));
        assert!(!is_plain_file_name("out.mp4/"));
        assert!(!is_plain_file_name("..\\secret"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(""));
    }
}
