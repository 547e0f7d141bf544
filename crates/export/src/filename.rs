//! Download filename sanitizer

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of the sanitized base name, in characters
pub const MAX_FILENAME_CHARS: usize = 50;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid pattern"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("valid pattern"))
}

/// Drop punctuation, collapse dashes and whitespace into `_`, cap the length
pub fn sanitize_filename(title: &str) -> String {
    let cleaned = disallowed().replace_all(title, "");
    let collapsed = separators().replace_all(cleaned.trim(), "_");
    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_filename("Hello, World! -- 2024"), "Hello_World_2024");
        assert_eq!(sanitize_filename("  spaced   out  "), "spaced_out");
        assert_eq!(sanitize_filename("snake_case-stays"), "snake_case_stays");
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("?!*"), "");
    }

    #[test]
    fn test_unicode_word_chars_kept() {
        assert_eq!(sanitize_filename("Résumé für Café"), "Résumé_für_Café");
    }

    #[test]
    fn test_truncated() {
        let title = "word ".repeat(30);
        let name = sanitize_filename(&title);
        assert_eq!(name.chars().count(), MAX_FILENAME_CHARS);
        assert!(name.starts_with("word_word"));
    }
}
