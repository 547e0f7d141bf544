//! Lightweight language guess
//!
//! Looks at the first characters of a text only. Script ranges decide for
//! Chinese, Japanese, Korean and Arabic; otherwise the lower-cased sample is
//! searched for common function words of a handful of Latin and Cyrillic
//! languages, in a fixed order.

/// Number of characters examined
pub const SAMPLE_CHARS: usize = 500;

/// Fallback when nothing matches
pub const DEFAULT_LANGUAGE: &str = "en";

/// Checked in this order; the first language with a hit wins
const COMMON_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "is", "are", "of", "to", "with", "that", "this", "was", "for", "it"]),
    ("es", &["el", "los", "las", "que", "y", "por", "para", "con", "una", "es"]),
    ("fr", &["le", "les", "et", "est", "des", "une", "dans", "pour", "avec", "qui"]),
    ("de", &["der", "die", "das", "und", "ist", "nicht", "ein", "mit", "auf", "für"]),
    ("ru", &["и", "в", "не", "на", "что", "это", "как", "он"]),
];

/// Guess a two-letter language code; never fails
pub fn detect_language(sample: &str) -> &'static str {
    let head: String = sample.chars().take(SAMPLE_CHARS).collect();
    if head.trim().is_empty() {
        return DEFAULT_LANGUAGE;
    }

    if let Some(code) = detect_script(&head) {
        return code;
    }

    // Words are matched as space-delimited substrings of the folded sample
    let folded = format!(" {} ", head.to_lowercase());
    COMMON_WORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| folded.contains(&format!(" {} ", w))))
        .map(|(code, _)| *code)
        .unwrap_or(DEFAULT_LANGUAGE)
}

fn detect_script(text: &str) -> Option<&'static str> {
    let has = |ranges: &[(u32, u32)]| {
        text.chars().any(|c| {
            let cp = c as u32;
            ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
        })
    };

    if has(&[(0x4E00, 0x9FFF), (0x3400, 0x4DBF)]) {
        Some("zh")
    } else if has(&[(0x3040, 0x30FF)]) {
        Some("ja")
    } else if has(&[(0xAC00, 0xD7AF), (0x1100, 0x11FF)]) {
        Some("ko")
    } else if has(&[(0x0600, 0x06FF)]) {
        Some("ar")
    } else {
        None
    }
}
