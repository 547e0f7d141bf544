//! Plain text decoding

/// Decode as UTF-8, falling back to Latin-1
///
/// Latin-1 maps every byte to the code point of the same value, so decoding
/// never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text("naïve café".as_bytes()), "naïve café");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in Latin-1 is not valid UTF-8
        assert_eq!(decode_text(&[0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(decode_text(&[0xFF]), "ÿ");
    }

    #[test]
    fn test_empty() {
        assert_eq!(decode_text(&[]), "");
    }
}
