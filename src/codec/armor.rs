//! Two-line text armor
//!
//! ```text
//! untrusted comment: <arbitrary text>
//! <base64 payload>
//! ```
//!
//! Blank lines and whitespace around either line are tolerated, as are
//! `\r\n` line endings. Parsing is a single pass over the lines.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::SecureBytes;
use crate::error::{MinikeyError, Result};
use crate::signature::UNTRUSTED_COMMENT_PREFIX;

pub const DEFAULT_COMMENT: &str = "minikey encrypted secret key";

#[derive(Debug)]
pub struct Armored {
    pub comment: String,
    pub payload: SecureBytes,
}

pub fn decode(text: &str) -> Result<Armored> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let comment = lines
        .next()
        .and_then(|line| line.strip_prefix(UNTRUSTED_COMMENT_PREFIX))
        .map(str::trim)
        .filter(|comment| !comment.is_empty())
        .ok_or_else(|| MinikeyError::Format("missing untrusted comment line".into()))?;

    let token = lines
        .next()
        .ok_or_else(|| MinikeyError::Format("missing payload line".into()))?;

    if lines.next().is_some() {
        return Err(MinikeyError::Format("unexpected data after payload".into()));
    }

    if !token.bytes().all(is_base64_byte) {
        return Err(MinikeyError::Format("payload is not base64".into()));
    }

    let payload = STANDARD
        .decode(token)
        .map_err(|e| MinikeyError::Format(format!("payload is not base64: {}", e)))?;

    Ok(Armored {
        comment: comment.to_string(),
        payload: SecureBytes::new(payload),
    })
}

/// Render `payload` under an untrusted comment line. Line breaks in
/// `comment` are flattened so the output always has exactly two lines.
pub fn encode(comment: &str, payload: &[u8]) -> String {
    let flattened: String = comment
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let comment = match flattened.trim() {
        "" => DEFAULT_COMMENT,
        trimmed => trimmed,
    };

    format!(
        "{}{}\n{}\n",
        UNTRUSTED_COMMENT_PREFIX,
        comment,
        STANDARD.encode(payload)
    )
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        let armored = decode("untrusted comment: my key\nAAECAw==\n").unwrap();
        assert_eq!(armored.comment, "my key");
        assert_eq!(&*armored.payload, &[0, 1, 2, 3]);
    }

    #[test]
    fn test_decode_tolerates_whitespace() {
        let armored = decode("\r\n  untrusted comment: my key  \r\n\r\n\tAAECAw==  \r\n\n").unwrap();
        assert_eq!(armored.comment, "my key");
        assert_eq!(&*armored.payload, &[0, 1, 2, 3]);
    }

    #[test]
    fn test_decode_without_trailing_newline() {
        let armored = decode("untrusted comment: x\nAAECAw==").unwrap();
        assert_eq!(armored.payload.len(), 4);
    }

    #[test]
    fn test_decode_missing_comment() {
        assert!(matches!(decode("AAECAw==\n"), Err(MinikeyError::Format(_))));
        assert!(matches!(decode("comment: x\nAAECAw==\n"), Err(MinikeyError::Format(_))));
        assert!(matches!(decode("untrusted comment:   \nAAECAw==\n"), Err(MinikeyError::Format(_))));
        assert!(matches!(decode(""), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_decode_requires_space_after_prefix() {
        assert!(matches!(decode("untrusted comment:foo\nAAECAw==\n"), Err(MinikeyError::Format(_))));
        assert!(matches!(decode("untrusted comment:\tfoo\nAAECAw==\n"), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_decode_missing_payload() {
        assert!(matches!(decode("untrusted comment: x\n\n"), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(matches!(decode("untrusted comment: x\nAAEC Aw==\n"), Err(MinikeyError::Format(_))));
        assert!(matches!(decode("untrusted comment: x\nAAE*Aw==\n"), Err(MinikeyError::Format(_))));
        // right alphabet, wrong padding
        assert!(matches!(decode("untrusted comment: x\nAAECA\n"), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_decode_rejects_trailing_lines() {
        let text = "untrusted comment: x\nAAECAw==\nAAECAw==\n";
        assert!(matches!(decode(text), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_encode_flattens_comment() {
        let text = encode("line one\nline two", &[0, 1, 2, 3]);
        assert_eq!(text, "untrusted comment: line one line two\nAAECAw==\n");
    }

    #[test]
    fn test_encode_empty_comment_uses_default() {
        let text = encode("  ", &[0]);
        assert!(text.starts_with(&format!("{}{}", UNTRUSTED_COMMENT_PREFIX, DEFAULT_COMMENT)));
    }
}
