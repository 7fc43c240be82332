//! Base64 armoring for free-form wire fields.
//!
//! The builder port carries free-form text (room names, descriptions, exit
//! keywords) as single whitespace-delimited tokens. Base64 is the agreed
//! escape: it survives embedded spaces, newlines, and the `~` terminator
//! used by the underlying world file format. A lone `-` or an empty token
//! stands for the empty string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode a free-form string as standard base64 with no line breaks.
/// The empty string encodes to the empty string.
pub fn encode(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    STANDARD.encode(s.as_bytes())
}

/// Encode a free-form string as a wire token: empty strings become the `-`
/// sentinel so positional fields never collapse.
pub fn encode_token(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        encode(s)
    }
}

/// Decode an armored token. `""` and `"-"` decode to the empty string;
/// malformed base64 decodes to the empty string as well. The server is
/// authoritative on correctness, so decoding stays lenient.
pub fn decode(t: &str) -> String {
    if t.is_empty() || t == "-" {
        return String::new();
    }
    match STANDARD.decode(t.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_round_trips() {
        assert_eq!(encode(""), "");
        assert_eq!(decode(""), "");
        assert_eq!(decode("-"), "");
    }

    #[test]
    fn round_trips_free_form_text() {
        for s in [
            "A hall",
            "A long hall.",
            "line one\nline two~\n",
            "tabs\tand  spaces",
            "unicode: åäö 🗺",
        ] {
            assert_eq!(decode(&encode(s)), s);
        }
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode("A hall"), "QSBoYWxs");
        assert_eq!(decode("QSBsb25nIGhhbGwu"), "A long hall.");
        assert_eq!(decode("Y29uZmxpY3Q="), "conflict");
    }

    #[test]
    fn malformed_base64_decodes_to_empty() {
        assert_eq!(decode("!!not-base64!!"), "");
        assert_eq!(decode("QQ=太"), "");
    }

    #[test]
    fn token_encoding_uses_sentinel_for_empty() {
        assert_eq!(encode_token(""), "-");
        assert_eq!(encode_token("A hall"), "QSBoYWxs");
    }
}
