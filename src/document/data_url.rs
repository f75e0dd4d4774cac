use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::constants::document::EXPECTED_DATA_URL_PREFIX;
use crate::error::DocumentError;

const BASE64_MARKER: &str = ";base64";

/// Decode a base64 data URL (`data:<mime>;base64,<payload>`) into UTF-8 text.
pub fn decode_text_data_url(content: &str) -> Result<String, DocumentError> {
    let content = content.trim();
    let rest = content.strip_prefix("data:").ok_or(DocumentError::NotDataUrl)?;
    let (media_type, payload) = rest
        .split_once(',')
        .ok_or(DocumentError::NotDataUrl)?;

    if !media_type.ends_with(BASE64_MARKER) {
        return Err(DocumentError::NotBase64Encoded);
    }
    if !content.starts_with(EXPECTED_DATA_URL_PREFIX) {
        debug!("[DOCUMENT] Accepting data URL with media type '{}'", media_type);
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(payload)?;
    String::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8)
}

/// Encode text the way a browser file reader delivers it.
pub fn encode_text_data_url(text: &str) -> String {
    format!("{}{}", EXPECTED_DATA_URL_PREFIX, STANDARD.encode(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_text_data_url() {
        // "print('x')\n"
        let url = "data:text/plain;base64,cHJpbnQoJ3gnKQo=";
        assert_eq!(decode_text_data_url(url).unwrap(), "print('x')\n");
    }

    #[test]
    fn test_decode_other_media_type() {
        let url = "data:text/x-python;base64,cHJpbnQoJ3gnKQo=";
        assert_eq!(decode_text_data_url(url).unwrap(), "print('x')\n");
    }

    #[test]
    fn test_decode_utf8_content() {
        let url = encode_text_data_url("# Stratégie €\n");
        assert_eq!(decode_text_data_url(&url).unwrap(), "# Stratégie €\n");
    }

    #[test]
    fn test_decode_empty_file() {
        assert_eq!(decode_text_data_url("data:text/plain;base64,").unwrap(), "");
    }

    #[test]
    fn test_reject_non_data_url() {
        assert!(matches!(
            decode_text_data_url("cHJpbnQoJ3gnKQo="),
            Err(DocumentError::NotDataUrl)
        ));
        assert!(matches!(
            decode_text_data_url("data:text/plain;base64"),
            Err(DocumentError::NotDataUrl)
        ));
    }

    #[test]
    fn test_reject_percent_encoded_data_url() {
        assert!(matches!(
            decode_text_data_url("data:text/plain,print%28%29"),
            Err(DocumentError::NotBase64Encoded)
        ));
    }

    #[test]
    fn test_reject_bad_base64() {
        assert!(matches!(
            decode_text_data_url("data:text/plain;base64,@@@"),
            Err(DocumentError::Base64(_))
        ));
    }

    #[test]
    fn test_reject_binary_content() {
        // 0xFF 0xFE is not valid UTF-8
        assert!(matches!(
            decode_text_data_url("data:text/plain;base64,//4="),
            Err(DocumentError::InvalidUtf8)
        ));
    }
}
