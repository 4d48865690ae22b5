use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::de::DeserializeOwned;

use crate::{FailureKind, TransportError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body is not valid {encoding}")]
    Charset { encoding: String },
    #[error("unexpected json: {0}")]
    Json(String),
}

impl From<DecodeError> for TransportError {
    fn from(err: DecodeError) -> Self {
        TransportError::new(FailureKind::Decode, err.to_string())
    }
}

/// Decodes a page body to UTF-8: BOM first, then the Content-Type charset,
/// then a chardetng guess.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Parses an API response body. The JSON endpoints always answer in UTF-8.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let text = decode_with(bytes, UTF_8)?;
    serde_json::from_str(&text).map_err(|err| DecodeError::Json(err.to_string()))
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]))
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Charset {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}
