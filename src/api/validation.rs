use axum::body::Bytes;
use serde::de::DeserializeOwned;

use super::ApiError;

/// Parses a JSON object body. An empty body yields `T::default()` when `allow_empty` is set.
pub fn parse_json_body<T>(body: &Bytes, allow_empty: bool) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        if allow_empty {
            return Ok(T::default());
        }
        return Err(ApiError::validation("Request body must be a JSON object"));
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("Invalid JSON body: {e}")))
}

/// Presence check only: an empty string is a valid value.
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value.ok_or_else(|| ApiError::missing_field(field))
}

/// Presence check that also rejects empty and whitespace-only values.
pub fn require_non_empty<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(field)),
    }
}

/// Optional string fields treat empty values as absent.
pub fn optional_field(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{FileContentRequest, ListFilesRequest};

    #[test]
    fn test_parse_json_body() {
        let req: FileContentRequest =
            parse_json_body(&Bytes::from_static(br#"{"filename": "a.txt", "content": ""}"#), false)
                .unwrap();
        assert_eq!(req.filename.as_deref(), Some("a.txt"));
        assert_eq!(req.content.as_deref(), Some(""));

        assert!(parse_json_body::<FileContentRequest>(&Bytes::new(), false).is_err());
        assert!(parse_json_body::<FileContentRequest>(&Bytes::from_static(b"not json"), false).is_err());
        assert!(parse_json_body::<FileContentRequest>(&Bytes::from_static(b"[1, 2]"), false).is_err());

        let req: ListFilesRequest = parse_json_body(&Bytes::from_static(b"  "), true).unwrap();
        assert!(req.directory.is_none());
    }

    #[test]
    fn test_require_field() {
        assert_eq!(require_field(Some(""), "content").unwrap(), "");
        assert!(require_field(None, "content").is_err());

        assert!(require_non_empty(Some(""), "filename").is_err());
        assert!(require_non_empty(Some("   "), "filename").is_err());
        assert_eq!(require_non_empty(Some("a.txt"), "filename").unwrap(), "a.txt");
    }

    #[test]
    fn test_optional_field() {
        assert_eq!(optional_field(Some("")), None);
        assert_eq!(optional_field(Some("*.py")), Some("*.py"));
        assert_eq!(optional_field(None), None);
    }
}
