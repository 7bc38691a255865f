use serde::{Deserialize, Deserializer, Serialize};

/// JSON envelope for every `/api/*` response.
///
/// Payload fields are flattened next to `status` and `message`, so a list
/// response reads `{"status": "success", "message": ..., "count": 2, "files": [...]}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FileContentRequest {
    pub filename: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateModuleRequest {
    pub module: Option<String>,
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub overwrite: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesRequest {
    pub directory: Option<String>,
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub timestamp: String,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub auth: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldDoc],
}

#[derive(Debug, Serialize)]
pub struct FieldDoc {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DocsResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub authentication: &'static str,
    pub endpoints: &'static [EndpointDoc],
}

/// Accepts JSON booleans, numbers, and the strings `true`/`1`/`yes`/`on`
/// (query strings carry everything as text).
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<BoolLike>::deserialize(deserializer)? {
        None => false,
        Some(BoolLike::Bool(b)) => b,
        Some(BoolLike::Int(i)) => i != 0,
        Some(BoolLike::Str(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_payload() {
        #[derive(Serialize)]
        struct Payload {
            count: usize,
        }

        let body = serde_json::to_value(ApiResponse::success("ok", Payload { count: 3 })).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "ok");
        assert_eq!(body["count"], 3);

        let body = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "error", "message": "nope"}));
    }

    #[test]
    fn test_flexible_bool() {
        let req: ListFilesRequest = serde_json::from_str(r#"{"recursive": true}"#).unwrap();
        assert!(req.recursive);
        let req: ListFilesRequest = serde_json::from_str(r#"{"recursive": "True"}"#).unwrap();
        assert!(req.recursive);
        let req: ListFilesRequest = serde_json::from_str(r#"{"recursive": 0}"#).unwrap();
        assert!(!req.recursive);
        let req: ListFilesRequest = serde_json::from_str(r#"{"recursive": null}"#).unwrap();
        assert!(!req.recursive);
        let req: ListFilesRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.recursive);
    }

    #[test]
    fn test_generate_request_type_field() {
        let req: GenerateModuleRequest =
            serde_json::from_str(r#"{"module": "x", "type": "journal_tracker"}"#).unwrap();
        assert_eq!(req.module_type.as_deref(), Some("journal_tracker"));
        assert!(!req.overwrite);
    }
}
