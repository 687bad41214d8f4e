use serde::{Deserialize, Serialize};

/// Response envelope of every API endpoint.
///
/// `success` is always present. Successful responses carry `data` and optionally a
/// `message`; failed responses carry a `message` and optionally per-field `errors`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Converts the envelope into its payload, or the failure message.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "request was not successful".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_omits_absent_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_error_with_field_errors() {
        let response: ApiResponse<()> =
            ApiResponse::error("validation failed").with_errors(vec!["firstName is required".into()]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            json!({
                "success": false,
                "message": "validation failed",
                "errors": ["firstName is required"],
            })
        );
    }

    #[test]
    fn test_parses_minimal_envelope() {
        let response: ApiResponse<String> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(response.into_result(), Ok(None));

        let failed: ApiResponse<String> =
            serde_json::from_str(r#"{"success": false, "message": "nope"}"#).unwrap();
        assert_eq!(failed.into_result(), Err("nope".to_string()));
    }

    fn decode<T: serde::de::DeserializeOwned>(json: &str) -> ApiResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct NoDefault {
        id: String,
    }

    #[test]
    fn test_decodes_payload_without_default_impl() {
        let response: ApiResponse<NoDefault> = decode(r#"{"success": true, "data": {"id": "7"}}"#);
        assert_eq!(response.into_result(), Ok(Some(NoDefault { id: "7".into() })));

        let empty: ApiResponse<NoDefault> = decode(r#"{"success": true}"#);
        assert_eq!(empty.data, None);
    }
}
