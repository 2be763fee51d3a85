//! The uniform `{ success, data, message?, errors? }` response wrapper.

use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    #[cfg(test)]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    /// Unwrap the payload, turning `success: false` into [`ApiError::Rejected`].
    pub fn into_data(self) -> Result<T, ApiError> {
        self.check()?.data.ok_or(ApiError::MissingData)
    }

    /// Check the envelope for calls whose payload is irrelevant.
    pub fn into_unit(self) -> Result<(), ApiError> {
        self.check().map(|_| ())
    }

    fn check(self) -> Result<Self, ApiError> {
        if self.success {
            return Ok(self);
        }
        Err(ApiError::Rejected {
            message: self
                .message
                .unwrap_or_else(|| "Request was not successful".to_string()),
            errors: self.errors.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Token {
        token: String,
    }

    #[test]
    fn test_successful_envelope_yields_data() {
        let envelope: ApiResponse<Token> =
            serde_json::from_str(r#"{"success":true,"data":{"token":"abc"}}"#).unwrap();
        assert_eq!(
            envelope.into_data().unwrap(),
            Token {
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_failed_envelope_is_rejected_with_errors() {
        let envelope: ApiResponse<Token> = serde_json::from_str(
            r#"{"success":false,"data":null,"message":"Bad input","errors":["email required"]}"#,
        )
        .unwrap();
        match envelope.into_data() {
            Err(ApiError::Rejected { message, errors }) => {
                assert_eq!(message, "Bad input");
                assert_eq!(errors, vec!["email required".to_string()]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_on_success_is_an_error() {
        let envelope: ApiResponse<Token> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(envelope.into_data(), Err(ApiError::MissingData)));
    }

    #[test]
    fn test_unit_calls_ignore_payload() {
        let envelope: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"success":true,"data":{"anything":1}}"#).unwrap();
        assert!(envelope.into_unit().is_ok());
    }
}
