//! Error handling for the API client

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Reqwest error, typically related to network issues, timeouts or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The envelope reported `success: false`.
    #[error("Request rejected: {message}")]
    Rejected {
        message: String,
        errors: Vec<String>,
    },

    /// The envelope reported success but carried no `data`.
    #[error("Response envelope is missing data")]
    MissingData,

    /// The response body was not a valid envelope for the expected type.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error bodies come either as a failed envelope or as a framework `detail`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<serde_json::Value>,
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(text) => Self::extract_message(&text),
            Err(_) => "Failed to read response text".to_string(),
        };

        ApiError::Http { status, message }
    }

    fn extract_message(text: &str) -> String {
        match serde_json::from_str::<ErrorBody>(text) {
            Ok(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
                ..
            }) => detail,
            Ok(ErrorBody {
                detail: Some(detail),
                ..
            }) => detail.to_string(),
            _ => text.to_string(),
        }
    }

    /// HTTP status of the failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server refused the credentials or token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// A short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status: 401, .. } => "Invalid credentials or expired session".to_string(),
            ApiError::Http { status: 403, .. } => "Access denied".to_string(),
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { status, .. } => format!("Server returned status {}", status),
            ApiError::Rejected { message, errors } if errors.is_empty() => message.clone(),
            ApiError::Rejected { message, errors } => {
                format!("{} ({})", message, errors.join("; "))
            }
            ApiError::Reqwest(e) if e.is_timeout() => "Request timed out".to_string(),
            ApiError::Reqwest(e) if e.is_connect() => "Unable to reach the API".to_string(),
            ApiError::Reqwest(_) => "Network error".to_string(),
            ApiError::MissingData | ApiError::Decode(_) => {
                "Unexpected response from the API".to_string()
            }
        }
    }
}
