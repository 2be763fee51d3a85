//! Authentication
//!
//! [`service::AuthService`] talks to the API and keeps the durable record;
//! [`session::SessionStore`] owns the in-memory session built on top of it.

use crate::api::error::ApiError;
use crate::storage::StorageError;
use thiserror::Error;

pub mod models;
pub mod service;
pub mod session;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// A short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::Api(e) => e.user_message(),
            AuthError::Storage(e) => format!("Unable to save session: {}", e),
        }
    }
}
