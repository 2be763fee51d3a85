//! Auth service
//!
//! API calls for the session plus the durable `auth_token` / `user` record.

use crate::api::AuthApi;
use crate::api::error::ApiError;
use crate::auth::AuthError;
use crate::auth::models::{AuthPayload, Credentials, RegisterData, TokenPayload, User};
use crate::consts::cli_consts::storage::{AUTH_TOKEN_KEY, USER_KEY};
use crate::storage::{Storage, StorageError};
use std::sync::Arc;

/// What the durable storage holds for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedState {
    /// Nothing stored.
    Empty,
    /// A token and a well-formed user.
    Complete { token: String, user: User },
    /// A partial or undecodable record.
    Invalid(String),
}

#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn Storage>,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn Storage>) -> Self {
        Self { api, storage }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, AuthError> {
        let payload = self.api.login(credentials).await?;
        self.persist(&payload)?;
        Ok(payload)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthPayload, AuthError> {
        let payload = self.api.register(data).await?;
        self.persist(&payload)?;
        Ok(payload)
    }

    /// Notify the server, then clear the durable record whatever the outcome.
    ///
    /// Returns the notification result so callers can log it.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let notified = self.api.logout().await;
        if let Err(e) = self.clear() {
            log::warn!("Failed to clear stored session: {}", e);
        }
        notified
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.api.current_user().await
    }

    /// Trade the token for a fresh one and store it.
    pub async fn refresh_token(&self) -> Result<TokenPayload, AuthError> {
        let payload = self.api.refresh_token().await?;
        self.storage
            .set_all(&[(AUTH_TOKEN_KEY, payload.token.as_str())])?;
        Ok(payload)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        Ok(self.api.forgot_password(email).await?)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        if token.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Reset token and new password are required".to_string(),
            ));
        }
        Ok(self.api.reset_password(token, password).await?)
    }

    /// Replace the stored user record, keeping the token.
    pub fn store_user(&self, user: &User) -> Result<(), AuthError> {
        let user_json = serde_json::to_string(user).map_err(StorageError::from)?;
        self.storage.set_all(&[(USER_KEY, user_json.as_str())])?;
        Ok(())
    }

    /// Read and validate the durable record.
    pub fn persisted(&self) -> Result<PersistedState, StorageError> {
        let token = self.storage.get(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = self.storage.get(USER_KEY)?;

        Ok(match (token, user) {
            (None, None) => PersistedState::Empty,
            (Some(_), None) => PersistedState::Invalid("token without user".to_string()),
            (None, Some(_)) => PersistedState::Invalid("user without token".to_string()),
            (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
                Ok(user) => PersistedState::Complete { token, user },
                Err(e) => PersistedState::Invalid(format!("undecodable user: {}", e)),
            },
        })
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_all(&[AUTH_TOKEN_KEY, USER_KEY])
    }

    /// Token and user are written as one record.
    fn persist(&self, payload: &AuthPayload) -> Result<(), AuthError> {
        let user_json = serde_json::to_string(&payload.user).map_err(StorageError::from)?;
        self.storage.set_all(&[
            (AUTH_TOKEN_KEY, payload.token.as_str()),
            (USER_KEY, user_json.as_str()),
        ])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAuthApi;
    use crate::auth::models::fixtures;
    use crate::storage::MemoryStorage;

    fn service(api: MockAuthApi, storage: Arc<MemoryStorage>) -> AuthService {
        AuthService::new(Arc::new(api), storage)
    }

    fn payload(token: &str) -> AuthPayload {
        AuthPayload {
            user: fixtures::user("u-1", "Ada"),
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_token_and_user() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .times(1)
            .returning(|_| Ok(payload("tok-1")));
        let storage = Arc::new(MemoryStorage::default());
        let service = service(api, storage.clone());

        service
            .login(&Credentials::new("ada@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(
            service.persisted().unwrap(),
            PersistedState::Complete {
                token: "tok-1".to_string(),
                user: fixtures::user("u-1", "Ada"),
            }
        );
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let mut api = MockAuthApi::new();
        api.expect_login().returning(|_| {
            Err(ApiError::Http {
                status: 401,
                message: "Invalid credentials".to_string(),
            })
        });
        let storage = Arc::new(MemoryStorage::default());
        let service = service(api, storage.clone());

        let result = service.login(&Credentials::new("ada@example.com", "pw")).await;
        assert!(matches!(result, Err(AuthError::Api(_))));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    // The server being unreachable must not keep the session on disk.
    async fn test_logout_clears_storage_even_when_notify_fails() {
        let mut api = MockAuthApi::new();
        api.expect_logout().times(1).returning(|| {
            Err(ApiError::Http {
                status: 503,
                message: String::new(),
            })
        });
        let storage = Arc::new(MemoryStorage::with_entries(&[
            (AUTH_TOKEN_KEY, "tok-1"),
            (USER_KEY, "{}"),
        ]));
        let service = service(api, storage.clone());

        assert!(service.logout().await.is_err());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_token_replaces_only_the_token() {
        let mut api = MockAuthApi::new();
        api.expect_refresh_token().returning(|| {
            Ok(TokenPayload {
                token: "tok-2".to_string(),
            })
        });
        let user_json = serde_json::to_string(&fixtures::user("u-1", "Ada")).unwrap();
        let storage = Arc::new(MemoryStorage::with_entries(&[
            (AUTH_TOKEN_KEY, "tok-1"),
            (USER_KEY, user_json.as_str()),
        ]));
        let service = service(api, storage.clone());

        service.refresh_token().await.unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok-2"));
        assert_eq!(storage.get(USER_KEY).unwrap(), Some(user_json));
    }

    #[test]
    fn test_partial_records_are_invalid() {
        let token_only = service(
            MockAuthApi::new(),
            Arc::new(MemoryStorage::with_entries(&[(AUTH_TOKEN_KEY, "tok-1")])),
        );
        assert!(matches!(
            token_only.persisted().unwrap(),
            PersistedState::Invalid(_)
        ));

        let user_only = service(
            MockAuthApi::new(),
            Arc::new(MemoryStorage::with_entries(&[(USER_KEY, "{}")])),
        );
        assert!(matches!(
            user_only.persisted().unwrap(),
            PersistedState::Invalid(_)
        ));

        let garbage_user = service(
            MockAuthApi::new(),
            Arc::new(MemoryStorage::with_entries(&[
                (AUTH_TOKEN_KEY, "tok-1"),
                (USER_KEY, "not json"),
            ])),
        );
        assert!(matches!(
            garbage_user.persisted().unwrap(),
            PersistedState::Invalid(_)
        ));
    }

    #[test]
    fn test_empty_storage_is_empty_state() {
        let service = service(MockAuthApi::new(), Arc::new(MemoryStorage::default()));
        assert_eq!(service.persisted().unwrap(), PersistedState::Empty);
    }

    #[tokio::test]
    async fn test_forgot_password_requires_email() {
        let mut api = MockAuthApi::new();
        api.expect_forgot_password().never();
        let service = service(api, Arc::new(MemoryStorage::default()));
        assert!(matches!(
            service.forgot_password("  ").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_password_forwards_token_and_password() {
        let mut api = MockAuthApi::new();
        api.expect_reset_password()
            .withf(|token, password| token == "reset-1" && password == "n3w")
            .times(1)
            .returning(|_, _| Ok(()));
        let service = service(api, Arc::new(MemoryStorage::default()));
        service.reset_password("reset-1", "n3w").await.unwrap();
    }
}
