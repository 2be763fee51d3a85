//! Session store
//!
//! The single piece of shared mutable state. Every transition goes through
//! [`SessionStore`], which serializes operations and broadcasts each change
//! to subscribers.

use crate::auth::AuthError;
use crate::auth::models::{Credentials, RegisterData, User};
use crate::auth::service::{AuthService, PersistedState};
use crate::error_classifier::ErrorClassifier;
use crate::events::{Event, EventSender, EventType};
use crate::logging::LogLevel;
use log::Level;
use std::fmt::{Display, Formatter};
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing has been read from storage yet.
    Uninitialized,
    /// An operation is in flight and there is no authenticated user.
    Loading,
    /// `verified` is false while a restored token has not been confirmed by the server.
    Authenticated { verified: bool },
    Anonymous,
}

impl Display for SessionPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Uninitialized => write!(f, "Uninitialized"),
            SessionPhase::Loading => write!(f, "Loading"),
            SessionPhase::Authenticated { verified: true } => write!(f, "Authenticated"),
            SessionPhase::Authenticated { verified: false } => {
                write!(f, "Authenticated (unverified)")
            }
            SessionPhase::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// User and token only ever exist together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Auth {
    #[default]
    Anonymous,
    Authenticated {
        user: User,
        token: String,
        verified: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    auth: Auth,
    loading: bool,
    initialized: bool,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match &self.auth {
            Auth::Authenticated { user, .. } => Some(user),
            Auth::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.auth {
            Auth::Authenticated { token, .. } => Some(token),
            Auth::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, Auth::Authenticated { .. })
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.auth {
            Auth::Authenticated { verified, .. } => SessionPhase::Authenticated {
                verified: *verified,
            },
            Auth::Anonymous if self.loading => SessionPhase::Loading,
            Auth::Anonymous if self.initialized => SessionPhase::Anonymous,
            Auth::Anonymous => SessionPhase::Uninitialized,
        }
    }

    fn sign_in(&mut self, user: User, token: String, verified: bool) {
        self.auth = Auth::Authenticated {
            user,
            token,
            verified,
        };
    }

    fn sign_out(&mut self) {
        self.auth = Auth::Anonymous;
    }

    fn settle(&mut self) {
        self.loading = false;
        self.initialized = true;
    }
}

pub struct SessionStore {
    service: AuthService,
    state: watch::Sender<Session>,
    events: Option<EventSender>,
    classifier: ErrorClassifier,
    /// Held for the whole of each operation so transitions never interleave.
    op_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(service: AuthService) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            service,
            state,
            events: None,
            classifier: ErrorClassifier::new(),
            op_lock: Mutex::new(()),
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Restore the persisted session and confirm it with the server.
    ///
    /// Never fails: every problem ends in `Anonymous`.
    pub async fn initialize(&self) -> SessionPhase {
        let _guard = self.op_lock.lock().await;
        self.restore_locked();
        self.verify_locked().await
    }

    /// First half of [`initialize`](Self::initialize): read storage and set
    /// the optimistic state. Loading stays set while a token awaits verification.
    pub async fn restore(&self) -> SessionPhase {
        let _guard = self.op_lock.lock().await;
        self.restore_locked()
    }

    /// Second half of [`initialize`](Self::initialize): check the restored token.
    pub async fn verify(&self) -> SessionPhase {
        let _guard = self.op_lock.lock().await;
        self.verify_locked().await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let _guard = self.op_lock.lock().await;
        self.update(|s| s.loading = true);
        let result = self.service.login(credentials).await;
        self.finish_sign_in(result, "Logged in")
    }

    /// Password confirmation is checked by the caller.
    pub async fn register(&self, data: &RegisterData) -> Result<User, AuthError> {
        if data.name.trim().is_empty() || data.email.trim().is_empty() || data.password.is_empty()
        {
            return Err(AuthError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }

        let _guard = self.op_lock.lock().await;
        self.update(|s| s.loading = true);
        let result = self.service.register(data).await;
        self.finish_sign_in(result, "Account created")
    }

    /// End the session locally whatever the server says.
    pub async fn logout(&self) {
        let _guard = self.op_lock.lock().await;
        self.update(|s| s.loading = true);

        if let Err(e) = self.service.logout().await {
            let level = self.classifier.classify_api_error(&e);
            log::log!(Level::from(level), "Logout notification failed: {}", e);
            self.send_event(
                format!("Logout notification failed: {}", e.user_message()),
                EventType::Error,
                level,
            );
        }

        self.update(|s| {
            s.sign_out();
            s.settle();
        });
        self.send_event("Logged out".to_string(), EventType::Success, LogLevel::Info);
    }

    /// Re-fetch the current user. On failure the cached user is kept.
    pub async fn refresh_user(&self) -> Option<User> {
        let _guard = self.op_lock.lock().await;
        if !self.snapshot().is_authenticated() {
            log::debug!("No session to refresh");
            return None;
        }

        match self.service.current_user().await {
            Ok(user) => {
                self.keep_user(&user);
                // A good `/auth/me` also confirms a restored token.
                self.update(|s| {
                    if let Auth::Authenticated {
                        user: current,
                        verified,
                        ..
                    } = &mut s.auth
                    {
                        *current = user.clone();
                        *verified = true;
                    }
                    s.settle();
                });
                self.send_event(
                    "User refreshed".to_string(),
                    EventType::Refresh,
                    LogLevel::Debug,
                );
                Some(user)
            }
            Err(e) => {
                self.update(|s| s.loading = false);
                let level = self.classifier.classify_api_error(&e);
                log::log!(Level::from(level), "Failed to refresh user: {}", e);
                self.send_event(
                    format!("Failed to refresh user: {}", e.user_message()),
                    EventType::Error,
                    level,
                );
                None
            }
        }
    }

    /// Trade the token for a fresh one. Failures propagate.
    pub async fn refresh_token(&self) -> Result<(), AuthError> {
        let _guard = self.op_lock.lock().await;
        if !self.snapshot().is_authenticated() {
            return Err(AuthError::Validation("Not logged in".to_string()));
        }

        let payload = self.service.refresh_token().await.inspect_err(|e| {
            self.update(|s| s.loading = false);
            self.send_event(
                format!("Token refresh failed: {}", e.user_message()),
                EventType::Error,
                self.classifier.classify_auth_error(e),
            );
        })?;
        self.update(|s| {
            if let Auth::Authenticated { token, .. } = &mut s.auth {
                *token = payload.token.clone();
            }
            s.loading = false;
        });
        self.send_event(
            "Token refreshed".to_string(),
            EventType::Refresh,
            LogLevel::Info,
        );
        Ok(())
    }

    fn restore_locked(&self) -> SessionPhase {
        self.update(|s| s.loading = true);

        match self.service.persisted() {
            Ok(PersistedState::Complete { token, user }) => {
                // Optimistic until the server confirms the token.
                self.update(|s| s.sign_in(user, token, false));
            }
            Ok(PersistedState::Empty) => {
                self.update(|s| {
                    s.sign_out();
                    s.settle();
                });
            }
            Ok(PersistedState::Invalid(reason)) => {
                log::warn!("Discarding stored session: {}", reason);
                self.discard_stored_session();
            }
            Err(e) => {
                log::warn!("Unable to read stored session: {}", e);
                self.discard_stored_session();
            }
        }
        self.phase()
    }

    async fn verify_locked(&self) -> SessionPhase {
        if !self.snapshot().is_authenticated() {
            self.update(Session::settle);
            return self.phase();
        }

        match self.service.current_user().await {
            Ok(user) => {
                self.keep_user(&user);
                self.update(|s| {
                    if let Auth::Authenticated {
                        user: current,
                        verified,
                        ..
                    } = &mut s.auth
                    {
                        *current = user.clone();
                        *verified = true;
                    }
                    s.settle();
                });
                self.send_event(
                    format!("Session restored for {}", user.email),
                    EventType::Success,
                    LogLevel::Info,
                );
            }
            Err(e) => {
                let level = self.classifier.classify_api_error(&e);
                log::log!(Level::from(level), "Stored session rejected: {}", e);
                self.send_event(
                    format!("Stored session is no longer valid: {}", e.user_message()),
                    EventType::Error,
                    level,
                );
                self.discard_stored_session();
            }
        }
        self.phase()
    }

    fn finish_sign_in(
        &self,
        result: Result<crate::auth::models::AuthPayload, AuthError>,
        message: &str,
    ) -> Result<User, AuthError> {
        match result {
            Ok(payload) => {
                let user = payload.user.clone();
                self.update(|s| {
                    s.sign_in(payload.user, payload.token, true);
                    s.settle();
                });
                self.send_event(
                    format!("{} as {}", message, user.email),
                    EventType::Success,
                    LogLevel::Info,
                );
                Ok(user)
            }
            Err(e) => {
                // Previous state stands; only the loading flag is dropped.
                self.update(|s| s.loading = false);
                self.send_event(
                    e.user_message(),
                    EventType::Error,
                    self.classifier.classify_auth_error(&e),
                );
                Err(e)
            }
        }
    }

    fn discard_stored_session(&self) {
        if let Err(e) = self.service.clear() {
            log::warn!("Failed to clear stored session: {}", e);
        }
        self.update(|s| {
            s.sign_out();
            s.settle();
        });
    }

    fn keep_user(&self, user: &User) {
        if let Err(e) = self.service.store_user(user) {
            log::warn!("Failed to store refreshed user: {}", e);
        }
    }

    fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    /// Apply a change and notify subscribers only when something changed.
    fn update(&self, f: impl FnOnce(&mut Session)) {
        let mut changed_to = None;
        self.state.send_if_modified(|session| {
            let before = session.clone();
            f(session);
            if *session == before {
                return false;
            }
            if session.phase() != before.phase() {
                changed_to = Some(session.phase());
            }
            true
        });

        if let Some(phase) = changed_to {
            log::debug!("Session phase: {}", phase);
            if let Some(events) = &self.events {
                events.send_event(Event::state_change(phase, format!("Session {}", phase)));
            }
        }
    }

    fn send_event(&self, message: String, event_type: EventType, level: LogLevel) {
        if let Some(events) = &self.events {
            events.send_session_event(message, event_type, level);
        }
    }
}
