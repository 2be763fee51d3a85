//! Event System
//!
//! Events published by the session store and the dashboard loaders

use crate::auth::session::SessionPhase;
use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Source {
    /// Authentication session transitions.
    Session,
    /// Dashboard card loading.
    Dashboard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    StateChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub source: Source,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
    /// Session phase reached, for state change events
    pub phase: Option<SessionPhase>,
}

impl Event {
    fn new(source: Source, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            source,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
            phase: None,
        }
    }

    pub fn state_change(phase: SessionPhase, msg: String) -> Self {
        Self {
            phase: Some(phase),
            ..Self::new(Source::Session, msg, EventType::StateChange, LogLevel::Debug)
        }
    }

    pub fn session_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Session, msg, event_type, log_level)
    }

    pub fn dashboard_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Dashboard, msg, event_type, log_level)
    }

    pub fn should_display(&self) -> bool {
        // State changes are only shown when debugging.
        if self.event_type == EventType::StateChange {
            return should_log_with_env(LogLevel::Debug);
        }
        if self.event_type == EventType::Success {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.event_type, self.timestamp, self.source, self.msg
        )
    }
}

/// Non-blocking event publishing shared by the session store and card loaders.
///
/// A full or closed queue drops the event; publishers never wait on readers.
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub fn send_event(&self, event: Event) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => log::debug!("Event queue full, dropped: {}", event),
            Err(TrySendError::Closed(_)) => {}
        }
    }

    pub fn send_session_event(&self, message: String, event_type: EventType, log_level: LogLevel) {
        self.send_event(Event::session_with_level(message, event_type, log_level));
    }

    pub fn send_dashboard_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::dashboard_with_level(message, event_type, log_level));
    }
}
