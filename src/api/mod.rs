use crate::api::error::ApiError;
use crate::auth::models::{AuthPayload, Credentials, RegisterData, TokenPayload, User};
use crate::dashboard::alerts::{AlertQuery, AlertStats, AlertsPage};
use crate::dashboard::compliance::{ComplianceReport, ComplianceStandard, ComplianceStats};
use crate::dashboard::cost::{CostAnalysis, CostPeriod, CostSummary};
use crate::dashboard::pipelines::Pipeline;
use crate::dashboard::topology::{Topology, UsageCostSummary};

pub(crate) mod client;
pub use client::ApiClient;
pub mod envelope;
pub mod error;

#[cfg(test)]
use mockall::automock;

/// Authentication endpoints under `/auth`.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a user record and bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError>;

    /// Create an account; the new user is signed in immediately.
    async fn register(&self, data: &RegisterData) -> Result<AuthPayload, ApiError>;

    /// Tell the server the current token is no longer in use.
    async fn logout(&self) -> Result<(), ApiError>;

    /// The user the current token belongs to.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Trade the current token for a fresh one.
    async fn refresh_token(&self) -> Result<TokenPayload, ApiError>;

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;

    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError>;
}

/// Read-only monitoring endpoints behind the dashboard cards.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn alerts(&self, query: &AlertQuery) -> Result<AlertsPage, ApiError>;

    async fn alert_stats(&self) -> Result<AlertStats, ApiError>;

    async fn compliance(&self) -> Result<ComplianceReport, ApiError>;

    async fn compliance_standard(&self, id: &str) -> Result<ComplianceStandard, ApiError>;

    async fn compliance_stats(&self) -> Result<ComplianceStats, ApiError>;

    async fn cost_analysis(&self, period: CostPeriod) -> Result<CostAnalysis, ApiError>;

    async fn cost_summary(&self) -> Result<CostSummary, ApiError>;

    /// Resources grouped by provider.
    async fn usage(&self) -> Result<Topology, ApiError>;

    async fn usage_cost_summary(&self) -> Result<UsageCostSummary, ApiError>;

    async fn pipelines(&self) -> Result<Vec<Pipeline>, ApiError>;
}
