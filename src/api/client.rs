//! CloudOps API Client
//!
//! The single HTTP egress of the client. Attaches the stored bearer token to
//! every request and unwraps the response envelope.

use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::api::{AuthApi, DashboardApi};
use crate::auth::models::{AuthPayload, Credentials, RegisterData, TokenPayload, User};
use crate::config::ApiConfig;
use crate::consts::cli_consts::storage::AUTH_TOKEN_KEY;
use crate::dashboard::alerts::{AlertQuery, AlertStats, AlertsPage};
use crate::dashboard::compliance::{ComplianceReport, ComplianceStandard, ComplianceStats};
use crate::dashboard::cost::{CostAnalysis, CostPeriod, CostSummary};
use crate::dashboard::pipelines::Pipeline;
use crate::dashboard::topology::{Topology, UsageCostSummary};
use crate::storage::Storage;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("cloudops-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    storage: Arc<dyn Storage>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            config,
            storage,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The token is read on every request so a login in another process is picked up.
    fn stored_token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::debug!("Sending request without token: {}", e);
                None
            }
        }
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.config.url_for(endpoint);
        log::trace!("{} {}", method, url);
        let builder = self.client.request(method, &url);
        match self.stored_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    /// An empty 2xx body counts as a bare success.
    fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<ApiResponse<T>, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse {
                success: true,
                data: None,
                message: None,
                errors: None,
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = request.send().await?;
        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_envelope(&response_bytes)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(self.request(Method::GET, endpoint).query(query))
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(self.request(Method::POST, endpoint).json(body))
            .await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(self.request(Method::POST, endpoint)).await
    }

    #[allow(unused)]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(self.request(Method::PUT, endpoint).json(body))
            .await
    }

    #[allow(unused)]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(self.request(Method::DELETE, endpoint)).await
    }
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        self.post("auth/login", credentials).await?.into_data()
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthPayload, ApiError> {
        self.post("auth/register", data).await?.into_data()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty::<serde_json::Value>("auth/logout")
            .await?
            .into_unit()
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("auth/me", &[]).await?.into_data()
    }

    async fn refresh_token(&self) -> Result<TokenPayload, ApiError> {
        self.post_empty("auth/refresh").await?.into_data()
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.post::<serde_json::Value, _>("auth/forgot-password", &json!({ "email": email }))
            .await?
            .into_unit()
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        self.post::<serde_json::Value, _>(
            "auth/reset-password",
            &json!({ "token": token, "password": password }),
        )
        .await?
        .into_unit()
    }
}

#[async_trait::async_trait]
impl DashboardApi for ApiClient {
    async fn alerts(&self, query: &AlertQuery) -> Result<AlertsPage, ApiError> {
        self.get("alerts", &query.to_query_pairs())
            .await?
            .into_data()
    }

    async fn alert_stats(&self) -> Result<AlertStats, ApiError> {
        self.get("alerts/summary/stats", &[]).await?.into_data()
    }

    async fn compliance(&self) -> Result<ComplianceReport, ApiError> {
        self.get("compliance/", &[]).await?.into_data()
    }

    async fn compliance_standard(&self, id: &str) -> Result<ComplianceStandard, ApiError> {
        let endpoint = format!("compliance/{}", urlencoding::encode(id));
        self.get(&endpoint, &[]).await?.into_data()
    }

    async fn compliance_stats(&self) -> Result<ComplianceStats, ApiError> {
        self.get("compliance/summary/stats", &[]).await?.into_data()
    }

    async fn cost_analysis(&self, period: CostPeriod) -> Result<CostAnalysis, ApiError> {
        self.get("ai-cost/", &[("time_range", period.to_string())])
            .await?
            .into_data()
    }

    async fn cost_summary(&self) -> Result<CostSummary, ApiError> {
        self.get("ai-cost/summary", &[]).await?.into_data()
    }

    async fn usage(&self) -> Result<Topology, ApiError> {
        self.get("usage/", &[]).await?.into_data()
    }

    async fn usage_cost_summary(&self) -> Result<UsageCostSummary, ApiError> {
        self.get("usage/cost-summary", &[]).await?.into_data()
    }

    async fn pipelines(&self) -> Result<Vec<Pipeline>, ApiError> {
        self.get("pipelines", &[]).await?.into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::fixtures;
    use crate::storage::MemoryStorage;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}/api/v1", addr)
    }

    fn client(base_url: String, storage: MemoryStorage) -> ApiClient {
        ApiClient::new(ApiConfig::new(base_url), Arc::new(storage)).unwrap()
    }

    async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if authorization != "Bearer tok-123" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Not authenticated"})),
            );
        }
        let user = fixtures::user("u-1", "Ada");
        (
            StatusCode::OK,
            Json(json!({"success": true, "data": user})),
        )
    }

    #[tokio::test]
    async fn test_bearer_token_is_read_from_storage() {
        let base = serve(Router::new().route("/api/v1/auth/me", get(me))).await;
        let api = client(
            base,
            MemoryStorage::with_entries(&[(AUTH_TOKEN_KEY, "tok-123")]),
        );
        let user = api.current_user().await.unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_http_error() {
        let base = serve(Router::new().route("/api/v1/auth/me", get(me))).await;
        let api = client(base, MemoryStorage::default());
        match api.current_user().await {
            Err(ApiError::Http { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Not authenticated");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_rejected() {
        let app = Router::new().route(
            "/api/v1/auth/login",
            post(|| async {
                Json(json!({
                    "success": false,
                    "data": null,
                    "message": "Invalid email or password",
                    "errors": ["password mismatch"]
                }))
            }),
        );
        let api = client(serve(app).await, MemoryStorage::default());
        let result = api
            .login(&Credentials::new("ops@example.com", "wrong"))
            .await;
        match result {
            Err(ApiError::Rejected { message, errors }) => {
                assert_eq!(message, "Invalid email or password");
                assert_eq!(errors, vec!["password mismatch".to_string()]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_alert_query_is_sent_as_parameters() {
        let app = Router::new().route(
            "/api/v1/alerts",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let severity = params.get("severity").cloned().unwrap_or_default();
                Json(json!({
                    "success": true,
                    "data": {"alerts": [], "total_count": 0, "last_updated": severity}
                }))
            }),
        );
        let api = client(serve(app).await, MemoryStorage::default());
        let query = AlertQuery {
            severity: Some(crate::dashboard::alerts::AlertSeverity::Critical),
            ..AlertQuery::default()
        };
        let page = api.alerts(&query).await.unwrap();
        assert_eq!(page.last_updated.as_deref(), Some("critical"));
    }

    #[tokio::test]
    async fn test_standard_id_is_path_encoded() {
        let app = Router::new().route(
            "/api/v1/compliance/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({"success": true, "data": {
                    "id": id, "name": "ISO", "status": "pass", "score": 90,
                    "last_checked": "2024-01-20T10:30:00Z"
                }}))
            }),
        );
        let api = client(serve(app).await, MemoryStorage::default());
        let standard = api.compliance_standard("iso 27001").await.unwrap();
        assert_eq!(standard.id, "iso 27001");
        assert!(standard.issues.is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_counts_as_success_for_unit_calls() {
        let app = Router::new().route("/api/v1/auth/logout", post(|| async { StatusCode::OK }));
        let api = client(serve(app).await, MemoryStorage::default());
        assert!(api.logout().await.is_ok());
    }

    #[tokio::test]
    async fn test_put_and_delete_verbs() {
        let app = Router::new().route(
            "/api/v1/alerts/{id}",
            put(|Json(body): Json<Value>| async move {
                Json(json!({"success": true, "data": body["status"]}))
            })
            .delete(|| async { Json(json!({"success": true, "data": null})) }),
        );
        let api = client(serve(app).await, MemoryStorage::default());
        let status: String = api
            .put("alerts/1", &json!({"status": "acknowledged"}))
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(status, "acknowledged");
        api.delete::<Value>("alerts/1")
            .await
            .unwrap()
            .into_unit()
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let api = client("http://127.0.0.1:9/api/v1".to_string(), MemoryStorage::default());
        let result = api.pipelines().await;
        assert!(matches!(result, Err(ApiError::Reqwest(_))));
    }
}
