//! Dashboard cards
//!
//! Each card loads its slice from the API and falls back to built-in sample
//! data when the call fails. Cards are independent of each other.

use crate::api::DashboardApi;
use crate::api::error::ApiError;
use crate::dashboard::alerts::{Alert, AlertQuery};
use crate::dashboard::compliance::{ComplianceStandard, select_standard};
use crate::dashboard::cost::{CostAnalysis, CostPeriod, CostSummary};
use crate::dashboard::pipelines::Pipeline;
use crate::dashboard::topology::Topology;
use crate::error_classifier::ErrorClassifier;
use crate::events::{EventSender, EventType};
use crate::logging::LogLevel;
use log::Level;
use std::future::Future;
use std::sync::Arc;

pub mod alerts;
pub mod compliance;
pub mod cost;
pub mod format;
pub mod pipelines;
pub mod render;
pub mod stats;
pub mod topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DataSource {
    Live,
    #[strum(serialize = "sample data")]
    Fixture,
}

/// Card data together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Loaded<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    pub fn fixture(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fixture,
        }
    }
}

/// Loads card data. Without an API every card shows its sample data.
#[derive(Clone)]
pub struct DashboardLoader {
    api: Option<Arc<dyn DashboardApi>>,
    events: Option<EventSender>,
    classifier: ErrorClassifier,
}

impl DashboardLoader {
    pub fn live(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api: Some(api),
            events: None,
            classifier: ErrorClassifier::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            api: None,
            events: None,
            classifier: ErrorClassifier::new(),
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub(crate) fn api(&self) -> Option<&Arc<dyn DashboardApi>> {
        self.api.as_ref()
    }

    pub async fn alerts(&self, query: &AlertQuery) -> Loaded<Vec<Alert>> {
        let fetch = self.api.as_ref().map(|api| async move {
            api.alerts(query).await.map(|page| page.alerts)
        });
        self.load_or_fixture("alerts", fetch, alerts::fixture).await
    }

    pub async fn compliance(&self) -> Loaded<Vec<ComplianceStandard>> {
        let fetch = self.api.as_ref().map(|api| async move {
            api.compliance().await.map(|report| report.standards)
        });
        self.load_or_fixture("compliance", fetch, compliance::fixture)
            .await
    }

    pub async fn compliance_standard(&self, id: &str) -> Loaded<Option<ComplianceStandard>> {
        let fetch = self
            .api
            .as_ref()
            .map(|api| async move { api.compliance_standard(id).await.map(Some) });
        self.load_or_fixture("compliance standard", fetch, || {
            select_standard(&compliance::fixture(), id).cloned()
        })
        .await
    }

    pub async fn cost(&self, period: CostPeriod) -> Loaded<CostAnalysis> {
        let fetch = self
            .api
            .as_ref()
            .map(|api| async move { api.cost_analysis(period).await });
        self.load_or_fixture("cost analysis", fetch, cost::fixture)
            .await
    }

    /// Server-side cost summary; offline it is derived from the sample series.
    pub async fn cost_summary(&self) -> Loaded<CostSummary> {
        let fetch = self
            .api
            .as_ref()
            .map(|api| async move { api.cost_summary().await });
        self.load_or_fixture("cost summary", fetch, || {
            let analysis = cost::fixture();
            CostSummary::from_series(&analysis.cost_data, &analysis.optimization_suggestions)
        })
        .await
    }

    pub async fn topology(&self) -> Loaded<Topology> {
        let fetch = self.api.as_ref().map(|api| async move { api.usage().await });
        self.load_or_fixture("topology", fetch, topology::fixture)
            .await
    }

    pub async fn pipelines(&self) -> Loaded<Vec<Pipeline>> {
        let fetch = self
            .api
            .as_ref()
            .map(|api| async move { api.pipelines().await });
        self.load_or_fixture("pipelines", fetch, pipelines::fixture)
            .await
    }

    async fn load_or_fixture<T, Fut>(
        &self,
        card: &str,
        fetch: Option<Fut>,
        fixture: impl FnOnce() -> T,
    ) -> Loaded<T>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(fetch) = fetch else {
            return Loaded::fixture(fixture());
        };

        match fetch.await {
            Ok(data) => {
                self.send_event(format!("Loaded {}", card), EventType::Refresh, LogLevel::Debug);
                Loaded::live(data)
            }
            Err(e) => {
                let level = self.classifier.classify_api_error(&e);
                log::log!(Level::from(level), "Failed to load {}: {}", card, e);
                self.send_event(
                    format!("Failed to load {}, showing sample data: {}", card, e.user_message()),
                    EventType::Error,
                    level,
                );
                Loaded::fixture(fixture())
            }
        }
    }

    pub(crate) fn send_event(&self, message: String, event_type: EventType, level: LogLevel) {
        if let Some(events) = &self.events {
            events.send_dashboard_event(message, event_type, level);
        }
    }
}
