//! Dashboard headline numbers
//!
//! Four summary calls are issued together. Each one that fails leaves its
//! figure at zero without affecting the others.

use crate::api::error::ApiError;
use crate::dashboard::alerts::active_counts;
use crate::dashboard::compliance::overall_score;
use crate::dashboard::{DashboardLoader, DataSource, alerts, compliance, topology};
use crate::events::EventType;
use crate::logging::LogLevel;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardStats {
    pub total_resources: usize,
    pub active_alerts: u32,
    pub compliance_score: f64,
    pub monthly_cost: f64,
    /// Figures that could not be fetched and show their default.
    pub unavailable: Vec<&'static str>,
    pub source: Option<DataSource>,
}

/// Keep the fetched value or fall back, recording which branch failed.
fn settle<T, U>(
    name: &'static str,
    outcome: Result<T, ApiError>,
    pick: impl FnOnce(T) -> U,
    fallback: U,
    unavailable: &mut Vec<&'static str>,
) -> U {
    match outcome {
        Ok(value) => pick(value),
        Err(e) => {
            log::debug!("Stat '{}' unavailable: {}", name, e);
            unavailable.push(name);
            fallback
        }
    }
}

impl DashboardLoader {
    pub async fn stats(&self) -> DashboardStats {
        let Some(api) = self.api() else {
            return fixture_stats();
        };

        let (costs, alert_stats, compliance_stats, usage) = tokio::join!(
            api.usage_cost_summary(),
            api.alert_stats(),
            api.compliance_stats(),
            api.usage(),
        );

        let mut unavailable = Vec::new();
        let monthly_cost = settle("monthly cost", costs, |c| c.total_cost, 0.0, &mut unavailable);
        let active_alerts = settle(
            "active alerts",
            alert_stats,
            |a| a.active_alerts,
            0,
            &mut unavailable,
        );
        let compliance_score = settle(
            "compliance score",
            compliance_stats,
            |c| c.overall_score,
            0.0,
            &mut unavailable,
        );
        let total_resources = settle(
            "total resources",
            usage,
            |u| u.resource_count(),
            0,
            &mut unavailable,
        );

        if !unavailable.is_empty() {
            self.send_event(
                format!("Some dashboard figures are unavailable: {}", unavailable.join(", ")),
                EventType::Error,
                LogLevel::Warn,
            );
        }

        DashboardStats {
            total_resources,
            active_alerts,
            compliance_score,
            monthly_cost,
            unavailable,
            source: Some(DataSource::Live),
        }
    }
}

/// Headline numbers derived from the sample data.
pub fn fixture_stats() -> DashboardStats {
    let topology = topology::fixture();
    let standards = compliance::fixture();
    DashboardStats {
        total_resources: topology.resource_count(),
        active_alerts: active_counts(&alerts::fixture()).total() as u32,
        compliance_score: overall_score(&standards).map_or(0.0, f64::from),
        monthly_cost: topology.total_cost(),
        unavailable: Vec::new(),
        source: Some(DataSource::Fixture),
    }
}
