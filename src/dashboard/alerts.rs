//! Alerts card
//!
//! Severity filtering and active-alert counts

use crate::consts::cli_consts::dashboard::ALERTS_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub timestamp: String,
    pub resource: String,
    pub category: String,
}

/// Response of `GET /alerts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertsPage {
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Response of `GET /alerts/summary/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AlertStats {
    #[serde(default)]
    pub total_alerts: u32,
    pub active_alerts: u32,
    #[serde(default)]
    pub critical_alerts: u32,
    #[serde(default)]
    pub warning_alerts: u32,
    #[serde(default)]
    pub resolved_today: u32,
}

/// Server-side filters for `GET /alerts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertQuery {
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for AlertQuery {
    fn default() -> Self {
        Self {
            severity: None,
            status: None,
            limit: ALERTS_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl AlertQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(severity) = self.severity {
            pairs.push(("severity", severity.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// The card's severity selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(AlertSeverity),
}

impl SeverityFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(severity) => alert.severity == *severity,
        }
    }
}

impl FromStr for SeverityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(SeverityFilter::All);
        }
        s.parse::<AlertSeverity>()
            .map(SeverityFilter::Only)
            .map_err(|_| {
                format!(
                    "unknown severity '{}', expected one of: all, critical, warning, info",
                    s
                )
            })
    }
}

impl std::fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityFilter::All => write!(f, "all"),
            SeverityFilter::Only(severity) => write!(f, "{}", severity),
        }
    }
}

/// Alerts matching the filter, in their original order.
pub fn filter_by_severity(alerts: &[Alert], filter: SeverityFilter) -> Vec<&Alert> {
    alerts.iter().filter(|alert| filter.matches(alert)).collect()
}

/// Active alerts per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl ActiveCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

pub fn active_counts(alerts: &[Alert]) -> ActiveCounts {
    alerts
        .iter()
        .filter(|alert| alert.status == AlertStatus::Active)
        .fold(ActiveCounts::default(), |mut counts, alert| {
            match alert.severity {
                AlertSeverity::Critical => counts.critical += 1,
                AlertSeverity::Warning => counts.warning += 1,
                AlertSeverity::Info => counts.info += 1,
            }
            counts
        })
}

fn alert(
    id: &str,
    title: &str,
    description: &str,
    severity: AlertSeverity,
    status: AlertStatus,
    timestamp: &str,
    resource: &str,
    category: &str,
) -> Alert {
    Alert {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        severity,
        status,
        timestamp: timestamp.to_string(),
        resource: resource.to_string(),
        category: category.to_string(),
    }
}

/// Alerts shown when the API is unavailable.
pub fn fixture() -> Vec<Alert> {
    use AlertSeverity::*;
    use AlertStatus::*;
    vec![
        alert(
            "1",
            "High CPU Usage",
            "Web server CPU usage has exceeded 90% for the last 15 minutes",
            Critical,
            Active,
            "2024-01-21T14:30:00Z",
            "aws-web-server-01",
            "Performance",
        ),
        alert(
            "2",
            "Database Connection Pool Exhausted",
            "PostgreSQL connection pool is at 95% capacity",
            Warning,
            Active,
            "2024-01-21T14:25:00Z",
            "gcp-postgres-primary",
            "Database",
        ),
        alert(
            "3",
            "SSL Certificate Expiring",
            "SSL certificate for api.cloudopspro.com expires in 7 days",
            Warning,
            Acknowledged,
            "2024-01-21T10:15:00Z",
            "api.cloudopspro.com",
            "Security",
        ),
        alert(
            "4",
            "Backup Job Completed",
            "Daily backup job completed successfully",
            Info,
            Resolved,
            "2024-01-21T06:00:00Z",
            "backup-service",
            "Backup",
        ),
        alert(
            "5",
            "Memory Usage High",
            "Application server memory usage is at 85%",
            Warning,
            Active,
            "2024-01-21T13:45:00Z",
            "azure-app-server-02",
            "Performance",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(alerts: &[&Alert]) -> Vec<String> {
        alerts.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_filter_critical_returns_exact_subset() {
        let alerts = fixture();
        let critical = filter_by_severity(&alerts, SeverityFilter::Only(AlertSeverity::Critical));
        assert_eq!(ids(&critical), vec!["1"]);
        assert!(critical.iter().all(|a| a.severity == AlertSeverity::Critical));
    }

    #[test]
    // Filtering keeps the original relative order.
    fn test_filter_warning_preserves_order() {
        let alerts = fixture();
        let warnings = filter_by_severity(&alerts, SeverityFilter::Only(AlertSeverity::Warning));
        assert_eq!(ids(&warnings), vec!["2", "3", "5"]);
    }

    #[test]
    fn test_filter_all_returns_everything() {
        let alerts = fixture();
        assert_eq!(filter_by_severity(&alerts, SeverityFilter::All).len(), 5);
    }

    #[test]
    // Acknowledged and resolved alerts are not counted.
    fn test_active_counts_ignore_inactive_alerts() {
        let counts = active_counts(&fixture());
        assert_eq!(
            counts,
            ActiveCounts {
                critical: 1,
                warning: 2,
                info: 0
            }
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_severity_filter_parsing() {
        assert_eq!("all".parse::<SeverityFilter>().unwrap(), SeverityFilter::All);
        assert_eq!(
            "CRITICAL".parse::<SeverityFilter>().unwrap(),
            SeverityFilter::Only(AlertSeverity::Critical)
        );
        assert_eq!(
            "Warning".parse::<SeverityFilter>().unwrap(),
            SeverityFilter::Only(AlertSeverity::Warning)
        );
        assert_eq!("info".parse::<AlertSeverity>(), Ok(AlertSeverity::Info));
        assert!("urgent".parse::<SeverityFilter>().is_err());
    }

    #[test]
    fn test_query_pairs_include_only_set_filters() {
        let query = AlertQuery {
            severity: Some(AlertSeverity::Warning),
            ..AlertQuery::default()
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("severity", "warning".to_string()),
                ("limit", "50".to_string()),
                ("offset", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_alerts_page_decodes_backend_shape() {
        let json = r#"{
            "alerts": [{
                "id": "9", "title": "Disk", "description": "Disk full",
                "severity": "critical", "status": "active",
                "timestamp": "2024-01-21T14:30:00.000001",
                "resource": "vm-1", "category": "Storage", "metadata": null
            }],
            "total_count": 1, "critical_count": 1, "warning_count": 0, "info_count": 0,
            "last_updated": "2024-01-21T14:31:00"
        }"#;
        let page: AlertsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(page.total_count, 1);
    }
}
