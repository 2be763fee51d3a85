//! Compliance card
//!
//! Standards, their open issues and the aggregate score

use crate::consts::cli_consts::dashboard::{SCORE_FAIR_THRESHOLD, SCORE_GOOD_THRESHOLD};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComplianceStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub id: String,
    pub title: String,
    pub severity: IssueSeverity,
    pub description: String,
    pub remediation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceStandard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ComplianceStatus,
    pub score: u32,
    pub last_checked: String,
    #[serde(default)]
    pub issues: Vec<ComplianceIssue>,
}

/// Response of `GET /compliance/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComplianceReport {
    pub standards: Vec<ComplianceStandard>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Response of `GET /compliance/summary/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ComplianceStats {
    #[serde(default)]
    pub total_standards: u32,
    #[serde(default)]
    pub passing_standards: u32,
    #[serde(default)]
    pub warning_standards: u32,
    #[serde(default)]
    pub failing_standards: u32,
    #[serde(default)]
    pub total_issues: u32,
    #[serde(default)]
    pub critical_issues: u32,
    #[serde(default)]
    pub high_issues: u32,
    pub overall_score: f64,
}

/// How a score is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        if score >= SCORE_GOOD_THRESHOLD {
            ScoreBand::Good
        } else if score >= SCORE_FAIR_THRESHOLD {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

/// Unweighted mean of the standards' scores, rounded to the nearest integer.
///
/// Returns `None` when there are no standards.
pub fn overall_score(standards: &[ComplianceStandard]) -> Option<u32> {
    if standards.is_empty() {
        return None;
    }
    let total: u64 = standards.iter().map(|s| u64::from(s.score)).sum();
    Some((total as f64 / standards.len() as f64).round() as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub pass: usize,
    pub warning: usize,
    pub fail: usize,
}

pub fn status_counts(standards: &[ComplianceStandard]) -> StatusCounts {
    standards
        .iter()
        .fold(StatusCounts::default(), |mut counts, standard| {
            match standard.status {
                ComplianceStatus::Pass => counts.pass += 1,
                ComplianceStatus::Warning => counts.warning += 1,
                ComplianceStatus::Fail => counts.fail += 1,
            }
            counts
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl IssueCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Open issues across all standards, by severity.
pub fn issue_counts(standards: &[ComplianceStandard]) -> IssueCounts {
    standards
        .iter()
        .flat_map(|standard| standard.issues.iter())
        .fold(IssueCounts::default(), |mut counts, issue| {
            match issue.severity {
                IssueSeverity::Critical => counts.critical += 1,
                IssueSeverity::High => counts.high += 1,
                IssueSeverity::Medium => counts.medium += 1,
                IssueSeverity::Low => counts.low += 1,
            }
            counts
        })
}

pub fn select_standard<'a>(
    standards: &'a [ComplianceStandard],
    id: &str,
) -> Option<&'a ComplianceStandard> {
    standards.iter().find(|standard| standard.id == id)
}

fn issue(
    id: &str,
    title: &str,
    severity: IssueSeverity,
    description: &str,
    remediation: &str,
) -> ComplianceIssue {
    ComplianceIssue {
        id: id.to_string(),
        title: title.to_string(),
        severity,
        description: description.to_string(),
        remediation: remediation.to_string(),
    }
}

/// Standards shown when the API is unavailable.
pub fn fixture() -> Vec<ComplianceStandard> {
    vec![
        ComplianceStandard {
            id: "soc2".to_string(),
            name: "SOC 2 Type II".to_string(),
            description: "Security, availability, and confidentiality controls".to_string(),
            status: ComplianceStatus::Pass,
            score: 94,
            last_checked: "2024-01-20T10:30:00Z".to_string(),
            issues: vec![issue(
                "soc2-1",
                "Access logging incomplete",
                IssueSeverity::Medium,
                "Some admin actions are not being logged",
                "Enable comprehensive audit logging for all admin operations",
            )],
        },
        ComplianceStandard {
            id: "hipaa".to_string(),
            name: "HIPAA".to_string(),
            description: "Health Insurance Portability and Accountability Act".to_string(),
            status: ComplianceStatus::Pass,
            score: 98,
            last_checked: "2024-01-19T14:15:00Z".to_string(),
            issues: vec![issue(
                "hipaa-1",
                "Data encryption at rest",
                IssueSeverity::Low,
                "Some backup files are not encrypted",
                "Enable encryption for all backup storage",
            )],
        },
        ComplianceStandard {
            id: "pci".to_string(),
            name: "PCI DSS".to_string(),
            description: "Payment Card Industry Data Security Standard".to_string(),
            status: ComplianceStatus::Warning,
            score: 87,
            last_checked: "2024-01-18T09:45:00Z".to_string(),
            issues: vec![
                issue(
                    "pci-1",
                    "Network segmentation insufficient",
                    IssueSeverity::High,
                    "Payment processing network not properly isolated",
                    "Implement proper network segmentation for cardholder data environment",
                ),
                issue(
                    "pci-2",
                    "Vulnerability scanning outdated",
                    IssueSeverity::Medium,
                    "Last vulnerability scan was 45 days ago",
                    "Schedule monthly vulnerability scans and implement automated scanning",
                ),
            ],
        },
    ]
}
