//! GitOps pipelines card

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Pending,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: RunStatus,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    pub branch: String,
    pub commit: String,
    pub status: RunStatus,
    pub stages: Vec<PipelineStage>,
    pub started_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    pub triggered_by: String,
}

impl Pipeline {
    /// Finished stages out of all stages.
    pub fn progress(&self) -> (usize, usize) {
        let done = self
            .stages
            .iter()
            .filter(|stage| stage.status == RunStatus::Success)
            .count();
        (done, self.stages.len())
    }

    /// The first stage that failed, if any.
    pub fn failed_stage(&self) -> Option<&PipelineStage> {
        self.stages
            .iter()
            .find(|stage| stage.status == RunStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStatusCounts {
    pub success: usize,
    pub failed: usize,
    pub pending: usize,
    pub running: usize,
}

pub fn status_counts(pipelines: &[Pipeline]) -> RunStatusCounts {
    pipelines
        .iter()
        .fold(RunStatusCounts::default(), |mut counts, pipeline| {
            match pipeline.status {
                RunStatus::Success => counts.success += 1,
                RunStatus::Failed => counts.failed += 1,
                RunStatus::Pending => counts.pending += 1,
                RunStatus::Running => counts.running += 1,
            }
            counts
        })
}

fn stage(
    id: &str,
    description: &str,
    status: RunStatus,
    duration: Option<u64>,
    timestamp: Option<&str>,
    logs: &[&str],
) -> PipelineStage {
    let mut name = id.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    PipelineStage {
        id: id.to_string(),
        name,
        description: description.to_string(),
        status,
        duration,
        timestamp: timestamp.map(str::to_string),
        logs: logs.iter().map(|line| line.to_string()).collect(),
    }
}

const BUILD_LOGS: [&str; 3] = [
    "Installing dependencies...",
    "Building application...",
    "Build completed successfully",
];
const BUILD: &str = "Compile and package application";
const TEST: &str = "Run unit and integration tests";

/// Pipelines shown when the API is unavailable.
pub fn fixture() -> Vec<Pipeline> {
    use RunStatus::*;
    vec![
        Pipeline {
            id: "1".to_string(),
            name: "Production Deployment".to_string(),
            branch: "main".to_string(),
            commit: "a1b2c3d".to_string(),
            status: Success,
            started_at: "2024-01-21T14:00:00Z".to_string(),
            completed_at: Some("2024-01-21T14:15:00Z".to_string()),
            triggered_by: "john.doe".to_string(),
            stages: vec![
                stage("build", BUILD, Success, Some(180), Some("2024-01-21T14:03:00Z"), &BUILD_LOGS),
                stage(
                    "test",
                    TEST,
                    Success,
                    Some(240),
                    Some("2024-01-21T14:07:00Z"),
                    &["Running unit tests...", "Running integration tests...", "All tests passed"],
                ),
                stage(
                    "deploy",
                    "Deploy to production environment",
                    Success,
                    Some(300),
                    Some("2024-01-21T14:12:00Z"),
                    &["Deploying to production...", "Health checks passed", "Deployment successful"],
                ),
            ],
        },
        Pipeline {
            id: "2".to_string(),
            name: "Feature Branch Build".to_string(),
            branch: "feature/new-dashboard".to_string(),
            commit: "e4f5g6h".to_string(),
            status: Running,
            started_at: "2024-01-21T14:20:00Z".to_string(),
            completed_at: None,
            triggered_by: "jane.smith".to_string(),
            stages: vec![
                stage("build", BUILD, Success, Some(165), Some("2024-01-21T14:23:00Z"), &BUILD_LOGS),
                stage(
                    "test",
                    TEST,
                    Running,
                    None,
                    Some("2024-01-21T14:26:00Z"),
                    &["Running unit tests...", "Running integration tests..."],
                ),
                stage("deploy", "Deploy to staging environment", Pending, None, None, &[]),
            ],
        },
        Pipeline {
            id: "3".to_string(),
            name: "Hotfix Deployment".to_string(),
            branch: "hotfix/security-patch".to_string(),
            commit: "i7j8k9l".to_string(),
            status: Failed,
            started_at: "2024-01-21T13:45:00Z".to_string(),
            completed_at: Some("2024-01-21T13:52:00Z".to_string()),
            triggered_by: "mike.wilson".to_string(),
            stages: vec![
                stage("build", BUILD, Success, Some(120), Some("2024-01-21T13:47:00Z"), &BUILD_LOGS),
                stage(
                    "test",
                    TEST,
                    Failed,
                    Some(180),
                    Some("2024-01-21T13:50:00Z"),
                    &[
                        "Running unit tests...",
                        "Running integration tests...",
                        "Test failed: Security validation error",
                    ],
                ),
                stage("deploy", "Deploy to production environment", Pending, None, None, &[]),
            ],
        },
    ]
}
