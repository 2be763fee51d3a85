//! Cost analytics card
//!
//! Daily cost series, period selection and optimization savings

use crate::consts::cli_consts::dashboard::MONTHLY_PROJECTION_DAYS;
use serde::{Deserialize, Serialize};

/// Parsed case-insensitively from its display form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CostPeriod {
    #[default]
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Month,
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDataPoint {
    pub date: String,
    pub cost: f64,
    #[serde(default)]
    pub predicted: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub potential_savings: f64,
    pub impact: Impact,
    pub category: String,
}

/// Response of `GET /ai-cost/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostAnalysis {
    pub cost_data: Vec<CostDataPoint>,
    #[serde(default)]
    pub optimization_suggestions: Vec<OptimizationSuggestion>,
    #[serde(default)]
    pub ai_insights: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Derived figures; also the response of `GET /ai-cost/summary`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct CostSummary {
    pub current_cost: f64,
    pub previous_cost: f64,
    pub change: f64,
    pub change_percent: f64,
    pub total_savings: f64,
    pub monthly_projection: f64,
}

impl CostSummary {
    /// Current and previous cost are the last two points of the series.
    /// Missing points count as zero, and so does the change percent when
    /// there is no previous cost.
    pub fn from_series(
        cost_data: &[CostDataPoint],
        suggestions: &[OptimizationSuggestion],
    ) -> Self {
        let point = |back: usize| {
            cost_data
                .len()
                .checked_sub(back)
                .and_then(|i| cost_data.get(i))
                .map_or(0.0, |p| p.cost)
        };
        let current_cost = point(1);
        let previous_cost = point(2);
        let change = current_cost - previous_cost;
        let change_percent = if previous_cost > 0.0 {
            change / previous_cost * 100.0
        } else {
            0.0
        };

        Self {
            current_cost,
            previous_cost,
            change,
            change_percent,
            total_savings: total_savings(suggestions),
            monthly_projection: current_cost * MONTHLY_PROJECTION_DAYS,
        }
    }
}

pub fn total_savings(suggestions: &[OptimizationSuggestion]) -> f64 {
    suggestions.iter().map(|s| s.potential_savings).sum()
}

fn point(date: &str, cost: f64, predicted: f64) -> CostDataPoint {
    CostDataPoint {
        date: date.to_string(),
        cost,
        predicted: Some(predicted),
    }
}

fn suggestion(
    id: &str,
    title: &str,
    description: &str,
    potential_savings: f64,
    impact: Impact,
    category: &str,
) -> OptimizationSuggestion {
    OptimizationSuggestion {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        potential_savings,
        impact,
        category: category.to_string(),
    }
}

/// Cost analysis shown when the API is unavailable.
pub fn fixture() -> CostAnalysis {
    CostAnalysis {
        cost_data: vec![
            point("2024-01-15", 2847.0, 2900.0),
            point("2024-01-16", 2923.0, 2950.0),
            point("2024-01-17", 3105.0, 3000.0),
            point("2024-01-18", 2987.0, 3050.0),
            point("2024-01-19", 3123.0, 3100.0),
            point("2024-01-20", 3056.0, 3150.0),
            point("2024-01-21", 3189.0, 3200.0),
        ],
        optimization_suggestions: vec![
            suggestion(
                "1",
                "Right-size EC2 instances",
                "Switch from m5.large to m5.medium for non-production workloads",
                340.0,
                Impact::High,
                "Compute",
            ),
            suggestion(
                "2",
                "Enable S3 Intelligent Tiering",
                "Move infrequently accessed data to cheaper storage tiers",
                120.0,
                Impact::Medium,
                "Storage",
            ),
            suggestion(
                "3",
                "Reserve instances for predictable workloads",
                "Purchase 1-year reserved instances for production databases",
                450.0,
                Impact::High,
                "Compute",
            ),
            suggestion(
                "4",
                "Optimize database queries",
                "Reduce RDS query execution time by 15% through indexing",
                85.0,
                Impact::Medium,
                "Database",
            ),
        ],
        ai_insights: None,
        last_updated: None,
    }
}
