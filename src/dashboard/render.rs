//! Plain-text card output

use crate::dashboard::alerts::{Alert, SeverityFilter, active_counts, filter_by_severity};
use crate::dashboard::compliance::{
    ComplianceStandard, ScoreBand, issue_counts, overall_score, status_counts,
};
use crate::dashboard::cost::{CostAnalysis, CostPeriod, CostSummary};
use crate::dashboard::format::{
    format_compact_timestamp, format_currency, format_duration, format_percent_change,
    format_time_ago,
};
use crate::dashboard::pipelines::{Pipeline, status_counts as pipeline_status_counts};
use crate::dashboard::stats::DashboardStats;
use crate::dashboard::topology::{CloudResource, Provider, Topology};
use crate::dashboard::{DataSource, Loaded};
use chrono::{DateTime, Utc};
use std::fmt::Write;

fn header(out: &mut String, title: &str, source: DataSource) {
    match source {
        DataSource::Live => {
            let _ = writeln!(out, "== {} ==", title);
        }
        DataSource::Fixture => {
            let _ = writeln!(out, "== {} ({}) ==", title, source);
        }
    }
}

pub fn render_stats(stats: &DashboardStats) -> String {
    let mut out = String::new();
    header(
        &mut out,
        "Overview",
        stats.source.unwrap_or(DataSource::Live),
    );
    let _ = writeln!(out, "Total resources:   {}", stats.total_resources);
    let _ = writeln!(out, "Active alerts:     {}", stats.active_alerts);
    let _ = writeln!(out, "Compliance score:  {:.0}%", stats.compliance_score);
    let _ = writeln!(out, "Monthly cost:      {}", format_currency(stats.monthly_cost));
    if !stats.unavailable.is_empty() {
        let _ = writeln!(out, "Unavailable:       {}", stats.unavailable.join(", "));
    }
    out
}

pub fn render_alerts(
    loaded: &Loaded<Vec<Alert>>,
    filter: SeverityFilter,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    header(&mut out, "Alerts", loaded.source);

    let counts = active_counts(&loaded.data);
    let _ = writeln!(
        out,
        "Active: {} critical, {} warning, {} info",
        counts.critical, counts.warning, counts.info
    );

    let shown = filter_by_severity(&loaded.data, filter);
    if shown.is_empty() {
        let _ = writeln!(out, "No {} alerts", filter);
        return out;
    }
    for alert in shown {
        let _ = writeln!(
            out,
            "[{:<8}] {} ({}) - {} - {}",
            alert.severity.to_string().to_uppercase(),
            alert.title,
            alert.status,
            alert.resource,
            format_time_ago(&alert.timestamp, now)
        );
        let _ = writeln!(out, "           {}", alert.description);
    }
    out
}

pub fn render_compliance(loaded: &Loaded<Vec<ComplianceStandard>>) -> String {
    let mut out = String::new();
    header(&mut out, "Compliance", loaded.source);

    let standards = &loaded.data;
    match overall_score(standards) {
        Some(score) => {
            let _ = writeln!(
                out,
                "Overall score: {}% ({})",
                score,
                ScoreBand::for_score(score)
            );
        }
        None => {
            let _ = writeln!(out, "No standards tracked");
            return out;
        }
    }

    let statuses = status_counts(standards);
    let issues = issue_counts(standards);
    let _ = writeln!(
        out,
        "Standards: {} passing, {} warning, {} failing",
        statuses.pass, statuses.warning, statuses.fail
    );
    let _ = writeln!(
        out,
        "Open issues: {} ({} critical, {} high, {} medium, {} low)",
        issues.total(),
        issues.critical,
        issues.high,
        issues.medium,
        issues.low
    );
    for standard in standards {
        let _ = writeln!(
            out,
            "  {:<16} {:>3}%  {:<8} {} issue(s)",
            standard.name,
            standard.score,
            standard.status.to_string(),
            standard.issues.len()
        );
    }
    out
}

pub fn render_standard(standard: &ComplianceStandard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} - {}% ({}), last checked {}",
        standard.name,
        standard.score,
        standard.status,
        format_compact_timestamp(&standard.last_checked)
    );
    if !standard.description.is_empty() {
        let _ = writeln!(out, "{}", standard.description);
    }
    for issue in &standard.issues {
        let _ = writeln!(out, "  [{}] {}", issue.severity, issue.title);
        let _ = writeln!(out, "      {}", issue.description);
        let _ = writeln!(out, "      Remediation: {}", issue.remediation);
    }
    out
}

fn summary_lines(out: &mut String, summary: &CostSummary) {
    let _ = writeln!(
        out,
        "Current daily cost: {} ({} / {})",
        format_currency(summary.current_cost),
        format_percent_change(summary.change_percent),
        format_currency(summary.change)
    );
    let _ = writeln!(
        out,
        "Monthly projection: {}",
        format_currency(summary.monthly_projection)
    );
    let _ = writeln!(
        out,
        "Potential savings:  {}",
        format_currency(summary.total_savings)
    );
}

pub fn render_cost_summary(loaded: &Loaded<CostSummary>) -> String {
    let mut out = String::new();
    header(&mut out, "Cost summary", loaded.source);
    summary_lines(&mut out, &loaded.data);
    out
}

pub fn render_cost(loaded: &Loaded<CostAnalysis>, period: CostPeriod) -> String {
    let mut out = String::new();
    header(&mut out, &format!("Cost ({})", period), loaded.source);

    let analysis = &loaded.data;
    summary_lines(
        &mut out,
        &CostSummary::from_series(&analysis.cost_data, &analysis.optimization_suggestions),
    );
    for suggestion in &analysis.optimization_suggestions {
        let _ = writeln!(
            out,
            "  {:>8}  {} [{} impact, {}]",
            format_currency(suggestion.potential_savings),
            suggestion.title,
            suggestion.impact,
            suggestion.category
        );
    }
    if let Some(insights) = &analysis.ai_insights {
        let _ = writeln!(out, "Insights: {}", insights);
    }
    out
}

fn resource_line(out: &mut String, resource: &CloudResource) {
    let _ = writeln!(
        out,
        "    {:<16} {:<10} {:<8} {:<12} {}",
        resource.name,
        resource.resource_type.to_string(),
        resource.status.to_string(),
        resource.region,
        format_currency(resource.cost)
    );
}

pub fn render_topology(loaded: &Loaded<Topology>) -> String {
    let mut out = String::new();
    header(&mut out, "Topology", loaded.source);

    let topology = &loaded.data;
    let statuses = topology.status_counts();
    let _ = writeln!(
        out,
        "{} resources, {} running, {} stopped, {} pending, {} error, total {}",
        topology.resource_count(),
        statuses.running,
        statuses.stopped,
        statuses.pending,
        statuses.error,
        format_currency(topology.total_cost())
    );
    for provider in Provider::ALL {
        let resources = topology.resources(provider);
        if resources.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "  {} ({})",
            provider.label(),
            format_currency(topology.provider_cost(provider))
        );
        for resource in resources {
            resource_line(&mut out, resource);
        }
    }
    out
}

pub fn render_resource(resource: &CloudResource) -> String {
    format!(
        "{} ({})\n  provider: {}\n  type:     {}\n  status:   {}\n  region:   {}\n  cost:     {}\n",
        resource.name,
        resource.id,
        resource.provider.label(),
        resource.resource_type,
        resource.status,
        resource.region,
        format_currency(resource.cost)
    )
}

pub fn render_pipelines(loaded: &Loaded<Vec<Pipeline>>) -> String {
    let mut out = String::new();
    header(&mut out, "Pipelines", loaded.source);

    let counts = pipeline_status_counts(&loaded.data);
    let _ = writeln!(
        out,
        "{} running, {} succeeded, {} failed, {} pending",
        counts.running, counts.success, counts.failed, counts.pending
    );
    for pipeline in &loaded.data {
        let (done, total) = pipeline.progress();
        let _ = writeln!(
            out,
            "  {} [{}] {}@{} by {} ({}/{} stages)",
            pipeline.name,
            pipeline.status,
            pipeline.branch,
            pipeline.commit,
            pipeline.triggered_by,
            done,
            total
        );
        for stage in &pipeline.stages {
            let _ = writeln!(
                out,
                "      {:<8} {:<8} {}",
                stage.name,
                stage.status.to_string(),
                format_duration(stage.duration)
            );
        }
        if let Some(last) = pipeline.failed_stage().and_then(|stage| stage.logs.last()) {
            let _ = writeln!(out, "      > {}", last);
        }
    }
    out
}
