//! Placement team overview: headline metrics, score and verdict charts,
//! candidate filtering and job description management.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use super::{
    failure, record, rows, soft, ChartKind, Field, FieldKind, Form, Metric, PageError, PageView,
    Section, SelectOption,
};
use crate::models::{Evaluation, EvaluationFilters, JobDescription};
use crate::navigation::{PageHandler, PortalContext};
use crate::pages::PLACEMENT_DASHBOARD;

const HISTOGRAM_BINS: usize = 10;
const CANDIDATE_COLUMNS: &[&str] = &["id", "user_id", "relevance_score", "verdict", "created_at"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

/// Ten equal-width bins over 0..=100. Out-of-range scores are clamped into
/// the outer bins; a score of exactly 100 lands in the last one.
pub fn score_histogram(scores: &[f64]) -> Vec<Bucket> {
    let width = 100 / HISTOGRAM_BINS;
    let mut counts = [0usize; HISTOGRAM_BINS];
    for score in scores.iter().filter(|s| s.is_finite()) {
        let bin = (score.max(0.0) / width as f64) as usize;
        counts[bin.min(HISTOGRAM_BINS - 1)] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| Bucket {
            label: format!("{}-{}", i * width, (i + 1) * width),
            count,
        })
        .collect()
}

/// Count per verdict label, most frequent first (ties by label).
pub fn verdict_distribution(evaluations: &[Evaluation]) -> Vec<Bucket> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for verdict in evaluations.iter().filter_map(|e| e.verdict.as_ref()) {
        *counts.entry(verdict.to_string()).or_default() += 1;
    }
    let mut buckets: Vec<Bucket> = counts
        .into_iter()
        .map(|(label, count)| Bucket { label, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    buckets
}

fn average_score(evaluations: &[Evaluation]) -> Option<f64> {
    let scores: Vec<f64> = evaluations.iter().filter_map(|e| e.relevance_score).collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

fn metrics(
    users: Option<usize>,
    evaluations: &[Evaluation],
    jobs: &[JobDescription],
) -> Vec<Metric> {
    let metric = |label: &str, value: String| Metric {
        label: label.to_string(),
        value,
    };
    vec![
        metric(
            "Total Users",
            users.map_or_else(|| "-".to_string(), |n| n.to_string()),
        ),
        metric("Evaluations", evaluations.len().to_string()),
        metric(
            "Active Jobs",
            jobs.iter().filter(|j| j.is_active()).count().to_string(),
        ),
        metric(
            "Avg Score",
            average_score(evaluations).map_or_else(|| "0".to_string(), |avg| format!("{avg:.1}")),
        ),
    ]
}

pub struct PlacementDashboard;

#[async_trait]
impl PageHandler for PlacementDashboard {
    async fn render(&self, ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let backend = &ctx.backend;
        let mut view = PageView::new(PLACEMENT_DASHBOARD, "Placement Team Dashboard");

        let users = soft(backend.admin_users().await)?;
        let evaluations = soft(backend.admin_evaluations(&EvaluationFilters::default()).await)?;
        let jobs = soft(backend.admin_job_descriptions(false).await)?;

        // Overview
        let no_evaluations = Vec::new();
        let no_jobs = Vec::new();
        view.push(Section::Metrics {
            items: metrics(
                users.as_ref().ok().map(Vec::len),
                evaluations.as_ref().unwrap_or(&no_evaluations),
                jobs.as_ref().unwrap_or(&no_jobs),
            ),
        });
        if let Err(e) = &users {
            view.push(failure("users", e));
        }

        match &evaluations {
            Ok(evaluations) if !evaluations.is_empty() => {
                let scores: Vec<f64> =
                    evaluations.iter().filter_map(|e| e.relevance_score).collect();
                view.push(Section::Chart {
                    title: "Score Distribution".into(),
                    chart: ChartKind::Histogram,
                    buckets: score_histogram(&scores),
                });
                view.push(Section::Chart {
                    title: "Verdict Distribution".into(),
                    chart: ChartKind::Pie,
                    buckets: verdict_distribution(evaluations),
                });
            }
            Ok(_) => {}
            Err(e) => view.push(failure("evaluations", e)),
        }

        // Candidates
        view.push(Section::Form(candidate_filter_form()));
        if let Ok(evaluations) = &evaluations {
            view.push(Section::table(
                "Candidate Management",
                CANDIDATE_COLUMNS,
                rows(evaluations),
                "No evaluations match filters.",
            ));
        }

        // Jobs
        view.push(Section::Form(job_description_form()));
        view.push(match &jobs {
            Ok(jobs) => Section::records(
                "Existing Jobs",
                jobs.iter()
                    .map(|jd| record(format!("{} - {}", jd.title, jd.company), jd))
                    .collect(),
                "No job descriptions yet.",
            ),
            Err(e) => failure("job descriptions", e),
        });

        view.push(Section::text(
            Some("System Settings"),
            "User management, analytics exports and notifications are not available yet.",
        ));
        Ok(view)
    }
}

fn candidate_filter_form() -> Form {
    let verdicts = ["All", "High", "Medium", "Low"]
        .iter()
        .map(|v| SelectOption {
            value: v.to_string(),
            label: v.to_string(),
        })
        .collect();
    Form {
        method: "GET",
        ..Form::post("candidate_filters", "Filter Candidates", "/api/admin/evaluations", "Apply")
    }
    .field(Field::new(FieldKind::Number, "min_score", "Min Score").value(0))
    .field(Field::new(FieldKind::Number, "max_score", "Max Score").value(100))
    .field(
        Field::new(FieldKind::Select, "verdict", "Verdict")
            .value("All")
            .options(verdicts),
    )
}

fn job_description_form() -> Form {
    Form::post(
        "jd_form",
        "Job Description Management",
        "/api/admin/job-descriptions",
        "Create Job",
    )
    .field(Field::new(FieldKind::Text, "title", "Job Title").required())
    .field(Field::new(FieldKind::Text, "company", "Company").required())
    .field(Field::new(FieldKind::Text, "location", "Location"))
    .field(Field::new(
        FieldKind::TextArea,
        "skills",
        "Required Skills (comma-separated)",
    ))
    .field(Field::new(FieldKind::TextArea, "description", "Job Description").required())
}
