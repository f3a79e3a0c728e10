use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{
    accepted, record_id, require_admin, require_login, required, ActionOutcome, FlowError,
};
use crate::backend::Backend;
use crate::models::job::parse_skills;
use crate::models::{
    Evaluation, EvaluationFilters, JobUpdate, NewJob, NewJobDescription, NewResume,
};
use crate::normalize::{normalize_entity, normalize_entity_as};

#[derive(Debug, Clone, Deserialize)]
pub struct JobForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeForm {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationForm {
    pub resume_id: Value,
    pub job_id: Value,
}

/// Placement dashboard job description form; skills are comma-separated.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDescriptionForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub description: String,
}

// ── Jobs ────────────────────────────────────────────────────────────────────

pub async fn create_job(backend: &Backend<'_>, form: &JobForm) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    required(&form.title, "Job title is required")?;

    let job = NewJob {
        title: form.title.trim().to_string(),
        company: form.company.trim().to_string(),
        location: form.location.trim().to_string(),
        description: form.description.clone(),
        must_have_skills: Vec::new(),
        good_to_have_skills: Vec::new(),
        keywords: Vec::new(),
    };
    let created = accepted(backend.create_job(&job).await?)?;
    info!("Created job '{}'", job.title);
    Ok(ActionOutcome::new("Job created", unwrap_data(created)))
}

pub async fn get_job(backend: &Backend<'_>, id: &str) -> Result<ActionOutcome, FlowError> {
    let id = record_id(id, "job")?;
    let job = backend
        .job(id)
        .await?
        .ok_or_else(|| FlowError::NotFound(format!("Job {id} not found")))?;
    Ok(ActionOutcome::new(format!("Job {id}"), job))
}

pub async fn update_job(
    backend: &Backend<'_>,
    id: &str,
    update: &JobUpdate,
) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "job")?;
    if update.is_empty() {
        return Err(FlowError::Validation("Nothing to update".into()));
    }
    let updated = accepted(backend.update_job(id, update).await?)?;
    Ok(ActionOutcome::new(format!("Job {id} updated"), unwrap_data(updated)))
}

pub async fn delete_job(backend: &Backend<'_>, id: &str) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "job")?;
    let deleted = accepted(backend.delete_job(id).await?)?;
    info!("Deleted job {id}");
    Ok(ActionOutcome::new(format!("Job {id} deleted"), deleted))
}

// ── Resumes ─────────────────────────────────────────────────────────────────

pub async fn create_resume(
    backend: &Backend<'_>,
    form: &ResumeForm,
) -> Result<ActionOutcome, FlowError> {
    let session = backend.session().get();
    require_login(&session)?;
    required(&form.student_name, "Student name is required")?;

    // The signed-in email is the default, as on the student dashboard.
    let email = match form.email.trim() {
        "" => session.email().unwrap_or_default().to_string(),
        email => email.to_string(),
    };
    required(&email, "Email is required")?;

    let resume = NewResume {
        student_name: form.student_name.trim().to_string(),
        email,
        file_path: form.file_path.trim().to_string(),
        skills: Vec::new(),
        education: Vec::new(),
        experience: Vec::new(),
    };
    let created = accepted(backend.create_resume(&resume).await?)?;
    Ok(ActionOutcome::new("Resume entry saved", unwrap_data(created)))
}

pub async fn get_resume(backend: &Backend<'_>, id: &str) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "resume")?;
    let resume = backend
        .resume(id)
        .await?
        .ok_or_else(|| FlowError::NotFound(format!("Resume {id} not found")))?;
    Ok(ActionOutcome::new(format!("Resume {id}"), resume))
}

/// Applies a partial update; `changes` must be a non-empty JSON object.
pub async fn update_resume(
    backend: &Backend<'_>,
    id: &str,
    changes: Value,
) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "resume")?;
    if !changes.as_object().is_some_and(|fields| !fields.is_empty()) {
        return Err(FlowError::Validation("Nothing to update".into()));
    }
    let updated = accepted(backend.update_resume(id, changes).await?)?;
    Ok(ActionOutcome::new(format!("Resume {id} updated"), unwrap_data(updated)))
}

pub async fn delete_resume(backend: &Backend<'_>, id: &str) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "resume")?;
    let deleted = accepted(backend.delete_resume(id).await?)?;
    Ok(ActionOutcome::new(format!("Resume {id} deleted"), deleted))
}

pub async fn parse_resume(backend: &Backend<'_>, id: &str) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let id = record_id(id, "resume")?;
    let parsed = accepted(backend.parse_resume(id).await?)?;
    Ok(ActionOutcome::new(format!("Resume {id} parsed"), unwrap_data(parsed)))
}

// ── Evaluations ─────────────────────────────────────────────────────────────

pub async fn evaluate(
    backend: &Backend<'_>,
    form: &EvaluationForm,
) -> Result<ActionOutcome, FlowError> {
    require_login(&backend.session().get())?;
    let resume_id = id_text(&form.resume_id)
        .ok_or_else(|| FlowError::Validation("Select a resume to evaluate".into()))?;
    let job_id = id_text(&form.job_id)
        .ok_or_else(|| FlowError::Validation("Select a job to evaluate against".into()))?;

    let result = accepted(backend.evaluate(&resume_id, &job_id).await?)?;
    let message = match normalize_entity_as::<Evaluation>(result.clone()) {
        Some(Evaluation {
            relevance_score: Some(score),
            verdict: Some(verdict),
            ..
        }) => format!("Score: {score} | Verdict: {verdict}"),
        _ => "Evaluation complete".to_string(),
    };
    info!("Evaluated resume {resume_id} against job {job_id}");
    Ok(ActionOutcome::new(message, unwrap_data(result)))
}

// ── Placement team ──────────────────────────────────────────────────────────

pub async fn filter_candidates(
    backend: &Backend<'_>,
    filters: &EvaluationFilters,
) -> Result<Vec<Evaluation>, FlowError> {
    require_admin(&backend.session().get())?;
    validate_filters(filters)?;
    Ok(backend.admin_evaluations(filters).await?)
}

pub async fn create_job_description(
    backend: &Backend<'_>,
    form: &JobDescriptionForm,
) -> Result<ActionOutcome, FlowError> {
    require_admin(&backend.session().get())?;
    const MISSING: &str = "Required fields missing";
    required(&form.title, MISSING)?;
    required(&form.company, MISSING)?;
    required(&form.description, MISSING)?;

    let job = NewJobDescription {
        title: form.title.trim().to_string(),
        company: form.company.trim().to_string(),
        location: form.location.trim().to_string(),
        description_text: form.description.clone(),
        required_skills: parse_skills(&form.skills),
    };
    let created = accepted(backend.create_job_description(&job).await?)?;
    Ok(ActionOutcome::new("Job created", unwrap_data(created)))
}

pub fn validate_filters(filters: &EvaluationFilters) -> Result<(), FlowError> {
    let min = filters.min_score.unwrap_or(0);
    let max = filters.max_score.unwrap_or(100);
    if min > 100 || max > 100 {
        return Err(FlowError::Validation(
            "Scores must be between 0 and 100".into(),
        ));
    }
    if min > max {
        return Err(FlowError::Validation(
            "Minimum score cannot exceed maximum score".into(),
        ));
    }
    Ok(())
}

/// The record inside a success envelope, or the payload itself.
fn unwrap_data(payload: Value) -> Value {
    match normalize_entity(payload.clone()) {
        Some(data) => data,
        None => payload,
    }
}

/// Record ids arrive from forms as numbers or strings.
fn id_text(raw: &Value) -> Option<String> {
    match raw {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
