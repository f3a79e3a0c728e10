use async_trait::async_trait;

use super::{
    failure, rows, soft, Field, FieldKind, Form, Notice, PageError, PageView, Section,
    SelectOption,
};
use crate::models::{JobDescription, Resume};
use crate::navigation::{PageHandler, PortalContext};
use crate::pages::STUDENT_DASHBOARD;

pub(super) const RESUME_COLUMNS: &[&str] = &["id", "student_name", "email", "file_path"];
pub(super) const JOB_COLUMNS: &[&str] = &["id", "title", "company", "location", "is_active"];
const HISTORY_COLUMNS: &[&str] = &[
    "id",
    "resume_id",
    "job_id",
    "relevance_score",
    "verdict",
    "created_at",
];

pub struct StudentDashboard;

#[async_trait]
impl PageHandler for StudentDashboard {
    async fn render(&self, ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let backend = &ctx.backend;
        let email = ctx.session.email().unwrap_or_default();
        let mut view = PageView::new(STUDENT_DASHBOARD, "Student Dashboard");
        if !email.is_empty() {
            view.push(Section::text(None, format!("Signed in as {email}")));
        } else if let Some(id) = ctx.session.user_id() {
            view.push(Section::text(None, format!("Signed in as user {id}")));
        }

        // My resume
        let resumes = soft(backend.resumes().await)?;
        view.push(Section::Form(resume_form(Some(email))));
        match &resumes {
            Ok(resumes) => {
                view.push(Section::table(
                    "My Resume",
                    RESUME_COLUMNS,
                    rows(resumes),
                    "No resumes found. Create one above.",
                ));
                if !resumes.is_empty() {
                    view.push(Section::Form(resume_actions(resumes)));
                }
            }
            Err(e) => view.push(failure("resumes", e)),
        }

        // Job descriptions
        let jobs = soft(backend.jobs().await)?;
        match &jobs {
            Ok(jobs) => view.push(Section::table(
                "Job Descriptions",
                JOB_COLUMNS,
                rows(jobs),
                "No jobs available yet. Create one below.",
            )),
            Err(e) => view.push(failure("job descriptions", e)),
        }
        view.push(Section::Form(job_form()));

        // Evaluation
        match (&resumes, &jobs) {
            (Ok(resumes), Ok(jobs)) if !resumes.is_empty() && !jobs.is_empty() => {
                view.push(Section::Form(evaluation_form(resumes, jobs)));
            }
            _ => view.push(Section::Alert(Notice::warning(
                "Please create/select both a resume and a job before evaluation.",
            ))),
        }

        // History
        view.push(match soft(backend.evaluations().await)? {
            Ok(evaluations) => Section::table(
                "Evaluation History",
                HISTORY_COLUMNS,
                rows(&evaluations),
                "No evaluation results yet.",
            ),
            Err(e) => failure("evaluations", &e),
        });

        Ok(view)
    }
}

pub(super) fn resume_form(email: Option<&str>) -> Form {
    let mut email_field = Field::new(FieldKind::Email, "email", "Email").required();
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        email_field = email_field.value(email);
    }
    Form::post("resume_form", "Create Resume Entry", "/api/resumes", "Save Resume Entry")
        .field(Field::new(FieldKind::Text, "student_name", "Name").required())
        .field(email_field)
        .field(Field::new(
            FieldKind::Text,
            "file_path",
            "File Path (optional placeholder)",
        ))
}

/// Parse/delete controls; `{resume_id}` in the action is filled from the select.
pub(super) fn resume_actions(resumes: &[Resume]) -> Form {
    Form::post(
        "resume_actions",
        "Resume Actions",
        "/api/resumes/{resume_id}/parse",
        "Parse Resume",
    )
    .field(
        Field::new(FieldKind::Select, "resume_id", "Resume")
            .required()
            .options(resume_options(resumes)),
    )
}

pub(super) fn job_form() -> Form {
    Form::post("job_form", "Create Job Description", "/api/jobs", "Save Job Description")
        .field(Field::new(FieldKind::Text, "title", "Job Title").required())
        .field(Field::new(FieldKind::Text, "company", "Company"))
        .field(Field::new(FieldKind::Text, "location", "Location"))
        .field(Field::new(FieldKind::TextArea, "description", "Job Description"))
}

fn evaluation_form(resumes: &[Resume], jobs: &[JobDescription]) -> Form {
    let job_options = jobs
        .iter()
        .map(|job| SelectOption {
            value: job.id.to_string(),
            label: job.label(),
        })
        .collect();
    Form::post("evaluation_form", "Resume Evaluation", "/api/evaluations", "Run Evaluation")
        .field(
            Field::new(FieldKind::Select, "resume_id", "Resume")
                .required()
                .options(resume_options(resumes)),
        )
        .field(
            Field::new(FieldKind::Select, "job_id", "Job")
                .required()
                .options(job_options),
        )
}

fn resume_options(resumes: &[Resume]) -> Vec<SelectOption> {
    resumes
        .iter()
        .map(|resume| SelectOption {
            value: resume.id.to_string(),
            label: resume.label(),
        })
        .collect()
}
