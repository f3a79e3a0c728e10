use async_trait::async_trait;

use super::student::{job_form, resume_actions, resume_form, JOB_COLUMNS, RESUME_COLUMNS};
use super::{failure, rows, soft, Field, FieldKind, Form, Notice, PageError, PageView, Section};
use crate::navigation::{PageHandler, PortalContext};
use crate::pages::{ADMIN_DASHBOARD, PLACEMENT_DASHBOARD};

const EVALUATION_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "resume_id",
    "job_id",
    "relevance_score",
    "verdict",
];

pub struct AdminDashboard;

#[async_trait]
impl PageHandler for AdminDashboard {
    async fn render(&self, ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let backend = &ctx.backend;
        let mut view = PageView::new(ADMIN_DASHBOARD, "Placement Team Dashboard").section(
            Section::Alert(Notice::info(
                "Manage job descriptions, resumes, and evaluation results.",
            )),
        );

        view.push(Section::Form(job_form()));
        match soft(backend.jobs().await)? {
            Ok(jobs) => {
                let any = !jobs.is_empty();
                view.push(Section::table(
                    "Manage Job Descriptions",
                    JOB_COLUMNS,
                    rows(&jobs),
                    "No jobs found.",
                ));
                if any {
                    view.push(Section::Form(job_update_form()));
                }
            }
            Err(e) => view.push(failure("job descriptions", &e)),
        }

        view.push(Section::Form(resume_form(None)));
        match soft(backend.resumes().await)? {
            Ok(resumes) => {
                view.push(Section::table(
                    "Manage Resumes",
                    RESUME_COLUMNS,
                    rows(&resumes),
                    "No resumes found.",
                ));
                if !resumes.is_empty() {
                    view.push(Section::Form(resume_actions(&resumes)));
                }
            }
            Err(e) => view.push(failure("resumes", &e)),
        }

        view.push(match soft(backend.evaluations().await)? {
            Ok(evaluations) => Section::table(
                "Evaluation Results",
                EVALUATION_COLUMNS,
                rows(&evaluations),
                "No evaluations available.",
            ),
            Err(e) => failure("evaluations", &e),
        });

        view.push(Section::links(
            "Analytics",
            &[("Placement Overview", PLACEMENT_DASHBOARD)],
        ));
        Ok(view)
    }
}

/// Updates a job by id; the same id also drives `GET`/`DELETE /api/jobs/{job_id}`.
fn job_update_form() -> Form {
    Form {
        method: "PUT",
        ..Form::post("job_update_form", "Update Job", "/api/jobs/{job_id}", "Update Job")
    }
    .field(Field::new(FieldKind::Number, "job_id", "Job ID").required())
    .field(Field::new(FieldKind::Text, "title", "New Title"))
    .field(Field::new(FieldKind::Text, "company", "New Company"))
    .field(Field::new(FieldKind::Text, "location", "New Location"))
}
