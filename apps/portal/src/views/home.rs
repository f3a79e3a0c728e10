use async_trait::async_trait;

use super::{failure, record, soft, PageError, PageView, Section};
use crate::backend::is_healthy;
use crate::navigation::{PageHandler, PortalContext};
use crate::pages::{ADMIN_DASHBOARD, HOME, PLACEMENT_DASHBOARD, STUDENT_DASHBOARD};

const ABOUT: &str = "The placement portal helps students prepare better resumes and lets \
placement teams evaluate candidates against job requirements: resume scoring, skill gap \
analysis, personalised suggestions and a placement team dashboard.";

pub struct HomePage;

#[async_trait]
impl PageHandler for HomePage {
    async fn render(&self, ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let backend = &ctx.backend;
        let mut view = PageView::new(HOME, "Resume Relevance System");

        view.push(match soft(backend.health().await)? {
            Ok(payload) if is_healthy(&payload) => Section::Status {
                title: "System Health".into(),
                online: true,
                detail: "Backend API is running".into(),
            },
            Ok(payload) => Section::Status {
                title: "System Health".into(),
                online: false,
                detail: format!("API error: {payload}"),
            },
            Err(e) => Section::Status {
                title: "System Health".into(),
                online: false,
                detail: e.to_string(),
            },
        });

        view.push(match soft(backend.jobs().await)? {
            Ok(jobs) => Section::records(
                "Job Descriptions",
                jobs.iter().map(|job| record(job.label(), job)).collect(),
                "No job descriptions found.",
            ),
            Err(e) => failure("job descriptions", &e),
        });

        view.push(match soft(backend.resumes().await)? {
            Ok(resumes) => Section::records(
                "Resumes",
                resumes.iter().map(|r| record(r.label(), r)).collect(),
                "No resumes uploaded yet.",
            ),
            Err(e) => failure("resumes", &e),
        });

        view.push(match soft(backend.evaluations().await)? {
            Ok(evaluations) => Section::records(
                "Evaluations",
                evaluations.iter().map(|e| record(e.summary(), e)).collect(),
                "No evaluations yet.",
            ),
            Err(e) => failure("evaluations", &e),
        });

        view.push(Section::links(
            "Quick Actions",
            &[
                ("Student Portal", STUDENT_DASHBOARD),
                ("Admin Portal", ADMIN_DASHBOARD),
                ("Placement Overview", PLACEMENT_DASHBOARD),
            ],
        ));
        view.push(Section::text(Some("About"), ABOUT));
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::config::Config;
    use crate::gateway::ApiGateway;
    use crate::session::SessionStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn render_home(server: &MockServer) -> PageView {
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let ctx = PortalContext {
            backend: Backend::new(&gateway, &store, store.begin_action()),
            session: store.get(),
        };
        HomePage.render(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_home_lists_backend_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/jobs/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": [{"id": 3, "title": "Data Analyst", "company": "Acme"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resumes/resumes/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/evaluations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let view = render_home(&server).await;
        assert_eq!(view.page, HOME);
        assert!(matches!(&view.sections[0], Section::Status { online: true, .. }));
        match &view.sections[1] {
            Section::Records { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].label, "Data Analyst @ Acme (ID: 3)");
                assert_eq!(items[0].data["title"], "Data Analyst");
            }
            other => panic!("unexpected section: {other:?}"),
        }
        assert!(matches!(&view.sections[2], Section::Records { items, .. } if items.is_empty()));
    }

    #[tokio::test]
    async fn test_home_survives_backend_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let view = render_home(&server).await;
        assert!(matches!(&view.sections[0], Section::Status { online: false, .. }));
        assert!(matches!(&view.sections[1], Section::Alert(_)));
        assert!(matches!(&view.sections[3], Section::Alert(_)));
    }
}
