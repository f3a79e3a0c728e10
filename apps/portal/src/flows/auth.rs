use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{refused, required, ActionOutcome, FlowError};
use crate::backend::Backend;
use crate::models::NewAccount;
use crate::pages::{ADMIN_DASHBOARD, HOME, STUDENT_DASHBOARD, USER_LOGIN};
use crate::session::{Role, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern compiles"))
}

/// Which login form was used. The admin portal only admits admin accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    #[default]
    Student,
    Admin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub portal: Portal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

/// Exchanges credentials for a token and logs the session in.
///
/// The session is only touched if this action is still the latest one; the
/// caller navigates to `landing_page` afterwards.
pub async fn login(backend: &Backend<'_>, form: &LoginForm) -> Result<ActionOutcome, FlowError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(FlowError::Validation("Please fill in all fields".into()));
    }

    let denied = match form.portal {
        Portal::Student => "Login failed. Please check your credentials.",
        Portal::Admin => "Admin access denied. Check credentials or contact system administrator.",
    };
    let email = form.email.trim();
    let token = backend
        .login(email, &form.password)
        .await
        .map_err(|e| refused(e, denied))?;

    if form.portal == Portal::Admin && !token.is_admin {
        warn!("Non-admin account attempted the admin portal");
        return Err(FlowError::Rejected(denied.into()));
    }

    let role = if token.is_admin { Role::Admin } else { Role::Student };
    backend.session().login_if_current(
        backend.ticket(),
        token.access_token,
        token.user_id.clone(),
        Some(email.to_string()),
        role,
    )?;

    let (message, landing) = match role {
        Role::Admin => ("Logged in as Admin", ADMIN_DASHBOARD),
        _ => ("Login successful", STUDENT_DASHBOARD),
    };
    Ok(
        ActionOutcome::new(message, json!({ "user_id": token.user_id, "role": role }))
            .landing(landing),
    )
}

pub fn logout(session: &SessionStore) -> ActionOutcome {
    session.logout();
    ActionOutcome::new("Logged out", serde_json::Value::Null).landing(HOME)
}

/// Creates a student account. Placement team accounts can't be self-registered.
pub async fn register(
    backend: &Backend<'_>,
    form: &RegistrationForm,
) -> Result<ActionOutcome, FlowError> {
    validate_registration(form)?;

    let account = NewAccount {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        full_name: form.full_name.trim().to_string(),
        is_admin: false,
    };
    backend
        .register(&account)
        .await
        .map_err(|e| refused(e, "Registration failed. Email may already exist."))?;

    info!("Registered a new student account");
    Ok(
        ActionOutcome::new("Account created successfully! Please login.", json!(null))
            .landing(USER_LOGIN),
    )
}

pub async fn forgot_password(
    backend: &Backend<'_>,
    form: &ForgotPasswordForm,
) -> Result<ActionOutcome, FlowError> {
    let email = form.email.trim();
    if !is_valid_email(email) {
        return Err(FlowError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    backend
        .forgot_password(email)
        .await
        .map_err(|e| refused(e, "Failed to send reset link. Please try again later."))?;
    Ok(ActionOutcome::new(
        format!("Password reset instructions sent to {email}"),
        json!(null),
    ))
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), FlowError> {
    const ALL_FIELDS: &str = "Please fill in all fields";
    required(&form.full_name, ALL_FIELDS)?;
    required(&form.email, ALL_FIELDS)?;
    if form.password.is_empty() || form.confirm_password.is_empty() {
        return Err(FlowError::Validation(ALL_FIELDS.into()));
    }
    if form.password != form.confirm_password {
        return Err(FlowError::Validation("Passwords do not match".into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FlowError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gateway::{ApiError, ApiGateway};
    use crate::navigation::resolve;
    use crate::session::{SessionError, UserId};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(email: &str, password: &str, portal: Portal) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
            portal,
        }
    }

    async fn token_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn registration(name: &str, email: &str, pw: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: name.into(),
            email: email.into(),
            password: pw.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn test_admin_login_end_to_end() {
        let server =
            token_server(json!({"access_token": "t1", "user_id": 1, "is_admin": true})).await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let outcome = login(&backend, &form("admin@x.com", "pw", Portal::Admin))
            .await
            .unwrap();
        assert_eq!(outcome.landing_page, Some(ADMIN_DASHBOARD));

        let session = store.get();
        assert_eq!(session.token(), Some("t1"));
        assert_eq!(session.user_id(), Some(&UserId::Int(1)));
        assert_eq!(session.role(), Role::Admin);
        assert_eq!(session.email(), Some("admin@x.com"));
        assert_eq!(session.current_page(), "Home");
        assert!(resolve(ADMIN_DASHBOARD, &session).is_ok());
    }

    #[tokio::test]
    async fn test_student_portal_routes_admins_to_admin_dashboard() {
        let server =
            token_server(json!({"access_token": "t1", "user_id": 1, "is_admin": true})).await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let outcome = login(&backend, &form("a@x.com", "pw", Portal::Student))
            .await
            .unwrap();
        assert_eq!(outcome.landing_page, Some(ADMIN_DASHBOARD));
        assert_eq!(store.get().role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_admin_portal_rejects_student_account() {
        let server =
            token_server(json!({"access_token": "t2", "user_id": 2, "is_admin": false})).await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let result = login(&backend, &form("s@x.com", "pw", Portal::Admin)).await;
        assert!(matches!(result, Err(FlowError::Rejected(_))), "{result:?}");
        assert_eq!(store.get().role(), Role::Guest);
        assert_eq!(store.get().token(), None);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected_not_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad"})))
            .mount(&server)
            .await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let result = login(&backend, &form("s@x.com", "nope", Portal::Student)).await;
        assert_eq!(
            result,
            Err(FlowError::Rejected(
                "Login failed. Please check your credentials.".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let gateway = ApiGateway::new(&Config::for_backend("http://127.0.0.1:1")).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());
        let result = login(&backend, &form("", "pw", Portal::Student)).await;
        assert_eq!(
            result,
            Err(FlowError::Validation("Please fill in all fields".into()))
        );
    }

    #[tokio::test]
    async fn test_superseded_login_leaves_session_to_newer_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("username=slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "ta", "user_id": 1, "is_admin": true}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("username=fast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tb", "user_id": 2, "is_admin": false})),
            )
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = Arc::new(SessionStore::new());

        let first = {
            let gateway = gateway.clone();
            let store = Arc::clone(&store);
            let ticket = store.begin_action();
            tokio::spawn(async move {
                let backend = Backend::new(&gateway, &store, ticket);
                login(&backend, &form("slow", "pw", Portal::Student)).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let backend = Backend::new(&gateway, &store, store.begin_action());
        login(&backend, &form("fast", "pw", Portal::Student))
            .await
            .unwrap();

        let late = first.await.unwrap();
        assert!(
            matches!(
                late,
                Err(FlowError::Api(ApiError::Stale)) | Err(FlowError::Session(SessionError::Stale))
            ),
            "{late:?}"
        );
        let session = store.get();
        assert_eq!(session.token(), Some("tb"));
        assert_eq!(session.role(), Role::Student);
    }

    #[test]
    fn test_registration_validation() {
        assert_eq!(
            validate_registration(&registration("", "a@b.co", "secret", "secret")),
            Err(FlowError::Validation("Please fill in all fields".into()))
        );
        assert_eq!(
            validate_registration(&registration("Ann", "a@b.co", "secret", "secreT")),
            Err(FlowError::Validation("Passwords do not match".into()))
        );
        assert_eq!(
            validate_registration(&registration("Ann", "a@b.co", "12345", "12345")),
            Err(FlowError::Validation(
                "Password must be at least 6 characters".into()
            ))
        );
        assert_eq!(
            validate_registration(&registration("Ann", "a@b.co", "123456", "123456")),
            Ok(())
        );
    }

    #[tokio::test]
    async fn test_register_lands_on_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
            .expect(1)
            .mount(&server)
            .await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let outcome = register(&backend, &registration("Ann", "a@b.co", "123456", "123456"))
            .await
            .unwrap();
        assert_eq!(outcome.landing_page, Some(USER_LOGIN));
        assert_eq!(store.get().role(), Role::Guest);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
            )
            .mount(&server)
            .await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let result = register(&backend, &registration("Ann", "a@b.co", "123456", "123456")).await;
        assert_eq!(
            result,
            Err(FlowError::Rejected(
                "Registration failed. Email may already exist.".into()
            ))
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("student@innomatics.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn test_forgot_password_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let result = forgot_password(&backend, &ForgotPasswordForm { email: "nope".into() }).await;
        assert!(matches!(result, Err(FlowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_sends_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        let gateway = ApiGateway::new(&Config::for_backend(&server.uri())).unwrap();
        let store = SessionStore::new();
        let backend = Backend::new(&gateway, &store, store.begin_action());

        let outcome = forgot_password(&backend, &ForgotPasswordForm { email: "a@b.co".into() })
            .await
            .unwrap();
        assert_eq!(outcome.message, "Password reset instructions sent to a@b.co");
    }

    #[test]
    fn test_logout_lands_home() {
        let store = SessionStore::new();
        store.login("t".into(), UserId::Int(1), Role::Student).unwrap();
        let outcome = logout(&store);
        assert_eq!(outcome.landing_page, Some(HOME));
        assert_eq!(store.get().role(), Role::Guest);
    }
}
