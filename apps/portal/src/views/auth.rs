use async_trait::async_trait;

use super::{Field, FieldKind, Form, Notice, PageError, PageView, Section};
use crate::flows::auth::MIN_PASSWORD_LEN;
use crate::navigation::{PageHandler, PortalContext};
use crate::pages::{ADMIN_LOGIN, FORGOT_PASSWORD, HOME, REGISTER, USER_LOGIN};

fn login_form(id: &str, title: &str, portal: &str, submit: &str) -> Form {
    Form::post(id, title, "/api/auth/login", submit)
        .field(Field::new(FieldKind::Email, "email", "Email Address").required())
        .field(Field::new(FieldKind::Password, "password", "Password").required())
        .field(Field::new(FieldKind::Hidden, "portal", "Portal").value(portal))
}

pub struct StudentLoginPage;

#[async_trait]
impl PageHandler for StudentLoginPage {
    async fn render(&self, _ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        Ok(PageView::new(USER_LOGIN, "Student Login")
            .section(Section::Form(login_form(
                "user_login_form",
                "Student Login",
                "student",
                "Login",
            )))
            .section(Section::links(
                "More Options",
                &[
                    ("Create New Account", REGISTER),
                    ("Forgot Password", FORGOT_PASSWORD),
                    ("Back to Home", HOME),
                ],
            )))
    }
}

pub struct AdminLoginPage;

#[async_trait]
impl PageHandler for AdminLoginPage {
    async fn render(&self, _ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        Ok(PageView::new(ADMIN_LOGIN, "Placement Team Login")
            .section(Section::Alert(Notice::warning(
                "This portal is for placement team members only. Students should use the Student Login.",
            )))
            .section(Section::Form(login_form(
                "admin_login_form",
                "Placement Team Login",
                "admin",
                "Admin Login",
            )))
            .section(Section::text(
                Some("Admin Information"),
                "Placement team access covers job description management, candidate \
                 evaluation review and analytics. Admin accounts are set up by the IT department.",
            ))
            .section(Section::links("Navigation", &[("Back to Home", HOME)])))
    }
}

pub struct RegisterPage;

#[async_trait]
impl PageHandler for RegisterPage {
    async fn render(&self, _ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let student = Form::post(
            "student_reg_form",
            "Student Account",
            "/api/auth/register",
            "Create Student Account",
        )
        .field(Field::new(FieldKind::Text, "full_name", "Full Name").required())
        .field(Field::new(FieldKind::Email, "email", "Email Address").required())
        .field(
            Field::new(
                FieldKind::Password,
                "password",
                &format!("Password (at least {MIN_PASSWORD_LEN} characters)"),
            )
            .required(),
        )
        .field(Field::new(FieldKind::Password, "confirm_password", "Confirm Password").required());

        // Placement team accounts are provisioned out of band; the form is shown disabled.
        let admin = Form::post(
            "admin_reg_form",
            "Placement Team Account",
            "/api/auth/register",
            "Request Admin Access",
        )
        .field(Field::new(FieldKind::Text, "full_name", "Full Name"))
        .field(Field::new(FieldKind::Email, "email", "Work Email"))
        .field(Field::new(FieldKind::Text, "admin_code", "Admin Access Code"))
        .disabled();

        Ok(PageView::new(REGISTER, "Create Account")
            .section(Section::Alert(Notice::info(
                "Create a student account to evaluate your resume against job descriptions.",
            )))
            .section(Section::Form(student))
            .section(Section::Alert(Notice::warning(
                "Placement team accounts require admin approval. Contact the IT department for access.",
            )))
            .section(Section::Form(admin))
            .section(Section::links(
                "Navigation",
                &[("Back to Login", USER_LOGIN), ("Admin Login", ADMIN_LOGIN)],
            )))
    }
}

pub struct ForgotPasswordPage;

#[async_trait]
impl PageHandler for ForgotPasswordPage {
    async fn render(&self, _ctx: &PortalContext<'_>) -> Result<PageView, PageError> {
        let form = Form::post(
            "forgot_password_form",
            "Email Recovery",
            "/api/auth/forgot-password",
            "Send Reset Link",
        )
        .field(Field::new(FieldKind::Email, "email", "Email Address").required());

        Ok(PageView::new(FORGOT_PASSWORD, "Password Recovery")
            .section(Section::Alert(Notice::info(
                "Enter your registered email to receive password reset instructions.",
            )))
            .section(Section::Form(form))
            .section(Section::Alert(Notice::warning(
                "Security question recovery is not available yet.",
            )))
            .section(Section::links("Navigation", &[("Back to Login", USER_LOGIN)])))
    }
}
