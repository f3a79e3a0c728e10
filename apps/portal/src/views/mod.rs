//! Page views: the JSON documents each portal page renders to.
//!
//! A view is a list of typed sections (status panels, record lists, tables,
//! metrics, charts, forms, links). Views never mutate the session; forms name
//! the portal endpoint that performs the action.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::gateway::{ApiError, ApiResult};
use crate::navigation::PageController;
use crate::pages;

mod admin;
mod auth;
mod home;
mod placement;
mod student;

pub use placement::Bucket;

// ────────────────────────────────────────────────────────────────────────────
// View model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub page: String,
    pub title: String,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

impl PageView {
    pub fn new(page: &str, title: impl Into<String>) -> Self {
        Self {
            page: page.to_string(),
            title: title.into(),
            sections: Vec::new(),
            notice: None,
            redirected_from: None,
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// A labelled JSON record, shown collapsed under its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub label: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub page: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        body: String,
    },
    Status {
        title: String,
        online: bool,
        detail: String,
    },
    Alert(Notice),
    Records {
        title: String,
        items: Vec<Record>,
        empty: String,
    },
    Table {
        title: String,
        columns: Vec<String>,
        rows: Vec<Value>,
        empty: String,
    },
    Metrics {
        items: Vec<Metric>,
    },
    Chart {
        title: String,
        chart: ChartKind,
        buckets: Vec<Bucket>,
    },
    Form(Form),
    Links {
        title: String,
        links: Vec<Link>,
    },
}

impl Section {
    pub fn text(title: Option<&str>, body: impl Into<String>) -> Self {
        Section::Text {
            title: title.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn records(title: &str, items: Vec<Record>, empty: &str) -> Self {
        Section::Records {
            title: title.to_string(),
            items,
            empty: empty.to_string(),
        }
    }

    pub fn table(title: &str, columns: &[&str], rows: Vec<Value>, empty: &str) -> Self {
        Section::Table {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            empty: empty.to_string(),
        }
    }

    pub fn links(title: &str, links: &[(&str, &'static str)]) -> Self {
        Section::Links {
            title: title.to_string(),
            links: links
                .iter()
                .map(|&(label, page)| Link {
                    label: label.to_string(),
                    page,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Forms
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    TextArea,
    Number,
    Select,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl Field {
    pub fn new(kind: FieldKind, name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            value: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }
}

/// A form submitted to a portal endpoint (`method` + `action`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub method: &'static str,
    pub action: String,
    pub fields: Vec<Field>,
    pub submit: String,
    pub disabled: bool,
}

impl Form {
    pub fn post(id: &str, title: &str, action: impl Into<String>, submit: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            method: "POST",
            action: action.into(),
            fields: Vec::new(),
            submit: submit.to_string(),
            disabled: false,
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Why a page could not be rendered. Caught by the page controller, which
/// falls back to the home page.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PageError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("No view registered for page {0}")]
    NoHandler(String),
}

impl PageError {
    pub fn is_stale(&self) -> bool {
        matches!(self, PageError::Api(ApiError::Stale))
    }
}

/// Splits a backend failure into one the page can show inline (network and
/// backend errors) and one that must abort rendering (expired session,
/// superseded action, missing token).
pub(crate) fn soft<T>(result: ApiResult<T>) -> Result<ApiResult<T>, PageError> {
    match result {
        Err(e @ (ApiError::Unauthorized | ApiError::Stale | ApiError::AuthRequired)) => {
            Err(PageError::Api(e))
        }
        other => Ok(other),
    }
}

/// Shows a backend record as-is under `label`.
pub(crate) fn record<T: Serialize>(label: String, item: &T) -> Record {
    Record {
        label,
        data: serde_json::to_value(item).unwrap_or_default(),
    }
}

pub(crate) fn rows<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).unwrap_or_default())
        .collect()
}

/// Inline alert for a backend failure on one section of a page.
pub(crate) fn failure(what: &str, error: &ApiError) -> Section {
    Section::Alert(Notice::error(format!("Could not load {what}: {error}")))
}

/// Rendered when even the home page fails. Touches nothing.
pub fn minimal_view() -> PageView {
    PageView::new(pages::HOME, "Placement Portal").section(Section::text(
        None,
        "The portal is having trouble reaching the evaluation service. Please try again shortly.",
    ))
}

/// Controller with a view registered for every page of the registry.
pub fn controller() -> PageController {
    PageController::new()
        .register(pages::HOME, home::HomePage)
        .register(pages::USER_LOGIN, auth::StudentLoginPage)
        .register(pages::ADMIN_LOGIN, auth::AdminLoginPage)
        .register(pages::REGISTER, auth::RegisterPage)
        .register(pages::FORGOT_PASSWORD, auth::ForgotPasswordPage)
        .register(pages::STUDENT_DASHBOARD, student::StudentDashboard)
        .register(pages::ADMIN_DASHBOARD, admin::AdminDashboard)
        .register(pages::PLACEMENT_DASHBOARD, placement::PlacementDashboard)
}
