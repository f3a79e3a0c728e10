//! Page resolution and rendering.
//!
//! `resolve` is the role gate over the static page registry. The
//! `PageController` records the resolved page in the session and renders it
//! through its registered view; any failure lands the user on the home page
//! with a notice instead of an error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::gateway::ApiError;
use crate::pages::{self, PageDescriptor, RequiredRole};
use crate::session::Session;
use crate::views::{self, Notice, PageError, PageView};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("Page '{0}' not found")]
    NotFound(String),

    #[error("Access to '{0}' denied")]
    AccessDenied(String),
}

/// Looks `key` up in the registry and checks the session's role against it.
/// Roles are flat: an admin is not a student.
pub fn resolve(key: &str, session: &Session) -> Result<&'static PageDescriptor, NavError> {
    let page = pages::lookup(key).ok_or_else(|| NavError::NotFound(key.to_string()))?;
    if page.required_role.permits(session.role()) {
        Ok(page)
    } else {
        Err(NavError::AccessDenied(page.key.to_string()))
    }
}

/// Everything a view needs to render: a backend bound to the current action
/// and a snapshot of the session taken when rendering started.
pub struct PortalContext<'a> {
    pub backend: Backend<'a>,
    pub session: Session,
}

#[async_trait]
pub trait PageHandler: Send + Sync {
    async fn render(&self, ctx: &PortalContext<'_>) -> Result<PageView, PageError>;
}

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub key: &'static str,
    pub display_name: &'static str,
    pub required_role: RequiredRole,
    pub accessible: bool,
    pub current: bool,
}

pub fn menu(session: &Session) -> Vec<MenuEntry> {
    pages::all()
        .iter()
        .map(|page| MenuEntry {
            key: page.key,
            display_name: page.display_name,
            required_role: page.required_role,
            accessible: page.required_role.permits(session.role()),
            current: page.key == session.current_page(),
        })
        .collect()
}

#[derive(Default)]
pub struct PageController {
    handlers: HashMap<&'static str, Arc<dyn PageHandler>>,
}

impl PageController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, key: &'static str, handler: impl PageHandler + 'static) -> Self {
        self.handlers.insert(key, Arc::new(handler));
        self
    }

    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Navigates to `key` and renders it. Always yields a view: unknown or
    /// forbidden pages and render failures fall back to the home page, and a
    /// failing home page falls back to a static view.
    pub async fn navigate(&self, backend: Backend<'_>, key: &str) -> PageView {
        let session = backend.session().get();
        let page = match resolve(key, &session) {
            Ok(page) => page,
            Err(e) => {
                warn!("Navigation to '{key}' refused: {e}");
                return self.fallback(backend, key, denial_notice(&e)).await;
            }
        };

        if let Err(e) = backend.session().set_current_page(page.key) {
            warn!("Could not record page '{}': {e}", page.key);
        }
        match self.render(backend, page.key).await {
            Ok(view) => view,
            Err(e) if e.is_stale() => {
                debug!("Rendering of '{}' superseded", page.key);
                views::minimal_view()
            }
            Err(e) => {
                warn!("Page '{}' failed to render: {e}", page.key);
                self.fallback(backend, key, failure_notice(&e)).await
            }
        }
    }

    /// Renders whatever page the session is on.
    pub async fn render_current(&self, backend: Backend<'_>) -> PageView {
        let current = backend.session().get().current_page().to_string();
        self.navigate(backend, &current).await
    }

    async fn render(&self, backend: Backend<'_>, key: &str) -> Result<PageView, PageError> {
        let handler = self
            .handlers
            .get(key)
            .ok_or_else(|| PageError::NoHandler(key.to_string()))?;
        let ctx = PortalContext {
            backend,
            session: backend.session().get(),
        };
        handler.render(&ctx).await
    }

    async fn fallback(&self, backend: Backend<'_>, from: &str, notice: Notice) -> PageView {
        let home = pages::default_page().key;
        if let Err(e) = backend.session().set_current_page(home) {
            warn!("Could not reset page to {home}: {e}");
        }
        let mut view = if from == home {
            views::minimal_view()
        } else {
            match self.render(backend, home).await {
                Ok(view) => view,
                Err(e) => {
                    warn!("Home page failed during fallback: {e}");
                    views::minimal_view()
                }
            }
        };
        view.redirected_from = Some(from.to_string());
        view.notice = Some(notice);
        view
    }
}

fn denial_notice(error: &NavError) -> Notice {
    match error {
        NavError::NotFound(key) => Notice::warning(format!("Page '{key}' does not exist.")),
        NavError::AccessDenied(key) => match pages::lookup(key).map(|p| p.required_role) {
            Some(RequiredRole::Admin) => {
                Notice::warning("Please log in as a placement team member to continue.")
            }
            _ => Notice::warning("Please login first."),
        },
    }
}

fn failure_notice(error: &PageError) -> Notice {
    match error {
        PageError::Api(ApiError::Unauthorized) => Notice::error(ApiError::Unauthorized.to_string()),
        other => Notice::error(format!("Page error: {other}")),
    }
}
