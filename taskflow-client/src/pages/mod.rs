//! Page view-models. Each page fetches what it needs on `load` and derives
//! its display aggregates locally; nothing is shared between pages.

pub mod analytics;
pub mod calendar;
pub mod dashboard;
pub mod projects;
pub mod tasks;

use shared_types::{Project, ProjectProgress};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum PageState<V> {
    Loading,
    Ready(V),
    Failed(String),
}

impl<V> PageState<V> {
    /// Turn a load result into what the page shows; failures become a
    /// message the user can retry from
    pub fn from_result(result: Result<V, ClientError>) -> Self {
        match result {
            Ok(view) => PageState::Ready(view),
            Err(e) => {
                tracing::debug!("Page load failed: {}", e);
                PageState::Failed(e.to_string())
            }
        }
    }

    pub fn view(&self) -> Option<&V> {
        match self {
            PageState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

/// Fetch progress one project at a time. A failed fetch is logged and the
/// project counts as having no tasks.
pub async fn load_progress(
    api: &ApiClient,
    session: &Session,
    projects: &[Project],
) -> HashMap<Uuid, ProjectProgress> {
    let mut progress = HashMap::with_capacity(projects.len());
    for project in projects {
        let entry = match api.get_project_progress(session, project.id).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Failed to fetch progress for project {}: {}", project.id, e);
                ProjectProgress::empty()
            }
        };
        progress.insert(project.id, entry);
    }
    progress
}
