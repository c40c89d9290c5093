use chrono::{DateTime, Utc};
use shared_types::{Project, ProjectProgress, Task};
use std::collections::HashMap;
use uuid::Uuid;

use crate::analytics::AnalyticsSummary;
use crate::api::ApiClient;
use crate::error::Result;
use crate::pages::load_progress;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsView {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub progress: HashMap<Uuid, ProjectProgress>,
    pub summary: AnalyticsSummary,
}

impl AnalyticsView {
    pub async fn load(api: &ApiClient, session: &Session, now: DateTime<Utc>) -> Result<Self> {
        let tasks = api.get_all_tasks(session).await?;
        let projects = api.get_projects(session).await?;
        let progress = load_progress(api, session, &projects).await;
        let summary = AnalyticsSummary::compute(&tasks, &projects, &progress, now);

        Ok(Self {
            tasks,
            projects,
            progress,
            summary,
        })
    }
}
