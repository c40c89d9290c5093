use clap::ValueEnum;
use shared_types::{Project, ProjectProgress};

use crate::api::ApiClient;
use crate::error::Result;
use crate::pages::load_progress;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProjectFilter {
    #[default]
    All,
    /// Progress below 100%
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWithProgress {
    pub project: Project,
    pub progress: ProjectProgress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectsView {
    pub projects: Vec<ProjectWithProgress>,
}

impl ProjectsView {
    pub async fn load(api: &ApiClient, session: &Session) -> Result<Self> {
        let projects = api.get_projects(session).await?;
        let mut progress = load_progress(api, session, &projects).await;

        let projects = projects
            .into_iter()
            .map(|project| ProjectWithProgress {
                progress: progress.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect();
        Ok(Self { projects })
    }

    pub fn filtered(&self, filter: ProjectFilter, search: Option<&str>) -> Vec<&ProjectWithProgress> {
        let search = search.map(str::trim).filter(|term| !term.is_empty());

        self.projects
            .iter()
            .filter(|entry| match filter {
                ProjectFilter::All => true,
                ProjectFilter::Active => !entry.progress.is_complete(),
                ProjectFilter::Completed => entry.progress.is_complete(),
            })
            .filter(|entry| {
                search
                    .map(|term| entry.project.matches_search(term))
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn stats(&self) -> ProjectStats {
        let completed = self
            .projects
            .iter()
            .filter(|entry| entry.progress.is_complete())
            .count();
        ProjectStats {
            total: self.projects.len(),
            completed,
            active: self.projects.len() - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::project;
    use crate::api::test_support::{progress_json, project_json, session};
    use uuid::Uuid;

    fn view() -> ProjectsView {
        let mut garden = project("Garden");
        garden.description = Some("Raised beds".to_string());
        let entries = vec![
            (garden, ProjectProgress::from_counts(2, 2)),
            (project("Website"), ProjectProgress::from_counts(3, 1)),
            (project("Taxes"), ProjectProgress::empty()),
        ];
        ProjectsView {
            projects: entries
                .into_iter()
                .map(|(project, progress)| ProjectWithProgress { project, progress })
                .collect(),
        }
    }

    fn names(entries: &[&ProjectWithProgress]) -> Vec<String> {
        entries.iter().map(|e| e.project.name.clone()).collect()
    }

    #[test]
    fn test_filter_by_progress() {
        let view = view();
        assert_eq!(names(&view.filtered(ProjectFilter::Completed, None)), vec!["Garden"]);
        assert_eq!(
            names(&view.filtered(ProjectFilter::Active, None)),
            vec!["Website", "Taxes"]
        );
        assert_eq!(view.filtered(ProjectFilter::All, None).len(), 3);
    }

    #[test]
    fn test_search_matches_description() {
        let view = view();
        assert_eq!(
            names(&view.filtered(ProjectFilter::All, Some("raised"))),
            vec!["Garden"]
        );
    }

    #[test]
    fn test_stats() {
        assert_eq!(
            view().stats(),
            ProjectStats {
                total: 3,
                completed: 1,
                active: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_load_fetches_progress_per_project() {
        let mut server = mockito::Server::new_async().await;
        let session = session();
        let id = Uuid::new_v4();

        server
            .mock("GET", format!("/api/{}/projects", session.user_id()).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([project_json(id, "Garden")]).to_string())
            .create_async()
            .await;
        let progress = server
            .mock(
                "GET",
                format!("/api/{}/projects/{}/progress", session.user_id(), id).as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(progress_json(2, 2).to_string())
            .expect(1)
            .create_async()
            .await;

        let api = ApiClient::new(server.url()).unwrap();
        let view = ProjectsView::load(&api, &session).await.unwrap();

        progress.assert_async().await;
        assert_eq!(view.projects.len(), 1);
        assert!(view.projects[0].progress.is_complete());
        assert_eq!(view.stats().completed, 1);
    }
}
