//! Derived statistics over already-fetched tasks and projects.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every render.

use chrono::{DateTime, Duration, Utc};
use shared_types::{Project, ProjectProgress, Task, TaskStats};
use std::collections::HashMap;
use uuid::Uuid;

pub const TOP_PROJECTS_LIMIT: usize = 3;
const WEEK_DAYS: i64 = 7;

/// Rounded percentage of completed tasks, 0 for an empty list
pub fn completion_rate(tasks: &[Task]) -> i64 {
    task_stats(tasks).completion_rate
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStats::from_counts(tasks.len() as i64, completed as i64)
}

/// Completed tasks last touched within the seven days up to `now`
pub fn weekly_completed(tasks: &[Task], now: DateTime<Utc>) -> usize {
    let week_ago = now - Duration::days(WEEK_DAYS);
    tasks
        .iter()
        .filter(|task| task.completed && task.updated_at >= week_ago && task.updated_at <= now)
        .count()
}

/// `min(100, round(completion_rate + weekly / 10))`. The weekly bonus is added
/// to the already rounded completion rate.
pub fn productivity_score(tasks: &[Task], now: DateTime<Utc>) -> i64 {
    if tasks.is_empty() {
        return 0;
    }
    let rate = completion_rate(tasks) as f64;
    let weekly = weekly_completed(tasks, now) as f64;
    ((rate + weekly / 10.0).round() as i64).min(100)
}

pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_overdue(now)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedProject {
    pub project: Project,
    pub progress: f64,
}

/// Projects by descending progress, at most [`TOP_PROJECTS_LIMIT`] of them.
/// Projects without a progress entry rank as 0.
pub fn top_projects(
    projects: &[Project],
    progress: &HashMap<Uuid, ProjectProgress>,
) -> Vec<RankedProject> {
    let mut ranked: Vec<RankedProject> = projects
        .iter()
        .map(|project| RankedProject {
            project: project.clone(),
            progress: progress.get(&project.id).map(|p| p.progress).unwrap_or(0.0),
        })
        .collect();

    // Stable sort keeps API order among ties
    ranked.sort_by(|a, b| b.progress.total_cmp(&a.progress));
    ranked.truncate(TOP_PROJECTS_LIMIT);
    ranked
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub stats: TaskStats,
    pub weekly_completed: usize,
    pub productivity_score: i64,
    pub overdue_tasks: usize,
    pub active_projects: usize,
    pub top_projects: Vec<RankedProject>,
}

impl AnalyticsSummary {
    pub fn compute(
        tasks: &[Task],
        projects: &[Project],
        progress: &HashMap<Uuid, ProjectProgress>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            stats: task_stats(tasks),
            weekly_completed: weekly_completed(tasks, now),
            productivity_score: productivity_score(tasks, now),
            overdue_tasks: overdue_tasks(tasks, now).len(),
            active_projects: projects.len(),
            top_projects: top_projects(projects, progress),
        }
    }

    pub fn best_progress(&self) -> f64 {
        self.top_projects.first().map(|p| p.progress).unwrap_or(0.0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use shared_types::{Project, Task};
    use uuid::Uuid;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    pub fn task(id: i64, completed: bool, updated_at: DateTime<Utc>) -> Task {
        Task {
            id,
            user_id: Uuid::nil(),
            title: format!("Task {id}"),
            description: None,
            completed,
            project_id: None,
            due_date: None,
            created_at: updated_at,
            updated_at,
        }
    }

    pub fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            color: "#3b82f6".to_string(),
            deadline: None,
            created_at: now(),
            updated_at: now(),
        }
    }
}
