use clap::ValueEnum;
use shared_types::Task;
use std::cmp::Ordering;

use crate::api::ApiClient;
use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TaskSort {
    #[default]
    Id,
    Title,
    Status,
    Created,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListOptions {
    pub filter: TaskFilter,
    pub search: Option<String>,
    pub sort: TaskSort,
    pub descending: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct TaskSections<'a> {
    pub incomplete: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TasksView {
    pub tasks: Vec<Task>,
}

impl TasksView {
    pub async fn load(api: &ApiClient, session: &Session) -> Result<Self> {
        let tasks = api.get_all_tasks(session).await?;
        Ok(Self { tasks })
    }

    pub fn find(&self, task_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Apply filter, search and sort
    pub fn visible(&self, options: &TaskListOptions) -> Vec<&Task> {
        let search = options
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());

        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| options.filter.matches(task))
            .filter(|task| search.map(|term| task.matches_search(term)).unwrap_or(true))
            .collect();

        tasks.sort_by(|a, b| {
            let ordering = compare(a, b, options.sort);
            if options.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        tasks
    }

    pub fn sections(&self, options: &TaskListOptions) -> TaskSections<'_> {
        let (completed, incomplete): (Vec<&Task>, Vec<&Task>) = self
            .visible(options)
            .into_iter()
            .partition(|task| task.completed);
        TaskSections {
            incomplete,
            completed,
        }
    }
}

fn compare(a: &Task, b: &Task, sort: TaskSort) -> Ordering {
    match sort {
        TaskSort::Id => a.id.cmp(&b.id),
        TaskSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        TaskSort::Status => a.completed.cmp(&b.completed),
        TaskSort::Created => a.created_at.cmp(&b.created_at),
    }
}
