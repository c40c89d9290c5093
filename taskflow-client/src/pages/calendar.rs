use chrono::{NaiveDate, TimeZone};
use shared_types::{Project, Task};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::calendar::{month_grid, tasks_for_date, CalendarDay, CalendarMonth};
use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub month: CalendarMonth,
    pub selected: NaiveDate,
}

impl CalendarView {
    /// Opens on the month containing `today` with `today` selected
    pub async fn load(api: &ApiClient, session: &Session, today: NaiveDate) -> Result<Self> {
        let tasks = api.get_all_tasks(session).await?;
        let projects = api.get_projects(session).await?;
        Ok(Self::new(tasks, projects, today))
    }

    pub fn new(tasks: Vec<Task>, projects: Vec<Project>, today: NaiveDate) -> Self {
        Self {
            tasks,
            projects,
            month: CalendarMonth::containing(today),
            selected: today,
        }
    }

    pub fn grid(&self) -> Vec<CalendarDay> {
        month_grid(self.month)
    }

    pub fn prev_month(&mut self) {
        self.month = self.month.prev_month();
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next_month();
    }

    pub fn show_month(&mut self, month: CalendarMonth) {
        self.month = month;
    }

    /// Selecting a day outside the displayed month jumps to that month
    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
        if !self.month.contains(date) {
            self.month = CalendarMonth::containing(date);
        }
    }

    pub fn tasks_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Vec<&Task> {
        tasks_for_date(&self.tasks, date, tz)
    }

    pub fn selected_tasks<Tz: TimeZone>(&self, tz: &Tz) -> Vec<&Task> {
        self.tasks_on(self.selected, tz)
    }

    pub fn project(&self, project_id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn project_for(&self, task: &Task) -> Option<&Project> {
        task.project_id.and_then(|id| self.project(id))
    }
}
