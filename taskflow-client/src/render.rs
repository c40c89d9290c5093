//! Plain-text rendering of page views for the terminal.

use chrono::{DateTime, Local, Utc};
use shared_types::{Project, Task};
use std::fmt::Write;

use crate::calendar::{due_urgency, time_until_due, DueUrgency};
use crate::pages::analytics::AnalyticsView;
use crate::pages::calendar::CalendarView;
use crate::pages::dashboard::DashboardView;
use crate::pages::projects::ProjectWithProgress;
use crate::pages::tasks::TaskSections;

fn format_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}] #{:<4} {}", task.id, task.title);
    if let Some(due) = task.due_date {
        let _ = write!(line, "  (due {})", format_due(due));
        if task.is_overdue(now) {
            line.push_str(" OVERDUE");
        }
    }
    line
}

pub fn task_detail(task: &Task, project: Option<&Project>, now: DateTime<Utc>) -> String {
    let mut out = task_line(task, now);
    if let Some(description) = &task.description {
        let _ = write!(out, "\n       {description}");
    }
    if let Some(project) = project {
        let _ = write!(out, "\n       project: {} {}", project.name, project.color);
    }
    out
}

pub fn dashboard(view: &DashboardView) -> String {
    let stats = &view.stats;
    format!(
        "Welcome back, {}\n\n  Total tasks      {}\n  Completed        {}\n  Pending          {}\n  Completion rate  {}%\n",
        view.email, stats.total, stats.completed, stats.pending, stats.completion_rate
    )
}

pub fn task_sections(sections: &TaskSections<'_>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "To do ({})", sections.incomplete.len());
    for task in &sections.incomplete {
        let _ = writeln!(out, "  {}", task_line(task, now));
    }
    let _ = writeln!(out, "\nCompleted ({})", sections.completed.len());
    for task in &sections.completed {
        let _ = writeln!(out, "  {}", task_line(task, now));
    }
    if sections.incomplete.is_empty() && sections.completed.is_empty() {
        out.push_str("\nNo tasks found. Add one with `taskflow tasks add`.\n");
    }
    out
}

pub fn project_line(entry: &ProjectWithProgress) -> String {
    let progress = &entry.progress;
    let mut line = format!(
        "{} {:<30} {:>6.2}%  {}/{} tasks",
        entry.project.color,
        entry.project.name,
        progress.progress,
        progress.completed_tasks,
        progress.total_tasks
    );
    if let Some(deadline) = entry.project.deadline {
        let _ = write!(line, "  deadline {}", deadline.with_timezone(&Local).format("%Y-%m-%d"));
    }
    let _ = write!(line, "\n  id {}", entry.project.id);
    line
}

pub fn calendar(view: &CalendarView, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let today = now.with_timezone(&Local).date_naive();

    let _ = writeln!(out, "{:^28}", view.month.to_string());
    out.push_str(" Su  Mo  Tu  We  Th  Fr  Sa\n");

    for week in view.grid().chunks(7) {
        for day in week {
            let has_tasks = !view.tasks_on(day.date, &Local).is_empty();
            let marker = if day.date == view.selected {
                '>'
            } else if day.date == today {
                '*'
            } else {
                ' '
            };
            let label = if day.is_current_month {
                format!("{:>2}", day.day)
            } else {
                "  ".to_string()
            };
            let dot = if has_tasks && day.is_current_month { '.' } else { ' ' };
            let _ = write!(out, "{marker}{label}{dot}");
        }
        out.push('\n');
    }

    let selected = view.selected_tasks(&Local);
    let _ = writeln!(
        out,
        "\n{} ({} tasks)",
        view.selected.format("%A, %B %-d, %Y"),
        selected.len()
    );
    for task in selected {
        let mut line = task_detail(task, view.project_for(task), now);
        if let Some(due) = task.due_date {
            if !task.completed {
                let urgency = match due_urgency(due, now) {
                    DueUrgency::Overdue => "overdue",
                    DueUrgency::Urgent => "urgent",
                    DueUrgency::Warning => "soon",
                    DueUrgency::Normal => "on track",
                };
                let _ = write!(line, "\n       {} [{}]", time_until_due(due, now), urgency);
            }
        }
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn analytics(view: &AnalyticsView) -> String {
    let summary = &view.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Analytics\n");
    let _ = writeln!(out, "  Completion rate     {}%", summary.stats.completion_rate);
    let _ = writeln!(
        out,
        "  Tasks               {} total, {} completed, {} pending",
        summary.stats.total, summary.stats.completed, summary.stats.pending
    );
    let _ = writeln!(out, "  Completed this week {}", summary.weekly_completed);
    let _ = writeln!(out, "  Overdue             {}", summary.overdue_tasks);
    let _ = writeln!(out, "  Projects            {}", summary.active_projects);
    let _ = writeln!(out, "  Productivity score  {}/100", summary.productivity_score);

    out.push_str("\nTop projects\n");
    if summary.top_projects.is_empty() {
        out.push_str("  No projects yet\n");
    }
    for (rank, entry) in summary.top_projects.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<30} {:>6.2}%",
            rank + 1,
            entry.project.name,
            entry.progress
        );
    }
    out
}
