use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Task entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Task {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => !self.completed && due < now,
            None => false,
        }
    }

    /// Case-insensitive match against title and description
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false)
    }
}

/// Request to create a new task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// Request to update a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Paginated task listing
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Per-user task counters shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub completion_rate: i64,
}

impl TaskStats {
    pub fn from_counts(total: i64, completed: i64) -> Self {
        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task(completed: bool, due_date: Option<DateTime<Utc>>) -> Task {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Task {
            id: 1,
            user_id: Uuid::nil(),
            title: "Write release notes".to_string(),
            description: Some("Cover the Calendar changes".to_string()),
            completed,
            project_id: None,
            due_date,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_overdue_only_when_pending_and_past_due() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let past = Some(now - Duration::hours(1));
        let future = Some(now + Duration::hours(1));

        assert!(task(false, past).is_overdue(now));
        assert!(!task(true, past).is_overdue(now));
        assert!(!task(false, future).is_overdue(now));
        assert!(!task(false, None).is_overdue(now));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let t = task(false, None);
        assert!(t.matches_search("RELEASE"));
        assert!(t.matches_search("calendar"));
        assert!(!t.matches_search("budget"));
    }

    #[test]
    fn test_stats_from_counts() {
        assert_eq!(
            TaskStats::from_counts(0, 0),
            TaskStats {
                total: 0,
                completed: 0,
                pending: 0,
                completion_rate: 0
            }
        );
        assert_eq!(TaskStats::from_counts(3, 2).completion_rate, 67);
        assert_eq!(TaskStats::from_counts(3, 2).pending, 1);
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let request = UpdateTaskRequest {
            completed: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }
}
