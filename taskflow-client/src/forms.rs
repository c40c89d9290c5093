//! Form state for creating and editing records, validated locally before
//! anything is sent.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use shared_types::validation::{
    validate_color, validate_description, validate_email, validate_new_password,
    validate_password, validate_project_name, validate_title, DEFAULT_PROJECT_COLOR,
};
use shared_types::{
    CreateProjectRequest, CreateTaskRequest, Project, RegisterRequest, ResetPasswordRequest,
    Task, UpdateProjectRequest, UpdateTaskRequest, ValidationError,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub name: &'static str,
    pub value: &'static str,
}

pub const PROJECT_COLORS: [ColorOption; 8] = [
    ColorOption { name: "Blue", value: "#3b82f6" },
    ColorOption { name: "Purple", value: "#8b5cf6" },
    ColorOption { name: "Green", value: "#10b981" },
    ColorOption { name: "Yellow", value: "#f59e0b" },
    ColorOption { name: "Red", value: "#ef4444" },
    ColorOption { name: "Pink", value: "#ec4899" },
    ColorOption { name: "Indigo", value: "#6366f1" },
    ColorOption { name: "Teal", value: "#14b8a6" },
];

/// Resolve a palette name (`"green"`) or pass a hex code through
pub fn resolve_color(input: &str) -> String {
    let input = input.trim();
    PROJECT_COLORS
        .iter()
        .find(|option| option.name.eq_ignore_ascii_case(input))
        .map(|option| option.value.to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Parse a due date or deadline typed by the user. Accepts RFC 3339, or a
/// local `YYYY-MM-DD HH:MM` / `YYYY-MM-DD` (end of day).
pub fn parse_datetime<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|date| {
                date.and_hms_opt(23, 59, 0)
                    .unwrap_or_else(|| date.and_time(Default::default()))
            })
        })
        .map_err(|_| format!("Invalid date '{input}', expected YYYY-MM-DD [HH:MM]"))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{input}' does not exist in the local time zone"))
}

pub fn parse_local_datetime(input: &str) -> Result<DateTime<Utc>, String> {
    parse_datetime(input, &Local)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            project_id: task.project_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_description(Some(self.description.trim()))
    }

    pub fn into_create(self) -> Result<CreateTaskRequest, ValidationError> {
        self.validate()?;
        Ok(CreateTaskRequest {
            title: self.title.trim().to_string(),
            description: non_empty(&self.description),
            completed: false,
            due_date: self.due_date,
            project_id: self.project_id,
        })
    }

    pub fn into_update(self) -> Result<UpdateTaskRequest, ValidationError> {
        self.validate()?;
        Ok(UpdateTaskRequest {
            title: Some(self.title.trim().to_string()),
            description: non_empty(&self.description),
            completed: None,
            project_id: self.project_id,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub color: String,
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            color: DEFAULT_PROJECT_COLOR.to_string(),
            deadline: None,
        }
    }
}

impl ProjectForm {
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            color: project.color.clone(),
            deadline: project.deadline,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_project_name(&self.name)?;
        validate_description(Some(self.description.trim()))?;
        validate_color(self.color.trim())
    }

    pub fn into_create(self) -> Result<CreateProjectRequest, ValidationError> {
        self.validate()?;
        Ok(CreateProjectRequest {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            color: non_empty(&self.color),
            deadline: self.deadline,
        })
    }

    pub fn into_update(self) -> Result<UpdateProjectRequest, ValidationError> {
        self.validate()?;
        Ok(UpdateProjectRequest {
            name: Some(self.name.trim().to_string()),
            description: non_empty(&self.description),
            color: non_empty(&self.color),
            deadline: self.deadline,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(self.email.trim())?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        validate_new_password(&self.password)
    }

    pub fn into_request(self) -> Result<RegisterRequest, ValidationError> {
        self.validate()?;
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetPasswordForm {
    pub email: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(self.email.trim())?;
        validate_password(&self.new_password)?;
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    pub fn into_request(self) -> Result<ResetPasswordRequest, ValidationError> {
        self.validate()?;
        Ok(ResetPasswordRequest {
            email: self.email.trim().to_string(),
            new_password: self.new_password,
        })
    }
}
