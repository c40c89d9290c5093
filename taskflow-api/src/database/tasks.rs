use crate::database::{now_millis, parse_uuid, to_datetime, AsyncDbConnection};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{CreateTaskRequest, Task, TaskStats, UpdateTaskRequest};
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, project_id, due_date, created_at, updated_at";

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let user_id: String = row.get(1)?;
    let project_id: Option<String> = row.get(5)?;
    let due_date: Option<i64> = row.get(6)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: parse_uuid(1, &user_id)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        project_id: project_id.map(|p| parse_uuid(5, &p)).transpose()?,
        due_date: due_date.map(to_datetime),
        created_at: to_datetime(row.get(7)?),
        updated_at: to_datetime(row.get(8)?),
    })
}

/// Optional filters for [`list_tasks`]
#[derive(Debug, Clone, Copy)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            completed: None,
            offset: 0,
            limit: 50,
        }
    }
}

/// List a user's tasks, newest first. Returns the page and the total
/// number of tasks matching the filter.
pub async fn list_tasks(
    conn: AsyncDbConnection,
    user_id: Uuid,
    query: TaskQuery,
) -> Result<(Vec<Task>, i64)> {
    let conn = conn.lock().await?;
    let user_id = user_id.to_string();

    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE user_id = ?1 AND (?2 IS NULL OR completed = ?2)
         ORDER BY created_at DESC, id DESC
         LIMIT ?3 OFFSET ?4"
    ))?;

    let tasks = stmt
        .query_map(
            params![user_id, query.completed, query.limit, query.offset],
            map_task,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND (?2 IS NULL OR completed = ?2)",
        params![user_id, query.completed],
        |row| row.get(0),
    )?;

    Ok((tasks, total))
}

pub async fn list_project_tasks(conn: AsyncDbConnection, project_id: Uuid) -> Result<Vec<Task>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;

    let tasks = stmt
        .query_map([project_id.to_string()], map_task)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tasks)
}

pub async fn insert_task(
    conn: AsyncDbConnection,
    user_id: Uuid,
    request: &CreateTaskRequest,
) -> Result<Task> {
    let conn = conn.lock().await?;
    let now = now_millis();

    let id: i64 = conn.query_row(
        "INSERT INTO tasks
         (user_id, project_id, title, description, completed, due_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING id",
        params![
            user_id.to_string(),
            request.project_id.map(|p| p.to_string()),
            &request.title,
            &request.description,
            request.completed,
            request.due_date.map(|d| d.timestamp_millis()),
            now,
            now
        ],
        |row| row.get(0),
    )?;

    Ok(Task {
        id,
        user_id,
        title: request.title.clone(),
        description: request.description.clone(),
        completed: request.completed,
        project_id: request.project_id,
        due_date: request.due_date,
        created_at: to_datetime(now),
        updated_at: to_datetime(now),
    })
}

/// Fetch a task only if it belongs to `user_id`
pub async fn get_task(conn: AsyncDbConnection, user_id: Uuid, id: i64) -> Result<Option<Task>> {
    let conn = conn.lock().await?;

    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id.to_string()],
            map_task,
        )
        .optional()?;

    Ok(task)
}

/// Apply the fields present in `request`. Returns `None` when the task does
/// not exist or belongs to another user.
pub async fn update_task(
    conn: AsyncDbConnection,
    user_id: Uuid,
    id: i64,
    request: &UpdateTaskRequest,
) -> Result<Option<Task>> {
    let conn = conn.lock().await?;

    let existing = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id.to_string()],
            map_task,
        )
        .optional()?;

    let Some(mut task) = existing else {
        return Ok(None);
    };

    if let Some(title) = &request.title {
        task.title = title.clone();
    }
    if let Some(description) = &request.description {
        task.description = Some(description.clone());
    }
    if let Some(completed) = request.completed {
        task.completed = completed;
    }
    if let Some(due_date) = request.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(project_id) = request.project_id {
        task.project_id = Some(project_id);
    }

    let now = now_millis();
    task.updated_at = to_datetime(now);

    conn.execute(
        "UPDATE tasks
         SET title = ?1, description = ?2, completed = ?3, due_date = ?4, project_id = ?5,
             updated_at = ?6
         WHERE id = ?7",
        params![
            &task.title,
            &task.description,
            task.completed,
            task.due_date.map(|d| d.timestamp_millis()),
            task.project_id.map(|p| p.to_string()),
            now,
            id
        ],
    )?;

    Ok(Some(task))
}

/// Flip the completion flag
pub async fn toggle_task(conn: AsyncDbConnection, user_id: Uuid, id: i64) -> Result<Option<Task>> {
    let conn = conn.lock().await?;

    let updated = conn.execute(
        "UPDATE tasks SET completed = NOT completed, updated_at = ?1
         WHERE id = ?2 AND user_id = ?3",
        params![now_millis(), id, user_id.to_string()],
    )?;

    if updated == 0 {
        return Ok(None);
    }

    let task = conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        map_task,
    )?;

    Ok(Some(task))
}

/// Returns `false` when nothing was deleted
pub async fn delete_task(conn: AsyncDbConnection, user_id: Uuid, id: i64) -> Result<bool> {
    let conn = conn.lock().await?;

    let deleted = conn.execute(
        "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
        params![id, user_id.to_string()],
    )?;

    Ok(deleted > 0)
}

pub async fn task_stats(conn: AsyncDbConnection, user_id: Uuid) -> Result<TaskStats> {
    let conn = conn.lock().await?;

    let (total, completed): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks WHERE user_id = ?1",
        [user_id.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(TaskStats::from_counts(total, completed))
}
