use crate::database::{now_millis, parse_uuid, to_datetime, AsyncDbConnection};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::validation::DEFAULT_PROJECT_COLOR;
use shared_types::{CreateProjectRequest, Project, ProjectProgress, UpdateProjectRequest};
use uuid::Uuid;

const PROJECT_COLUMNS: &str =
    "id, user_id, name, description, color, deadline, created_at, updated_at";

fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let deadline: Option<i64> = row.get(5)?;

    Ok(Project {
        id: parse_uuid(0, &id)?,
        user_id: parse_uuid(1, &user_id)?,
        name: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        deadline: deadline.map(to_datetime),
        created_at: to_datetime(row.get(6)?),
        updated_at: to_datetime(row.get(7)?),
    })
}

pub async fn list_projects(conn: AsyncDbConnection, user_id: Uuid) -> Result<Vec<Project>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;

    let projects = stmt
        .query_map([user_id.to_string()], map_project)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(projects)
}

pub async fn insert_project(
    conn: AsyncDbConnection,
    user_id: Uuid,
    request: &CreateProjectRequest,
) -> Result<Project> {
    let conn = conn.lock().await?;
    let now = now_millis();
    let id = Uuid::new_v4();
    let color = request
        .color
        .clone()
        .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string());

    conn.execute(
        "INSERT INTO projects
         (id, user_id, name, description, color, deadline, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            user_id.to_string(),
            &request.name,
            &request.description,
            &color,
            request.deadline.map(|d| d.timestamp_millis()),
            now,
            now
        ],
    )?;

    Ok(Project {
        id,
        user_id,
        name: request.name.clone(),
        description: request.description.clone(),
        color,
        deadline: request.deadline,
        created_at: to_datetime(now),
        updated_at: to_datetime(now),
    })
}

/// Fetch a project only if it belongs to `user_id`
pub async fn get_project(
    conn: AsyncDbConnection,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Project>> {
    let conn = conn.lock().await?;

    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), user_id.to_string()],
            map_project,
        )
        .optional()?;

    Ok(project)
}

pub async fn update_project(
    conn: AsyncDbConnection,
    user_id: Uuid,
    id: Uuid,
    request: &UpdateProjectRequest,
) -> Result<Option<Project>> {
    let conn = conn.lock().await?;

    let existing = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), user_id.to_string()],
            map_project,
        )
        .optional()?;

    let Some(mut project) = existing else {
        return Ok(None);
    };

    if let Some(name) = &request.name {
        project.name = name.clone();
    }
    if let Some(description) = &request.description {
        project.description = Some(description.clone());
    }
    if let Some(color) = &request.color {
        project.color = color.clone();
    }
    if let Some(deadline) = request.deadline {
        project.deadline = Some(deadline);
    }

    let now = now_millis();
    project.updated_at = to_datetime(now);

    conn.execute(
        "UPDATE projects
         SET name = ?1, description = ?2, color = ?3, deadline = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            &project.name,
            &project.description,
            &project.color,
            project.deadline.map(|d| d.timestamp_millis()),
            now,
            id.to_string()
        ],
    )?;

    Ok(Some(project))
}

/// Delete a project and detach its tasks. Returns `false` when nothing was
/// deleted.
pub async fn delete_project(conn: AsyncDbConnection, user_id: Uuid, id: Uuid) -> Result<bool> {
    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;

    let owned: i64 = tx.query_row(
        "SELECT COUNT(*) FROM projects WHERE id = ?1 AND user_id = ?2",
        params![id.to_string(), user_id.to_string()],
        |row| row.get(0),
    )?;

    if owned == 0 {
        return Ok(false);
    }

    tx.execute(
        "UPDATE tasks SET project_id = NULL WHERE project_id = ?1",
        [id.to_string()],
    )?;
    tx.execute("DELETE FROM projects WHERE id = ?1", [id.to_string()])?;
    tx.commit()?;

    Ok(true)
}

pub async fn project_progress(conn: AsyncDbConnection, id: Uuid) -> Result<ProjectProgress> {
    let conn = conn.lock().await?;

    let (total, completed): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks WHERE project_id = ?1",
        [id.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(ProjectProgress::from_counts(total, completed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{tasks, users, Database};
    use shared_types::CreateTaskRequest;

    async fn setup() -> (Database, Uuid) {
        let db = Database::new_in_memory().unwrap();
        let user = users::insert_user(db.async_connection.clone(), "ada@example.com", "hash")
            .await
            .unwrap();
        (db, user.id)
    }

    fn create(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_uses_default_color() {
        let (db, user) = setup().await;
        let project = insert_project(db.async_connection.clone(), user, &create("Garden"))
            .await
            .unwrap();
        assert_eq!(project.color, "#3b82f6");

        let listed = list_projects(db.async_connection.clone(), user).await.unwrap();
        assert_eq!(listed, vec![project]);
    }

    #[tokio::test]
    async fn test_progress_counts_project_tasks() {
        let (db, user) = setup().await;
        let conn = db.async_connection.clone();
        let project = insert_project(conn.clone(), user, &create("Garden")).await.unwrap();

        for (title, completed) in [("dig", true), ("plant", false), ("water", false)] {
            let request = CreateTaskRequest {
                title: title.to_string(),
                completed,
                project_id: Some(project.id),
                ..Default::default()
            };
            tasks::insert_task(conn.clone(), user, &request).await.unwrap();
        }

        let progress = project_progress(conn, project.id).await.unwrap();
        assert_eq!(progress.total_tasks, 3);
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(progress.pending_tasks, 2);
        assert_eq!(progress.progress, 33.33);
    }

    #[tokio::test]
    async fn test_delete_detaches_tasks() {
        let (db, user) = setup().await;
        let conn = db.async_connection.clone();
        let project = insert_project(conn.clone(), user, &create("Garden")).await.unwrap();

        let request = CreateTaskRequest {
            title: "dig".to_string(),
            project_id: Some(project.id),
            ..Default::default()
        };
        let task = tasks::insert_task(conn.clone(), user, &request).await.unwrap();

        assert!(delete_project(conn.clone(), user, project.id).await.unwrap());
        assert!(!delete_project(conn.clone(), user, project.id).await.unwrap());

        let task = tasks::get_task(conn, user, task.id).await.unwrap().unwrap();
        assert_eq!(task.project_id, None);
    }

    #[tokio::test]
    async fn test_delete_keeps_task_timestamps() {
        let (db, user) = setup().await;
        let conn = db.async_connection.clone();
        let project = insert_project(conn.clone(), user, &create("Garden")).await.unwrap();

        let request = CreateTaskRequest {
            title: "dig".to_string(),
            completed: true,
            project_id: Some(project.id),
            ..Default::default()
        };
        let task = tasks::insert_task(conn.clone(), user, &request).await.unwrap();

        let finished = now_millis() - 90 * 24 * 60 * 60 * 1000;
        conn.lock()
            .await
            .unwrap()
            .execute(
                "UPDATE tasks SET updated_at = ?1 WHERE id = ?2",
                params![finished, task.id],
            )
            .unwrap();

        assert!(delete_project(conn.clone(), user, project.id).await.unwrap());

        let task = tasks::get_task(conn, user, task.id).await.unwrap().unwrap();
        assert_eq!(task.project_id, None);
        assert_eq!(task.updated_at.timestamp_millis(), finished);
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let (db, user) = setup().await;
        let conn = db.async_connection.clone();
        let mut request = create("Garden");
        request.description = Some("Backyard".to_string());
        let project = insert_project(conn.clone(), user, &request).await.unwrap();

        let update = UpdateProjectRequest {
            color: Some("#10b981".to_string()),
            ..Default::default()
        };
        let updated = update_project(conn, user, project.id, &update)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Garden");
        assert_eq!(updated.description.as_deref(), Some("Backyard"));
        assert_eq!(updated.color, "#10b981");
    }
}
