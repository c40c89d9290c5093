use crate::database::{now_millis, parse_uuid, to_datetime, AsyncDbConnection};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

/// Stored user row, including the password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let id: String = row.get(0)?;
    Ok(UserRecord {
        id: parse_uuid(0, &id)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: to_datetime(row.get(3)?),
        updated_at: to_datetime(row.get(4)?),
    })
}

pub async fn insert_user(
    conn: AsyncDbConnection,
    email: &str,
    password_hash: &str,
) -> Result<UserRecord> {
    let conn = conn.lock().await?;
    let now = now_millis();
    let id = Uuid::new_v4();

    conn.execute(
        "INSERT INTO users (id, email, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id.to_string(), email, password_hash, now, now],
    )?;

    Ok(UserRecord {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: to_datetime(now),
        updated_at: to_datetime(now),
    })
}

pub async fn find_user_by_email(conn: AsyncDbConnection, email: &str) -> Result<Option<UserRecord>> {
    let conn = conn.lock().await?;

    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            [email],
            map_user,
        )
        .optional()?;

    Ok(user)
}

pub async fn get_user(conn: AsyncDbConnection, id: Uuid) -> Result<Option<UserRecord>> {
    let conn = conn.lock().await?;

    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id.to_string()],
            map_user,
        )
        .optional()?;

    Ok(user)
}

pub async fn update_password(conn: AsyncDbConnection, id: Uuid, password_hash: &str) -> Result<()> {
    let conn = conn.lock().await?;

    conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        params![password_hash, now_millis(), id.to_string()],
    )?;

    Ok(())
}
