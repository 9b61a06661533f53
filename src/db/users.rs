// src/db/users.rs
use crate::auth::{CurrentUser, Role};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

/// Insert a user if they don't exist, then return the user id.
/// Email should already be normalized by caller (trim/lowercase).
pub fn get_or_create_user(conn: &Connection, email: &str, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        "insert or ignore into users (email, created_at) values (?, ?)",
        params![email, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;

    conn.query_row(
        "select id from users where email = ?",
        params![email],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))
}

pub fn set_profile(
    conn: &Connection,
    user_id: i64,
    full_name: Option<&str>,
    role: Role,
) -> Result<(), ServerError> {
    conn.execute(
        "update users set full_name = ?, role = ? where id = ?",
        params![full_name, role.as_str(), user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update user profile failed: {e}")))?;
    Ok(())
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;
    Ok(())
}

pub fn find_user(conn: &Connection, user_id: i64) -> Result<Option<CurrentUser>, ServerError> {
    conn.query_row(
        "select id, email, role from users where id = ?",
        params![user_id],
        |row| {
            let role: String = row.get(2)?;
            Ok(CurrentUser {
                id: row.get(0)?,
                email: row.get(1)?,
                role: Role::from_db(&role),
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}
