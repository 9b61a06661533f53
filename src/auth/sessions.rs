// src/auth/sessions.rs
use crate::auth::token::{self, Token};
use crate::auth::{CurrentUser, Role};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

/// Starts a session and returns the raw cookie value.
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    now: i64,
    ttl_secs: i64,
) -> Result<String, ServerError> {
    let token = Token::generate();

    conn.execute(
        r#"
        insert into sessions (user_id, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![user_id, token.digest().as_slice(), now, now + ttl_secs],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(token.as_str().to_string())
}

/// Resolves a cookie value to its user; expired or revoked sessions are None.
pub fn load_session_user(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<CurrentUser>, ServerError> {
    conn.query_row(
        r#"
        select u.id, u.email, u.role
        from sessions s
        join users u on u.id = s.user_id
        where s.token_hash = ?
          and s.expires_at > ?
          and s.revoked_at is null
        "#,
        params![token::digest(raw_token).as_slice(), now],
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
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, token::digest(raw_token).as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}
