// src/db/auth.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

/// Stores a sign-in link by the SHA-256 digest of its token.
pub fn insert_magic_link(
    conn: &Connection,
    user_id: i64,
    token_hash: &[u8],
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into magic_links (user_id, token_hash, created_at, expires_at) values (?, ?, ?, ?)",
        params![user_id, token_hash, created_at, expires_at],
    )?;
    Ok(())
}

/// Marks a live link as used and returns its user.
///
/// A single conditional update does the check and the claim, so two
/// concurrent redemptions of the same token cannot both succeed.
pub fn consume_magic_link(
    conn: &Connection,
    token_hash: &[u8],
    now: i64,
) -> Result<Option<i64>, ServerError> {
    let user_id = conn
        .query_row(
            "update magic_links set used_at = ?1
             where token_hash = ?2 and used_at is null and expires_at > ?1
             returning user_id",
            params![now, token_hash],
            |r| r.get(0),
        )
        .optional()?;
    Ok(user_id)
}

/// Drops links that expired before `before`, used or not.
pub fn prune_magic_links(conn: &Connection, before: i64) -> Result<usize, ServerError> {
    Ok(conn.execute("delete from magic_links where expires_at < ?", params![before])?)
}
