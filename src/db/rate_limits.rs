use crate::errors::ServerError;
use rusqlite::{params, Connection};

/// Counts one hit for `user_id` in the window starting at `window_start`
/// and returns the running total for that window.
pub fn hit(conn: &Connection, user_id: i64, window_start: i64) -> Result<i64, ServerError> {
    Ok(conn.query_row(
        "insert into rate_limits (user_id, window_start, count) values (?1, ?2, 1)
         on conflict(user_id, window_start) do update set count = count + 1
         returning count",
        params![user_id, window_start],
        |r| r.get(0),
    )?)
}

/// Drops counters for windows that started before `before`.
pub fn prune(conn: &Connection, before: i64) -> Result<usize, ServerError> {
    Ok(conn.execute(
        "delete from rate_limits where window_start < ?1",
        params![before],
    )?)
}
