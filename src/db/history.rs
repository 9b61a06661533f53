use crate::db::leads::{millis_to_utc, parse_uuid};
use crate::domain::changes::{HistoryDiff, HistoryEntry, HistoryRecord};
use crate::domain::lead::LeadId;
use crate::errors::ServerError;
use rusqlite::types::Type;
use rusqlite::{params, Connection};

/// Appends one audit entry. Entries are never updated or deleted.
pub fn append_history(conn: &Connection, entry: &HistoryEntry) -> Result<(), ServerError> {
    let diff = serde_json::to_string(&entry.diff.to_json())
        .map_err(|_| ServerError::InternalError)?;
    conn.execute(
        "insert into buyer_history (id, buyer_id, changed_by, changed_at, diff)
         values (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.buyer_id.to_string(),
            entry.changed_by,
            entry.changed_at.timestamp_millis(),
            diff,
        ],
    )?;
    Ok(())
}

/// History of one lead, newest first; insertion order breaks timestamp ties.
pub fn list_history(
    conn: &Connection,
    buyer_id: LeadId,
    limit: Option<i64>,
) -> Result<Vec<HistoryRecord>, ServerError> {
    let mut stmt = conn.prepare(
        "select h.id, h.buyer_id, h.changed_by, h.changed_at, h.diff, u.email
         from buyer_history h
         join users u on u.id = h.changed_by
         where h.buyer_id = ?1
         order by h.changed_at desc, h.rowid desc
         limit ?2",
    )?;

    // SQLite treats a negative limit as "no limit".
    let rows = stmt.query_map(params![buyer_id.to_string(), limit.unwrap_or(-1)], |row| {
        let id: String = row.get(0)?;
        let buyer: String = row.get(1)?;
        let raw_diff: String = row.get(4)?;
        let diff = serde_json::from_str(&raw_diff)
            .and_then(HistoryDiff::from_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(HistoryRecord {
            entry: HistoryEntry {
                id: parse_uuid(0, &id)?,
                buyer_id: parse_uuid(1, &buyer)?,
                changed_by: row.get(2)?,
                changed_at: millis_to_utc(3, row.get(3)?)?,
                diff,
            },
            changed_by_email: row.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
pub fn count_history(conn: &Connection, buyer_id: LeadId) -> Result<i64, ServerError> {
    Ok(conn.query_row(
        "select count(*) from buyer_history where buyer_id = ?1",
        params![buyer_id.to_string()],
        |r| r.get(0),
    )?)
}
