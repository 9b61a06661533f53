// src/leads/service.rs
use crate::db::connection::Database;
use crate::db::{history, leads as store};
use crate::domain::changes::{self, HistoryEntry, HistoryRecord};
use crate::domain::lead::{LeadFields, LeadId, LeadPatch, LeadRecord};
use crate::domain::query::{LeadFilter, LeadPage, Pagination};
use crate::domain::validation::{validate_new, validate_update};
use crate::errors::ServerError;
use crate::leads::UpdateStage;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

/// Stamps carry millisecond precision, the same as what is stored.
pub fn truncate_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// The stamp for the next write: `now`, bumped past `previous` when the
/// clock has not moved on, so every write yields a strictly newer stamp.
pub fn next_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_millis(now);
    let floor = previous + Duration::milliseconds(1);
    if now >= floor {
        now
    } else {
        floor
    }
}

/// Inserts a validated lead and its `created` history entry.
/// The caller owns the surrounding transaction.
fn insert_with_history(
    conn: &Connection,
    actor: i64,
    fields: LeadFields,
    now: DateTime<Utc>,
) -> Result<LeadRecord, ServerError> {
    let lead = LeadRecord {
        id: Uuid::new_v4(),
        fields,
        owner_id: actor,
        updated_at: now,
        created_at: now,
    };
    store::insert_lead(conn, &lead)?;
    history::append_history(conn, &HistoryEntry::created(lead.id, actor, now))?;
    Ok(lead)
}

pub fn create_lead(
    db: &Database,
    actor: i64,
    candidate: &LeadPatch,
    now: DateTime<Utc>,
) -> Result<LeadRecord, ServerError> {
    let fields = validate_new(candidate).map_err(|errors| {
        tracing::debug!(%errors, "create rejected");
        ServerError::Validation(errors)
    })?;
    let now = truncate_millis(now);

    let lead = db.with_conn(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let lead = insert_with_history(&tx, actor, fields, now)?;
        tx.commit()?;
        Ok(lead)
    })?;

    tracing::info!(lead_id = %lead.id, actor, "lead created");
    Ok(lead)
}

/// Applies `candidate` to lead `id` if it still carries `expected` as its
/// stamp. On success the stored record and its history entry are committed
/// together; on any failure nothing is written.
pub fn update_lead(
    db: &Database,
    actor: i64,
    id: LeadId,
    candidate: &LeadPatch,
    expected: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<LeadRecord, ServerError> {
    let mut stage = UpdateStage::Fetching;

    let result = db.with_conn(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = run_update(&tx, actor, id, candidate, expected, now, &mut stage)?;
        tx.commit()?;
        Ok(updated)
    });

    match &result {
        Ok(lead) => {
            tracing::info!(lead_id = %id, actor, updated_at = %lead.updated_at, "lead updated");
        }
        Err(ServerError::Conflict) => {
            tracing::warn!(lead_id = %id, actor, %stage, "update rejected: stale stamp");
        }
        Err(err) => {
            tracing::warn!(lead_id = %id, actor, %stage, error = %err, "update failed");
        }
    }
    result
}

fn run_update(
    tx: &Connection,
    actor: i64,
    id: LeadId,
    candidate: &LeadPatch,
    expected: DateTime<Utc>,
    now: DateTime<Utc>,
    stage: &mut UpdateStage,
) -> Result<LeadRecord, ServerError> {
    *stage = UpdateStage::Fetching;
    let current = store::find_lead(tx, id)?.ok_or(ServerError::NotFound)?;

    *stage = UpdateStage::Validating;
    let fields = validate_update(&current.fields, candidate)?;

    *stage = UpdateStage::ConflictChecking;
    if current.updated_at != expected {
        return Err(ServerError::Conflict);
    }

    *stage = UpdateStage::Persisting;
    let stamp = next_stamp(current.updated_at, now);
    if !store::update_lead_if_unchanged(tx, id, &fields, expected, stamp)? {
        return Err(ServerError::Conflict);
    }

    *stage = UpdateStage::Diffing;
    let delta = changes::diff(&current.fields, &fields, candidate);

    *stage = UpdateStage::Recording;
    if delta.is_empty() {
        tracing::debug!(lead_id = %id, "no field changed; history untouched");
    } else {
        history::append_history(tx, &HistoryEntry::changes(id, actor, stamp, delta))?;
    }

    *stage = UpdateStage::Done;
    Ok(LeadRecord {
        fields,
        updated_at: stamp,
        ..current
    })
}

pub fn get_lead(db: &Database, id: LeadId) -> Result<LeadRecord, ServerError> {
    db.with_conn(|conn| store::find_lead(conn, id))?
        .ok_or(ServerError::NotFound)
}

pub fn list_leads(
    db: &Database,
    filter: &LeadFilter,
    page: i64,
    per_page: i64,
) -> Result<LeadPage, ServerError> {
    db.with_conn(|conn| {
        let total = store::count_leads(conn, filter)?;
        let pagination = Pagination::new(page, per_page, total);
        let buyers = store::search_leads(
            conn,
            filter,
            Some((pagination.limit, pagination.offset())),
        )?;
        Ok(LeadPage { buyers, pagination })
    })
}

/// Every lead matching `filter`, newest first, unpaged.
pub fn export_leads(db: &Database, filter: &LeadFilter) -> Result<Vec<LeadRecord>, ServerError> {
    db.with_conn(|conn| store::search_leads(conn, filter, None))
}

/// Audit trail of a lead, newest first. `limit` of None returns everything.
pub fn list_history(
    db: &Database,
    id: LeadId,
    limit: Option<i64>,
) -> Result<Vec<HistoryRecord>, ServerError> {
    db.with_conn(|conn| {
        if store::find_lead(conn, id)?.is_none() {
            return Err(ServerError::NotFound);
        }
        history::list_history(conn, id, limit)
    })
}

/// Inserts already validated rows in one transaction, each with its own
/// `created` entry. Either every row lands or none does.
pub fn import_leads(
    db: &Database,
    actor: i64,
    rows: Vec<LeadFields>,
    now: DateTime<Utc>,
) -> Result<Vec<LeadId>, ServerError> {
    let now = truncate_millis(now);
    let ids = db.with_conn(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ids = Vec::with_capacity(rows.len());
        for fields in rows {
            ids.push(insert_with_history(&tx, actor, fields, now)?.id);
        }
        tx.commit()?;
        Ok(ids)
    })?;

    tracing::info!(actor, count = ids.len(), "leads imported");
    Ok(ids)
}
