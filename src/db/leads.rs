use crate::domain::lead::{LeadFields, LeadId, LeadRecord};
use crate::domain::query::LeadFilter;
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const SELECT_COLUMNS: &str = r#"
    id, full_name, email, phone, city, property_type, bhk, purpose,
    budget_min, budget_max, timeline, source, status, notes, tags,
    owner_id, updated_at, created_at
"#;

pub(crate) fn millis_to_utc(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {ms}").into(),
        )
    })
}

pub(crate) fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<LeadId> {
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<LeadRecord> {
    let id: String = row.get(0)?;
    let tags_json: String = row.get(14)?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e)))?;

    Ok(LeadRecord {
        id: parse_uuid(0, &id)?,
        fields: LeadFields {
            full_name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            city: row.get(4)?,
            property_type: row.get(5)?,
            bhk: row.get(6)?,
            purpose: row.get(7)?,
            budget_min: row.get(8)?,
            budget_max: row.get(9)?,
            timeline: row.get(10)?,
            source: row.get(11)?,
            status: row.get(12)?,
            notes: row.get(13)?,
            tags,
        },
        owner_id: row.get(15)?,
        updated_at: millis_to_utc(16, row.get(16)?)?,
        created_at: millis_to_utc(17, row.get(17)?)?,
    })
}

fn tags_json(tags: &BTreeSet<String>) -> Result<String, ServerError> {
    serde_json::to_string(tags).map_err(|_| ServerError::InternalError)
}

pub fn insert_lead(conn: &Connection, lead: &LeadRecord) -> Result<(), ServerError> {
    let f = &lead.fields;
    conn.execute(
        r#"
        INSERT INTO buyers (
            id, full_name, email, phone, city, property_type, bhk, purpose,
            budget_min, budget_max, timeline, source, status, notes, tags,
            owner_id, updated_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        "#,
        params![
            lead.id.to_string(),
            f.full_name,
            f.email,
            f.phone,
            f.city,
            f.property_type,
            f.bhk,
            f.purpose,
            f.budget_min,
            f.budget_max,
            f.timeline,
            f.source,
            f.status,
            f.notes,
            tags_json(&f.tags)?,
            lead.owner_id,
            lead.updated_at.timestamp_millis(),
            lead.created_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

pub fn find_lead(conn: &Connection, id: LeadId) -> Result<Option<LeadRecord>, ServerError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM buyers WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id.to_string()], row_to_lead)
        .optional()?)
}

/// Writes `fields` only if the stored stamp still equals `expected`.
///
/// Returns false when no row matched: either the lead is gone or another
/// writer got there first. The caller tells those apart.
pub fn update_lead_if_unchanged(
    conn: &Connection,
    id: LeadId,
    fields: &LeadFields,
    expected: DateTime<Utc>,
    new_stamp: DateTime<Utc>,
) -> Result<bool, ServerError> {
    let updated = conn.execute(
        r#"
        UPDATE buyers SET
            full_name = ?1, email = ?2, phone = ?3, city = ?4, property_type = ?5,
            bhk = ?6, purpose = ?7, budget_min = ?8, budget_max = ?9, timeline = ?10,
            source = ?11, status = ?12, notes = ?13, tags = ?14, updated_at = ?15
        WHERE id = ?16 AND updated_at = ?17
        "#,
        params![
            fields.full_name,
            fields.email,
            fields.phone,
            fields.city,
            fields.property_type,
            fields.bhk,
            fields.purpose,
            fields.budget_min,
            fields.budget_max,
            fields.timeline,
            fields.source,
            fields.status,
            fields.notes,
            tags_json(&fields.tags)?,
            new_stamp.timestamp_millis(),
            id.to_string(),
            expected.timestamp_millis(),
        ],
    )?;
    Ok(updated == 1)
}

/// WHERE clause and its bind values, in matching order.
fn where_clause(filter: &LeadFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        clauses.push(
            "(full_name LIKE ? ESCAPE '\\' OR phone LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        binds.extend(std::iter::repeat(pattern).take(3));
    }
    if let Some(city) = filter.city {
        clauses.push("city = ?".to_string());
        binds.push(city.as_str().to_string());
    }
    if let Some(kind) = filter.property_type {
        clauses.push("property_type = ?".to_string());
        binds.push(kind.as_str().to_string());
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?".to_string());
        binds.push(status.as_str().to_string());
    }
    if let Some(timeline) = filter.timeline {
        clauses.push("timeline = ?".to_string());
        binds.push(timeline.as_str().to_string());
    }

    if clauses.is_empty() {
        (String::new(), binds)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), binds)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Leads matching `filter`, most recently updated first.
/// `page` is `(limit, offset)`; None returns every match (exports).
pub fn search_leads(
    conn: &Connection,
    filter: &LeadFilter,
    page: Option<(i64, i64)>,
) -> Result<Vec<LeadRecord>, ServerError> {
    let (where_sql, mut binds) = where_clause(filter);
    let mut sql = format!(
        "SELECT {SELECT_COLUMNS} FROM buyers {where_sql} ORDER BY updated_at DESC, rowid DESC"
    );
    if let Some((limit, offset)) = page {
        sql.push_str(" LIMIT ? OFFSET ?");
        binds.push(limit.to_string());
        binds.push(offset.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(binds.iter()), row_to_lead)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_leads(conn: &Connection, filter: &LeadFilter) -> Result<i64, ServerError> {
    let (where_sql, binds) = where_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM buyers {where_sql}");
    Ok(conn.query_row(&sql, params_from_iter(binds.iter()), |r| r.get(0))?)
}

pub fn count_all(conn: &Connection) -> Result<i64, ServerError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM buyers", [], |r| r.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_conn;
    use crate::db::users::get_or_create_user;
    use crate::domain::lead::{City, LeadPatch, Status};
    use crate::domain::validation::validate_new;
    use chrono::Duration;
    use uuid::Uuid;

    fn fields(name: &str, phone: &str, city: &str) -> LeadFields {
        validate_new(&LeadPatch {
            full_name: Some(name.into()),
            phone: Some(phone.into()),
            city: Some(city.into()),
            property_type: Some("Plot".into()),
            purpose: Some("Buy".into()),
            timeline: Some("Exploring".into()),
            source: Some("Call".into()),
            tags: Some(vec!["b".into(), "a".into()]),
            ..LeadPatch::default()
        })
        .unwrap()
    }

    fn stamp(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn insert(conn: &Connection, owner: i64, fields: LeadFields, at: i64) -> LeadRecord {
        let lead = LeadRecord {
            id: Uuid::new_v4(),
            fields,
            owner_id: owner,
            updated_at: stamp(at),
            created_at: stamp(at),
        };
        insert_lead(conn, &lead).unwrap();
        lead
    }

    #[test]
    fn insert_then_find_returns_same_record() {
        let conn = test_conn();
        let owner = get_or_create_user(&conn, "o@example.com", 1).unwrap();
        let lead = insert(&conn, owner, fields("Priya Singh", "9876543211", "Mohali"), 1_700_000_000_123);

        let found = find_lead(&conn, lead.id).unwrap().unwrap();
        assert_eq!(found, lead);
        assert!(find_lead(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn conditional_update_requires_matching_stamp() {
        let conn = test_conn();
        let owner = get_or_create_user(&conn, "o@example.com", 1).unwrap();
        let lead = insert(&conn, owner, fields("Priya Singh", "9876543211", "Mohali"), 5_000);

        let mut changed = lead.fields.clone();
        changed.status = Status::Qualified;

        let stale = lead.updated_at - Duration::milliseconds(1);
        assert!(!update_lead_if_unchanged(&conn, lead.id, &changed, stale, stamp(6_000)).unwrap());
        assert_eq!(find_lead(&conn, lead.id).unwrap().unwrap(), lead);

        assert!(update_lead_if_unchanged(&conn, lead.id, &changed, lead.updated_at, stamp(6_000)).unwrap());
        let stored = find_lead(&conn, lead.id).unwrap().unwrap();
        assert_eq!(stored.fields.status, Status::Qualified);
        assert_eq!(stored.updated_at, stamp(6_000));
        assert_eq!(stored.created_at, lead.created_at);
    }

    #[test]
    fn search_filters_and_pages_newest_first() {
        let conn = test_conn();
        let owner = get_or_create_user(&conn, "o@example.com", 1).unwrap();
        for i in 0..12 {
            let city = if i % 2 == 0 { "Mohali" } else { "Zirakpur" };
            insert(&conn, owner, fields(&format!("Lead {i:02}"), &format!("98765432{i:02}"), city), 1_000 + i);
        }

        let all = LeadFilter::default();
        assert_eq!(count_leads(&conn, &all).unwrap(), 12);

        let first = search_leads(&conn, &all, Some((5, 0))).unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].fields.full_name, "Lead 11");

        let last = search_leads(&conn, &all, Some((5, 10))).unwrap();
        assert_eq!(last.len(), 2);

        let mohali = LeadFilter {
            city: Some(City::Mohali),
            ..LeadFilter::default()
        };
        assert_eq!(count_leads(&conn, &mohali).unwrap(), 6);
        assert!(search_leads(&conn, &mohali, None)
            .unwrap()
            .iter()
            .all(|l| l.fields.city == City::Mohali));
    }

    #[test]
    fn search_matches_name_phone_and_email_literally() {
        let conn = test_conn();
        let owner = get_or_create_user(&conn, "o@example.com", 1).unwrap();
        let mut with_email = fields("Rajesh Kumar", "9876543210", "Chandigarh");
        with_email.email = Some("rk_100@example.com".into());
        insert(&conn, owner, with_email, 1);
        insert(&conn, owner, fields("Priya Singh", "9123456789", "Mohali"), 2);

        let by = |s: &str| LeadFilter {
            search: Some(s.into()),
            ..LeadFilter::default()
        };
        assert_eq!(count_leads(&conn, &by("rajesh")).unwrap(), 1);
        assert_eq!(count_leads(&conn, &by("912345")).unwrap(), 1);
        assert_eq!(count_leads(&conn, &by("rk_100")).unwrap(), 1);
        // `_` is literal, not a wildcard.
        assert_eq!(count_leads(&conn, &by("rk_1_0")).unwrap(), 0);
    }
}
