// src/domain/changes.rs

use crate::domain::lead::{LeadFields, LeadId, LeadPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Before/after values of one changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Field-level description of one update, keyed by the field's API name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta(BTreeMap<String, FieldChange>);

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.0.iter()
    }

    /// The `new` side of every entry, shaped like an update payload.
    pub fn as_patch(&self) -> Result<LeadPatch, serde_json::Error> {
        let body: Map<String, Value> = self
            .0
            .iter()
            .map(|(field, change)| (field.clone(), change.new.clone()))
            .collect();
        serde_json::from_value(Value::Object(body))
    }
}

/// Computes the delta between the stored and the validated fields.
///
/// Only fields carried by `patch` are compared; identity, owner and stamps
/// live outside `LeadFields` and so can never appear here.
pub fn diff(before: &LeadFields, after: &LeadFields, patch: &LeadPatch) -> Delta {
    let mut changes = BTreeMap::new();

    macro_rules! compare {
        ($field:ident, $name:expr) => {
            if patch.$field.is_some() && before.$field != after.$field {
                changes.insert(
                    $name.to_string(),
                    FieldChange {
                        old: to_json(&before.$field),
                        new: to_json(&after.$field),
                    },
                );
            }
        };
    }

    compare!(full_name, "fullName");
    compare!(email, "email");
    compare!(phone, "phone");
    compare!(city, "city");
    compare!(property_type, "propertyType");
    compare!(bhk, "bhk");
    compare!(purpose, "purpose");
    compare!(budget_min, "budgetMin");
    compare!(budget_max, "budgetMax");
    compare!(timeline, "timeline");
    compare!(source, "source");
    compare!(status, "status");
    compare!(notes, "notes");
    compare!(tags, "tags");

    Delta(changes)
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// What a history entry records: the sentinel for a fresh lead or a delta.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryDiff {
    Created,
    Changes(Delta),
}

impl HistoryDiff {
    pub fn to_json(&self) -> Value {
        match self {
            HistoryDiff::Created => json!({ "created": true }),
            HistoryDiff::Changes(delta) => to_json(delta),
        }
    }

    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        if value == json!({ "created": true }) {
            return Ok(HistoryDiff::Created);
        }
        serde_json::from_value(value).map(HistoryDiff::Changes)
    }
}

impl Serialize for HistoryDiff {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Immutable audit entry attached to one lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub buyer_id: LeadId,
    pub changed_by: i64,
    pub changed_at: DateTime<Utc>,
    pub diff: HistoryDiff,
}

impl HistoryEntry {
    pub fn created(buyer_id: LeadId, changed_by: i64, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            buyer_id,
            changed_by,
            changed_at: at,
            diff: HistoryDiff::Created,
        }
    }

    pub fn changes(buyer_id: LeadId, changed_by: i64, at: DateTime<Utc>, delta: Delta) -> Self {
        Self {
            id: Uuid::new_v4(),
            buyer_id,
            changed_by,
            changed_at: at,
            diff: HistoryDiff::Changes(delta),
        }
    }
}

/// A history entry joined with the acting user's email, for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub changed_by_email: String,
}
