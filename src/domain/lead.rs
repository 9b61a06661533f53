// src/domain/lead.rs

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type LeadId = Uuid;

/// Declares a closed set of labels stored and exchanged as their display text.
/// Extra `| "alias"` patterns are accepted when parsing but never emitted.
macro_rules! lead_enum {
    ($name:ident, $what:expr, { $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Human readable list of accepted labels, for error messages.
            pub fn expected() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label $(| $alias)* => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not a valid {}; expected one of: {}",
                        other,
                        $what,
                        Self::expected()
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

lead_enum!(City, "city", {
    Chandigarh => "Chandigarh",
    Mohali => "Mohali",
    Zirakpur => "Zirakpur",
    Panchkula => "Panchkula",
    Other => "Other",
});

lead_enum!(PropertyType, "property type", {
    Apartment => "Apartment",
    Villa => "Villa",
    Plot => "Plot",
    Office => "Office",
    Retail => "Retail",
});

lead_enum!(Bhk, "BHK", {
    One => "1",
    Two => "2",
    Three => "3",
    Four => "4",
    Studio => "Studio",
});

lead_enum!(Purpose, "purpose", {
    Buy => "Buy",
    Rent => "Rent",
});

lead_enum!(Timeline, "timeline", {
    UpToThreeMonths => "0–3m" | "0-3m",
    ThreeToSixMonths => "3–6m" | "3-6m",
    OverSixMonths => ">6m",
    Exploring => "Exploring",
});

lead_enum!(Source, "source", {
    Website => "Website",
    Referral => "Referral",
    WalkIn => "Walk-in",
    Call => "Call",
    Other => "Other",
});

lead_enum!(Status, "status", {
    New => "New",
    Qualified => "Qualified",
    Contacted => "Contacted",
    Visited => "Visited",
    Negotiation => "Negotiation",
    Converted => "Converted",
    Dropped => "Dropped",
});

impl PropertyType {
    /// Residential types are the only ones that carry a BHK.
    pub fn requires_bhk(self) -> bool {
        matches!(self, PropertyType::Apartment | PropertyType::Villa)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::New
    }
}

/// The editable part of a lead, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFields {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: Source,
    pub status: Status,
    pub notes: Option<String>,
    pub tags: BTreeSet<String>,
}

/// A lead as stored: the editable fields plus identity, ownership and stamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: LeadId,
    #[serde(flatten)]
    pub fields: LeadFields,
    pub owner_id: i64,
    /// Concurrency stamp, millisecond precision.
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A candidate lead as submitted by a caller.
///
/// Every field is optional: a create must supply the required ones, an update
/// only carries what it wants to change. For nullable fields the outer
/// `Option` says whether the field was sent at all and the inner one whether
/// it was cleared, so `{"bhk": null}` and `{}` mean different things.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub bhk: Option<Option<String>>,
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub budget_min: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub budget_max: Option<Option<i64>>,
    pub timeline: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Marks a field as sent, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional text inputs treat blank as "no value".
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits a comma separated tag list as typed into a form or CSV cell.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(non_blank)
        .collect()
}

pub fn join_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().cloned().collect::<Vec<_>>().join(", ")
}
