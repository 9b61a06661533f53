// src/domain/validation.rs

use crate::domain::lead::{
    non_blank, Bhk, City, LeadFields, LeadPatch, PropertyType, Purpose, Source, Status, Timeline,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 80;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const NOTES_MAX: usize = 1000;

pub const BHK_REQUIRED: &str = "BHK is required for Apartment and Villa property types";
pub const BHK_NOT_ALLOWED: &str = "BHK only applies to Apartment and Villa property types";
pub const BUDGET_ORDER: &str = "Budget max must be greater than or equal to budget min";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every rule a candidate broke. Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message reported for `field`, used to annotate form inputs.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.message.contains(needle))
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validates a complete candidate for a new lead.
pub fn validate_new(patch: &LeadPatch) -> Result<LeadFields, ValidationErrors> {
    resolve(None, patch)
}

/// Validates `patch` merged over the stored `current` fields.
///
/// Fields absent from the patch keep their stored value; the merged record is
/// then checked as a whole so cross-field rules see the final state.
pub fn validate_update(current: &LeadFields, patch: &LeadPatch) -> Result<LeadFields, ValidationErrors> {
    resolve(Some(current), patch)
}

fn resolve(base: Option<&LeadFields>, patch: &LeadPatch) -> Result<LeadFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = match (&patch.full_name, base) {
        (Some(raw), _) => check_full_name(raw, &mut errors),
        (None, Some(b)) => Some(b.full_name.clone()),
        (None, None) => required("fullName", &mut errors),
    };

    let phone = match (&patch.phone, base) {
        (Some(raw), _) => check_phone(raw, &mut errors),
        (None, Some(b)) => Some(b.phone.clone()),
        (None, None) => required("phone", &mut errors),
    };

    let email = match (&patch.email, base) {
        (Some(raw), _) => check_email(raw.as_deref(), &mut errors),
        (None, Some(b)) => b.email.clone(),
        (None, None) => None,
    };

    let city = required_label::<City>("city", &patch.city, base.map(|b| b.city), &mut errors);
    let property_type = required_label::<PropertyType>(
        "propertyType",
        &patch.property_type,
        base.map(|b| b.property_type),
        &mut errors,
    );
    let purpose =
        required_label::<Purpose>("purpose", &patch.purpose, base.map(|b| b.purpose), &mut errors);
    let timeline = required_label::<Timeline>(
        "timeline",
        &patch.timeline,
        base.map(|b| b.timeline),
        &mut errors,
    );
    let source =
        required_label::<Source>("source", &patch.source, base.map(|b| b.source), &mut errors);

    let status = match &patch.status {
        Some(raw) => parse_label::<Status>("status", raw, &mut errors),
        None => Some(base.map(|b| b.status).unwrap_or_default()),
    };

    let bhk = match (&patch.bhk, base) {
        (Some(Some(raw)), _) => match non_blank(raw) {
            Some(text) => parse_label::<Bhk>("bhk", &text, &mut errors).map(Some),
            None => Some(None),
        },
        (Some(None), _) => Some(None),
        (None, Some(b)) => Some(b.bhk),
        (None, None) => Some(None),
    };

    let budget_min = match (&patch.budget_min, base) {
        (Some(value), _) => check_budget("budgetMin", *value, &mut errors),
        (None, Some(b)) => b.budget_min,
        (None, None) => None,
    };

    let budget_max = match (&patch.budget_max, base) {
        (Some(value), _) => check_budget("budgetMax", *value, &mut errors),
        (None, Some(b)) => b.budget_max,
        (None, None) => None,
    };

    let notes = match (&patch.notes, base) {
        (Some(raw), _) => check_notes(raw.as_deref(), &mut errors),
        (None, Some(b)) => b.notes.clone(),
        (None, None) => None,
    };

    let tags = match (&patch.tags, base) {
        (Some(raw), _) => normalize_tags(raw),
        (None, Some(b)) => b.tags.clone(),
        (None, None) => BTreeSet::new(),
    };

    // Cross-field rules only run once both sides parsed cleanly.
    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if max < min {
            errors.push("budgetMax", BUDGET_ORDER);
        }
    }

    if let (Some(kind), Some(bhk)) = (property_type, bhk) {
        match (kind.requires_bhk(), bhk) {
            (true, None) => errors.push("bhk", BHK_REQUIRED),
            (false, Some(_)) => errors.push("bhk", BHK_NOT_ALLOWED),
            _ => {}
        }
    }

    match (
        full_name,
        phone,
        city,
        property_type,
        bhk,
        purpose,
        timeline,
        source,
        status,
    ) {
        (
            Some(full_name),
            Some(phone),
            Some(city),
            Some(property_type),
            Some(bhk),
            Some(purpose),
            Some(timeline),
            Some(source),
            Some(status),
        ) => errors.into_result(LeadFields {
            full_name,
            email,
            phone,
            city,
            property_type,
            bhk,
            purpose,
            budget_min,
            budget_max,
            timeline,
            source,
            status,
            notes,
            tags,
        }),
        _ => Err(errors),
    }
}

fn required<T>(field: &'static str, errors: &mut ValidationErrors) -> Option<T> {
    errors.push(field, "is required");
    None
}

fn parse_label<T>(field: &'static str, raw: &str, errors: &mut ValidationErrors) -> Option<T>
where
    T: FromStr<Err = String>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(msg) => {
            errors.push(field, msg);
            None
        }
    }
}

fn required_label<T>(
    field: &'static str,
    raw: &Option<String>,
    stored: Option<T>,
    errors: &mut ValidationErrors,
) -> Option<T>
where
    T: FromStr<Err = String>,
{
    match (raw.as_deref().and_then(non_blank), stored) {
        (Some(text), _) => parse_label(field, &text, errors),
        (None, Some(value)) if raw.is_none() => Some(value),
        (None, _) => required(field, errors),
    }
}

fn check_full_name(raw: &str, errors: &mut ValidationErrors) -> Option<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < FULL_NAME_MIN || len > FULL_NAME_MAX {
        errors.push(
            "fullName",
            format!("must be between {FULL_NAME_MIN} and {FULL_NAME_MAX} characters"),
        );
        return None;
    }
    Some(name.to_string())
}

fn check_phone(raw: &str, errors: &mut ValidationErrors) -> Option<String> {
    let phone = raw.trim();
    let digits_only = phone.chars().all(|c| c.is_ascii_digit());
    if !digits_only || phone.len() < PHONE_MIN_DIGITS || phone.len() > PHONE_MAX_DIGITS {
        errors.push(
            "phone",
            format!("Phone must be {PHONE_MIN_DIGITS}-{PHONE_MAX_DIGITS} digits"),
        );
        return None;
    }
    Some(phone.to_string())
}

fn check_email(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let email = raw.and_then(non_blank)?;
    if !is_valid_email(&email) {
        errors.push("email", "must be a valid email address");
        return None;
    }
    Some(email)
}

/// Structural check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn check_budget(field: &'static str, value: Option<i64>, errors: &mut ValidationErrors) -> Option<i64> {
    match value {
        Some(n) if n < 0 => {
            errors.push(field, "must be a non-negative whole number");
            None
        }
        other => other,
    }
}

fn check_notes(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let notes = raw.and_then(non_blank)?;
    if notes.chars().count() > NOTES_MAX {
        errors.push("notes", format!("must be at most {NOTES_MAX} characters"));
        return None;
    }
    Some(notes)
}

fn normalize_tags(raw: &[String]) -> BTreeSet<String> {
    raw.iter().filter_map(|t| non_blank(t)).collect()
}
