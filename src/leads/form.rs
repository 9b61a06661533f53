// src/leads/form.rs
use crate::domain::lead::{join_tags, non_blank, split_tags, LeadFields, LeadPatch};
use crate::domain::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Raw values of the lead form, kept as typed so a rejected submission can be
/// shown again unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFormValues(HashMap<String, String>);

impl LeadFormValues {
    pub fn from_pairs(pairs: HashMap<String, String>) -> Self {
        Self(pairs)
    }

    /// Prefills the form from a stored lead.
    pub fn from_fields(f: &LeadFields) -> Self {
        let mut v = HashMap::new();
        let mut put = |k: &str, val: String| {
            v.insert(k.to_string(), val);
        };
        put("fullName", f.full_name.clone());
        put("email", f.email.clone().unwrap_or_default());
        put("phone", f.phone.clone());
        put("city", f.city.to_string());
        put("propertyType", f.property_type.to_string());
        put("bhk", f.bhk.map(|b| b.to_string()).unwrap_or_default());
        put("purpose", f.purpose.to_string());
        put("budgetMin", f.budget_min.map(|n| n.to_string()).unwrap_or_default());
        put("budgetMax", f.budget_max.map(|n| n.to_string()).unwrap_or_default());
        put("timeline", f.timeline.to_string());
        put("source", f.source.to_string());
        put("status", f.status.to_string());
        put("notes", f.notes.clone().unwrap_or_default());
        put("tags", join_tags(&f.tags));
        Self(v)
    }

    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// The stamp echoed back by the edit form, in unix milliseconds.
    pub fn expected_stamp(&self) -> Option<DateTime<Utc>> {
        self.get("updatedAt")
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Every form field is submitted, so every field is present in the
    /// patch; blank optional inputs clear the value.
    pub fn to_patch(&self) -> Result<LeadPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut amount = |field: &'static str| -> Option<i64> {
            let raw = self.get(field).trim();
            if raw.is_empty() {
                return None;
            }
            match raw.replace(',', "").parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.push(field, "Must be a whole number");
                    None
                }
            }
        };
        let budget_min = amount("budgetMin");
        let budget_max = amount("budgetMax");
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(LeadPatch {
            full_name: Some(self.get("fullName").to_string()),
            email: Some(non_blank(self.get("email"))),
            phone: Some(self.get("phone").to_string()),
            city: Some(self.get("city").to_string()),
            property_type: Some(self.get("propertyType").to_string()),
            bhk: Some(non_blank(self.get("bhk"))),
            purpose: Some(self.get("purpose").to_string()),
            budget_min: Some(budget_min),
            budget_max: Some(budget_max),
            timeline: Some(self.get("timeline").to_string()),
            source: Some(self.get("source").to_string()),
            status: non_blank(self.get("status")),
            notes: Some(non_blank(self.get("notes"))),
            tags: Some(split_tags(self.get("tags"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::validate_new;

    fn filled() -> LeadFormValues {
        let mut v = LeadFormValues::default();
        for (k, val) in [
            ("fullName", "Rajesh Kumar"),
            ("phone", "9876543210"),
            ("city", "Chandigarh"),
            ("propertyType", "Plot"),
            ("bhk", ""),
            ("purpose", "Buy"),
            ("budgetMin", "50,00,000"),
            ("timeline", "Exploring"),
            ("source", "Call"),
            ("tags", "vip, corner"),
        ] {
            v.set(k, val);
        }
        v
    }

    #[test]
    fn filled_form_validates() {
        let fields = validate_new(&filled().to_patch().unwrap()).unwrap();
        assert_eq!(fields.budget_min, Some(5_000_000));
        assert_eq!(fields.bhk, None);
        assert_eq!(fields.tags.len(), 2);
    }

    #[test]
    fn stored_lead_prefills_the_same_values() {
        let fields = validate_new(&filled().to_patch().unwrap()).unwrap();
        let again = LeadFormValues::from_fields(&fields).to_patch().unwrap();
        assert_eq!(validate_new(&again).unwrap(), fields);
    }

    #[test]
    fn non_numeric_budget_is_a_field_error() {
        let mut v = filled();
        v.set("budgetMax", "a lot");
        let errors = v.to_patch().unwrap_err();
        assert!(errors.for_field("budgetMax").is_some());
    }

    #[test]
    fn expected_stamp_parses_millis() {
        let mut v = filled();
        assert_eq!(v.expected_stamp(), None);
        v.set("updatedAt", "1700000000123");
        assert_eq!(v.expected_stamp().unwrap().timestamp_millis(), 1_700_000_000_123);
    }
}
