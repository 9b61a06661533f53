use crate::domain::lead::{Bhk, City, PropertyType, Purpose, Source, Status, Timeline};
use crate::domain::validation::ValidationErrors;
use crate::leads::form::LeadFormValues;
use crate::templates::components::{labels, select};
use chrono::{DateTime, Utc};
use maud::{html, Markup};

pub struct LeadFormVm<'a> {
    pub action: String,
    pub values: &'a LeadFormValues,
    pub errors: Option<&'a ValidationErrors>,
    /// Present on edit; sent back so the server can detect a stale form.
    pub updated_at: Option<DateTime<Utc>>,
    pub submit_label: &'a str,
}

fn field(label: &str, name: &str, errors: Option<&ValidationErrors>, input: Markup) -> Markup {
    let message = errors.and_then(|e| e.for_field(name));
    html! {
        div.field.has-error[message.is_some()] {
            label for=(name) { (label) }
            (input)
            @if let Some(m) = message {
                p class="field-error" { (m) }
            }
        }
    }
}

fn text(name: &str, value: &str, kind: &str) -> Markup {
    html! { input type=(kind) id=(name) name=(name) value=(value); }
}

pub fn lead_form(vm: &LeadFormVm<'_>) -> Markup {
    let v = vm.values;
    let e = vm.errors;

    html! {
        form method="post" action=(vm.action) class="lead-form" {
            @if let Some(stamp) = vm.updated_at {
                input type="hidden" name="updatedAt" value=(stamp.timestamp_millis());
            }

            @if let Some(errors) = e {
                @if !errors.is_empty() {
                    div class="form-errors" role="alert" {
                        p { "Please fix the highlighted fields." }
                    }
                }
            }

            (field("Full name", "fullName", e, text("fullName", v.get("fullName"), "text")))
            (field("Email", "email", e, text("email", v.get("email"), "email")))
            (field("Phone", "phone", e, text("phone", v.get("phone"), "tel")))
            (field("City", "city", e, select("city", &labels(City::ALL, City::as_str), v.get("city"), None)))
            (field(
                "Property type",
                "propertyType",
                e,
                select("propertyType", &labels(PropertyType::ALL, PropertyType::as_str), v.get("propertyType"), None),
            ))
            (field(
                "BHK (Apartment and Villa only)",
                "bhk",
                e,
                select("bhk", &labels(Bhk::ALL, Bhk::as_str), v.get("bhk"), Some("—")),
            ))
            (field("Purpose", "purpose", e, select("purpose", &labels(Purpose::ALL, Purpose::as_str), v.get("purpose"), None)))
            (field("Budget min (INR)", "budgetMin", e, text("budgetMin", v.get("budgetMin"), "text")))
            (field("Budget max (INR)", "budgetMax", e, text("budgetMax", v.get("budgetMax"), "text")))
            (field("Timeline", "timeline", e, select("timeline", &labels(Timeline::ALL, Timeline::as_str), v.get("timeline"), None)))
            (field("Source", "source", e, select("source", &labels(Source::ALL, Source::as_str), v.get("source"), None)))
            (field("Status", "status", e, select("status", &labels(Status::ALL, Status::as_str), v.get("status"), None)))
            (field("Notes", "notes", e, html! {
                textarea id="notes" name="notes" rows="4" maxlength="1000" { (v.get("notes")) }
            }))
            (field("Tags (comma separated)", "tags", e, text("tags", v.get("tags"), "text")))

            button type="submit" class="primary" { (vm.submit_label) }
        }
    }
}
