// src/db/seed.rs
use crate::auth::Role;
use crate::db::connection::Database;
use crate::db::{history, leads, users};
use crate::domain::changes::HistoryEntry;
use crate::domain::lead::{LeadPatch, LeadRecord};
use crate::domain::validation::validate_new;
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::TransactionBehavior;
use uuid::Uuid;

pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEMO_AGENT_EMAIL: &str = "agent@example.com";

fn demo_leads() -> [LeadPatch; 2] {
    [
        LeadPatch {
            full_name: Some("Rajesh Kumar".into()),
            email: Some(Some("rajesh.kumar@example.com".into())),
            phone: Some("9876543210".into()),
            city: Some("Chandigarh".into()),
            property_type: Some("Apartment".into()),
            bhk: Some(Some("3".into())),
            purpose: Some("Buy".into()),
            budget_min: Some(Some(5_000_000)),
            budget_max: Some(Some(7_500_000)),
            timeline: Some("0–3m".into()),
            source: Some("Website".into()),
            status: Some("New".into()),
            tags: Some(vec!["premium".into(), "urgent".into()]),
            ..LeadPatch::default()
        },
        LeadPatch {
            full_name: Some("Priya Singh".into()),
            email: Some(Some("priya.singh@example.com".into())),
            phone: Some("9876543211".into()),
            city: Some("Mohali".into()),
            property_type: Some("Villa".into()),
            bhk: Some(Some("4".into())),
            purpose: Some("Rent".into()),
            budget_min: Some(Some(35_000)),
            budget_max: Some(Some(50_000)),
            timeline: Some("3–6m".into()),
            source: Some("Referral".into()),
            status: Some("Contacted".into()),
            tags: Some(vec!["family".into(), "gated-community".into()]),
            ..LeadPatch::default()
        },
    ]
}

/// Creates the demo admin and agent and, when no lead exists yet, one lead
/// owned by each. Returns how many leads were inserted.
pub fn seed_demo_data(db: &Database, now: DateTime<Utc>) -> Result<usize, ServerError> {
    let secs = now.timestamp();
    let inserted = db.with_conn(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let admin = users::get_or_create_user(&tx, DEMO_ADMIN_EMAIL, secs)?;
        users::set_profile(&tx, admin, Some("Admin User"), Role::Admin)?;
        let agent = users::get_or_create_user(&tx, DEMO_AGENT_EMAIL, secs)?;
        users::set_profile(&tx, agent, Some("Real Estate Agent"), Role::User)?;

        if leads::count_all(&tx)? > 0 {
            tx.commit()?;
            return Ok(0);
        }

        let mut inserted = 0;
        for (patch, owner) in demo_leads().iter().zip([admin, agent]) {
            let fields = validate_new(patch)?;
            let lead = LeadRecord {
                id: Uuid::new_v4(),
                fields,
                owner_id: owner,
                updated_at: now,
                created_at: now,
            };
            leads::insert_lead(&tx, &lead)?;
            history::append_history(&tx, &HistoryEntry::created(lead.id, owner, now))?;
            inserted += 1;
        }

        tx.commit()?;
        Ok(inserted)
    })?;

    tracing::info!(inserted, "demo data seeded");
    Ok(inserted)
}
