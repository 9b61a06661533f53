use crate::auth::Role;
use crate::domain::lead::Status;
use crate::errors::ServerError;
use crate::leads;
use crate::router::{handle, respond};
use crate::tests::utils::{body_string, get, post_form, sign_in, test_state};

const LEAD_FORM: [(&str, &str); 11] = [
    ("fullName", "Rajesh Kumar"),
    ("email", "rajesh@example.com"),
    ("phone", "9876543210"),
    ("city", "Chandigarh"),
    ("propertyType", "Apartment"),
    ("bhk", "3"),
    ("purpose", "Buy"),
    ("budgetMin", "5000000"),
    ("budgetMax", "7500000"),
    ("timeline", "0–3m"),
    ("source", "Website"),
];

fn created_id(location: &str) -> uuid::Uuid {
    location.trim_start_matches("/buyers/").parse().unwrap()
}

#[test]
fn pages_redirect_to_login_without_a_session() {
    let state = test_state();
    let resp = respond(get("/buyers", None), &state);
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login");
}

#[test]
fn create_form_redirects_to_the_new_lead() {
    let state = test_state();
    let (owner, cookie) = sign_in(&state, "agent@example.com", Role::User);

    let resp = handle(post_form("/buyers", Some(&cookie), &LEAD_FORM), &state).unwrap();
    assert_eq!(resp.status(), 303);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap().to_string();
    let id = created_id(&location);

    let lead = leads::get_lead(&state.db, id).unwrap();
    assert_eq!(lead.owner_id, owner);
    assert_eq!(lead.fields.full_name, "Rajesh Kumar");

    let page = handle(get(&location, Some(&cookie)), &state).unwrap();
    let body = body_string(page);
    assert!(body.contains("Rajesh Kumar"));
    assert!(body.contains("Lead created"));
    assert!(body.contains(&lead.updated_at.timestamp_millis().to_string()));
}

#[test]
fn invalid_form_is_shown_again_with_errors() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);

    let mut form = LEAD_FORM.to_vec();
    form.retain(|(k, _)| *k != "bhk");
    form.push(("bhk", ""));

    let resp = handle(post_form("/buyers", Some(&cookie), &form), &state).unwrap();
    assert_eq!(resp.status(), 422);
    let body = body_string(resp);
    assert!(body.contains("BHK is required"));
    // Submitted values survive the round trip.
    assert!(body.contains("rajesh@example.com"));
}

#[test]
fn edit_with_stale_stamp_shows_conflict() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);

    let resp = handle(post_form("/buyers", Some(&cookie), &LEAD_FORM), &state).unwrap();
    let location = resp.headers().get("Location").unwrap().to_str().unwrap().to_string();
    let id = created_id(&location);
    let lead = leads::get_lead(&state.db, id).unwrap();
    let stamp = lead.updated_at.timestamp_millis().to_string();

    let mut edit: Vec<(&str, &str)> = LEAD_FORM.to_vec();
    edit.push(("status", "Contacted"));
    edit.push(("updatedAt", stamp.as_str()));
    let first = handle(post_form(&location, Some(&cookie), &edit), &state).unwrap();
    assert_eq!(first.status(), 303);

    // Same form again: its stamp is now stale.
    let mut second_edit: Vec<(&str, &str)> = LEAD_FORM.to_vec();
    second_edit.push(("status", "Dropped"));
    second_edit.push(("updatedAt", stamp.as_str()));
    let second = handle(post_form(&location, Some(&cookie), &second_edit), &state).unwrap();
    assert_eq!(second.status(), 409);
    assert!(body_string(second).contains("Record changed, please refresh"));

    assert_eq!(leads::get_lead(&state.db, id).unwrap().fields.status, Status::Contacted);
}

#[test]
fn only_owner_or_admin_may_edit() {
    let state = test_state();
    let (_, owner_cookie) = sign_in(&state, "owner@example.com", Role::User);
    let (_, other_cookie) = sign_in(&state, "other@example.com", Role::User);
    let (_, admin_cookie) = sign_in(&state, "boss@example.com", Role::Admin);

    let resp = handle(post_form("/buyers", Some(&owner_cookie), &LEAD_FORM), &state).unwrap();
    let location = resp.headers().get("Location").unwrap().to_str().unwrap().to_string();
    let id = created_id(&location);

    let stamp = leads::get_lead(&state.db, id).unwrap().updated_at.timestamp_millis().to_string();
    let mut edit: Vec<(&str, &str)> = LEAD_FORM.to_vec();
    edit.push(("status", "Visited"));
    edit.push(("updatedAt", stamp.as_str()));

    let refused = handle(post_form(&location, Some(&other_cookie), &edit), &state);
    assert!(matches!(refused, Err(ServerError::Forbidden)));

    let allowed = handle(post_form(&location, Some(&admin_cookie), &edit), &state).unwrap();
    assert_eq!(allowed.status(), 303);
    assert_eq!(leads::get_lead(&state.db, id).unwrap().fields.status, Status::Visited);
}

#[test]
fn list_page_filters_and_links_exports() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    handle(post_form("/buyers", Some(&cookie), &LEAD_FORM), &state).unwrap();

    let body = body_string(handle(get("/buyers?city=Chandigarh", Some(&cookie)), &state).unwrap());
    assert!(body.contains("Rajesh Kumar"));
    assert!(body.contains("/api/buyers/export?city=Chandigarh"));

    let body = body_string(handle(get("/buyers?city=Mohali", Some(&cookie)), &state).unwrap());
    assert!(!body.contains("Rajesh Kumar"));

    let bad = handle(get("/buyers?city=Delhi", Some(&cookie)), &state);
    assert!(matches!(bad, Err(ServerError::BadRequest(_))));
}

#[test]
fn import_form_renders_the_report() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let csv = "fullName,phone,city,propertyType,bhk,purpose,timeline,source\n\
               Amit Sharma,9988776655,Panchkula,Office,,Rent,>6m,Referral\n\
               X,1,Nowhere,Plot,,Buy,Exploring,Call\n";

    let resp = handle(post_form("/buyers/import", Some(&cookie), &[("csv", csv)]), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Import results"));
    assert!(body.contains("1 rows skipped"));
}

#[test]
fn unknown_lead_is_not_found() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let resp = respond(get(&format!("/buyers/{}", uuid::Uuid::new_v4()), Some(&cookie)), &state);
    assert_eq!(resp.status(), 404);
    let resp = respond(get("/buyers/not-a-uuid", Some(&cookie)), &state);
    assert_eq!(resp.status(), 404);
}
