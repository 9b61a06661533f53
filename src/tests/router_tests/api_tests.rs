use crate::auth::Role;
use crate::config::AppConfig;
use crate::errors::ServerError;
use crate::router::{handle, respond};
use crate::tests::utils::{
    body_json, body_string, get, post_csv, send_json, sign_in, test_state, test_state_with,
};
use http::Method;
use serde_json::{json, Value};

fn lead_json(name: &str, city: &str) -> Value {
    json!({
        "fullName": name,
        "phone": "9876543210",
        "city": city,
        "propertyType": "Apartment",
        "bhk": "2",
        "purpose": "Buy",
        "budgetMin": 4000000,
        "budgetMax": 6000000,
        "timeline": "3-6m",
        "source": "Call",
        "tags": ["vip"]
    })
}

fn create(state: &crate::app::AppState, cookie: &str, body: &Value) -> Value {
    let resp = handle(send_json(Method::POST, "/api/buyers", Some(cookie), body), state).unwrap();
    assert_eq!(resp.status(), 201);
    body_json(resp)
}

#[test]
fn api_requires_a_session_and_answers_in_json() {
    let state = test_state();
    let resp = respond(get("/api/buyers", None), &state);
    assert_eq!(resp.status(), 401);
    let body = body_json(resp);
    assert!(body["error"].as_str().unwrap().contains("sign in"));
}

#[test]
fn create_returns_the_stored_lead() {
    let state = test_state();
    let (owner, cookie) = sign_in(&state, "agent@example.com", Role::User);

    let lead = create(&state, &cookie, &lead_json("Priya Singh", "Mohali"));
    assert_eq!(lead["fullName"], "Priya Singh");
    assert_eq!(lead["timeline"], "3–6m");
    assert_eq!(lead["status"], "New");
    assert_eq!(lead["ownerId"], owner);
    assert!(lead["updatedAt"].is_string());

    let id = lead["id"].as_str().unwrap();
    let fetched = body_json(handle(get(&format!("/api/buyers/{id}"), Some(&cookie)), &state).unwrap());
    assert_eq!(fetched, lead);
}

#[test]
fn invalid_create_lists_field_errors() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);

    let mut body = lead_json("Priya Singh", "Mohali");
    body["budgetMin"] = json!(9000000);
    let resp = respond(send_json(Method::POST, "/api/buyers", Some(&cookie), &body), &state);
    assert_eq!(resp.status(), 422);
    let err = body_json(resp);
    let details = err["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "budgetMax"));
}

#[test]
fn list_filters_and_paginates() {
    let state = test_state_with(AppConfig {
        page_size: 2,
        rate_limit_max: 100,
        ..AppConfig::default()
    });
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    for name in ["Aman Gill", "Bela Rao", "Chirag Jain"] {
        create(&state, &cookie, &lead_json(name, "Zirakpur"));
    }
    create(&state, &cookie, &lead_json("Dev Anand", "Panchkula"));

    let page = body_json(handle(get("/api/buyers?city=Zirakpur", Some(&cookie)), &state).unwrap());
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["totalPages"], 2);
    // Newest first.
    assert_eq!(page["buyers"][0]["fullName"], "Chirag Jain");
    assert_eq!(page["buyers"].as_array().unwrap().len(), 2);

    let second = body_json(handle(get("/api/buyers?city=Zirakpur&page=2", Some(&cookie)), &state).unwrap());
    assert_eq!(second["buyers"][0]["fullName"], "Aman Gill");

    let search = body_json(handle(get("/api/buyers?search=dev", Some(&cookie)), &state).unwrap());
    assert_eq!(search["pagination"]["total"], 1);

    let past_end = body_json(
        handle(get("/api/buyers?city=Zirakpur&page=9223372036854775807", Some(&cookie)), &state).unwrap(),
    );
    assert_eq!(past_end["pagination"]["page"], 2);
    assert_eq!(past_end["buyers"][0]["fullName"], "Aman Gill");

    let bad = handle(get("/api/buyers?status=Sold", Some(&cookie)), &state);
    assert!(matches!(bad, Err(ServerError::BadRequest(_))));
}

#[test]
fn update_needs_the_current_stamp() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let lead = create(&state, &cookie, &lead_json("Priya Singh", "Mohali"));
    let id = lead["id"].as_str().unwrap().to_string();
    let uri = format!("/api/buyers/{id}");
    let stamp = lead["updatedAt"].clone();

    let ok = handle(
        send_json(Method::PUT, &uri, Some(&cookie), &json!({ "updatedAt": stamp, "status": "Qualified" })),
        &state,
    )
    .unwrap();
    assert_eq!(ok.status(), 200);
    let updated = body_json(ok);
    assert_eq!(updated["status"], "Qualified");
    assert_ne!(updated["updatedAt"], stamp);

    let stale = respond(
        send_json(Method::PUT, &uri, Some(&cookie), &json!({ "updatedAt": stamp, "status": "Dropped" })),
        &state,
    );
    assert_eq!(stale.status(), 409);
    assert_eq!(body_json(stale)["error"], "Record changed, please refresh");

    let current = body_json(handle(get(&uri, Some(&cookie)), &state).unwrap());
    assert_eq!(current["status"], "Qualified");

    let missing = handle(send_json(Method::PUT, &uri, Some(&cookie), &json!({ "status": "Dropped" })), &state);
    assert!(matches!(missing, Err(ServerError::BadRequest(_))));
}

#[test]
fn history_is_newest_first() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let lead = create(&state, &cookie, &lead_json("Priya Singh", "Mohali"));
    let id = lead["id"].as_str().unwrap().to_string();

    handle(
        send_json(
            Method::PUT,
            &format!("/api/buyers/{id}"),
            Some(&cookie),
            &json!({ "updatedAt": lead["updatedAt"], "budgetMax": 6500000, "notes": "wants corner unit" }),
        ),
        &state,
    )
    .unwrap();

    let history = body_json(handle(get(&format!("/api/buyers/{id}/history"), Some(&cookie)), &state).unwrap());
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["diff"]["budgetMax"]["old"], 6000000);
    assert_eq!(entries[0]["diff"]["budgetMax"]["new"], 6500000);
    assert_eq!(entries[0]["diff"]["notes"]["old"], Value::Null);
    assert_eq!(entries[0]["changedByEmail"], "agent@example.com");
    assert_eq!(entries[1]["diff"], json!({ "created": true }));
}

#[test]
fn admin_may_edit_any_lead() {
    let state = test_state();
    let (_, owner) = sign_in(&state, "owner@example.com", Role::User);
    let (_, other) = sign_in(&state, "other@example.com", Role::User);
    let (_, admin) = sign_in(&state, "boss@example.com", Role::Admin);
    let lead = create(&state, &owner, &lead_json("Priya Singh", "Mohali"));
    let uri = format!("/api/buyers/{}", lead["id"].as_str().unwrap());
    let body = json!({ "updatedAt": lead["updatedAt"], "status": "Visited" });

    let refused = respond(send_json(Method::PUT, &uri, Some(&other), &body), &state);
    assert_eq!(refused.status(), 403);

    let allowed = handle(send_json(Method::PUT, &uri, Some(&admin), &body), &state).unwrap();
    assert_eq!(body_json(allowed)["status"], "Visited");
}

#[test]
fn csv_export_names_the_file_and_follows_the_filter() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    create(&state, &cookie, &lead_json("Priya Singh", "Mohali"));
    create(&state, &cookie, &lead_json("Dev Anand", "Panchkula"));

    let resp = handle(get("/api/buyers/export?city=Mohali", Some(&cookie)), &state).unwrap();
    let disposition = resp.headers().get("Content-Disposition").unwrap().to_str().unwrap().to_string();
    assert!(disposition.contains("buyers-"));
    assert!(disposition.contains(".csv"));

    let body = body_string(resp);
    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("fullName,email,phone,city"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("Priya Singh"));
}

#[test]
fn xlsx_export_is_a_workbook() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    create(&state, &cookie, &lead_json("Priya Singh", "Mohali"));

    let resp = handle(get("/api/buyers/export.xlsx", Some(&cookie)), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut resp.into_body().reader(), &mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn import_reports_inserted_rows_and_row_errors() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let csv = "fullName,email,phone,city,propertyType,bhk,purpose,budgetMin,budgetMax,timeline,source,notes,tags,status\n\
               Amit Sharma,,9988776655,Panchkula,Villa,4,Buy,\"9,000,000\",,>6m,Referral,,\"vip, nri\",\n\
               Neha Verma,neha@example.com,9988776600,Mohali,Plot,2,Buy,,,Exploring,Website,,,\n";

    let report = body_json(handle(post_csv("/api/buyers/import", Some(&cookie), csv), &state).unwrap());
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["errors"][0]["row"], 3);
    assert!(report["errors"][0]["errors"][0].as_str().unwrap().starts_with("bhk"));

    let page = body_json(handle(get("/api/buyers", Some(&cookie)), &state).unwrap());
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["buyers"][0]["fullName"], "Amit Sharma");
}

#[test]
fn import_without_required_columns_is_rejected() {
    let state = test_state();
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let resp = respond(post_csv("/api/buyers/import", Some(&cookie), "fullName,phone\nA B,123\n"), &state);
    assert_eq!(resp.status(), 400);
    assert!(body_json(resp)["error"].as_str().unwrap().contains("city"));
}

#[test]
fn writes_beyond_the_limit_are_throttled() {
    let state = test_state_with(AppConfig {
        rate_limit_max: 2,
        ..AppConfig::default()
    });
    let (_, cookie) = sign_in(&state, "agent@example.com", Role::User);
    let body = lead_json("Priya Singh", "Mohali");

    create(&state, &cookie, &body);
    create(&state, &cookie, &body);
    let third = respond(send_json(Method::POST, "/api/buyers", Some(&cookie), &body), &state);
    assert_eq!(third.status(), 429);

    // Reads are not counted.
    let list = handle(get("/api/buyers", Some(&cookie)), &state).unwrap();
    assert_eq!(list.status(), 200);
}
