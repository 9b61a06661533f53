use crate::app::AppState;
use crate::auth::{self, magic, sessions, CurrentUser};
use crate::domain::lead::{LeadId, LeadPatch, LeadRecord};
use crate::domain::query::{page_param, LeadFilter};
use crate::errors::ServerError;
use crate::leads::{self, form::LeadFormValues};
use crate::responses::{
    api_error_response, html_error_response, html_response, html_response_with_status,
    json_response, json_response_with_status, redirect, redirect_with_cookie, ResultResp,
};
use crate::spreadsheets::{self, ImportReport};
use crate::templates::pages;
use astra::{Request, Response};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::time::Instant;

/// Recent entries shown beside the edit form.
const DETAIL_HISTORY_LIMIT: i64 = 5;

/// Entry point for the server: routes the request, renders errors as JSON
/// under `/api` and as pages elsewhere, and logs the outcome.
pub fn respond(req: Request, state: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let is_api = path.starts_with("/api/");

    let resp = match handle(req, state) {
        Ok(resp) => resp,
        Err(err) => error_response(err, is_api),
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

fn error_response(err: ServerError, is_api: bool) -> Response {
    if err.status() >= 500 {
        tracing::error!(error = %err, "request failed");
    }
    match err {
        ServerError::Unauthorized(_) if !is_api => {
            redirect("/login").unwrap_or_else(|e| html_error_response(&e))
        }
        _ if is_api => api_error_response(&err),
        _ => html_error_response(&err),
    }
}

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", [""]) => redirect("/buyers"),

        // ---------- auth ----------
        ("GET", ["login"]) => html_response(pages::login_page()),
        ("POST", ["auth", "request-link"]) => request_link(&mut req, state),
        ("GET", ["auth", "magic"]) => redeem_link(&req, state),
        ("POST", ["logout"]) => logout(&req, state),

        // ---------- pages ----------
        ("GET", ["buyers"]) => list_page(&req, state),
        ("GET", ["buyers", "new"]) => {
            let user = require_user(&req, state)?;
            html_response(pages::new_buyer_page(&user, &LeadFormValues::default(), None))
        }
        ("POST", ["buyers"]) => create_from_form(&mut req, state),
        ("POST", ["buyers", "import"]) => import_from_form(&mut req, state),
        ("GET", ["buyers", id]) => detail_page(&req, state, parse_id(id)?),
        ("POST", ["buyers", id]) => update_from_form(&mut req, state, parse_id(id)?),

        // ---------- api ----------
        ("GET", ["api", "buyers"]) => api_list(&req, state),
        ("POST", ["api", "buyers"]) => api_create(&mut req, state),
        ("GET", ["api", "buyers", "export"]) => api_export_csv(&req, state),
        ("GET", ["api", "buyers", "export.xlsx"]) => api_export_xlsx(&req, state),
        ("POST", ["api", "buyers", "import"]) => api_import(&mut req, state),
        ("GET", ["api", "buyers", id]) => {
            require_user(&req, state)?;
            json_response(&leads::get_lead(&state.db, parse_id(id)?)?)
        }
        ("PUT", ["api", "buyers", id]) => api_update(&mut req, state, parse_id(id)?),
        ("GET", ["api", "buyers", id, "history"]) => {
            require_user(&req, state)?;
            json_response(&leads::list_history(&state.db, parse_id(id)?, None)?)
        }

        _ => Err(ServerError::NotFound),
    }
}

// ---------- request helpers ----------

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn parse_id(raw: &str) -> Result<LeadId, ServerError> {
    raw.parse().map_err(|_| ServerError::NotFound)
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_body(req: &mut Request) -> Result<Vec<u8>, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(buf)
}

fn parse_form(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let body = read_body(req)?;
    Ok(url::form_urlencoded::parse(&body).into_owned().collect())
}

fn require_user(req: &Request, state: &AppState) -> Result<CurrentUser, ServerError> {
    let Some(token) = auth::session_cookie(req) else {
        return Err(ServerError::Unauthorized("sign in required".into()));
    };
    let secs = now().timestamp();
    state
        .db
        .with_conn(|conn| sessions::load_session_user(conn, &token, secs))?
        .ok_or_else(|| ServerError::Unauthorized("session expired".into()))
}

/// Loads the lead and checks the caller may change it.
fn load_editable(state: &AppState, user: &CurrentUser, id: LeadId) -> Result<LeadRecord, ServerError> {
    let lead = leads::get_lead(&state.db, id)?;
    if !user.can_edit(&lead) {
        tracing::warn!(lead_id = %id, user_id = user.id, "edit refused: not owner");
        return Err(ServerError::Forbidden);
    }
    Ok(lead)
}

// ---------- auth ----------

fn request_link(req: &mut Request, state: &AppState) -> ResultResp {
    let form = parse_form(req)?;
    let email = form.get("email").map(String::as_str).unwrap_or("");
    let issued = magic::request_magic_link(
        &state.db,
        state.magic_link_config(),
        email,
        now().timestamp(),
    )?;
    html_response(pages::check_email_content(&issued.email))
}

fn redeem_link(req: &Request, state: &AppState) -> ResultResp {
    let query = parse_query(req);
    let token = query.get("token").map(String::as_str).unwrap_or("");
    let secs = now().timestamp();

    let user_id = magic::redeem_magic_link(&state.db, state.magic_link_config(), token, secs)?;
    let ttl = state.config.session_ttl_secs;
    let session = state
        .db
        .with_conn(|conn| sessions::create_session(conn, user_id, secs, ttl))?;

    tracing::info!(user_id, "signed in");
    redirect_with_cookie("/buyers", &auth::session_set_cookie(&session, ttl))
}

fn logout(req: &Request, state: &AppState) -> ResultResp {
    if let Some(token) = auth::session_cookie(req) {
        let secs = now().timestamp();
        state
            .db
            .with_conn(|conn| sessions::revoke_session(conn, &token, secs))?;
    }
    redirect_with_cookie("/login", &auth::session_clear_cookie())
}

// ---------- pages ----------

fn list_page(req: &Request, state: &AppState) -> ResultResp {
    let user = require_user(req, state)?;
    let query = parse_query(req);
    let filter = LeadFilter::from_params(&query)?;
    let page = leads::list_leads(&state.db, &filter, page_param(&query), state.config.page_size)?;
    html_response(pages::buyers_list_page(&user, &page, &filter))
}

fn create_from_form(req: &mut Request, state: &AppState) -> ResultResp {
    let user = require_user(req, state)?;
    let values = LeadFormValues::from_pairs(parse_form(req)?);
    state.limiter.check(&state.db, user.id, now())?;

    let created = values
        .to_patch()
        .map_err(ServerError::Validation)
        .and_then(|patch| leads::create_lead(&state.db, user.id, &patch, now()));

    match created {
        Ok(lead) => redirect(&format!("/buyers/{}", lead.id)),
        Err(ServerError::Validation(errors)) => html_response_with_status(
            422,
            pages::new_buyer_page(&user, &values, Some(&errors)),
        ),
        Err(err) => Err(err),
    }
}

fn detail_page(req: &Request, state: &AppState, id: LeadId) -> ResultResp {
    let user = require_user(req, state)?;
    let lead = leads::get_lead(&state.db, id)?;
    let history = leads::list_history(&state.db, id, Some(DETAIL_HISTORY_LIMIT))?;

    html_response(pages::buyer_detail_page(&pages::BuyerDetailVm {
        user: &user,
        lead: &lead,
        values: LeadFormValues::from_fields(&lead.fields),
        errors: None,
        history: &history,
        conflict: false,
    }))
}

fn update_from_form(req: &mut Request, state: &AppState, id: LeadId) -> ResultResp {
    let user = require_user(req, state)?;
    let values = LeadFormValues::from_pairs(parse_form(req)?);
    let lead = load_editable(state, &user, id)?;
    state.limiter.check(&state.db, user.id, now())?;

    let expected = values
        .expected_stamp()
        .ok_or_else(|| ServerError::BadRequest("missing updatedAt".into()))?;

    let updated = values
        .to_patch()
        .map_err(ServerError::Validation)
        .and_then(|patch| leads::update_lead(&state.db, user.id, id, &patch, expected, now()));

    match updated {
        Ok(_) => redirect(&format!("/buyers/{id}")),
        Err(ServerError::Validation(errors)) => {
            let history = leads::list_history(&state.db, id, Some(DETAIL_HISTORY_LIMIT))?;
            html_response_with_status(
                422,
                pages::buyer_detail_page(&pages::BuyerDetailVm {
                    user: &user,
                    lead: &lead,
                    values,
                    errors: Some(&errors),
                    history: &history,
                    conflict: false,
                }),
            )
        }
        Err(ServerError::Conflict) => {
            let fresh = leads::get_lead(&state.db, id)?;
            let history = leads::list_history(&state.db, id, Some(DETAIL_HISTORY_LIMIT))?;
            html_response_with_status(
                409,
                pages::buyer_detail_page(&pages::BuyerDetailVm {
                    user: &user,
                    lead: &fresh,
                    values: LeadFormValues::from_fields(&fresh.fields),
                    errors: None,
                    history: &history,
                    conflict: true,
                }),
            )
        }
        Err(err) => Err(err),
    }
}

fn import_from_form(req: &mut Request, state: &AppState) -> ResultResp {
    let user = require_user(req, state)?;
    let form = parse_form(req)?;
    let csv = form.get("csv").map(String::as_str).unwrap_or("");
    let report = run_import(state, &user, csv.as_bytes())?;
    html_response(pages::import_report_page(&user, &report))
}

// ---------- api ----------

fn api_list(req: &Request, state: &AppState) -> ResultResp {
    require_user(req, state)?;
    let query = parse_query(req);
    let filter = LeadFilter::from_params(&query)?;
    let page = leads::list_leads(&state.db, &filter, page_param(&query), state.config.page_size)?;
    json_response(&page)
}

fn json_body(req: &mut Request) -> Result<Value, ServerError> {
    let body = read_body(req)?;
    serde_json::from_slice(&body).map_err(|e| ServerError::BadRequest(format!("invalid JSON: {e}")))
}

fn patch_from(value: Value) -> Result<LeadPatch, ServerError> {
    serde_json::from_value(value).map_err(|e| ServerError::BadRequest(format!("invalid lead: {e}")))
}

/// `updatedAt` as RFC 3339 text (what the API returns) or unix milliseconds.
fn expected_stamp(body: &Value) -> Result<DateTime<Utc>, ServerError> {
    let parsed = match body.get("updatedAt") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => return Err(ServerError::BadRequest("updatedAt is required".into())),
    };
    parsed.ok_or_else(|| ServerError::BadRequest("updatedAt is not a valid timestamp".into()))
}

fn api_create(req: &mut Request, state: &AppState) -> ResultResp {
    let user = require_user(req, state)?;
    let patch = patch_from(json_body(req)?)?;
    state.limiter.check(&state.db, user.id, now())?;
    let lead = leads::create_lead(&state.db, user.id, &patch, now())?;
    json_response_with_status(201, &lead)
}

fn api_update(req: &mut Request, state: &AppState, id: LeadId) -> ResultResp {
    let user = require_user(req, state)?;
    let body = json_body(req)?;
    let expected = expected_stamp(&body)?;
    let patch = patch_from(body)?;

    load_editable(state, &user, id)?;
    state.limiter.check(&state.db, user.id, now())?;
    let lead = leads::update_lead(&state.db, user.id, id, &patch, expected, now())?;
    json_response(&lead)
}

fn api_export_csv(req: &Request, state: &AppState) -> ResultResp {
    require_user(req, state)?;
    let filter = LeadFilter::from_params(&parse_query(req))?;
    let rows = leads::export_leads(&state.db, &filter)?;
    tracing::info!(rows = rows.len(), "csv export");
    spreadsheets::export_leads_csv(&rows, now().date_naive())
}

fn api_export_xlsx(req: &Request, state: &AppState) -> ResultResp {
    require_user(req, state)?;
    let filter = LeadFilter::from_params(&parse_query(req))?;
    let rows = leads::export_leads(&state.db, &filter)?;
    tracing::info!(rows = rows.len(), "xlsx export");
    spreadsheets::export_leads_xlsx(&rows, now().date_naive())
}

fn api_import(req: &mut Request, state: &AppState) -> ResultResp {
    let user = require_user(req, state)?;
    let body = read_body(req)?;
    let report = run_import(state, &user, &body)?;
    json_response(&report)
}

fn run_import(state: &AppState, user: &CurrentUser, data: &[u8]) -> Result<ImportReport, ServerError> {
    state.limiter.check(&state.db, user.id, now())?;
    let parsed = spreadsheets::parse_import(data, state.config.import_max_rows)?;
    if !parsed.errors.is_empty() {
        tracing::debug!(rejected = parsed.errors.len(), "import rows rejected");
    }

    let inserted = if parsed.valid.is_empty() {
        0
    } else {
        leads::import_leads(&state.db, user.id, parsed.valid, now())?.len()
    };
    Ok(ImportReport {
        inserted,
        errors: parsed.errors,
    })
}
