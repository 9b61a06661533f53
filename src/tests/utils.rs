use crate::app::AppState;
use crate::auth::{sessions, Role};
use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::db::users;
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A database file no other test uses. The schema is not applied yet.
pub fn temp_db(prefix: &str) -> Database {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "{prefix}_{}_{}_{nanos}.sqlite",
        std::process::id(),
        NEXT_DB.fetch_add(1, Ordering::Relaxed)
    ));
    Database::new(path.to_string_lossy().into_owned())
}

/// Application state over a fresh, initialized database.
pub fn test_state() -> AppState {
    test_state_with(AppConfig::default())
}

pub fn test_state_with(config: AppConfig) -> AppState {
    let db = temp_db("router");
    let state = AppState::new(AppConfig {
        database_path: db.path().to_string(),
        ..config
    });
    init_db(&state.db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    state
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Creates (or reuses) a user with `role` and returns its id and a
/// `Cookie` header value for a live session.
pub fn sign_in(state: &AppState, email: &str, role: Role) -> (i64, String) {
    let now = now_unix();
    let ttl = state.config.session_ttl_secs;
    state
        .db
        .with_conn(|conn| {
            let id = users::get_or_create_user(conn, email, now)?;
            users::set_profile(conn, id, None, role)?;
            let token = sessions::create_session(conn, id, now, ttl)?;
            Ok((id, format!("session={token}")))
        })
        .expect("sign in")
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}

fn builder(method: Method, uri: &str, cookie: Option<&str>) -> http::request::Builder {
    let b = Request::builder().method(method).uri(uri);
    match cookie {
        Some(c) => b.header("Cookie", c),
        None => b,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    builder(Method::GET, uri, cookie).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    builder(Method::POST, uri, cookie)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn send_json(method: Method, uri: &str, cookie: Option<&str>, value: &serde_json::Value) -> Request<Body> {
    builder(method, uri, cookie)
        .header("Content-Type", "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

pub fn post_csv(uri: &str, cookie: Option<&str>, csv: &str) -> Request<Body> {
    builder(Method::POST, uri, cookie)
        .header("Content-Type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}
