// src/auth/magic.rs
use crate::auth::token::{self, Token};
use crate::db::connection::Database;
use crate::db::{auth as db_auth, users};
use crate::errors::ServerError;
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    pub ttl_secs: i64,
    /// Path the emailed link points at, e.g. "/auth/magic".
    pub magic_path: String,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            magic_path: "/auth/magic".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub email: String,
    pub user_id: i64,
    pub expires_at: i64,
    /// Relative URL carrying the raw token.
    pub link: String,
}

pub struct MagicLinkService {
    cfg: MagicLinkConfig,
}

impl MagicLinkService {
    pub fn new(cfg: MagicLinkConfig) -> Self {
        Self { cfg }
    }

    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    /// Sign-up and sign-in are the same thing: the user row is created on
    /// first request and a single-use link is stored by digest.
    pub fn request_link(
        &self,
        conn: &Connection,
        email: &str,
        now: i64,
    ) -> Result<IssuedMagicLink, ServerError> {
        let email = Self::normalize_email(email)?;
        let user_id = users::get_or_create_user(conn, &email, now)?;

        let token = Token::generate();
        let expires_at = now + self.cfg.ttl_secs;
        db_auth::prune_magic_links(conn, now)?;
        db_auth::insert_magic_link(conn, user_id, &token.digest(), now, expires_at)?;

        Ok(IssuedMagicLink {
            email,
            user_id,
            expires_at,
            link: format!("{}?token={}", self.cfg.magic_path, token.as_str()),
        })
    }

    /// Consumes the link and returns the user id it was issued for.
    pub fn redeem(&self, conn: &mut Connection, raw: &str, now: i64) -> Result<i64, ServerError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let Some(user_id) = db_auth::consume_magic_link(conn, &token::digest(raw), now)? else {
            return Err(ServerError::Unauthorized("invalid or expired link".into()));
        };
        users::touch_last_login(conn, user_id, now)?;
        Ok(user_id)
    }
}

/// Issues a link and logs it; there is no mail transport.
pub fn request_magic_link(
    db: &Database,
    cfg: MagicLinkConfig,
    email: &str,
    now: i64,
) -> Result<IssuedMagicLink, ServerError> {
    let svc = MagicLinkService::new(cfg);
    let issued = db.with_conn(|conn| svc.request_link(conn, email, now))?;
    tracing::info!(email = %issued.email, link = %issued.link, "magic link issued");
    Ok(issued)
}

pub fn redeem_magic_link(
    db: &Database,
    cfg: MagicLinkConfig,
    raw: &str,
    now: i64,
) -> Result<i64, ServerError> {
    let svc = MagicLinkService::new(cfg);
    db.with_conn(|conn| svc.redeem(conn, raw, now))
}
