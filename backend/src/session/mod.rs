//! Per-browser session identity.
//!
//! A session is nothing more than a UUID carried in the `labeldesk_session`
//! cookie. The id is minted on upload and keys every file in the store; a
//! missing or unparseable cookie means "no session".

pub mod store;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use std::fmt;
use uuid::Uuid;

pub use store::{FsSessionStore, SessionStore, Slot, StoreError};

pub const SESSION_COOKIE: &str = "labeldesk_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        req.cookie(SESSION_COOKIE)
            .and_then(|c| Self::parse(c.value()))
    }

    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// A cookie that makes the browser forget the session.
    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
