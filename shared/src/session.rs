use async_trait::async_trait;
use fiscal_atoms::users::Role;
use fiscal_atoms::LedgerStore;
use lambda_http::http::header::COOKIE;
use lambda_http::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

/// Who is calling. The role always comes from the user table, never from
/// the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub user_id: u32,
    pub role: Role,
}

/// Identity collaborator consumed by the request handlers
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self, store: &dyn LedgerStore, headers: &HeaderMap)
        -> Option<SessionUser>;

    /// Set-Cookie values that end the session
    fn end_session(&self) -> Vec<String>;
}

#[derive(Deserialize)]
struct SessionCookie {
    #[serde(rename = "userId")]
    user_id: u32,
}

/// Reads the `session` cookie written by the web front-end.
/// The value is either a bare user id or `{"userId": <id>, ...}`.
#[derive(Debug, Clone, Default)]
pub struct CookieSession;

pub fn get_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

pub fn parse_session_value(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.starts_with('{') {
        serde_json::from_str::<SessionCookie>(value)
            .ok()
            .map(|c| c.user_id)
    } else {
        value.parse().ok()
    }
}

#[async_trait]
impl SessionProvider for CookieSession {
    async fn current_user(
        &self,
        store: &dyn LedgerStore,
        headers: &HeaderMap,
    ) -> Option<SessionUser> {
        let user_id = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|h| get_cookie(h, SESSION_COOKIE))
            .and_then(parse_session_value)?;

        match store.get_user(user_id).await {
            Ok(Some(user)) => Some(SessionUser {
                user_id: user.user_id,
                role: user.user_role,
            }),
            Ok(None) => {
                tracing::warn!(user_id, "Session refers to an unknown user");
                None
            }
            Err(e) => {
                tracing::error!("Failed to resolve session user {}: {}", user_id, e);
                None
            }
        }
    }

    fn end_session(&self) -> Vec<String> {
        vec![format!(
            "{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax",
            SESSION_COOKIE
        )]
    }
}
