//! Cookie-backed session extractor.
//!
//! Reads the session id from the configured cookie and loads the session
//! bag from the backend. Handlers mutate it through the orchestrator and
//! call [`ChatSession::commit`] before building the response, which saves
//! a modified bag and yields the `Set-Cookie` header when a newly minted
//! session was stored.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};

use bonechat_infra::session::SessionHandle;

use crate::state::AppState;

/// The caller's session, loaded for the duration of one request.
pub struct ChatSession(pub SessionHandle);

impl FromRequestParts<AppState> for ChatSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie = cookie_value(&parts.headers, &state.config.server.cookie_name);
        let handle = state.sessions.load(cookie);
        if handle.is_new() {
            tracing::debug!(session_id = %handle.id(), "Starting new session");
        }
        Ok(ChatSession(handle))
    }
}

impl ChatSession {
    /// Save the session if modified and return the headers the response must
    /// carry. Clean sessions get no cookie.
    pub fn commit(self, state: &AppState) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let handle = self.0;
        let id = handle.id();
        let is_new = handle.is_new();

        if !state.sessions.save(handle) {
            return headers;
        }
        tracing::debug!(session_id = %id, "Session saved");

        if is_new {
            let server = &state.config.server;
            let cookie = format!(
                "{}={id}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
                server.cookie_name, server.session_ttl_secs
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "Cookie name is not a valid header value"),
            }
        }
        headers
    }
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}
