//! services/api/src/web/middleware.rs
//!
//! Access guard for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use habit_tracker_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::state::{AppState, CurrentUser};

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session";

/// Extracts the session token from the `Cookie` header, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Middleware that resolves the session cookie to a `CurrentUser`.
///
/// If valid, inserts the `CurrentUser` into request extensions for handlers to use.
/// If missing, unknown or expired, redirects to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(session_id) = session_id_from_headers(req.headers()) else {
        debug!("No session cookie on {}, redirecting to login", req.uri().path());
        return Redirect::to("/login").into_response();
    };

    let user_id = match state.db.validate_auth_session(&session_id).await {
        Ok(user_id) => user_id,
        Err(PortError::Unauthorized) => return Redirect::to("/login").into_response(),
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            return Redirect::to("/login").into_response();
        }
    };

    req.extensions_mut().insert(CurrentUser {
        user_id,
        session_id,
    });
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn ignores_lookalike_and_empty_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("old_session=zzz; session="),
        );
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}
