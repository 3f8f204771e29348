//! Session cookie
//!
//! The session is the API token plus the signed-in user id, stored as JSON in
//! a single cookie. A cookie that does not decode is treated as no session.

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use walletweb_config::SessionConfig;
use walletweb_core::Session;

use crate::routes::auth::LOGIN_PATH;

/// Read the session from the request's `Cookie` headers
pub fn read_session(headers: &HeaderMap, config: &SessionConfig) -> Option<Session> {
    let raw = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == config.cookie_name)
        .map(|(_, value)| value)?;

    if raw.is_empty() {
        return None;
    }

    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!(target: "walletweb::session", "Session cookie is not valid UTF-8: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<Session>(&decoded) {
        Ok(session) if !session.token.is_empty() && !session.user_id.is_empty() => Some(session),
        Ok(_) => {
            log::warn!(target: "walletweb::session", "Session cookie without token or user id");
            None
        }
        Err(e) => {
            log::warn!(target: "walletweb::session", "Failed to decode session cookie: {}", e);
            None
        }
    }
}

/// `name=value` pair of the session cookie
pub fn cookie_pair(config: &SessionConfig, session: &Session) -> String {
    let json = serde_json::to_string(session).unwrap_or_default();
    format!("{}={}", config.cookie_name, urlencoding::encode(&json))
}

/// `Set-Cookie` value that stores the session
pub fn set_cookie(config: &SessionConfig, session: &Session) -> String {
    let mut cookie = format!("{}; Path=/; HttpOnly; SameSite=Lax", cookie_pair(config, session));
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session
pub fn clear_cookie(config: &SessionConfig) -> String {
    let mut cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", config.cookie_name);
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Drop the session and send the user to the login page
pub fn end_session(config: &SessionConfig) -> Response {
    (
        [(header::SET_COOKIE, clear_cookie(config))],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use walletweb_core::Id;

    fn session() -> Session {
        Session {
            token: "abc.def".to_string(),
            user_id: Id::new("7"),
        }
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_cookie_round_trip_among_other_cookies() {
        let config = SessionConfig::default();
        let cookie = format!("theme=dark; {}; lang=es", cookie_pair(&config, &session()));
        assert_eq!(read_session(&headers(&cookie), &config), Some(session()));
    }

    #[test]
    fn test_undecodable_cookie_is_no_session() {
        let config = SessionConfig::default();
        let cookie = format!("{}=not-json", config.cookie_name);
        assert_eq!(read_session(&headers(&cookie), &config), None);

        let cookie = format!("{}=", config.cookie_name);
        assert_eq!(read_session(&headers(&cookie), &config), None);

        assert_eq!(read_session(&HeaderMap::new(), &config), None);
    }

    #[test]
    fn test_cookie_without_user_is_no_session() {
        let config = SessionConfig::default();
        let json = urlencoding::encode(r#"{"token":"t","user_id":""}"#).into_owned();
        let cookie = format!("{}={}", config.cookie_name, json);
        assert_eq!(read_session(&headers(&cookie), &config), None);
    }

    #[test]
    fn test_set_and_clear_cookie_attributes() {
        let config = SessionConfig {
            secure: true,
            ..SessionConfig::default()
        };
        let set = set_cookie(&config, &session());
        assert!(set.starts_with(&format!("{}=", config.cookie_name)));
        assert!(set.contains("HttpOnly"));
        assert!(set.ends_with("; Secure"));

        let clear = clear_cookie(&config);
        assert!(clear.contains("Max-Age=0"));
    }

    #[test]
    fn test_end_session_redirects_to_login() {
        let response = end_session(&SessionConfig::default());
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), LOGIN_PATH);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }
}
