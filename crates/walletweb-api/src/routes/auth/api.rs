//! Login and logout submissions

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};
use walletweb_core::{Credentials, DefaultErrorLogger, ErrorContext, ErrorLogger, Session};

use super::page::render_login;
use crate::routes::send_money::SEND_MONEY_PATH;
use crate::session::{end_session, read_session, set_cookie};
use crate::{base_html, form_params, AppState};

fn login_failed(state: &AppState, email: &str, message: &str) -> Response {
    Html(base_html(
        "Ingresar",
        &render_login(email, Some(message), state.config.transfer.notification_duration_ms),
    ))
    .into_response()
}

/// Sign in against the wallet API and store the session cookie
pub async fn htmx_login(state: State<AppState>, body: String) -> Response {
    let params = form_params(&body);
    let email = params.get("email").map(|e| e.trim().to_string()).unwrap_or_default();
    let password = params.get("password").cloned().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return login_failed(&state, &email, "Completá tu email y contraseña");
    }

    let credentials = Credentials {
        email: email.clone(),
        password,
    };
    let response = match state.api.login(&credentials).await {
        Ok(response) => response,
        Err(e) => {
            DefaultErrorLogger.log_warning(&e.to_string(), &ErrorContext::new("login"));
            return login_failed(&state, &email, &e.message);
        }
    };

    let Some(user_id) = response.resolved_user_id() else {
        DefaultErrorLogger.log_warning("Login answer without user id", &ErrorContext::new("login"));
        return login_failed(&state, &email, "No pudimos iniciar sesión");
    };

    log::info!(target: "walletweb::session", "User {} signed in", user_id);
    let session = Session {
        token: response.token,
        user_id,
    };
    (
        [(header::SET_COOKIE, set_cookie(&state.config.session, &session))],
        Redirect::to(SEND_MONEY_PATH),
    )
        .into_response()
}

/// End the session; the API logout is best effort
pub async fn htmx_logout(state: State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session) = read_session(&headers, &state.config.session) {
        if let Err(e) = state.api.logout(&session.token).await {
            let context = ErrorContext::new("logout").with_user_id(session.user_id.to_string());
            DefaultErrorLogger.log_warning(&e.to_string(), &context);
        }
    }
    end_session(&state.config.session)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{header, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;
    use walletweb_core::RequestError;

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(post_form("/login", None, "email=lucia%40example.com&password=secreto"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/send-money");
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_login_failure_rerenders_form() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(post_form("/login", None, "email=lucia%40example.com&password=otra"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_text(response).await;
        assert!(body.contains("Credenciales inválidas"));
        assert!(body.contains("value='lucia@example.com'"));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let api = Arc::new(fixture_api());
        let response = app(api.clone())
            .oneshot(post_form("/login", None, "email=&password="))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Completá tu email y contraseña"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_page_redirects_signed_in_users() {
        let cookie = session_cookie();
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/login", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_even_when_api_fails() {
        let api = Arc::new(fixture_api().failing("logout", RequestError::new(500, "boom")));
        let cookie = session_cookie();
        let response = app(api.clone())
            .oneshot(post_form("/logout", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
        assert_eq!(api.calls(), vec!["logout".to_string()]);
    }
}
