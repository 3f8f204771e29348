//! HTTP server with HTMX pages for the send-money flow
//!
//! Routes are organized into modules:
//! - routes::send_money: Counterparty list and the three transfer steps
//! - routes::activity: Transfer receipt
//! - routes::auth: Login and logout
//!
//! Every page is rendered on the server. The step and the form state travel
//! in the URL, so a reload or a shared link shows the same screen.

pub mod components;
pub mod error;
pub mod routes;
pub mod session;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use walletweb_config::Config;
use walletweb_core::ApiRef;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiRef,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::activity::page_activity_receipt;
    use routes::auth::{htmx_login, htmx_logout, page_login};
    use routes::send_money::{htmx_send_money_submit, page_send_money};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        // Pages
        .route("/", get(index_page))
        .route("/login", get(page_login))
        .route("/login", post(htmx_login))
        .route("/logout", post(htmx_logout))
        .route("/send-money", get(page_send_money))
        .route("/send-money", post(htmx_send_money_submit))
        .route("/activity/:id", get(page_activity_receipt))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

/// Entry point: the flow for signed-in users, the login otherwise
async fn index_page(state: State<AppState>, headers: HeaderMap) -> Response {
    match session::read_session(&headers, &state.config.session) {
        Some(_) => Redirect::to(routes::send_money::SEND_MONEY_PATH).into_response(),
        None => Redirect::to(routes::auth::LOGIN_PATH).into_response(),
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es-AR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Walletweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900" hx-boost="true">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Top navigation bar
pub fn nav_bar(current_path: &str) -> String {
    let links = [
        ("/send-money", "Enviar dinero"),
    ];

    let mut nav = String::from("<header class='bg-white border-b'><div class='max-w-3xl mx-auto flex items-center justify-between px-4 py-3'><a href='/' class='text-xl font-bold text-indigo-600'>Walletweb</a><nav class='flex items-center gap-2'>");
    for (path, label) in &links {
        let active_class = if current_path.starts_with(path) {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            "<a href='{}' class='px-3 py-2 rounded-lg {}'>{}</a>",
            path, active_class, label
        ));
    }
    nav.push_str("<form method='post' action='/logout'><button type='submit' class='px-3 py-2 rounded-lg text-gray-600 hover:bg-gray-50'>Cerrar sesión</button></form>");
    nav.push_str("</nav></div></header>");
    nav
}

/// Check if request is an HTMX partial update (boosted navigation gets the full page)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some() && headers.get("hx-boosted").is_none()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!("<main class='max-w-3xl mx-auto p-6'>{}</main>", inner_content)
    } else {
        base_html(
            title,
            &format!(
                "{}<main class='max-w-3xl mx-auto p-6'>{}</main>",
                nav_bar(current_path),
                inner_content
            ),
        )
    }
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn form_params(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " "))
            .map(|k| k.into_owned())
            .unwrap_or_default();
        let value = urlencoding::decode(&value.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_default();
        params.insert(key, value);
    }
    params
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process receives
/// Ctrl-C.
pub async fn start_server(config: Config, api: ApiRef) -> Result<(), ApiError> {
    let addr = config.bind_addr();
    let state = AppState { config, api };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind { addr: addr.clone(), source })?;
    log::info!("Starting Walletweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /login (Sign in)");
    log::info!("  - /send-money (Send money)");
    log::info!("  - /activity/:id (Transfer receipt)");
    log::info!("  - /api/health (Health check)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ApiError::Server)?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, body_text, fixture_api, get, location, session_cookie};
    use super::{form_params, page_response};
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_form_params() {
        let params = form_params("destination=ana+pago&amount=10%2C5&step=2&empty=");
        assert_eq!(params.get("destination").map(String::as_str), Some("ana pago"));
        assert_eq!(params.get("amount").map(String::as_str), Some("10,5"));
        assert_eq!(params.get("step").map(String::as_str), Some("2"));
        assert_eq!(params.get("empty").map(String::as_str), Some(""));
        assert!(form_params("").is_empty());
    }

    #[test]
    fn test_page_response_partial_for_htmx() {
        let mut headers = HeaderMap::new();
        let full = page_response(&headers, "T", "/send-money", "<p>x</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("Cerrar sesión"));

        headers.insert("hx-request", HeaderValue::from_static("true"));
        let partial = page_response(&headers, "T", "/send-money", "<p>x</p>");
        assert!(!partial.contains("<!DOCTYPE html>"));

        headers.insert("hx-boosted", HeaderValue::from_static("true"));
        assert!(page_response(&headers, "T", "/send-money", "").starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_page() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("No encontramos lo que buscabas"));
    }

    #[tokio::test]
    async fn test_index_redirects_by_session() {
        let app = app(Arc::new(fixture_api()));
        let response = app.clone().oneshot(get("/", None)).await.unwrap();
        assert_eq!(location(&response), "/login");

        let cookie = session_cookie();
        let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
        assert_eq!(location(&response), "/send-money");
    }
}
