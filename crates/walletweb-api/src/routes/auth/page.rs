//! Login page rendering

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use walletweb_utils::escape_html;

use super::LOGIN_PATH;
use crate::components::{snack_bar, SnackKind};
use crate::routes::send_money::SEND_MONEY_PATH;
use crate::session::read_session;
use crate::{base_html, AppState};

/// Login form; signed-in users go straight to the flow
pub async fn page_login(state: State<AppState>, headers: HeaderMap) -> Response {
    if read_session(&headers, &state.config.session).is_some() {
        return Redirect::to(SEND_MONEY_PATH).into_response();
    }
    Html(base_html("Ingresar", &render_login("", None, 0))).into_response()
}

/// Render the login form, optionally with the last failure
pub fn render_login(email: &str, error: Option<&str>, duration_ms: u64) -> String {
    let notification = error
        .map(|message| snack_bar(message, SnackKind::Error, duration_ms))
        .unwrap_or_default();

    format!(
        r#"<main class='max-w-sm mx-auto mt-16'>
    <h1 class='text-2xl font-bold text-indigo-600 text-center mb-6'>Walletweb</h1>
    <form method='post' action='{}' class='bg-white rounded-xl shadow-sm p-6 space-y-4'>
        <div>
            <label for='email' class='block text-sm font-medium text-gray-700 mb-1'>Email</label>
            <input id='email' name='email' type='email' value='{}' required
                class='w-full px-3 py-2 border rounded-lg focus:ring-2 focus:ring-indigo-500'>
        </div>
        <div>
            <label for='password' class='block text-sm font-medium text-gray-700 mb-1'>Contraseña</label>
            <input id='password' name='password' type='password' required
                class='w-full px-3 py-2 border rounded-lg focus:ring-2 focus:ring-indigo-500'>
        </div>
        <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Ingresar</button>
    </form>
</main>
{}"#,
        LOGIN_PATH,
        escape_html(email),
        notification
    )
}
