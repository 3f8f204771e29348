//! Transfer receipt page

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use walletweb_config::Config;
use walletweb_core::transfer::{Receipt, Screen, SEND_MONEY_PATH};
use walletweb_core::{format_currency, ActivityKind, FlowOutcome, Id, TransferFlow};
use walletweb_utils::escape_html;

use crate::routes::send_money::api::respond;
use crate::session::{end_session, read_session};
use crate::{page_response, AppState};

/// Receipt of one of the signed-in user's transactions
pub async fn page_activity_receipt(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = read_session(&headers, &state.config.session) else {
        return end_session(&state.config.session);
    };

    let flow = TransferFlow::new(state.api.as_ref(), &session);
    let current_path = format!("/activity/{}", id);
    match flow.receipt(&Id::new(id)).await {
        FlowOutcome::Show(Screen::Receipt(None)) => (
            StatusCode::NOT_FOUND,
            Html(page_response(&headers, "Comprobante", &current_path, &render_receipt(None, &state.config))),
        )
            .into_response(),
        outcome => respond(&state, &headers, &current_path, outcome),
    }
}

/// Render a receipt, or the not-found message
pub fn render_receipt(receipt: Option<&Receipt>, config: &Config) -> String {
    let Some(receipt) = receipt else {
        return format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-6 text-center'>
    <h2 class='text-xl font-semibold mb-2'>No encontramos esta actividad</h2>
    <a href='{}' class='text-indigo-600 hover:underline'>Volver</a>
</div>"#,
            SEND_MONEY_PATH
        );
    };

    let tx = &receipt.transaction;
    let (icon, amount_class) = match receipt.kind {
        ActivityKind::TransferIn | ActivityKind::Deposit => ("↓", "text-green-600"),
        ActivityKind::TransferOut => ("↑", "text-gray-900"),
        ActivityKind::Other => ("•", "text-gray-900"),
    };
    let dated = tx.dated_display();
    let dated_row = if dated.is_empty() {
        String::new()
    } else {
        format!(
            "<div><p class='text-sm text-gray-500'>Fecha</p><p class='font-medium'>{}</p></div>",
            escape_html(&dated)
        )
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
    <div class='flex items-center gap-3 mb-4'>
        <span class='text-2xl'>{}</span>
        <h2 class='text-xl font-semibold'>{}</h2>
    </div>
    <p class='text-3xl font-bold mb-6 {}'>{}</p>
    <div class='grid grid-cols-2 gap-4'>
        <div><p class='text-sm text-gray-500'>Nombre</p><p class='font-medium'>{}</p></div>
        {}
        <div><p class='text-sm text-gray-500'>Número de operación</p><p class='font-medium'>{}</p></div>
    </div>
    <div class='mt-6 text-right'>
        <a href='{}' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Volver al inicio</a>
    </div>
</div>"#,
        icon,
        receipt.kind.label(),
        amount_class,
        escape_html(&format_currency(tx.amount.abs(), &config.currency)),
        escape_html(&tx.name),
        dated_row,
        escape_html(tx.id.as_str()),
        SEND_MONEY_PATH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::sync::Arc;
    use tower::ServiceExt;
    use walletweb_core::testing::transfer;

    #[tokio::test]
    async fn test_receipt_page() {
        let mut tx = transfer("tx123", "0000000000000000000010", -250);
        tx.name = "Ana Paz".to_string();
        tx.dated = Some("2024-06-15T10:30:00Z".to_string());
        let api = Arc::new(fixture_api().with_activity(&Id::new("10"), vec![tx]));
        let cookie = session_cookie();

        let response = app(api).oneshot(get("/activity/tx123", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Transferencia enviada"));
        assert!(body.contains("$ 250,00"));
        assert!(body.contains("15/06/2024 10:30"));
        assert!(body.contains("tx123"));
    }

    #[tokio::test]
    async fn test_missing_receipt_is_not_found() {
        let cookie = session_cookie();
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/activity/nope", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("No encontramos esta actividad"));
    }

    #[tokio::test]
    async fn test_receipt_requires_session() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/activity/tx123", None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
    }
}
