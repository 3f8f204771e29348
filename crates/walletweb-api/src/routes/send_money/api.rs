//! Send-money handlers
//!
//! Endpoints:
//! - page_send_money: GET, renders the screen selected by `step`
//! - htmx_send_money_submit: POST, submits the current step and redirects

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use walletweb_core::{FlowOutcome, FlowQuery, Step, TransferFlow, TransferForm};

use super::page::{render_screen, screen_title};
use crate::session::{end_session, read_session};
use crate::{form_params, page_response, AppState};
use walletweb_core::transfer::SEND_MONEY_PATH;

/// Turn a flow outcome into an HTTP response
pub(crate) fn respond(state: &AppState, headers: &HeaderMap, current_path: &str, outcome: FlowOutcome) -> Response {
    match outcome {
        FlowOutcome::Show(screen) => Html(page_response(
            headers,
            screen_title(&screen),
            current_path,
            &render_screen(&screen, &state.config),
        ))
        .into_response(),
        FlowOutcome::Redirect(url) => Redirect::to(&url).into_response(),
        FlowOutcome::Unauthorized => {
            log::info!(target: "walletweb::session", "Wallet API rejected the session token, signing out");
            end_session(&state.config.session)
        }
    }
}

/// Render the counterparty list or a transfer step
pub async fn page_send_money(
    state: State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FlowQuery>,
) -> Response {
    let Some(session) = read_session(&headers, &state.config.session) else {
        return end_session(&state.config.session);
    };

    let flow = TransferFlow::new(state.api.as_ref(), &session);
    let outcome = flow.enter(&query, state.config.transfer.max_amount).await;
    respond(&state, &headers, SEND_MONEY_PATH, outcome)
}

/// Submit the step named by the `step` form field
pub async fn htmx_send_money_submit(
    state: State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(session) = read_session(&headers, &state.config.session) else {
        return end_session(&state.config.session);
    };

    let params = form_params(&body);
    let form = TransferForm {
        destination: params.get("destination").cloned().unwrap_or_default(),
        amount: params.get("amount").cloned().unwrap_or_default(),
    };

    let flow = TransferFlow::new(state.api.as_ref(), &session);
    let outcome = match Step::parse(params.get("step").map(String::as_str)) {
        Some(Step::Destination) => flow.submit_destination(&form),
        Some(Step::Amount) => flow.submit_amount(&form, state.config.transfer.max_amount).await,
        Some(Step::Confirm) => flow.submit_transfer(&form, state.config.transfer.max_amount).await,
        Some(Step::List) | None => FlowOutcome::Redirect(SEND_MONEY_PATH.to_string()),
    };
    respond(&state, &headers, SEND_MONEY_PATH, outcome)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{header, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;
    use walletweb_core::testing::transfer;
    use walletweb_core::{Id, RequestError};

    #[tokio::test]
    async fn test_requires_session() {
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/send-money", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_list_page() {
        let api = Arc::new(fixture_api().with_activity(
            &Id::new("10"),
            vec![transfer("t1", "A", 10), transfer("t2", "B", 5), transfer("t3", "A", 7)],
        ));
        let cookie = session_cookie();
        let response = app(api).oneshot(get("/send-money", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert_eq!(body.matches("name-A").count(), 1);
        assert!(body.contains("name-B"));
        assert!(body.contains("Nueva cuenta"));
    }

    #[tokio::test]
    async fn test_unknown_destination_redirects_with_error() {
        let cookie = session_cookie();
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/send-money?step=2&destination=ANA.PAGO", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money?step=1&error=true");
    }

    #[tokio::test]
    async fn test_step_one_with_error_flag_shows_notification() {
        let cookie = session_cookie();
        let response = app(Arc::new(fixture_api()))
            .oneshot(get("/send-money?step=1&error=true", Some(&cookie)))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("Cuenta no encontrada"));
    }

    #[tokio::test]
    async fn test_step_guard_and_invalid_step() {
        let app = app(Arc::new(fixture_api()));
        let cookie = session_cookie();

        let response = app.clone().oneshot(get("/send-money?step=3", Some(&cookie))).await.unwrap();
        assert_eq!(location(&response), "/send-money?step=1");

        let response = app.oneshot(get("/send-money?step=7", Some(&cookie))).await.unwrap();
        assert_eq!(location(&response), "/send-money");
    }

    #[tokio::test]
    async fn test_full_flow_by_posts() {
        let api = Arc::new(fixture_api().with_transfer_id("tx123"));
        let app = app(api.clone());
        let cookie = session_cookie();

        let response = app
            .clone()
            .oneshot(post_form("/send-money", Some(&cookie), "step=1&destination=+ana.pago+"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money?step=2&destination=ana.pago");

        let response = app
            .clone()
            .oneshot(get("/send-money?step=2&destination=ana.pago", Some(&cookie)))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Ana Paz"));

        let response = app
            .clone()
            .oneshot(post_form("/send-money", Some(&cookie), "step=2&destination=ana.pago&amount=150"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money?step=3&destination=ana.pago&amount=150");

        let response = app
            .clone()
            .oneshot(get("/send-money?step=3&destination=ana.pago&amount=150", Some(&cookie)))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("$ 150,00"));

        let response = app
            .oneshot(post_form("/send-money", Some(&cookie), "step=3&destination=ana.pago&amount=150"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).contains("tx123"));
        assert_eq!(api.transfers().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_amount_rerenders_step_two() {
        let cookie = session_cookie();
        let response = app(Arc::new(fixture_api()))
            .oneshot(post_form("/send-money", Some(&cookie), "step=2&destination=ana.pago&amount=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Ingresá un monto válido"));
    }

    #[tokio::test]
    async fn test_zero_amount_never_transfers() {
        let api = Arc::new(fixture_api());
        let cookie = session_cookie();
        let response = app(api.clone())
            .oneshot(post_form("/send-money", Some(&cookie), "step=3&destination=ana.pago&amount=0"))
            .await
            .unwrap();
        assert!(location(&response).starts_with("/send-money?step=2"));
        assert!(api.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_step_three_posts_follow_amount_rules() {
        let api = Arc::new(fixture_api());
        let app = app(api.clone());
        let cookie = session_cookie();

        for amount in ["-50", "1.234", "99999999999"] {
            let body = format!("step=3&destination=ana.pago&amount={}", amount);
            let response = app
                .clone()
                .oneshot(post_form("/send-money", Some(&cookie), &body))
                .await
                .unwrap();
            assert!(location(&response).starts_with("/send-money?step=2"));
        }

        let response = app
            .oneshot(get("/send-money?step=3&destination=ana.pago&amount=-50", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money?step=2&destination=ana.pago&amount=-50");
        assert!(api.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_account_lookup_failure_has_its_own_notice() {
        let api = Arc::new(fixture_api().failing("list_accounts", RequestError::new(503, "down")));
        let app = app(api);
        let cookie = session_cookie();

        let response = app
            .clone()
            .oneshot(get("/send-money?step=2&destination=ana.pago", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/send-money?step=1&error=unavailable");

        let response = app
            .oneshot(get("/send-money?step=1&error=unavailable", Some(&cookie)))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("No pudimos buscar la cuenta"));
        assert!(!body.contains("Cuenta no encontrada"));
    }

    #[tokio::test]
    async fn test_transfer_failure_is_shown() {
        let api = Arc::new(fixture_api().failing("create_transfer", RequestError::new(400, "Saldo insuficiente")));
        let cookie = session_cookie();
        let response = app(api)
            .oneshot(post_form("/send-money", Some(&cookie), "step=3&destination=ana.pago&amount=10"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Saldo insuficiente"));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let api = Arc::new(fixture_api().failing("list_accounts", RequestError::new(401, "expired")));
        let cookie = session_cookie();
        let response = app(api)
            .oneshot(get("/send-money?step=2&destination=ana.pago", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
