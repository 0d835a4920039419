use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream as async_stream;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::application::usecases::{SubmissionOutcome, SubmitContactUseCase};
use crate::domain::{ContactForm, Notification};

#[derive(Clone)]
pub struct ApiState {
    pub flow: Arc<SubmitContactUseCase>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/contact", post(submit_contact))
        .route(
            "/notification",
            get(current_notification).delete(dismiss_notification),
        )
        .route("/notifications/stream", get(stream_notifications))
        .route("/state", get(flow_state))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[derive(Serialize)]
struct SubmitResponse {
    outcome: SubmissionOutcome,
    /// What this attempt showed; `null` when it was turned away as busy.
    notification: Option<Notification>,
    /// Fields as the page should show them after the attempt.
    form: ContactForm,
}

async fn submit_contact(
    State(state): State<ApiState>,
    Json(mut form): Json<ContactForm>,
) -> impl IntoResponse {
    let (outcome, notification) = state.flow.execute(&mut form).await;
    let code = match &outcome {
        SubmissionOutcome::Sent => StatusCode::OK,
        SubmissionOutcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionOutcome::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
        SubmissionOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        SubmissionOutcome::Busy => StatusCode::CONFLICT,
    };
    let body = SubmitResponse {
        outcome,
        notification,
        form,
    };
    (code, Json(body))
}

async fn current_notification(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.flow.notifications().current())
}

async fn dismiss_notification(State(state): State<ApiState>) -> impl IntoResponse {
    state.flow.notifications().dismiss();
    StatusCode::NO_CONTENT
}

async fn flow_state(State(state): State<ApiState>) -> impl IntoResponse {
    Json(serde_json::json!({ "state": state.flow.state() }))
}

async fn stream_notifications(State(state): State<ApiState>) -> impl IntoResponse {
    let mut rx = state.flow.notifications().subscribe();

    // current value first, then one event per change
    let stream = async_stream! {
        loop {
            let current = rx.borrow_and_update().clone();
            let data = serde_json::to_string(&current).unwrap_or_else(|_| "null".to_string());
            yield Ok::<_, Infallible>(SseEvent::default().event("notification").data(data));

            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
