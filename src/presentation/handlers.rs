// HTTP request handlers
use crate::application::view_controller::PeriodRequest;
use crate::domain::period::Period;
use crate::domain::view_state::ViewSnapshot;
use crate::error::ViewError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PeriodBody {
    pub period: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view snapshot
pub async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.controller.snapshot())
}

/// Stream a snapshot per state transition, starting with the current one
pub async fn stream_view(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.controller.subscribe();

    let stream = async_stream::stream! {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            match Event::default().event("snapshot").json_data(&snapshot) {
                Ok(event) => yield Ok::<Event, Infallible>(event),
                Err(e) => tracing::error!("Failed to encode view snapshot: {}", e),
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Switch the displayed period. The fetch runs in the background; the
/// response carries the snapshot right after the request was accepted.
pub async fn select_period(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PeriodBody>,
) -> Result<(StatusCode, Json<ViewSnapshot>), ViewError> {
    match state.controller.request_period(Period::new(body.period))? {
        PeriodRequest::Unchanged => Ok((StatusCode::OK, Json(state.controller.snapshot()))),
        PeriodRequest::Issued(ticket) => {
            let snapshot = state.controller.snapshot();
            let controller = state.controller.clone();
            tokio::spawn(async move {
                controller.run(ticket).await;
            });
            Ok((StatusCode::ACCEPTED, Json(snapshot)))
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = match self {
            ViewError::NotReady => StatusCode::CONFLICT,
            ViewError::UnknownPeriod(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
