//! Response shapes of the event routes.

use crate::core::{StateName, StateValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Body of the `200` and `409` responses.
#[derive(Debug, Serialize)]
pub struct NextState<T> {
    #[serde(rename = "nextState")]
    pub next_state: T,
}

/// Outcome of one event request.
#[derive(Clone, Debug, PartialEq)]
pub enum EventResponse {
    /// The machine moved and the new state was saved.
    Applied(StateName),
    /// The machine stayed where it was; nothing was saved.
    Rejected(StateValue),
    /// Load, instantiate, run or save failed.
    Failed,
}

impl EventResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Applied(_) => StatusCode::OK,
            Self::Rejected(_) => StatusCode::CONFLICT,
            Self::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Applied(key) => (status, Json(NextState { next_state: key })).into_response(),
            Self::Rejected(value) => {
                (status, Json(NextState { next_state: value })).into_response()
            }
            Self::Failed => (status, Json(serde_json::json!({}))).into_response(),
        }
    }
}
