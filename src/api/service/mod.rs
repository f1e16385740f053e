pub mod endpoints;
pub mod router;
pub mod types;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::db;
use crate::planner::PlanError;

#[derive(Clone)]
pub struct State {
    pub db: db::Database,
}

impl State {
    pub fn new(db: db::Database) -> Self {
        Self { db }
    }
}

impl axum::extract::FromRef<State> for sqlx::PgPool {
    fn from_ref(input: &State) -> Self {
        input.db.pool.clone()
    }
}

impl IntoResponse for types::ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl types::ErrorResponse {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl From<sqlx::Error> for types::ErrorResponse {
    fn from(value: sqlx::Error) -> Self {
        log::error!("db returned error: {value}");
        types::ErrorResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("db returned error: {value}"),
        )
    }
}

impl From<PlanError> for types::ErrorResponse {
    fn from(value: PlanError) -> Self {
        types::ErrorResponse::unprocessable(value.to_string())
    }
}
