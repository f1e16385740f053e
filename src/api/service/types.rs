use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::types::{ActualStop, PlannedStop, Route, RouteMetrics};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRoutesQuery {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ListRoutesQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ListRoutesQuery {
    pub fn validate(&self) -> Result<(), ErrorResponse> {
        if self.skip < 0 {
            return Err(ErrorResponse::unprocessable("skip must be greater than or equal to 0"));
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&self.limit) {
            return Err(ErrorResponse::unprocessable(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlannedRouteResponse {
    pub route: Route,
    pub planned_route: Vec<PlannedStop>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteComparison {
    pub route: Route,
    pub planned_route: Vec<PlannedStop>,
    pub actual_route: Vec<ActualStop>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteMetricsResponse {
    pub route: Route,
    pub metrics: RouteMetrics,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,

    pub detail: String,
}
