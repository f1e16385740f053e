use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Path, Query, State};
use sqlx::PgPool;

use crate::api::types::*;
use crate::planner;
use crate::repository;

use super::types::*;

pub type Result<T> = std::result::Result<T, ErrorResponse>;

const ROUTE_NOT_FOUND: &str = "Route not found";

async fn require_route(pool: &PgPool, route_id: &str) -> Result<Route> {
    repository::get_route(pool, route_id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found(ROUTE_NOT_FOUND))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn list_all_routes(State(pool): State<PgPool>) -> Result<Json<Vec<RouteWithStopCount>>> {
    let routes = repository::list_routes(&pool, 0, None).await?;
    Ok(Json(routes))
}

pub async fn route_and_stop_count(State(pool): State<PgPool>) -> Result<Json<RouteAndStopCount>> {
    let counts = repository::route_and_stop_count(&pool).await?;
    Ok(Json(counts))
}

pub async fn list_routes(
    State(pool): State<PgPool>,
    query: std::result::Result<Query<ListRoutesQuery>, QueryRejection>,
) -> Result<Json<Vec<RouteWithStopCount>>> {
    let Query(q) = query.map_err(|e| ErrorResponse::unprocessable(e.body_text()))?;
    q.validate()?;

    let routes = repository::list_routes(&pool, q.skip, Some(q.limit)).await?;
    Ok(Json(routes))
}

pub async fn get_route(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<Route>> {
    let route = require_route(&pool, &route_id).await?;
    Ok(Json(route))
}

pub async fn get_route_stops(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<Vec<Stop>>> {
    let stops = repository::get_stops(&pool, &route_id).await?;
    Ok(Json(stops))
}

pub async fn get_actual_sequence(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<Vec<ActualSequenceEntry>>> {
    let sequence = repository::get_actual_sequence(&pool, &route_id).await?;
    Ok(Json(sequence))
}

pub async fn generate_planned_route(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<PlannedRouteResponse>> {
    let route = require_route(&pool, &route_id).await?;

    let stops = repository::get_stops(&pool, &route_id).await?;
    if stops.is_empty() {
        return Err(ErrorResponse::not_found("No stops found for the given route"));
    }

    let planned_route = planner::plan(&stops).inspect_err(|e| {
        log::warn!("cannot plan route {route_id}: {e}");
    })?;

    repository::save_planned_route(&pool, &route_id, &planned_route).await?;
    log::info!(
        "Generated planned route for {route_id} ({} stops)",
        planned_route.len()
    );

    Ok(Json(PlannedRouteResponse {
        route,
        planned_route,
    }))
}

pub async fn get_route_comparison(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteComparison>> {
    let route = require_route(&pool, &route_id).await?;

    let planned_route = repository::get_planned_route(&pool, &route_id).await?;
    let actual_route = repository::get_actual_route(&pool, &route_id).await?;

    let comparison = planner::compare(&planned_route, &actual_route);
    let metrics = repository::upsert_route_metrics(&pool, &route_id, &comparison).await?;
    log::info!(
        "Updated metrics for {route_id}: delta {} km, order match {}%",
        metrics.distance_delta_km,
        metrics.order_match_percentage
    );

    Ok(Json(RouteComparison {
        route,
        planned_route,
        actual_route,
    }))
}

pub async fn get_route_metrics(
    State(pool): State<PgPool>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteMetricsResponse>> {
    let route = require_route(&pool, &route_id).await?;

    let metrics = repository::get_route_metrics(&pool, &route_id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Route metrics not found"))?;

    Ok(Json(RouteMetricsResponse { route, metrics }))
}
