use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use super::endpoints::*;
use super::State;

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: State) -> axum::Router {
    let routes = axum::Router::new()
        .route("/routes", get(list_routes))
        .route("/routes/all", get(list_all_routes))
        .route("/routes/total_routes_and_stops", get(route_and_stop_count))
        .route("/routes/{route_id}", get(get_route))
        .route("/routes/{route_id}/stops", get(get_route_stops))
        .route("/routes/{route_id}/actual", get(get_actual_sequence))
        .route(
            "/routes/{route_id}/generate/planned_routes",
            post(generate_planned_route),
        )
        .route("/routes/{route_id}/comparison", get(get_route_comparison))
        .route("/routes/{route_id}/metrics", get(get_route_metrics));

    axum::Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
