use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use route_insights::api::client::Client;
use route_insights::dashboard::{Command, Dashboard, Flow, MapMode, SessionStore};

#[derive(Clone, Default)]
struct Mock {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Mock {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

fn route(id: &str) -> Value {
    json!({
        "route_id": id,
        "station_code": "DLA3",
        "date_YYYY_MM_DD": "2018-07-27",
        "departure_time_utc": "16:02:10",
        "executor_capacity_cm3": 3313071.0,
        "route_score": "High"
    })
}

fn listed(id: &str) -> Value {
    let mut r = route(id);
    r["stop_count"] = json!(3);
    r
}

fn stop(code: &str, key: &str, seq: i32, lng: f64, kind: &str) -> Value {
    let mut s = json!({
        "stop_code": code,
        "lat": 34.0,
        "lng": lng,
        "zone_id": null,
        "type": kind
    });
    s[key] = json!(seq);
    s
}

async fn api(State(mock): State<Mock>, method: Method, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches("/api/v1");
    let call = match uri.query() {
        Some(q) => format!("{method} {path}?{q}"),
        None => format!("{method} {path}"),
    };
    mock.calls.lock().unwrap().push(call);

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let body = match (method.as_str(), segments.as_slice()) {
        ("GET", ["routes", "total_routes_and_stops"]) => {
            json!({"route_count": 12, "stop_count": 36})
        }
        ("GET", ["routes"]) => match uri.query() {
            Some("skip=0&limit=10") => json!([listed("R1"), listed("R2")]),
            Some("skip=10&limit=10") => json!([listed("R11")]),
            _ => json!([]),
        },
        (_, ["routes", "BROKEN", ..]) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"})))
                .into_response();
        }
        ("POST", ["routes", id, "generate", "planned_routes"]) => json!({
            "route": route(id),
            "planned_route": [
                stop("DS", "planned_sequence", 0, -118.0, "Station"),
                stop("AA", "planned_sequence", 1, -118.01, "Dropoff"),
            ]
        }),
        ("GET", ["routes", id, "comparison"]) => json!({
            "route": route(id),
            "planned_route": [
                stop("DS", "planned_sequence", 0, -118.0, "Station"),
                stop("AA", "planned_sequence", 1, -118.01, "Dropoff"),
            ],
            "actual_route": [
                stop("DS", "actual_sequence", 0, -118.0, "Station"),
                stop("AA", "actual_sequence", 1, -118.01, "Dropoff"),
            ]
        }),
        ("GET", ["routes", id, "metrics"]) => json!({
            "route": route(id),
            "metrics": {
                "route_id": id,
                "total_planned_distance_km": 0.92,
                "total_actual_distance_km": 0.92,
                "distance_delta_km": 0.0,
                "distance_delta_percent": 0.0,
                "order_matched_stops": 2,
                "order_match_percentage": 100.0,
                "prefix_match_count": 2,
                "total_stops": 2,
                "generated_at": "2024-01-01T00:00:00Z"
            }
        }),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(body).into_response()
}

async fn spawn_mock() -> (Mock, String) {
    let mock = Mock::default();
    let app = axum::Router::new().fallback(api).with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (mock, format!("http://{addr}/api/v1"))
}

fn dashboard(base: &str, session: &std::path::Path) -> Dashboard {
    let client = Client::new(base).unwrap();
    Dashboard::new(client, SessionStore::new(session)).unwrap()
}

#[tokio::test]
async fn login_loads_stats_first_page_and_selects_first_route() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));

    let flow = dash
        .handle("login admin admin123".parse().unwrap())
        .await;
    assert_eq!(flow, Flow::Continue);
    assert_eq!(dash.username(), Some("admin"));

    assert_eq!(
        mock.calls(),
        [
            "GET /routes/total_routes_and_stops",
            "GET /routes?skip=0&limit=10",
            "POST /routes/R1/generate/planned_routes",
            "GET /routes/R1/comparison",
            "GET /routes/R1/metrics",
        ]
    );

    let view = dash.view();
    assert_eq!(view.pagination.total_pages, 2);
    assert_eq!(view.routes.len(), 2);
    assert_eq!(view.selected.as_deref(), Some("R1"));
    assert_eq!(view.comparison.as_ref().unwrap().planned_route.len(), 2);
    assert_eq!(view.metrics.as_ref().unwrap().order_match_percentage, 100.0);

    let screen = dash.render();
    assert!(screen.contains("Page 1 of 2"));
    assert!(screen.contains("Order Match            100% (2 / 2 stops)"));
}

#[tokio::test]
async fn selecting_a_route_issues_generate_comparison_metrics_in_order() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));
    dash.handle("login admin admin123".parse().unwrap()).await;
    mock.reset();

    dash.handle(Command::Select("#2".to_string())).await;

    assert_eq!(
        mock.calls(),
        [
            "POST /routes/R2/generate/planned_routes",
            "GET /routes/R2/comparison",
            "GET /routes/R2/metrics",
        ]
    );
    assert_eq!(dash.view().selected_route().unwrap().route.route_id, "R2");
}

#[tokio::test]
async fn paging_respects_bounds() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));
    dash.handle("login admin admin123".parse().unwrap()).await;
    mock.reset();

    dash.handle(Command::Prev).await;
    assert!(mock.calls().is_empty());
    assert_eq!(dash.notice(), Some("Already on the first page"));

    dash.handle(Command::Next).await;
    assert_eq!(mock.calls()[0], "GET /routes?skip=10&limit=10");
    assert_eq!(dash.view().pagination.page, 1);
    assert_eq!(dash.view().selected.as_deref(), Some("R11"));

    mock.reset();
    dash.handle(Command::Next).await;
    assert!(mock.calls().is_empty());
    assert_eq!(dash.notice(), Some("Already on the last page"));

    dash.handle(Command::Page(9)).await;
    assert!(mock.calls().is_empty());
    assert_eq!(dash.notice(), Some("No page 9"));
}

#[tokio::test]
async fn failed_generation_leaves_route_view_empty() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));
    dash.handle("login admin admin123".parse().unwrap()).await;
    mock.reset();

    dash.handle(Command::Select("BROKEN".to_string())).await;

    assert_eq!(mock.calls(), ["POST /routes/BROKEN/generate/planned_routes"]);
    assert_eq!(dash.view().selected.as_deref(), Some("BROKEN"));
    assert!(dash.view().comparison.is_none());
    assert!(dash.view().metrics.is_none());
}

#[tokio::test]
async fn map_can_switch_between_planned_and_actual() {
    let (_mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));
    dash.handle("login admin admin123".parse().unwrap()).await;

    assert!(dash.render().contains("[Planned Route]"));

    dash.handle(Command::Show(MapMode::Actual)).await;
    assert_eq!(dash.view().map_mode, MapMode::Actual);
    assert!(dash.render().contains("[Actual Route]"));
}

#[tokio::test]
async fn session_survives_restart_and_logout_clears_it() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session");

    let mut dash = dashboard(&base, &session);
    assert!(dash.render().contains("admin / admin123"));

    dash.handle("login admin nope".parse().unwrap()).await;
    assert_eq!(dash.username(), None);
    assert!(dash.render().contains("Invalid username or password"));
    assert!(mock.calls().is_empty());

    dash.handle("login admin admin123".parse().unwrap()).await;

    let mut restarted = dashboard(&base, &session);
    assert_eq!(restarted.username(), Some("admin"));

    restarted.handle(Command::Logout).await;
    assert_eq!(restarted.username(), None);
    assert!(restarted.view().routes.is_empty());
    assert!(restarted.view().stats.is_none());
    assert!(!session.exists());
}

#[tokio::test]
async fn commands_need_a_login() {
    let (mock, base) = spawn_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let mut dash = dashboard(&base, &dir.path().join("session"));

    dash.handle(Command::Next).await;
    dash.handle(Command::Refresh).await;

    assert!(mock.calls().is_empty());
    assert_eq!(dash.notice(), Some("Log in first"));
    assert_eq!(dash.handle(Command::Quit).await, Flow::Quit);
}
