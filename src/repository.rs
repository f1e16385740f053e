//! Queries over the route tables.
//!
//! Every function takes any Postgres executor, so callers can pass the pool or
//! a transaction (`&mut *tx`).

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgExecutor;

use crate::api::types::*;
use crate::planner::Comparison;

const ROUTE_COLUMNS: &str = "
    r.route_id,
    r.station_code,
    r.date_yyyy_mm_dd,
    r.departure_time_utc,
    r.executor_capacity_cm3,
    r.route_score
";

/// Routes ordered by id with their stop counts. `limit = None` returns all.
pub async fn list_routes<'e>(
    db: impl PgExecutor<'e>,
    skip: i64,
    limit: Option<i64>,
) -> sqlx::Result<Vec<RouteWithStopCount>> {
    let query = format!(
        "
        SELECT {ROUTE_COLUMNS}, COUNT(s.stop_code) AS stop_count
        FROM routes r
        LEFT JOIN stops s ON s.route_id = r.route_id
        GROUP BY r.route_id
        ORDER BY r.route_id
        OFFSET $1
        LIMIT $2;
    "
    );

    sqlx::query_as(&query)
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn route_and_stop_count<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<RouteAndStopCount> {
    sqlx::query_as(
        "
        SELECT
            (SELECT COUNT(*) FROM routes) AS route_count,
            (SELECT COUNT(*) FROM stops) AS stop_count;
    ",
    )
    .fetch_one(db)
    .await
}

pub async fn get_route<'e>(db: impl PgExecutor<'e>, route_id: &str) -> sqlx::Result<Option<Route>> {
    let query = format!("SELECT {ROUTE_COLUMNS} FROM routes r WHERE r.route_id = $1;");

    sqlx::query_as(&query)
        .bind(route_id)
        .fetch_optional(db)
        .await
}

pub async fn route_exists<'e>(db: impl PgExecutor<'e>, route_id: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM routes WHERE route_id = $1);")
        .bind(route_id)
        .fetch_one(db)
        .await
}

/// Stops of a route in insertion order.
pub async fn get_stops<'e>(db: impl PgExecutor<'e>, route_id: &str) -> sqlx::Result<Vec<Stop>> {
    sqlx::query_as(
        "
        SELECT stop_code, lat, lng, type, zone_id
        FROM stops
        WHERE route_id = $1
        ORDER BY stop_id;
    ",
    )
    .bind(route_id)
    .fetch_all(db)
    .await
}

pub async fn get_actual_sequence<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
) -> sqlx::Result<Vec<ActualSequenceEntry>> {
    sqlx::query_as(
        "
        SELECT stop_code, actual_sequence
        FROM actual_route_sequence
        WHERE route_id = $1
        ORDER BY actual_sequence;
    ",
    )
    .bind(route_id)
    .fetch_all(db)
    .await
}

pub async fn get_planned_route<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
) -> sqlx::Result<Vec<PlannedStop>> {
    sqlx::query_as(
        "
        SELECT p.stop_code, p.planned_sequence, s.lat, s.lng, s.zone_id, s.type
        FROM planned_route_sequence p
        INNER JOIN stops s ON s.route_id = p.route_id AND s.stop_code = p.stop_code
        WHERE p.route_id = $1
        ORDER BY p.planned_sequence;
    ",
    )
    .bind(route_id)
    .fetch_all(db)
    .await
}

pub async fn get_actual_route<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
) -> sqlx::Result<Vec<ActualStop>> {
    sqlx::query_as(
        "
        SELECT a.stop_code, a.actual_sequence, s.lat, s.lng, s.zone_id, s.type
        FROM actual_route_sequence a
        INNER JOIN stops s ON s.route_id = a.route_id AND s.stop_code = a.stop_code
        WHERE a.route_id = $1
        ORDER BY a.actual_sequence;
    ",
    )
    .bind(route_id)
    .fetch_all(db)
    .await
}

/// Replaces the stored planned sequence of a route.
pub async fn save_planned_route(
    pool: &sqlx::PgPool,
    route_id: &str,
    planned: &[PlannedStop],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM planned_route_sequence WHERE route_id = $1;")
        .bind(route_id)
        .execute(&mut *tx)
        .await?;

    for stop in planned {
        sqlx::query(
            "
            INSERT INTO planned_route_sequence (route_id, stop_code, planned_sequence)
            VALUES ($1, $2, $3)
            ON CONFLICT (route_id, stop_code)
            DO UPDATE SET planned_sequence = EXCLUDED.planned_sequence, created_at = now();
        ",
        )
        .bind(route_id)
        .bind(&stop.stop_code)
        .bind(stop.planned_sequence)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

pub async fn upsert_route_metrics<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
    comparison: &Comparison,
) -> sqlx::Result<RouteMetrics> {
    sqlx::query_as(
        "
        INSERT INTO route_metrics (
            route_id,
            total_planned_distance_km,
            total_actual_distance_km,
            distance_delta_km,
            distance_delta_percent,
            order_matched_stops,
            order_match_percentage,
            prefix_match_count,
            total_stops
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (route_id) DO UPDATE SET
            total_planned_distance_km = EXCLUDED.total_planned_distance_km,
            total_actual_distance_km = EXCLUDED.total_actual_distance_km,
            distance_delta_km = EXCLUDED.distance_delta_km,
            distance_delta_percent = EXCLUDED.distance_delta_percent,
            order_matched_stops = EXCLUDED.order_matched_stops,
            order_match_percentage = EXCLUDED.order_match_percentage,
            prefix_match_count = EXCLUDED.prefix_match_count,
            total_stops = EXCLUDED.total_stops,
            generated_at = now()
        RETURNING
            route_id,
            total_planned_distance_km,
            total_actual_distance_km,
            distance_delta_km,
            distance_delta_percent,
            order_matched_stops,
            order_match_percentage,
            prefix_match_count,
            total_stops,
            generated_at;
    ",
    )
    .bind(route_id)
    .bind(comparison.total_planned_distance_km)
    .bind(comparison.total_actual_distance_km)
    .bind(comparison.distance_delta_km)
    .bind(comparison.distance_delta_percent)
    .bind(comparison.order_matched_stops as i32)
    .bind(comparison.order_match_percentage)
    .bind(comparison.prefix_match_count as i32)
    .bind(comparison.total_stops as i32)
    .fetch_one(db)
    .await
}

pub async fn get_route_metrics<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
) -> sqlx::Result<Option<RouteMetrics>> {
    sqlx::query_as(
        "
        SELECT
            route_id,
            total_planned_distance_km,
            total_actual_distance_km,
            distance_delta_km,
            distance_delta_percent,
            order_matched_stops,
            order_match_percentage,
            prefix_match_count,
            total_stops,
            generated_at
        FROM route_metrics
        WHERE route_id = $1;
    ",
    )
    .bind(route_id)
    .fetch_optional(db)
    .await
}

pub struct NewRoute<'a> {
    pub route_id: &'a str,
    pub station_code: Option<&'a str>,
    pub date: NaiveDate,
    pub departure_time_utc: NaiveTime,
    pub executor_capacity_cm3: f64,
    pub route_score: Option<&'a str>,
}

/// Inserts a route unless one with the same id exists. Returns whether a row
/// was written.
pub async fn insert_route<'e>(db: impl PgExecutor<'e>, route: &NewRoute<'_>) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "
        INSERT INTO routes (
            route_id,
            station_code,
            date_yyyy_mm_dd,
            departure_time_utc,
            executor_capacity_cm3,
            route_score
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (route_id) DO NOTHING;
    ",
    )
    .bind(route.route_id)
    .bind(route.station_code)
    .bind(route.date)
    .bind(route.departure_time_utc)
    .bind(route.executor_capacity_cm3)
    .bind(route.route_score)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Inserts a stop unless the route already has one with that code.
pub async fn insert_stop<'e>(db: impl PgExecutor<'e>, route_id: &str, stop: &Stop) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "
        INSERT INTO stops (route_id, stop_code, lat, lng, type, zone_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (route_id, stop_code) DO NOTHING;
    ",
    )
    .bind(route_id)
    .bind(&stop.stop_code)
    .bind(stop.lat)
    .bind(stop.lng)
    .bind(&stop.kind)
    .bind(&stop.zone_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_actual_entry<'e>(
    db: impl PgExecutor<'e>,
    route_id: &str,
    entry: &ActualSequenceEntry,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "
        INSERT INTO actual_route_sequence (route_id, stop_code, actual_sequence)
        VALUES ($1, $2, $3)
        ON CONFLICT (route_id, stop_code) DO UPDATE SET actual_sequence = EXCLUDED.actual_sequence;
    ",
    )
    .bind(route_id)
    .bind(&entry.stop_code)
    .bind(entry.actual_sequence)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
