//! Text rendering of the dashboard panels.

use crate::api::service::types::RouteComparison;
use crate::api::types::*;

use super::app::MapMode;
use super::auth::CREDENTIALS_HINT;
use super::pagination::Pagination;

pub const MAP_WIDTH: usize = 61;
pub const MAP_HEIGHT: usize = 21;

/// Used when the planned route has no station to centre on.
pub const FALLBACK_CENTER: (f64, f64) = (34.007369, -118.143927);

const PATH: char = '.';
const COLLISION: char = '*';

pub fn login_screen(error: Option<&str>) -> String {
    let mut out = String::from("== Login ==\nlogin <username> <password>\n");
    if let Some(error) = error {
        out.push_str(error);
        out.push('\n');
    }
    out.push_str(CREDENTIALS_HINT);
    out.push('\n');
    out
}

pub fn header(username: &str) -> String {
    format!("== Route Insights == logged in as {username} (logout to leave)\n")
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn stats_cards(stats: Option<&RouteAndStopCount>) -> String {
    match stats {
        None => "[ loading... ]\n[ loading... ]\n".to_string(),
        Some(stats) => format!(
            "[ Total Routes {:>10} ]\n[ Total Stops  {:>10} ]\n",
            stats.route_count, stats.stop_count
        ),
    }
}

pub fn list_item(index: usize, route: &RouteWithStopCount, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    let r = &route.route;

    format!(
        "{marker} #{index} {}\n    Station: {}\n    Total Stops: {}\n    Departure: {} ({})\n    Capacity: {} cm3\n",
        r.route_id,
        r.station_code.as_deref().unwrap_or("-"),
        route.stop_count,
        r.departure_time_utc.format("%H:%M:%S"),
        r.date.format("%Y-%m-%d"),
        group_thousands(r.executor_capacity_cm3.round() as i64)
    )
}

pub fn pagination_footer(pagination: &Pagination) -> String {
    if !pagination.has_footer() {
        return String::new();
    }

    let prev = if pagination.prev().is_some() { "prev" } else { "----" };
    let next = if pagination.next().is_some() { "next" } else { "----" };

    format!(
        "{prev}   Page {} of {}   {next}\n",
        pagination.page + 1,
        pagination.total_pages
    )
}

pub fn route_list(
    routes: &[RouteWithStopCount],
    selected: Option<&str>,
    pagination: &Pagination,
) -> String {
    let mut out = String::new();

    if routes.is_empty() {
        out.push_str("No routes available\n");
    }

    for (i, route) in routes.iter().enumerate() {
        let is_selected = selected == Some(route.route.route_id.as_str());
        out.push_str(&list_item(i + 1, route, is_selected));
    }

    out.push_str(&pagination_footer(pagination));
    out
}

pub fn metric_cards(metrics: &RouteMetrics) -> String {
    [
        format!("Planned Distance       {} km", metrics.total_planned_distance_km),
        format!("Actual Distance        {} km", metrics.total_actual_distance_km),
        format!(
            "Distance Delta         {} km ({}%)",
            metrics.distance_delta_km, metrics.distance_delta_percent
        ),
        format!(
            "Order Match            {}% ({} / {} stops)",
            metrics.order_match_percentage, metrics.order_matched_stops, metrics.total_stops
        ),
        format!("Prefix Match (Top-10)  {}", metrics.prefix_match_count),
    ]
    .into_iter()
    .map(|line| line + "\n")
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub sequence: i32,
    pub stop_code: String,
    pub lat: f64,
    pub lng: f64,
}

impl MapMarker {
    fn glyph(&self) -> char {
        if self.sequence == 0 {
            return 'S';
        }
        std::char::from_digit(self.sequence.rem_euclid(36) as u32, 36).unwrap_or(COLLISION)
    }
}

/// Markers for the sequence the map currently shows, ordered by sequence.
pub fn markers(comparison: &RouteComparison, mode: MapMode) -> Vec<MapMarker> {
    let mut markers: Vec<MapMarker> = match mode {
        MapMode::Planned => comparison
            .planned_route
            .iter()
            .map(|s| MapMarker {
                sequence: s.planned_sequence,
                stop_code: s.stop_code.clone(),
                lat: s.lat,
                lng: s.lng,
            })
            .collect(),
        MapMode::Actual => comparison
            .actual_route
            .iter()
            .map(|s| MapMarker {
                sequence: s.actual_sequence,
                stop_code: s.stop_code.clone(),
                lat: s.lat,
                lng: s.lng,
            })
            .collect(),
    };

    markers.sort_by_key(|m| m.sequence);
    markers
}

/// The station of the planned route, or [`FALLBACK_CENTER`].
pub fn map_center(planned: &[PlannedStop]) -> (f64, f64) {
    planned
        .iter()
        .find(|s| s.kind.eq_ignore_ascii_case("station"))
        .map(|s| (s.lat, s.lng))
        .unwrap_or(FALLBACK_CENTER)
}

/// Projects markers onto a `width` x `height` grid centred on `center`.
/// Returns `(column, row)` per marker.
pub fn project(
    markers: &[MapMarker],
    center: (f64, f64),
    width: usize,
    height: usize,
) -> Vec<(usize, usize)> {
    let (clat, clng) = center;
    let scale = clat.to_radians().cos();

    let offsets: Vec<(f64, f64)> = markers
        .iter()
        .map(|m| ((m.lng - clng) * scale, m.lat - clat))
        .collect();

    let span = offsets
        .iter()
        .map(|(x, y)| x.abs().max(y.abs()))
        .fold(0.0, f64::max);
    let span = if span > 0.0 { span } else { 1.0 };

    let half_w = (width.saturating_sub(1)) as f64 / 2.0;
    let half_h = (height.saturating_sub(1)) as f64 / 2.0;

    offsets
        .into_iter()
        .map(|(x, y)| {
            let col = (x / span * half_w + half_w).round().clamp(0.0, 2.0 * half_w);
            let row = (-y / span * half_h + half_h).round().clamp(0.0, 2.0 * half_h);
            (col as usize, row as usize)
        })
        .collect()
}

fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize)) {
    let (mut x0, mut y0) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = PATH;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws the markers and the path between consecutive ones inside a frame,
/// followed by a legend.
pub fn map(markers: &[MapMarker], center: (f64, f64), width: usize, height: usize) -> String {
    let mut grid = vec![vec![' '; width]; height];
    let cells = project(markers, center, width, height);

    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1]);
    }

    let mut occupied = vec![vec![false; width]; height];
    for (marker, &(col, row)) in markers.iter().zip(&cells) {
        let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) else {
            continue;
        };

        *cell = if occupied[row][col] {
            COLLISION
        } else {
            marker.glyph()
        };
        occupied[row][col] = true;
    }

    let mut out = String::new();
    let border = format!("+{}+\n", "-".repeat(width));
    out.push_str(&border);
    for row in &grid {
        out.push('|');
        out.extend(row.iter());
        out.push_str("|\n");
    }
    out.push_str(&border);

    for marker in markers {
        out.push_str(&format!(
            "{:>4} {:<6} ({:.4}, {:.4})\n",
            marker.sequence, marker.stop_code, marker.lat, marker.lng
        ));
    }

    out
}

pub fn route_panel(
    route: Option<&RouteWithStopCount>,
    comparison: Option<&RouteComparison>,
    metrics: Option<&RouteMetrics>,
    mode: MapMode,
) -> String {
    let Some(route) = route else {
        return "Select a route to view map & metrics\n".to_string();
    };

    let mut out = format!("== {} ==\n", route.route.route_id);

    let (planned_tab, actual_tab) = match mode {
        MapMode::Planned => ("[Planned Route]", " Actual Route "),
        MapMode::Actual => (" Planned Route ", "[Actual Route]"),
    };
    out.push_str(&format!("{planned_tab} {actual_tab}\n"));

    match comparison {
        Some(comparison) => {
            let center = map_center(&comparison.planned_route);
            out.push_str(&map(
                &markers(comparison, mode),
                center,
                MAP_WIDTH,
                MAP_HEIGHT,
            ));
        }
        None => out.push_str("No route data\n"),
    }

    if let Some(metrics) = metrics {
        out.push_str(&metric_cards(metrics));
    }

    out
}
