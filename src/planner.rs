//! Planned route generation and planned-vs-actual comparison.
//!
//! Everything here is pure: stops come in, sequences and numbers come out.

use serde::Serialize;
use thiserror::Error;

use crate::api::types::{Located, PlannedStop, Stop};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// How many leading stops the prefix match looks at.
pub const PREFIX_MATCH_CAP: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("no station found in route")]
    NoStation,
}

/// Great-circle distance between two points in kilometres.
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

fn distance(a: &impl Located, b: &impl Located) -> f64 {
    haversine(a.lat(), a.lng(), b.lat(), b.lng())
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits the depot from the dropoffs. With several stations the last one wins.
pub fn split_station(stops: &[Stop]) -> Result<(&Stop, Vec<&Stop>), PlanError> {
    let mut station = None;
    let mut dropoffs = Vec::new();

    for stop in stops {
        if stop.is_station() {
            station = Some(stop);
        } else {
            dropoffs.push(stop);
        }
    }

    let station = station.ok_or(PlanError::NoStation)?;
    Ok((station, dropoffs))
}

fn nearest(from: &Stop, candidates: &[&Stop]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, stop) in candidates.iter().enumerate() {
        let d = distance(from, *stop);
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((idx, d)),
        }
    }

    best.map(|(idx, _)| idx)
}

/// Orders the stops with a nearest-neighbour walk starting at the station.
///
/// The station gets sequence 0 and each following stop is the closest
/// unvisited dropoff to the previous one. Ties go to the stop listed first.
pub fn plan(stops: &[Stop]) -> Result<Vec<PlannedStop>, PlanError> {
    let (station, mut remaining) = split_station(stops)?;

    let mut planned = Vec::with_capacity(remaining.len() + 1);
    planned.push(PlannedStop::from_stop(station, 0));

    let mut current = station;
    let mut sequence = 1;

    while let Some(nearest_idx) = nearest(current, &remaining) {
        let nearest = remaining.remove(nearest_idx);
        planned.push(PlannedStop::from_stop(nearest, sequence));

        sequence += 1;
        current = nearest;
    }

    Ok(planned)
}

/// Length of the path through the stops in order, rounded to two decimals.
pub fn total_distance<T: Located>(stops: &[T]) -> f64 {
    let total: f64 = stops.windows(2).map(|w| distance(&w[0], &w[1])).sum();
    round2(total)
}

/// Number of positions holding the same stop in both sequences, and that
/// number as a percentage of the shorter sequence.
pub fn order_match<P: Located, A: Located>(planned: &[P], actual: &[A]) -> (usize, f64) {
    let length = planned.len().min(actual.len());
    if length == 0 {
        return (0, 0.0);
    }

    let matches = planned
        .iter()
        .zip(actual)
        .filter(|(p, a)| p.stop_code() == a.stop_code())
        .count();

    (matches, round2(matches as f64 / length as f64 * 100.0))
}

/// Length of the common leading run, looking at no more than `cap` positions.
pub fn prefix_match<P: Located, A: Located>(planned: &[P], actual: &[A], cap: usize) -> usize {
    planned
        .iter()
        .zip(actual)
        .take(cap)
        .take_while(|(p, a)| p.stop_code() == a.stop_code())
        .count()
}

/// Planned-vs-actual summary for one route.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Comparison {
    pub total_planned_distance_km: f64,
    pub total_actual_distance_km: f64,
    pub distance_delta_km: f64,
    pub distance_delta_percent: f64,
    pub order_matched_stops: usize,
    pub order_match_percentage: f64,
    pub prefix_match_count: usize,
    pub total_stops: usize,
}

pub fn compare<P: Located, A: Located>(planned: &[P], actual: &[A]) -> Comparison {
    let planned_km = total_distance(planned);
    let actual_km = total_distance(actual);

    let delta = planned_km - actual_km;
    let delta_percent = if actual_km != 0.0 {
        delta / actual_km * 100.0
    } else {
        0.0
    };

    let (order_matched_stops, order_match_percentage) = order_match(planned, actual);

    Comparison {
        total_planned_distance_km: planned_km,
        total_actual_distance_km: actual_km,
        distance_delta_km: round2(delta),
        distance_delta_percent: round2(delta_percent),
        order_matched_stops,
        order_match_percentage,
        prefix_match_count: prefix_match(planned, actual, PREFIX_MATCH_CAP),
        total_stops: planned.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ActualStop;

    fn stop(code: &str, kind: &str, lat: f64, lng: f64) -> Stop {
        Stop {
            stop_code: code.to_string(),
            lat,
            lng,
            kind: kind.to_string(),
            zone_id: None,
        }
    }

    fn actual(codes: &[&str]) -> Vec<ActualStop> {
        codes
            .iter()
            .enumerate()
            .map(|(i, code)| ActualStop {
                stop_code: code.to_string(),
                actual_sequence: i as i32,
                lat: 0.0,
                lng: i as f64 * 0.01,
                zone_id: None,
                kind: "Dropoff".to_string(),
            })
            .collect()
    }

    #[test]
    fn haversine_matches_known_distance() {
        // One degree of latitude is ~111.19 km.
        let d = haversine(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "{d}");
        assert_eq!(haversine(34.0, -118.0, 34.0, -118.0), 0.0);
    }

    #[test]
    fn plan_starts_at_station_and_walks_to_nearest() {
        let stops = vec![
            stop("FAR", "Dropoff", 0.0, 0.3),
            stop("DS", "Station", 0.0, 0.0),
            stop("MID", "Dropoff", 0.0, 0.2),
            stop("NEAR", "Dropoff", 0.0, 0.1),
        ];

        let planned = plan(&stops).unwrap();
        let codes: Vec<_> = planned.iter().map(|s| s.stop_code.as_str()).collect();
        assert_eq!(codes, ["DS", "NEAR", "MID", "FAR"]);

        let sequences: Vec<_> = planned.iter().map(|s| s.planned_sequence).collect();
        assert_eq!(sequences, [0, 1, 2, 3]);
        assert_eq!(planned[0].kind, "Station");
    }

    #[test]
    fn plan_breaks_ties_by_input_order() {
        let stops = vec![
            stop("DS", "station", 0.0, 0.0),
            stop("EAST", "Dropoff", 0.0, 0.1),
            stop("WEST", "Dropoff", 0.0, -0.1),
        ];

        let planned = plan(&stops).unwrap();
        assert_eq!(planned[1].stop_code, "EAST");
        assert_eq!(planned[2].stop_code, "WEST");
    }

    #[test]
    fn plan_without_station_fails() {
        let stops = vec![stop("A", "Dropoff", 0.0, 0.0)];
        assert_eq!(plan(&stops), Err(PlanError::NoStation));
    }

    #[test]
    fn plan_with_only_station_is_just_the_station() {
        let planned = plan(&[stop("DS", "Station", 1.0, 2.0)]).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].planned_sequence, 0);
    }

    #[test]
    fn total_distance_sums_legs() {
        let stops = vec![
            stop("A", "Station", 0.0, 0.0),
            stop("B", "Dropoff", 1.0, 0.0),
            stop("C", "Dropoff", 2.0, 0.0),
        ];
        assert_eq!(total_distance(&stops), 222.39);
        assert_eq!(total_distance(&stops[..1]), 0.0);
        assert_eq!(total_distance::<Stop>(&[]), 0.0);
    }

    #[test]
    fn order_match_compares_positions_of_shorter_sequence() {
        let planned = actual(&["DS", "A", "B", "C"]);
        let driven = actual(&["DS", "B", "A"]);

        assert_eq!(order_match(&planned, &driven), (1, 33.33));
        assert_eq!(order_match(&planned, &actual(&[])), (0, 0.0));
    }

    #[test]
    fn prefix_match_stops_at_first_difference_and_cap() {
        let planned = actual(&["DS", "A", "B", "C"]);
        assert_eq!(prefix_match(&planned, &actual(&["DS", "A", "C", "B"]), 10), 2);
        assert_eq!(prefix_match(&planned, &planned, 10), 4);
        assert_eq!(prefix_match(&planned, &planned, 3), 3);

        let long: Vec<String> = (0..15).map(|i| format!("S{i}")).collect();
        let long: Vec<&str> = long.iter().map(String::as_str).collect();
        let long = actual(&long);
        assert_eq!(prefix_match(&long, &long, PREFIX_MATCH_CAP), 10);
    }

    #[test]
    fn compare_computes_deltas() {
        let planned = actual(&["DS", "A", "B"]);
        let mut driven = actual(&["DS", "B", "A", "C"]);
        driven[3].lng = 0.05;

        let c = compare(&planned, &driven);
        assert_eq!(c.total_stops, 3);
        assert_eq!(c.order_matched_stops, 1);
        assert_eq!(c.prefix_match_count, 1);
        assert_eq!(c.distance_delta_km, round2(c.total_planned_distance_km - c.total_actual_distance_km));
        assert!(c.distance_delta_percent < 0.0);
    }

    #[test]
    fn compare_with_no_actual_distance_has_zero_percent() {
        let planned = actual(&["DS", "A"]);
        let c = compare(&planned, &actual(&[]));
        assert_eq!(c.total_actual_distance_km, 0.0);
        assert_eq!(c.distance_delta_percent, 0.0);
        assert_eq!(c.distance_delta_km, c.total_planned_distance_km);
        assert_eq!(c.order_match_percentage, 0.0);
    }
}
