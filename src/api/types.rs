use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A delivery route as stored in `routes`.
#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Route {
    pub route_id: String,
    pub station_code: Option<String>,

    #[serde(rename = "date_YYYY_MM_DD")]
    #[sqlx(rename = "date_yyyy_mm_dd")]
    pub date: NaiveDate,

    pub departure_time_utc: NaiveTime,
    pub executor_capacity_cm3: f64,
    pub route_score: Option<String>,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct RouteWithStopCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub route: Route,

    pub stop_count: i64,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAndStopCount {
    pub route_count: i64,
    pub stop_count: i64,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_code: String,
    pub lat: f64,
    pub lng: f64,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,

    pub zone_id: Option<String>,
}

impl Stop {
    pub fn is_station(&self) -> bool {
        self.kind.eq_ignore_ascii_case("station")
    }
}

/// One row of a recorded (driven) sequence, without coordinates.
#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ActualSequenceEntry {
    pub stop_code: String,
    pub actual_sequence: i32,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PlannedStop {
    pub stop_code: String,
    pub planned_sequence: i32,
    pub lat: f64,
    pub lng: f64,
    pub zone_id: Option<String>,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ActualStop {
    pub stop_code: String,
    pub actual_sequence: i32,
    pub lat: f64,
    pub lng: f64,
    pub zone_id: Option<String>,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct RouteMetrics {
    pub route_id: String,
    pub total_planned_distance_km: f64,
    pub total_actual_distance_km: f64,
    pub distance_delta_km: f64,
    pub distance_delta_percent: f64,
    pub order_matched_stops: i32,
    pub order_match_percentage: f64,
    pub prefix_match_count: i32,
    pub total_stops: i32,
    pub generated_at: DateTime<Utc>,
}

/// Anything with a stop code and a position.
pub trait Located {
    fn stop_code(&self) -> &str;
    fn lat(&self) -> f64;
    fn lng(&self) -> f64;
}

macro_rules! impl_located {
    ($($ty:ty),*) => {
        $(
            impl Located for $ty {
                fn stop_code(&self) -> &str {
                    &self.stop_code
                }

                fn lat(&self) -> f64 {
                    self.lat
                }

                fn lng(&self) -> f64 {
                    self.lng
                }
            }
        )*
    };
}

impl_located!(Stop, PlannedStop, ActualStop);

impl PlannedStop {
    pub fn from_stop(stop: &Stop, planned_sequence: i32) -> Self {
        Self {
            stop_code: stop.stop_code.clone(),
            planned_sequence,
            lat: stop.lat,
            lng: stop.lng,
            zone_id: stop.zone_id.clone(),
            kind: stop.kind.clone(),
        }
    }
}
