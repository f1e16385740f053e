//! Loads the last-mile dataset files into the route tables.
//!
//! Both files are JSON arrays of single-key objects keyed by route id.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveTime};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::api::types::{ActualSequenceEntry, Stop};
use crate::repository::{self, NewRoute};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub station_code: Option<String>,

    #[serde(rename = "date_YYYY_MM_DD")]
    pub date: NaiveDate,

    pub departure_time_utc: NaiveTime,
    pub executor_capacity_cm3: f64,
    pub route_score: Option<String>,

    /// Kept in file order, which decides ties when planning.
    #[serde(default, deserialize_with = "in_file_order")]
    pub stops: Vec<(String, StopEntry)>,
}

fn in_file_order<'de, D, T>(d: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct Entries<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for Entries<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    d.deserialize_map(Entries(PhantomData))
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StopEntry {
    pub lat: f64,
    pub lng: f64,

    #[serde(rename = "type")]
    pub kind: String,

    /// Anything that isn't a string (null, numbers) is treated as missing.
    #[serde(default)]
    pub zone_id: serde_json::Value,
}

impl StopEntry {
    pub fn to_stop(&self, stop_code: &str) -> Stop {
        Stop {
            stop_code: stop_code.to_string(),
            lat: self.lat,
            lng: self.lng,
            kind: self.kind.clone(),
            zone_id: self.zone_id.as_str().map(str::to_string),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ActualEntry {
    pub actual: Option<BTreeMap<String, i32>>,
}

impl ActualEntry {
    /// Entries ordered by their recorded position.
    pub fn sequence(&self) -> Option<Vec<ActualSequenceEntry>> {
        let actual = self.actual.as_ref()?;

        let mut entries: Vec<_> = actual
            .iter()
            .map(|(stop_code, &actual_sequence)| ActualSequenceEntry {
                stop_code: stop_code.clone(),
                actual_sequence,
            })
            .collect();
        entries.sort_by_key(|e| e.actual_sequence);

        Some(entries)
    }
}

fn flatten<T>(items: Vec<BTreeMap<String, T>>) -> Vec<(String, T)> {
    items.into_iter().flat_map(BTreeMap::into_iter).collect()
}

const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replaces bare `NaN` and `Infinity` tokens, which the dataset files contain
/// but JSON does not allow, with `null`. String contents are left alone.
pub fn null_non_finite(json: &str) -> String {
    let bytes = json.as_bytes();
    let mut out = String::with_capacity(json.len());
    let mut copied = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE
            .iter()
            .find(|t| bytes[i..].starts_with(t.as_bytes()))
        {
            out.push_str(&json[copied..i]);
            out.push_str("null");
            i += token.len();
            copied = i;
            continue;
        }

        i += 1;
    }

    out.push_str(&json[copied..]);
    out
}

pub fn parse_route_metadata(json: &str) -> serde_json::Result<Vec<(String, RouteEntry)>> {
    let items: Vec<BTreeMap<String, RouteEntry>> = serde_json::from_str(&null_non_finite(json))?;
    Ok(flatten(items))
}

pub fn parse_actual_sequences(json: &str) -> serde_json::Result<Vec<(String, ActualEntry)>> {
    let items: Vec<BTreeMap<String, ActualEntry>> = serde_json::from_str(&null_non_finite(json))?;
    Ok(flatten(items))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub routes: usize,
    pub stops: usize,
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn log(&self) {
        log::info!("Routes written: {}", self.routes);
        log::info!("Stops written: {}", self.stops);

        if !self.skipped.is_empty() {
            log::warn!("Skipped routes ({}):", self.skipped.len());
            for route_id in &self.skipped {
                log::warn!("  - {route_id}");
            }
        }
    }
}

/// Writes routes and their stops. Existing routes and stops are kept as they are.
pub async fn import_route_metadata(
    pool: &sqlx::PgPool,
    routes: &[(String, RouteEntry)],
) -> anyhow::Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for (route_id, entry) in routes {
        let mut tx = pool.begin().await?;

        let route = NewRoute {
            route_id,
            station_code: entry.station_code.as_deref(),
            date: entry.date,
            departure_time_utc: entry.departure_time_utc,
            executor_capacity_cm3: entry.executor_capacity_cm3,
            route_score: entry.route_score.as_deref(),
        };

        if repository::insert_route(&mut *tx, &route).await? {
            summary.routes += 1;
        }

        for (stop_code, stop) in &entry.stops {
            if repository::insert_stop(&mut *tx, route_id, &stop.to_stop(stop_code)).await? {
                summary.stops += 1;
            }
        }

        tx.commit().await?;
        log::debug!("Imported route {route_id} ({} stops)", entry.stops.len());
    }

    Ok(summary)
}

/// Writes recorded stop sequences. Routes that are unknown, lack an `actual`
/// object or fail to write are skipped.
pub async fn import_actual_sequences(
    pool: &sqlx::PgPool,
    entries: &[(String, ActualEntry)],
) -> anyhow::Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for (route_id, entry) in entries {
        if !repository::route_exists(pool, route_id).await? {
            log::warn!("Skipping {route_id}: route not found");
            summary.skipped.push(route_id.clone());
            continue;
        }

        let Some(sequence) = entry.sequence() else {
            log::warn!("Skipping {route_id}: no actual sequence");
            summary.skipped.push(route_id.clone());
            continue;
        };

        match write_actual_sequence(pool, route_id, &sequence).await {
            Ok(()) => {
                summary.routes += 1;
                summary.stops += sequence.len();
                log::debug!("Imported {} stops for {route_id}", sequence.len());
            }
            Err(e) => {
                log::error!("Error inserting route {route_id}: {e}");
                summary.skipped.push(route_id.clone());
            }
        }
    }

    Ok(summary)
}

async fn write_actual_sequence(
    pool: &sqlx::PgPool,
    route_id: &str,
    sequence: &[ActualSequenceEntry],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    for entry in sequence {
        repository::insert_actual_entry(&mut *tx, route_id, entry).await?;
    }

    tx.commit().await
}
