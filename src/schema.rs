pub const SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS routes (
    route_id VARCHAR(100) PRIMARY KEY,
    station_code VARCHAR(20),
    date_yyyy_mm_dd DATE NOT NULL,
    departure_time_utc TIME NOT NULL,
    executor_capacity_cm3 DOUBLE PRECISION NOT NULL,
    route_score VARCHAR(20),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS stops (
    stop_id SERIAL PRIMARY KEY,
    route_id VARCHAR(100) NOT NULL REFERENCES routes (route_id) ON DELETE CASCADE,
    stop_code VARCHAR(10) NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lng DOUBLE PRECISION NOT NULL,
    type VARCHAR(20) NOT NULL,
    zone_id VARCHAR(20),
    UNIQUE (route_id, stop_code)
);

CREATE TABLE IF NOT EXISTS actual_route_sequence (
    id SERIAL PRIMARY KEY,
    route_id VARCHAR(100) NOT NULL REFERENCES routes (route_id) ON DELETE CASCADE,
    stop_code VARCHAR(10) NOT NULL,
    actual_sequence INTEGER NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (route_id, stop_code)
);

CREATE TABLE IF NOT EXISTS planned_route_sequence (
    id SERIAL PRIMARY KEY,
    route_id VARCHAR(100) NOT NULL REFERENCES routes (route_id) ON DELETE CASCADE,
    stop_code VARCHAR(10) NOT NULL,
    planned_sequence INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (route_id, stop_code)
);

CREATE TABLE IF NOT EXISTS route_metrics (
    id SERIAL PRIMARY KEY,
    route_id VARCHAR(100) NOT NULL UNIQUE REFERENCES routes (route_id) ON DELETE CASCADE,
    total_planned_distance_km DOUBLE PRECISION NOT NULL,
    total_actual_distance_km DOUBLE PRECISION NOT NULL,
    distance_delta_km DOUBLE PRECISION NOT NULL,
    distance_delta_percent DOUBLE PRECISION NOT NULL,
    order_matched_stops INTEGER NOT NULL,
    order_match_percentage DOUBLE PRECISION NOT NULL,
    prefix_match_count INTEGER NOT NULL,
    total_stops INTEGER NOT NULL,
    generated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

"#;
