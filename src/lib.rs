pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod import;
pub mod planner;
pub mod repository;
pub mod schema;
