//! Terminal dashboard over the route analysis API.
//!
//! The dashboard keeps one view at a time: a page of routes, the selected
//! route's planned and actual sequences, and its metrics.

pub mod app;
pub mod auth;
pub mod pagination;
pub mod render;

pub use app::{Command, Dashboard, Flow, MapMode};
pub use auth::SessionStore;
pub use pagination::Pagination;
