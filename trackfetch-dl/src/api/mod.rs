//! HTTP API handlers for trackfetch-dl

pub mod dataset;
pub mod health;
pub mod ui;

pub use dataset::dataset_routes;
pub use health::health_routes;
pub use ui::ui_routes;
