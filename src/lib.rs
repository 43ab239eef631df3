//! Growth tracking for family members: measurement timelines, BMI bands,
//! height and weight forecasts, CSV export and whole-account backup/restore
//! on top of a document store.

pub mod config;
pub mod error;
pub mod files;
pub mod models;
pub mod reference;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::GrowthConfig;
pub use error::{GrowthError, Result};
