//! learnlens-core: learning insights from assessment and study-session data.
//!
//! This crate defines the data model, the insights analyzer (aggregation,
//! trend estimation, topic classification, forecasting, recommendations and
//! class rollups) and the report types the rest of learnlens builds on.

pub mod analyzer;
pub mod class;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod predict;
pub mod recommend;
pub mod report;
pub mod statistics;
pub mod topics;

pub use analyzer::InsightsAnalyzer;
pub use config::{AnalyzerConfig, LearnlensConfig};
pub use error::InsightError;
pub use model::Dataset;
