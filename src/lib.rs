//! Glucose ET - Relative Bio-Time shift engine for post-prandial glucose
//!
//! Glucose ET turns five glucose readings taken around a meal into a derived
//! "biological time" metric through a deterministic pipeline: index mapping
//! (glucose → T → E) → step changes → mean-E classification → guidance.
//!
//! ## Entry points
//!
//! - **Core**: [`analyze_meal`] over five bare values
//! - **Documents**: [`meal_to_report`] over a `glucose.meal_input.v1` JSON document
//! - **C ABI**: functions in [`ffi`]

pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod guidance;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ReferenceBounds;
pub use error::ComputeError;
pub use pipeline::{analyze_meal, analyze_meal_with_bounds, meal_to_report, MealAnalyzer};
pub use types::{MealAnalysis, MealReport, Status};

// Schema exports
pub use schema::{MealInput, Reading, ValidationError, SCHEMA_VERSION};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "glucose-et";

/// Aggregation model identifier carried in reports
pub const MODEL_LABEL: &str = "mean E anchored";
