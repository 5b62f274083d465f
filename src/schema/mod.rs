//! glucose.meal_input.v1 schema
//!
//! This module defines the input document a caller submits for one meal:
//! five labelled, optionally timestamped glucose readings.

mod meal_input;

pub use meal_input::*;
