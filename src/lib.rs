//! wxdigest library
//!
//! Reshapes Open-Meteo point forecasts into time-keyed records and compresses each
//! day's hours into a handful of weather segments.

pub mod adapter;
pub mod assembler;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod overview;
pub mod service;
pub mod summary;
pub mod wind;

pub use data::{Overview, OverviewError};
pub use overview::{build_overview, DetailLevel};
