#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Coordinate frame alignment.
pub mod align;

/// Threshold configuration.
pub mod config;

/// Annotation dataset model.
pub mod dataset;

/// The validation driver.
pub mod engine;

/// Error types for the checking engine.
pub mod error;

/// Cross-frame motion consistency analysis.
pub mod motion;

/// Findings and the aggregated report.
pub mod report;

/// The static rule catalogue.
pub mod rules;

pub use align::CoordinateFrameContext;
pub use config::{CheckConfig, UnknownCategoryPolicy};
pub use dataset::{Category, Dataset, Frame, ObjectAnnotation, Orientation};
pub use engine::{check_dataset, check_dataset_serial};
pub use error::CheckError;
pub use report::{Finding, Report, ReportSummary};
pub use rules::Rule;
