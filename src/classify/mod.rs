//! Error classification.
//!
//! Turns raw engine, network and signer failures into a small stable
//! taxonomy with human-readable wording.

pub mod catalog;
pub mod classifier;
pub mod messages;

pub use catalog::{ErrorCatalog, ErrorCategory, CATALOG_VERSION};
pub use classifier::{Classification, ClassifiedError, ErrorClassifier, Stage, Step};
