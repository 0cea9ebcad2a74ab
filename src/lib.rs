pub mod analyzer;
pub mod columns;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filters;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod reports;
pub mod schema;
pub mod store;

pub use error::{AnalyzerError, Result};
