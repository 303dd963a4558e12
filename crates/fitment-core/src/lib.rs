// Public fallible APIs in this crate share one concrete error contract
// (`FitmentError`); per-function `# Errors` boilerplate would duplicate it.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type"
)]

pub mod batch;
pub mod catalog;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod matcher;
pub mod models;
pub mod report;
pub mod repository;
pub mod resolve;
pub mod row;
pub mod service;
pub mod state;

pub use catalog::{MemoryProductCatalog, ProductCatalog};
pub use error::{FitmentError, Result};
pub use models::{FilterCategory, FitmentRecord, ResolutionStatus};
pub use repository::{FitmentStore, MemoryFitmentStore};
pub use resolve::ResolutionEngine;
pub use service::FitmentService;
pub use state::SqliteFitmentStore;
