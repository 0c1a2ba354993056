//! Validation pipeline services

pub mod batch_deduplicator;
pub mod import_service;
pub mod reference_resolver;
pub mod validation_manager;

pub use batch_deduplicator::dedup_batch;
pub use import_service::{ImportReport, StudentImportService, StudentUpserter};
pub use reference_resolver::ReferenceResolver;
pub use validation_manager::{ValidationManager, ValidationOptions};
