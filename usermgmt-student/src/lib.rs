//! # Student Validation Core
//!
//! Validates batches of candidate student records before they are
//! created or updated:
//! - bulk reference resolution through narrow repository traits
//! - intra-batch deduplication of unique identifiers
//! - fail-fast field validators
//! - the enrollment status state machine
//!
//! [`ValidationManager::fully_validate`] returns the records to create, the
//! records to update and per-record [`FieldError`]s.
//! [`StudentImportService`] adds the upsert step on top.

pub mod config;
pub mod db;
pub mod enrollment;
pub mod field_error;
pub mod models;
pub mod reference_data;
pub mod repository;
pub mod services;
pub mod validators;

pub use config::ValidationSettings;
pub use field_error::{Field, FieldError, InvalidReason, NestedField};
pub use models::{StudentRecord, ValidatedStudent, ValidationMode, ValidationOutcome};
pub use reference_data::ReferenceData;
pub use repository::Repositories;
pub use services::{
    ImportReport, ReferenceResolver, StudentImportService, StudentUpserter, ValidationManager,
    ValidationOptions,
};
