//! Student import: validation followed by the upsert
//!
//! The upserter contract is all-or-nothing per call. In lenient mode the
//! valid records are written and the errors reported; in strict mode a
//! single error keeps the whole batch out of storage.

use crate::field_error::FieldError;
use crate::models::{StudentRecord, ValidatedStudent, ValidationMode};
use crate::services::validation_manager::{ValidationManager, ValidationOptions};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use usermgmt_common::Result;

/// Persists validated students
#[async_trait::async_trait]
pub trait StudentUpserter: Send + Sync {
    /// Write both lists atomically
    async fn upsert(
        &self,
        to_create: &[ValidatedStudent],
        to_update: &[ValidatedStudent],
    ) -> Result<()>;
}

/// Summary returned to the caller of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub errors: Vec<FieldError>,
    /// Strict mode refused the batch
    pub rejected: bool,
}

impl ImportReport {
    pub fn written(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

pub struct StudentImportService {
    manager: ValidationManager,
    upserter: Arc<dyn StudentUpserter>,
}

impl StudentImportService {
    pub fn new(manager: ValidationManager, upserter: Arc<dyn StudentUpserter>) -> Self {
        Self { manager, upserter }
    }

    /// Validate a batch and upsert what `mode` accepts
    pub async fn import(
        &self,
        records: Vec<StudentRecord>,
        options: ValidationOptions,
        mode: ValidationMode,
        cancel: &CancellationToken,
    ) -> Result<ImportReport> {
        let outcome = self.manager.fully_validate(records, options, cancel).await?;
        let errors = outcome.errors.clone();

        let (to_create, to_update) = match outcome.into_accepted(mode) {
            Ok(accepted) => accepted,
            Err(rejected) => {
                tracing::warn!(
                    errored_records = rejected.errored_records,
                    errors = rejected.errors.len(),
                    "Strict import rejected, nothing written"
                );
                return Ok(ImportReport {
                    errors: rejected.errors,
                    rejected: true,
                    ..Default::default()
                });
            }
        };

        if !to_create.is_empty() || !to_update.is_empty() {
            self.upserter.upsert(&to_create, &to_update).await?;
        }

        let report = ImportReport {
            created: to_create.iter().map(|s| s.user_id.clone()).collect(),
            updated: to_update.iter().map(|s| s.user_id.clone()).collect(),
            errors,
            rejected: false,
        };

        tracing::info!(
            created = report.created.len(),
            updated = report.updated.len(),
            errors = report.errors.len(),
            "Student import finished"
        );

        Ok(report)
    }
}
