//! Validation Manager
//!
//! Runs a whole batch through the pipeline and splits it into records to
//! create, records to update and per-record errors:
//! 1. index assignment and username normalisation
//! 2. one reference lookup per entity kind for the whole batch
//! 3. intra-batch deduplication
//! 4. fail-fast field validation per record, in index order
//!
//! Only step 2 can fail the call as a whole (storage error, timeout or
//! cancellation). Everything else lands in [`ValidationOutcome::errors`].

use crate::config::ValidationSettings;
use crate::field_error::FieldError;
use crate::models::{StudentRecord, ValidatedStudent, ValidationOutcome};
use crate::reference_data::ReferenceData;
use crate::repository::Repositories;
use crate::services::batch_deduplicator::dedup_batch;
use crate::services::reference_resolver::ReferenceResolver;
use crate::validators::enrollment_status::{self, EnrollmentContext};
use crate::validators::{
    grade, identity, locations, ownership, phone_numbers, school_histories, tags, user_address,
    FieldResult,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use usermgmt_common::{time, uuid_utils, Error, Result};

/// Per-call switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Username is a distinct mandatory identifier; otherwise it mirrors email
    pub enable_username: bool,
    /// Caller is the order/ERP flow
    pub order_flow: bool,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Where a valid record goes
enum Accepted {
    Create(ValidatedStudent),
    Update(ValidatedStudent),
}

/// Entry point of the student validation core
#[derive(Clone)]
pub struct ValidationManager {
    resolver: ReferenceResolver,
    settings: ValidationSettings,
    clock: Clock,
}

impl ValidationManager {
    pub fn new(repos: Repositories, settings: ValidationSettings) -> Self {
        Self {
            resolver: ReferenceResolver::new(repos, settings.lookup_timeout),
            settings,
            clock: Arc::new(time::now),
        }
    }

    /// Replace the wall clock used for date rules
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Validate a batch of candidate student records
    ///
    /// Every input index ends up in exactly one of `to_create`, `to_update`
    /// or `errors`. Errors are ordered by record index.
    pub async fn fully_validate(
        &self,
        records: Vec<StudentRecord>,
        options: ValidationOptions,
        cancel: &CancellationToken,
    ) -> Result<ValidationOutcome> {
        let total = records.len();
        let records = normalize(records, options.enable_username);

        let refs = self.resolver.resolve(&records, cancel).await?;

        let (records, mut errors) = dedup_batch(records, options.enable_username);

        let ctx = EnrollmentContext {
            order_flow: options.order_flow,
            now: (self.clock)(),
        };

        let mut outcome = ValidationOutcome::default();
        for record in records {
            if cancel.is_cancelled() {
                tracing::warn!(index = record.index, "Validation cancelled between records");
                return Err(Error::Cancelled);
            }

            match self.validate_record(record, &refs, options, ctx) {
                Ok(Accepted::Create(student)) => outcome.to_create.push(student),
                Ok(Accepted::Update(student)) => outcome.to_update.push(student),
                Err(err) => {
                    tracing::debug!(index = err.index(), error = %err, "Record failed validation");
                    errors.push(err);
                }
            }
        }

        // Stable: a record's own errors keep their order
        errors.sort_by_key(FieldError::index);
        outcome.errors = errors;

        tracing::info!(
            total,
            to_create = outcome.to_create.len(),
            to_update = outcome.to_update.len(),
            errored = outcome.errored_indices().len(),
            order_flow = options.order_flow,
            "Validated student batch"
        );

        Ok(outcome)
    }

    fn validate_record(
        &self,
        record: StudentRecord,
        refs: &ReferenceData,
        options: ValidationOptions,
        ctx: EnrollmentContext,
    ) -> FieldResult<Accepted> {
        let grade = grade::validate_grade(&record, &refs.grades)?;
        let tags = tags::validate_tags(&record, &refs.tags)?;
        let gender = identity::validate_identity(&record, options.enable_username)?;

        let (user_id, is_update) = match record.existing_user_id() {
            Some(_) => {
                let current = ownership::validate_for_updating(&record, refs)?;
                (current.user_id.clone(), true)
            }
            None => {
                ownership::validate_for_creating(&record, refs)?;
                (uuid_utils::generate_string(), false)
            }
        };

        let school_histories = school_histories::validate_school_histories(
            &record,
            &refs.schools,
            &refs.school_courses,
        )?;
        let locations = locations::validate_locations(&record, &refs.locations)?;
        let phone_numbers = phone_numbers::validate_phone_numbers(&record)?;
        let address = user_address::validate_user_address(&record, &refs.prefectures)?;

        let requested = enrollment_status::validate_structure(&record, &locations, &user_id, ctx)?;
        if is_update {
            enrollment_status::validate_for_updating(
                &record,
                &user_id,
                &requested,
                &refs.enrollment_histories,
                ctx,
            )?;
        } else {
            enrollment_status::validate_for_creating(record.index, &requested)?;
        }

        let login_email =
            self.settings
                .login_email(&user_id, &record.email, options.enable_username);

        let student = ValidatedStudent {
            user_id,
            login_email,
            gender,
            grade,
            tags,
            locations,
            school_histories,
            phone_numbers,
            address,
            enrollment_status_histories: requested.into_iter().map(|r| r.history).collect(),
            record,
        };

        tracing::debug!(
            index = student.index(),
            user_id = %student.user_id,
            update = is_update,
            "Record passed validation"
        );

        Ok(if is_update {
            Accepted::Update(student)
        } else {
            Accepted::Create(student)
        })
    }
}

/// Assign batch indices; mirror email into username when usernames are off
fn normalize(records: Vec<StudentRecord>, enable_username: bool) -> Vec<StudentRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, mut record)| {
            record.index = index;
            if !enable_username {
                record.username = record.email.clone();
            }
            record
        })
        .collect()
}
