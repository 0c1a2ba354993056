//! Import service tests: strict and lenient handling of mixed batches

mod helpers;

use helpers::*;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use usermgmt_common::{Error, Result};
use usermgmt_student::models::ValidatedStudent;
use usermgmt_student::{StudentImportService, StudentUpserter, ValidationMode, ValidationOptions};

/// Records what would have been written
#[derive(Default)]
struct RecordingUpserter {
    calls: Mutex<Vec<(Vec<usize>, Vec<usize>)>>,
    fail: bool,
}

#[async_trait::async_trait]
impl StudentUpserter for RecordingUpserter {
    async fn upsert(
        &self,
        to_create: &[ValidatedStudent],
        to_update: &[ValidatedStudent],
    ) -> Result<()> {
        if self.fail {
            return Err(Error::Repository("write failed".to_string()));
        }
        self.calls.lock().unwrap().push((
            to_create.iter().map(|s| s.index()).collect(),
            to_update.iter().map(|s| s.index()).collect(),
        ));
        Ok(())
    }
}

fn service(upserter: Arc<RecordingUpserter>) -> StudentImportService {
    let store = Arc::new(FakeStore::seeded());
    StudentImportService::new(manager(&store), upserter)
}

fn mixed_batch() -> Vec<usermgmt_student::StudentRecord> {
    let mut bad = new_student(1);
    bad.grade = "G-404".to_string();
    vec![new_student(0), bad, existing_student()]
}

#[tokio::test]
async fn test_lenient_writes_valid_records() {
    let upserter = Arc::new(RecordingUpserter::default());

    let report = service(upserter.clone())
        .import(
            mixed_batch(),
            ValidationOptions::default(),
            ValidationMode::Lenient,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!report.rejected);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.updated, vec![EXISTING_STUDENT_ID.to_string()]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].index(), 1);
    assert_eq!(*upserter.calls.lock().unwrap(), vec![(vec![0], vec![2])]);
}

#[tokio::test]
async fn test_strict_writes_nothing_on_error() {
    let upserter = Arc::new(RecordingUpserter::default());

    let report = service(upserter.clone())
        .import(
            mixed_batch(),
            ValidationOptions::default(),
            ValidationMode::Strict,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(report.rejected);
    assert_eq!(report.written(), 0);
    assert_eq!(report.errors.len(), 1);
    assert!(upserter.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_strict_writes_clean_batch() {
    let upserter = Arc::new(RecordingUpserter::default());

    let report = service(upserter.clone())
        .import(
            vec![new_student(0), new_student(1)],
            ValidationOptions::default(),
            ValidationMode::Strict,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!report.rejected);
    assert_eq!(report.created.len(), 2);
    assert_eq!(upserter.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upsert_failure_propagates() {
    let upserter = Arc::new(RecordingUpserter {
        fail: true,
        ..Default::default()
    });

    let result = service(upserter)
        .import(
            vec![new_student(0)],
            ValidationOptions::default(),
            ValidationMode::Lenient,
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(Error::Repository(_))));
}
