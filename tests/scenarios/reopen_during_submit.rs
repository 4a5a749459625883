//! Scenario: the dialog is closed and reopened while a submission is in flight

use crate::helpers::*;
use runconf::backend::BackendError;
use runconf::core::PipelineInfo;
use runconf::session::{SessionError, SessionOrigin};
use std::time::Duration;

/// A late failure does not put its banner on the reopened form
#[tokio::test]
async fn test_late_failure_leaves_reopened_session_alone() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let backend = MockBackend::new(&pipeline, vec![v1, v2.clone()])
        .with_submit_delay(Duration::from_millis(100));
    let (session, backend, _) = session_with(pipeline, backend).await;
    backend.fail_submissions(BackendError::PermissionDenied);
    session.open(SessionOrigin::Current).await.unwrap();

    let (submitted, reopened) = tokio::join!(session.submit(false), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.close().await;
        session.open(SessionOrigin::Current).await
    });

    assert!(matches!(
        submitted,
        Err(SessionError::Submission(BackendError::PermissionDenied))
    ));
    assert!(reopened.unwrap());
    assert_eq!(session.banner().await, None);
    assert!(!session.is_closed().await);
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v2.id));
}

/// A late success does not close the reopened dialog
#[tokio::test]
async fn test_late_success_keeps_reopened_session_open() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let backend = MockBackend::new(&pipeline, vec![v1, v2.clone()])
        .with_submit_delay(Duration::from_millis(100));
    let (session, backend, _) = session_with(pipeline, backend).await;
    session.open(SessionOrigin::Current).await.unwrap();

    let (submitted, reopened) = tokio::join!(session.submit(false), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.close().await;
        session.open(SessionOrigin::Current).await
    });

    assert!(submitted.is_ok());
    assert!(reopened.unwrap());
    assert_eq!(backend.runs().await.len(), 1);
    assert!(!session.is_closed().await);
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v2.id));
}
