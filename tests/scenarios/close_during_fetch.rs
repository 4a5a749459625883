//! Scenario: closing the session while a fetch is in flight

use crate::helpers::*;
use runconf::core::PipelineInfo;
use runconf::session::{SessionError, SessionOrigin};
use std::time::Duration;

#[tokio::test]
async fn test_fetch_after_close_is_discarded() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let backend = MockBackend::new(&pipeline, vec![v1, v2])
        .with_fetch_delays(vec![Duration::from_millis(100)]);
    let (session, _, _) = session_with(pipeline, backend).await;

    let (opened, _) = tokio::join!(session.open(SessionOrigin::Current), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.close().await
    });

    assert!(!opened.unwrap());
    assert!(session.is_closed().await);
    assert!(session.active_version().await.is_none());
    assert!(session.values().await.is_empty());
    assert_eq!(session.set_value("n", "1").await, Err(SessionError::Closed));
}

#[tokio::test]
async fn test_reopen_after_close() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let (session, _, _) = session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![v1, v2.clone()])).await;

    session.open(SessionOrigin::Current).await.unwrap();
    session.set_value("n", "9").await.unwrap();
    session.close().await;

    assert!(session.open(SessionOrigin::Current).await.unwrap());
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v2.id));
    // Nothing from the previous opening survives
    assert_eq!(
        session.values().await.get("n"),
        Some(&runconf::core::Value::Int(5))
    );
}
