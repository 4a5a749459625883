//! Scenario: last selection wins

use crate::helpers::*;
use runconf::core::PipelineInfo;
use runconf::session::{SessionEvent, SessionOrigin};
use std::time::Duration;

/// A slow current-version fetch that lands after an explicit pick is discarded
#[tokio::test]
async fn test_explicit_selection_overtakes_slow_fetch() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let backend = MockBackend::new(&pipeline, vec![v1.clone(), v2])
        .with_fetch_delays(vec![Duration::from_millis(150)]);
    let (session, _, events) = session_with(pipeline, backend).await;

    let (opened, selected) = tokio::join!(session.open(SessionOrigin::Current), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.select_version(v1.clone()).await
    });

    assert!(!opened.unwrap());
    assert!(selected.unwrap());
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v1.id));
    assert!(session.values().await.contains_key("x"));
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::StaleResolutionDiscarded { .. })),
        1
    );
}

/// Of two overlapping fetches of the current version, only the later applies
#[tokio::test]
async fn test_later_fetch_wins() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let backend = MockBackend::new(&pipeline, vec![v1, v2.clone()])
        .with_fetch_delays(vec![Duration::from_millis(150), Duration::from_millis(10)]);
    let (session, backend, events) = session_with(pipeline, backend).await;

    let (first, second) = tokio::join!(session.open(SessionOrigin::Current), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.select_current().await
    });

    assert!(!first.unwrap());
    assert!(second.unwrap());
    assert_eq!(backend.fetch_count(), 2);
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v2.id));
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::VersionResolved { .. })),
        1
    );
}
