//! Scenario: switching versions resets the form

use crate::helpers::*;
use runconf::core::{PipelineInfo, Value};
use runconf::session::SessionOrigin;
use serde_json::json;

/// A field edited under one version never leaks into another version's build
#[tokio::test]
async fn test_switch_drops_fields_of_previous_version() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let (session, _, _) =
        session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![v1.clone(), v2])).await;

    session.open(SessionOrigin::Current).await.unwrap();
    session.select_version(v1).await.unwrap();
    assert_eq!(session.values().await.get("x"), Some(&Value::from("only in v1")));

    session.set_value("x", "edited").await.unwrap();
    session.set_value("n", "3").await.unwrap();

    session.select_current().await.unwrap();

    let config = session.build().await.unwrap();
    assert!(!config.contains("x"));
    // n is reseeded from v2's default, not carried over
    assert_eq!(config.to_json(), json!({ "n": 5, "tags": [] }));
}

/// Field errors of the previous version are cleared by a switch
#[tokio::test]
async fn test_switch_clears_errors() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let (session, _, _) =
        session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![v1.clone(), v2.clone()])).await;

    session.open(SessionOrigin::Current).await.unwrap();
    session.select_version(v1).await.unwrap();
    assert!(!session.validate().await.unwrap().is_empty());

    session.select_version(v2).await.unwrap();
    assert!(session.errors().await.is_empty());
    assert!(session.validate().await.unwrap().is_empty());
}
