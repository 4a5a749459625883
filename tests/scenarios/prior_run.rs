//! Scenario: re-running an earlier run

use crate::helpers::*;
use runconf::core::{FormValues, PipelineInfo, PriorRun, Value};
use runconf::session::SessionOrigin;
use uuid::Uuid;

#[tokio::test]
async fn test_prior_run_pins_its_version_and_values() {
    let (v1, v2) = two_versions();
    let pipeline = PipelineInfo::new("etl");
    let (session, backend, _) =
        session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![v1.clone(), v2])).await;

    let mut config = FormValues::new();
    config.insert("x".to_string(), Value::Null);
    config.insert("n".to_string(), Value::Int(3));
    let run = PriorRun {
        id: Uuid::new_v4(),
        version: v1.clone(),
        config,
    };

    assert!(session.open(SessionOrigin::PriorRun(run)).await.unwrap());

    // No fetch: the run already names its version
    assert_eq!(backend.fetch_count(), 0);
    assert_eq!(session.active_version().await.map(|v| v.id), Some(v1.id));

    let values = session.values().await;
    assert_eq!(values.get("x"), Some(&Value::Null));
    assert_eq!(values.get("n"), Some(&Value::Int(3)));

    let handle = session.submit(false).await.unwrap();
    assert_eq!(handle.version_id, v1.id);
}
