//! Scenario: a scheduled pipeline requires every parameter

use crate::helpers::*;
use runconf::core::{Parameter, ParameterSchema, ParameterType, PipelineInfo, Version};
use runconf::session::{SessionError, SessionOrigin};

fn version() -> Version {
    Version::new(
        1,
        "Ada",
        ParameterSchema::new(vec![
            Parameter::new("is_ok", ParameterType::Bool).with_default(false),
            Parameter::new("note", ParameterType::Str),
        ]),
    )
}

#[tokio::test]
async fn test_optional_fields_required_under_schedule() {
    let pipeline = PipelineInfo::new("nightly").with_schedule("0 2 * * *");
    let (session, backend, _) =
        session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![version()])).await;
    session.open(SessionOrigin::Current).await.unwrap();

    let errors = session.validate().await.unwrap();
    assert_field_error(&errors, "is_ok", "This field is required");
    assert_field_error(&errors, "note", "This field is required");

    assert!(matches!(
        session.submit(false).await,
        Err(SessionError::Validation(_))
    ));
    assert_eq!(backend.submit_count(), 0);

    session.set_value("is_ok", true).await.unwrap();
    session.set_value("note", "ready").await.unwrap();
    assert!(session.validate().await.unwrap().is_empty());
    assert!(session.submit(false).await.is_ok());
}

#[tokio::test]
async fn test_unscheduled_pipeline_accepts_false_and_empty() {
    let pipeline = PipelineInfo::new("adhoc");
    let (session, _, _) = session_with(pipeline.clone(), MockBackend::new(&pipeline, vec![version()])).await;
    session.open(SessionOrigin::Current).await.unwrap();

    assert!(session.validate().await.unwrap().is_empty());
}
