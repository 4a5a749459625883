//! Scenario-based tests for run sessions

#[path = "../helpers.rs"]
mod helpers;

mod close_during_fetch;
mod prior_run;
mod reopen_during_submit;
mod scheduled_pipeline;
mod stale_resolution;
mod version_switch;
