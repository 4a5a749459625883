//! CLI output formatting

use crate::core::{FieldErrors, RunConfiguration, Version};
use crate::session::SessionEvent;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");

/// Format a version for the version list
pub fn format_version(version: &Version, current: bool) -> String {
    let marker = if current {
        style("(current)").green().to_string()
    } else {
        String::new()
    };
    let name = version
        .name
        .as_deref()
        .map(|name| style(name).dim().to_string())
        .unwrap_or_default();

    format!("{} {} {}", style(version.label()).bold(), name, marker)
        .trim_end()
        .to_string()
}

/// Format field errors, one per line
pub fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(code, error)| format!("  {} {}: {}", CROSS, style(code).cyan(), style(error).red()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a run configuration, one parameter per line
pub fn format_config(config: &RunConfiguration) -> String {
    config
        .iter()
        .map(|(code, value)| format!("  {} = {}", style(code).cyan(), value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a session event for display
pub fn format_session_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::VersionResolved { number, .. } => {
            format!("{} Using version {}", INFO, style(format!("v{}", number)).bold())
        }
        SessionEvent::StaleResolutionDiscarded { generation } => format!(
            "{} Discarded stale resolution {}",
            INFO,
            style(generation).dim()
        ),
        SessionEvent::ResolutionFailed { error } => {
            format!("{} Could not load version: {}", WARN, style(error).yellow())
        }
        SessionEvent::ValidationFailed { errors } => format!(
            "{} {} field(s) have errors",
            CROSS,
            style(errors.len()).red()
        ),
        SessionEvent::RunSubmitted { run_id, .. } => format!(
            "{} Run {} submitted",
            CHECK,
            style(&run_id.to_string()[..8]).dim()
        ),
        SessionEvent::SubmissionFailed { error } => {
            format!("{} {}", CROSS, style(error).red())
        }
        SessionEvent::DefaultConfigSaved { .. } => {
            format!("{} Default configuration saved", CHECK)
        }
        SessionEvent::Closed => format!("{} Session closed", INFO),
    }
}
