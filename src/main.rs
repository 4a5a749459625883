use anyhow::{Context, Result};
use runconf::backend::PipelineBackend;
use runconf::cli::commands::{BuildCommand, ValidateCommand, VersionsCommand};
use runconf::cli::output::*;
use runconf::cli::{Cli, Command};
use runconf::core::PipelineDefinition;
use runconf::session::{RunSession, SessionConfig, SessionOrigin};
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Validate(cmd) => validate_definition(cmd)?,
        Command::Versions(cmd) => list_versions(cmd).await?,
        Command::Build(cmd) => build_config(cmd, cli.verbose).await?,
    }

    Ok(())
}

fn validate_definition(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline definition...", INFO);

    match PipelineDefinition::from_file(&cmd.file) {
        Ok(definition) => {
            println!("{} Pipeline definition is valid!", CHECK);
            println!("  Pipeline: {}", style(&definition.pipeline.code).bold());
            println!("  Versions: {}", style(definition.versions.len()).cyan());
            if let Some(current) = definition.current_version_number() {
                println!("  Current: {}", style(format!("v{}", current)).cyan());
            }
            if let Some(schedule) = &definition.pipeline.schedule {
                println!("  Schedule: {}", style(schedule).dim());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&definition)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn list_versions(cmd: &VersionsCommand) -> Result<()> {
    let definition = PipelineDefinition::from_file(&cmd.file)
        .context("Failed to load pipeline definition")?;
    let (pipeline, backend) = definition.to_backend();

    let query = cmd.query.as_deref().unwrap_or("");
    let versions = backend.search_versions(pipeline.id, query).await?;
    let current = definition.current_version_number();

    if cmd.json {
        let data = serde_json::json!({
            "pipeline": pipeline.code,
            "versions": versions.iter().map(|v| serde_json::json!({
                "number": v.number,
                "label": v.label(),
                "name": v.name,
                "current": Some(v.number) == current,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if versions.is_empty() {
        println!("{} No versions match {:?}", INFO, query);
        return Ok(());
    }

    println!("{} Versions of {}:", INFO, style(&pipeline.name).bold());
    for version in &versions {
        println!("  {}", format_version(version, Some(version.number) == current));
    }

    Ok(())
}

async fn build_config(cmd: &BuildCommand, verbose: bool) -> Result<()> {
    let definition = PipelineDefinition::from_file(&cmd.file)
        .context("Failed to load pipeline definition")?;
    let (pipeline, backend) = definition.to_backend();
    let backend = Arc::new(backend);

    let session = RunSession::new(pipeline.clone(), backend.clone(), SessionConfig::default());
    if verbose {
        session
            .add_event_handler(|event| println!("{}", format_session_event(&event)))
            .await;
    }

    session.open(SessionOrigin::Current).await?;

    if let Some(number) = cmd.version {
        let version = backend
            .search_versions(pipeline.id, "")
            .await?
            .into_iter()
            .find(|v| v.number == number)
            .with_context(|| format!("Pipeline '{}' has no version {}", pipeline.code, number))?;
        session.select_version(version).await?;
    }

    for (code, raw) in cmd.overrides() {
        debug!("Override {} = {}", code, raw);
        session.set_value(code, raw).await?;
    }

    let active = session.active_version().await.context("No active version")?;
    println!(
        "{} Building configuration for {}",
        INFO,
        style(active.label()).bold()
    );

    let errors = session.validate().await?;
    if !errors.is_empty() {
        println!("{} Configuration is invalid:", CROSS);
        println!("{}", format_field_errors(&errors));
        std::process::exit(1);
    }

    let config = session.build().await.context("No active version")?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    } else {
        println!("{} Configuration is valid!", CHECK);
        println!("{}", format_config(&config));
    }

    session.close().await;
    Ok(())
}
