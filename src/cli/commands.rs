//! CLI command definitions

use crate::core::{FormValues, Value};
use clap::Args;

/// Validate a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List a pipeline's versions
#[derive(Debug, Args, Clone)]
pub struct VersionsCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Only show versions whose label contains this text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Build the run configuration of a version
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Version number (defaults to the current version)
    #[arg(long)]
    pub version: Option<u32>,

    /// Field values (code=value), repeat a code to give several values
    #[arg(long, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl BuildCommand {
    /// Collect the overrides into raw form values
    ///
    /// A code given once stays a scalar; a repeated code becomes a list.
    pub fn overrides(&self) -> FormValues {
        let mut values = FormValues::new();
        for (code, raw) in &self.set {
            let raw = Value::from(raw.as_str());
            match values.remove(code) {
                None => {
                    values.insert(code.clone(), raw);
                }
                Some(Value::List(mut items)) => {
                    items.push(raw);
                    values.insert(code.clone(), Value::List(items));
                }
                Some(previous) => {
                    values.insert(code.clone(), Value::List(vec![previous, raw]));
                }
            }
        }
        values
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
