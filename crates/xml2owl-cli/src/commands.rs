//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xml2owl_mapping::{inspect, MapperConfig, RuleSetSummary};

/// Main CLI structure
#[derive(Parser)]
#[command(name = "xml2owl")]
#[command(about = "Inspect XML2OWL rule documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the parameters, namespaces, reference names and executable rules of a rule document
    Inspect {
        /// Rule document
        #[arg(short, long)]
        rules: PathBuf,

        /// Mapper configuration as JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective mapper configuration
    Config {
        /// Mapper configuration as JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Info,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

/// Command execution result
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Execute CLI commands
#[derive(Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Inspect { rules, config, format } => self.execute_inspect(&rules, config.as_deref(), format),
            Commands::Config { config } => self.execute_config(config.as_deref()),
            Commands::Info => Ok(self.execute_info()),
        }
    }

    fn execute_inspect(&self, rules: &Path, config: Option<&Path>, format: OutputFormat) -> Result<CommandResult> {
        let config = load_config(config)?;
        let xml = std::fs::read_to_string(rules).with_context(|| format!("Failed to read {}", rules.display()))?;
        let document =
            roxmltree::Document::parse(&xml).with_context(|| format!("{} is not well-formed XML", rules.display()))?;
        debug!(rules = %rules.display(), "rule document parsed");

        let summary = match inspect(&config, &document) {
            Ok(summary) => summary,
            Err(error) => {
                return Ok(CommandResult {
                    success: false,
                    message: error.message,
                    data: None,
                })
            }
        };
        info!(rules = summary.rules.len(), "rule document inspected");

        let data = serde_json::to_value(&summary)?;
        let message = match format {
            OutputFormat::Text => render_summary(rules, &summary),
            OutputFormat::Json => serde_json::to_string(&data)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&data)?,
        };

        Ok(CommandResult {
            success: true,
            message,
            data: Some(data),
        })
    }

    fn execute_config(&self, config: Option<&Path>) -> Result<CommandResult> {
        let config = load_config(config)?;
        let data = serde_json::to_value(&config)?;
        Ok(CommandResult {
            success: true,
            message: serde_json::to_string_pretty(&data)?,
            data: Some(data),
        })
    }

    fn execute_info(&self) -> CommandResult {
        CommandResult {
            success: true,
            message: format!("xml2owl {}", env!("CARGO_PKG_VERSION")),
            data: None,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MapperConfig> {
    match path {
        Some(path) => MapperConfig::from_json_file(path).context("Failed to load mapper configuration"),
        None => Ok(MapperConfig::default()),
    }
}

/// Human-readable rule document summary
pub fn render_summary(rules: &Path, summary: &RuleSetSummary) -> String {
    let parameters = &summary.parameters;
    let mut lines = vec![
        format!("Rule document: {}", rules.display()),
        format!("Query language: {}", parameters.query_language),
        format!("Expression language: {}", parameters.expression_language),
        format!("Strict: {}", parameters.strict),
        format!("Namespaces ({}):", summary.namespaces.len()),
    ];
    lines.extend(
        summary
            .namespaces
            .iter()
            .map(|binding| format!("  {} = {}", binding.prefix, binding.uri)),
    );

    let names: Vec<&str> = summary.reference_names.iter().collect();
    lines.push(format!(
        "Reference names: {}",
        if names.is_empty() { "-".to_string() } else { names.join(", ") }
    ));

    lines.push(format!("Rules ({}):", summary.rules.len()));
    lines.extend(summary.rules.iter().map(|rule| match &rule.reference_name {
        Some(reference) => format!("  {}. {} [{}]", rule.position + 1, rule.name, reference),
        None => format!("  {}. {}", rule.position + 1, rule.name),
    }));
    lines.join("\n")
}
