//! Runs the shared VPC control and prints the report as JSON.
//! Logs go to stderr (`RUST_LOG`, default `info`) so stdout stays parseable.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use vpc_control::config::{CheckConfig, SourceConfig};
use vpc_control::controls::vpc_control;
use vpc_control::display::{ReportFormatter, exit_code};
use vpc_control::profile::{Profile, ProfileReport};

#[derive(Parser, Debug)]
#[command(name = "vpc-control", version, about = "Check the shared VPC subnet configuration")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Attribute file (YAML or JSON); may be repeated
    #[arg(long = "attrs", value_name = "FILE")]
    attrs: Vec<PathBuf>,

    /// Read attributes from environment variables with this prefix
    #[arg(long, value_name = "PREFIX")]
    env_prefix: Option<String>,

    /// Read attributes from `terraform output -json` in this directory
    #[arg(long, value_name = "DIR")]
    terraform_dir: Option<PathBuf>,

    /// Profile name shown in the report
    #[arg(long, default_value = "platform_basic")]
    profile: String,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let formatter = if cli.pretty {
        ReportFormatter::pretty()
    } else {
        ReportFormatter::new()
    };

    let printed = run(&cli).and_then(|report| {
        let output = formatter.format(&report)?;
        println!("{}", output);
        Ok(report.outcome())
    });

    match printed {
        Ok(outcome) => ExitCode::from(exit_code(outcome)),
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "check could not run");
            let error_output = ReportFormatter::create_error_output(e);
            match serde_json::to_string(&error_output) {
                Ok(json) => println!("{}", json),
                Err(err) => tracing::error!(error = %err, "failed to serialize error output"),
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file (or defaults) plus any sources given on the command line
fn build_config(cli: &Cli) -> Result<CheckConfig> {
    let mut config = match &cli.config {
        Some(path) => CheckConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CheckConfig::default(),
    };

    for path in &cli.attrs {
        config = config.with_source(SourceConfig::File { path: path.clone() });
    }
    if let Some(prefix) = &cli.env_prefix {
        config = config.with_source(SourceConfig::Env { prefix: prefix.clone() });
    }
    if let Some(dir) = &cli.terraform_dir {
        config = config.with_source(SourceConfig::Terraform {
            dir: dir.clone(),
            binary: PathBuf::from(vpc_control::data::terraform::DEFAULT_TERRAFORM_BINARY),
        });
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<ProfileReport> {
    let config = build_config(cli)?;
    let store = config.build_store().context("Failed to set up attribute sources")?;

    if store.is_empty() {
        tracing::warn!("no attribute sources configured; every attribute will be missing");
    } else {
        tracing::debug!(sources = ?store.store_names(), "attribute sources");
    }

    let mut profile = Profile::new(cli.profile.clone());
    profile.register(vpc_control(&config.attributes, &config.expectations))?;

    Ok(profile.run(&store))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::io::Write;
    use vpc_control::profile::RunOutcome;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vpc-control").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_sources_are_appended_in_order() {
        let cli = parse(&["--attrs", "a.yml", "--attrs", "b.json", "--env-prefix", "ATTR_", "--terraform-dir", "infra"]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.sources.len(), 4);
        assert_eq!(config.sources[0], SourceConfig::File { path: PathBuf::from("a.yml") });
        assert_eq!(config.sources[2], SourceConfig::Env { prefix: "ATTR_".to_string() });
        assert!(matches!(config.sources[3], SourceConfig::Terraform { .. }));
    }

    #[test]
    fn test_run_against_attribute_file() {
        let mut attrs = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(attrs, "vpc_shared_net_prod_name: shared-net-prod").unwrap();
        writeln!(attrs, "vpc_shared_net_subnets:\n  - subnet_name: prod-subnet").unwrap();

        let path = attrs.path().display().to_string();
        let report = run(&parse(&["--attrs", &path])).unwrap();

        assert_eq!(report.outcome(), RunOutcome::Passed);
        assert_eq!(report.profile, "platform_basic");
    }

    #[test]
    fn test_missing_attribute_file_fails_to_start() {
        let err = run(&parse(&["--attrs", "/nonexistent/attrs.yml"])).unwrap_err();
        let output = ReportFormatter::create_error_output(err);

        assert!(output.error.contains("Failed to set up attribute sources"));

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"status\":\"error\""));
    }

    #[test]
    fn test_no_sources_reports_errored() {
        let report = run(&parse(&[])).unwrap();
        assert_eq!(report.outcome(), RunOutcome::Errored);
    }
}
