//! flatspec: flattens inline OpenAPI schemas into named components.
//!
//! `flatten` rewrites a spec so every inline composite schema lives under
//! `components.schemas`; `check` reports whether specs are already flat.

use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use flatspec_flatten::{flatten, FlattenConfig};
use flatspec_lib::{check_spec, error_code, load_config, parse_key_value, CheckResult};
use flatspec_spec_parser::{parse_spec_file, write_spec, SpecFormat};
use flatspec_telemetry::{LogFormat, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(
    name = "flatspec",
    about = "Flatten inline OpenAPI schemas into named components",
    version
)]
struct Cli {
    /// Log level or filter directive (RUST_LOG takes precedence).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, default_value = "pretty", value_parser = ["pretty", "json"])]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten a spec and write the result.
    Flatten {
        /// Input spec file (YAML or JSON).
        #[arg(short, long)]
        spec: String,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Output format. Defaults to the output file extension, else yaml.
        #[arg(long, value_parser = ["yaml", "json"])]
        format: Option<String>,

        /// Project configuration file (flatspec.yaml).
        #[arg(short, long)]
        config: Option<String>,

        /// Inline schema option, KEY=VALUE. Overrides the config file.
        #[arg(long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,

        /// Name override, FROM=TO. Overrides the config file.
        #[arg(long = "name-mapping", value_parser = parse_key_value)]
        name_mappings: Vec<(String, String)>,
    },

    /// Report whether specs still contain inline schemas.
    ///
    /// Runs a dry flattening pass on each spec; nothing is written.
    Check {
        /// Input spec file(s) (YAML or JSON).
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<String>,

        /// Output format (text or json).
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Project configuration file (flatspec.yaml).
        #[arg(short, long)]
        config: Option<String>,

        /// Inline schema option, KEY=VALUE. Overrides the config file.
        #[arg(long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },
}

/// Load the pass configuration, printing the error on failure.
fn config_or_exit(
    config: Option<&str>,
    options: &[(String, String)],
    name_mappings: &[(String, String)],
) -> Result<FlattenConfig, ExitCode> {
    load_config(config.map(Path::new), options, name_mappings).map_err(|e| {
        eprintln!("error: {}", e);
        ExitCode::from(1)
    })
}

/// Run the flatten command.
fn run_flatten(
    spec: &str,
    output: Option<&str>,
    format: Option<&str>,
    config: &FlattenConfig,
) -> ExitCode {
    let spec_path = Path::new(spec);
    if !spec_path.exists() {
        eprintln!("error: spec file not found: {}", spec);
        return ExitCode::from(1);
    }

    let mut doc = match parse_spec_file(spec_path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("error: {} [{}]: {}", error_code(&e), spec, e);
            return ExitCode::from(1);
        }
    };

    let report = match flatten(&mut doc, config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: flattening failed: {}", e);
            return ExitCode::from(1);
        }
    };

    let format = match (format, output) {
        (Some(format), _) => SpecFormat::from_str(format).unwrap_or_default(),
        (None, Some(output)) => SpecFormat::from_path(Path::new(output)),
        (None, None) => SpecFormat::Yaml,
    };
    let rendered = match write_spec(&doc, format) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    match output {
        Some(output) => {
            if let Err(e) = std::fs::write(output, rendered) {
                eprintln!("error: failed to write {}: {}", output, e);
                return ExitCode::from(1);
            }
        }
        None => print!("{}", rendered),
    }

    for pointer in &report.unresolved {
        eprintln!("  warning: unresolved reference {}", pointer);
    }
    eprintln!(
        "flattened {}: {} schema(s) registered, {} reused",
        spec,
        report.registered.len(),
        report.reused.len()
    );
    tracing::debug!(
        generate_metadata = report.generate_metadata,
        "flatten command finished"
    );
    ExitCode::SUCCESS
}

/// Run the check command.
fn run_check(specs: &[String], output_format: &str, config: &FlattenConfig) -> ExitCode {
    let results: Vec<CheckResult> = specs
        .iter()
        .map(|spec| check_spec(Path::new(spec), config))
        .collect();
    let all_flat = results.iter().all(|r| r.flat);

    if output_format == "json" {
        let output = serde_json::json!({
            "results": results,
            "summary": {
                "total": results.len(),
                "flat": results.iter().filter(|r| r.flat).count(),
                "not_flat": results.iter().filter(|r| !r.flat).count(),
            }
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        for result in &results {
            if result.flat {
                eprintln!("✓ {} is flat", result.file);
            } else if result.errors.is_empty() {
                eprintln!(
                    "✗ {} has {} schema(s) to extract",
                    result.file,
                    result.would_register.len()
                );
            } else {
                eprintln!("✗ {} could not be checked", result.file);
            }

            for location in &result.inline_locations {
                eprintln!("  inline schema at {}", location);
            }
            for err in &result.errors {
                eprintln!("  {}: {}", err.code, err.message);
            }
            for pointer in &result.unresolved {
                eprintln!("  unresolved reference {} (warning)", pointer);
            }
        }

        let flat_count = results.iter().filter(|r| r.flat).count();
        let total = results.len();
        eprintln!();
        eprintln!(
            "checked {} spec(s): {} flat, {} not flat",
            total,
            flat_count,
            total - flat_count
        );
    }

    if all_flat {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(LogFormat::parse(&cli.log_format).unwrap_or_default());
    if let Err(e) = flatspec_telemetry::init(&telemetry) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    match cli.command {
        Commands::Flatten {
            spec,
            output,
            format,
            config,
            options,
            name_mappings,
        } => match config_or_exit(config.as_deref(), &options, &name_mappings) {
            Ok(config) => run_flatten(&spec, output.as_deref(), format.as_deref(), &config),
            Err(code) => code,
        },
        Commands::Check {
            spec,
            format,
            config,
            options,
        } => match config_or_exit(config.as_deref(), &options, &[]) {
            Ok(config) => run_check(&spec, &format, &config),
            Err(code) => code,
        },
    }
}
