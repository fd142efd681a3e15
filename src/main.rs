use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cityweather_core::{Config, InputConfig};
use cityweather_input::{xml, CityWeatherInput, InputDefinition, ModularInput, XmlEventWriter};
use cityweather_kvstore::{KvStoreClient, KvStoreConnection};

/// Splunk modular input reporting current weather for configured cities.
#[derive(Parser, Debug)]
#[command(name = "city_weather_input", version, about)]
struct Cli {
    /// Print the introspection scheme and exit
    #[arg(long, conflicts_with = "validate_arguments")]
    scheme: bool,

    /// Validate the configured inputs and exit
    #[arg(long)]
    validate_arguments: bool,

    /// Configuration file (defaults to the per-user config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run or validate this input
    #[arg(long)]
    input: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.scheme {
        println!("{}", CityWeatherInput::describe().to_xml());
        return ExitCode::SUCCESS;
    }

    // Logs go to stderr; stdout belongs to the host protocol.
    if let Err(e) = cityweather_core::init() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let result = if cli.validate_arguments {
        validate_arguments(&cli)
    } else {
        stream_events(&cli).await
    };

    result.unwrap_or_else(|e| {
        tracing::error!("{:#}", e);
        ExitCode::FAILURE
    })
}

/// Inputs selected by `--input`, or all of `candidates`.
fn selected<'a>(
    config: &'a Config,
    only: Option<&str>,
    candidates: impl Iterator<Item = &'a InputConfig>,
) -> Vec<Result<InputDefinition, String>> {
    let resolve = |input: &InputConfig| {
        InputDefinition::from_input(config, input)
            .map_err(|e| format!("{}: {}", input.stanza(), e))
    };

    match only {
        Some(name) => vec![InputDefinition::resolve(config, name).map_err(|e| e.to_string())],
        None => candidates.map(resolve).collect(),
    }
}

fn validate_arguments(cli: &Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut problems = Vec::new();
    match cli.input.as_deref() {
        None => {
            let result = config.validate();
            for warning in &result.warnings {
                tracing::warn!("{}", warning);
            }
            problems.extend(result.errors.iter().map(ToString::to_string));
        }
        Some(name) => match InputDefinition::resolve(&config, name) {
            Ok(def) => {
                if let Err(e) = CityWeatherInput::check(&def) {
                    problems.push(format!("{}: {}", def.input.stanza(), e));
                }
            }
            Err(e) => problems.push(e.to_string()),
        },
    }

    if problems.is_empty() {
        tracing::info!("All inputs are valid");
        return Ok(ExitCode::SUCCESS);
    }

    let message = problems.join("; ");
    tracing::error!("{}", message);
    println!("<error><message>{}</message></error>", xml::escape(&message));
    Ok(ExitCode::FAILURE)
}

async fn stream_events(cli: &Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let connection = KvStoreConnection::from_config(&config.splunk)?;
    let store = KvStoreClient::new(connection, config.splunk.allow_invalid_certs)?;
    let http = cityweather_api::build_client()?;
    let input = CityWeatherInput::new(http, Arc::new(store));

    let mut sink = XmlEventWriter::new(BufWriter::new(std::io::stdout()));
    let mut failures = 0usize;
    let mut runs = 0usize;

    for definition in selected(&config, cli.input.as_deref(), config.enabled_inputs()) {
        runs += 1;
        let def = match definition {
            Ok(def) => def,
            Err(message) => {
                tracing::error!("{}", message);
                failures += 1;
                continue;
            }
        };

        if let Err(e) = input.run(&def, &mut sink).await {
            tracing::error!(step = e.step(), "{} failed: {}", def.input.stanza(), e);
            failures += 1;
        }
    }

    sink.close().context("Failed to close event stream")?;

    if runs == 0 {
        tracing::warn!("No enabled inputs configured");
    }
    tracing::info!("Finished {} input(s), {} failed", runs, failures);

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
