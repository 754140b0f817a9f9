// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Command line front end of the exporter.
// Run with: scriptgauge <command>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scriptgauge::prompt::prompt_definition;
use scriptgauge::settings::{DEFAULT_COLLECT_INTERVAL, DEFAULT_DEFINITIONS_FILE};
use scriptgauge::{ExporterError, Exporter, MetricDefinition, Settings, Validator};
use scriptgauge_telemetry::CollectionReport;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "scriptgauge", version, about = "Expose the output of scripts as gauges")]
struct Cli {
    /// Metric definitions file
    #[arg(short, long, global = true, env = "SCRIPTGAUGE_CONFIG", default_value = DEFAULT_DEFINITIONS_FILE)]
    config: PathBuf,

    /// Seconds a script may run before it is killed (0 waits forever)
    #[arg(long, global = true, default_value_t = 10)]
    script_timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactively enter a new gauge and add it to the definitions file
    Add,
    /// Print the stored definitions
    List,
    /// Sample every gauge once and print the result as JSON
    Collect,
    /// Sample every gauge on an interval until interrupted
    Run {
        /// Seconds between collection cycles
        #[arg(long, default_value_t = DEFAULT_COLLECT_INTERVAL.as_secs())]
        interval: u64,
    },
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::new(cli.config).with_script_timeout_secs(cli.script_timeout);

    match cli.command {
        Command::Add => add(&settings),
        Command::List => list(&settings),
        Command::Collect => collect(&settings),
        Command::Run { interval } => run(
            settings.with_collect_interval(Duration::from_secs(interval.max(1))),
        ),
    }
}

fn add(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let definition = prompt_definition(&mut stdin.lock(), &mut io::stdout())
        .map_err(ExporterError::Prompt)?;
    let name = definition.name.clone();

    settings
        .store()
        .add(definition, &Validator::new(settings.executor()))
        .context("Failed to add metric")?;

    println!(
        "Added metric '{}' to {}",
        name,
        settings.definitions_path.display()
    );
    Ok(())
}

fn list(settings: &Settings) -> Result<()> {
    let definitions = settings.store().load_or_default()?;
    if definitions.is_empty() {
        println!(
            "No metrics defined in {}",
            settings.definitions_path.display()
        );
        return Ok(());
    }

    println!("{:<24} {:<8} {:<12} SCRIPT", "NAME", "TYPE", "UNIT");
    for MetricDefinition {
        name,
        kind,
        unit,
        script_path,
        ..
    } in &definitions
    {
        println!(
            "{:<24} {:<8} {:<12} {}",
            name,
            kind,
            unit,
            script_path.display()
        );
    }
    Ok(())
}

fn collect(settings: &Settings) -> Result<()> {
    let exporter = Exporter::start(settings.clone()).context("Failed to initialize metrics")?;
    let report = exporter.collect_once()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(settings: Settings) -> Result<()> {
    let exporter = Exporter::start(settings).context("Failed to initialize metrics")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let flushed = runtime.block_on(exporter.service().run_until(
        async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Interrupt received, shutting down"),
                Err(e) => log::error!("Cannot listen for Ctrl-C ({}), shutting down", e),
            }
        },
        print_report,
    ))?;

    if let Some(report) = flushed {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &CollectionReport) {
    for id in &report.skipped {
        log::debug!("No value for {} this cycle", id);
    }
    match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("Failed to encode collection report: {}", e),
    }
}
