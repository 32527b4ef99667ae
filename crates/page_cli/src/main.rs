use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use page_engine::{Pipeline, PipelineOutput};
use pipeline_logging::{pipeline_error, pipeline_info};

mod args;
mod config;
mod logging;

use args::Args;
use config::AppConfig;

/// Exit status when the run ended in an error payload.
const EXIT_PAYLOAD_ERROR: u8 = 1;
/// Exit status when the CLI could not even start the run.
const EXIT_SETUP_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::initialize(args.log, args.log_level);

    match run(&args) {
        Ok(output) if output.is_error() => ExitCode::from(EXIT_PAYLOAD_ERROR),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            pipeline_error!("{:#}", err);
            eprintln!("page-extract: {err:#}");
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}

fn run(args: &Args) -> anyhow::Result<PipelineOutput> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let config = args.apply(config);

    pipeline_info!("Extracting {}", args.url);
    let pipeline = Pipeline::from_settings(config.fetch_settings(), config.extract_settings());
    let output = pipeline
        .run_blocking(&args.url)
        .context("failed to start the async runtime")?;

    let rendered = if args.compact {
        output.to_json()
    } else {
        output.to_json_pretty()
    }
    .context("failed to serialize the result")?;
    println!("{rendered}");

    Ok(output)
}
