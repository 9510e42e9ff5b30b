use std::process::ExitCode;

use anyhow::Context;

use bandfilter::config::{JobSettings, RunConfig, USAGE};
use bandfilter::{job, Error, FilterPlan, Image};
use common::log_setup::setup_logging;

fn main() -> ExitCode {
    let settings = match JobSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("bandfilter: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = match RunConfig::from_args(std::env::args().skip(1), settings) {
        Ok(config) => config,
        Err(Error::Usage(msg)) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("bandfilter: {err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config.settings.log_level);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RunConfig) -> anyhow::Result<()> {
    let parsed = FilterPlan::parse(&config.filter_tokens, config.settings.unknown_filters)?;

    let image = Image::read_file(&config.input)
        .with_context(|| format!("Failed to read '{}'", config.input.display()))?;
    tracing::info!(
        input = %config.input.display(),
        image = %image.desc(),
        plan = %parsed.plan,
        workers = config.settings.workers,
        "Starting job"
    );

    let (output, report) = job::run(image, &parsed.plan, config.settings.workers)?;

    output
        .save_file(&config.output)
        .with_context(|| format!("Failed to write '{}'", config.output.display()))?;
    tracing::info!(
        output = %config.output.display(),
        elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
        "Output written"
    );

    Ok(())
}
