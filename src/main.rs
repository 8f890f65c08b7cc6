use std::path::PathBuf;
use std::process::ExitCode;

use surveyplot::data::loader;
use surveyplot::state::chart_kind::ChartKind;
use surveyplot::state::config::PipelineConfig;
use surveyplot::{PipelineOutcome, Result};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: surveyplot <data.csv> [--config <pipeline.json>] [--chart <bar|scatter|bubble|box|stacked>] [--report]";

struct Args {
    data: PathBuf,
    config: Option<PathBuf>,
    chart: Option<ChartKind>,
    report: bool,
}

/// Parsed command line. `None` means help was requested.
fn parse_args<I>(argv: I) -> std::result::Result<Option<Args>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut data = None;
    let mut config = None;
    let mut chart = None;
    let mut report = false;

    let mut args = argv.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().ok_or("--config needs a path")?)),
            "--chart" => {
                let name = args.next().ok_or("--chart needs a chart kind")?;
                chart = Some(name.parse::<ChartKind>().map_err(|e| e.to_string())?);
            }
            "--report" => report = true,
            "-h" | "--help" => return Ok(None),
            other if data.is_none() && !other.starts_with('-') => data = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument '{other}'\n{USAGE}")),
        }
    }

    Ok(Some(Args {
        data: data.ok_or_else(|| USAGE.to_string())?,
        config,
        chart,
        report,
    }))
}

fn execute(args: &Args) -> Result<PipelineOutcome> {
    let dataset = loader::load_file(&args.data)?;

    let config = match (&args.config, args.chart) {
        (Some(path), _) => PipelineConfig::from_json(&std::fs::read_to_string(path)?)?,
        (None, Some(kind)) => kind.preset(),
        (None, None) => ChartKind::default_for(dataset.schema).preset(),
    };

    surveyplot::run(&dataset, &config)
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // usage errors exit with 2, runtime failures with 1
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    match execute(&args) {
        Ok(PipelineOutcome::NoData { .. }) => {
            println!("no data");
            ExitCode::SUCCESS
        }
        Ok(PipelineOutcome::Ready(chart)) if args.report => {
            print!("{}", chart.report());
            ExitCode::SUCCESS
        }
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Failed to serialize chart data: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
