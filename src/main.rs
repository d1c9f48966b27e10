use std::error::Error;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use sidewalk_crowding::adapters::outbound::{init_logger, FilesystemScenarioSource};
use sidewalk_crowding::application::CrowdingService;
use sidewalk_crowding::domains::crowding::AnalysisRequest;
use sidewalk_crowding::Config;

const USAGE: &str = "usage: sidewalk-crowding <scenario.geojson> [--config <file>] [--output <file>]";

struct CliArgs {
    scenario: String,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut scenario = None;
    let mut config = None;
    let mut output = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "--output" => output = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if scenario.is_none() => scenario = Some(arg),
            _ => return Err(format!("unexpected argument `{}`\n{}", arg, USAGE)),
        }
    }

    Ok(CliArgs {
        scenario: scenario.ok_or(USAGE)?,
        config,
        output,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    let config = Config::load_layered(args.config.as_deref())?;

    // fast_log owns the `log` facade when file logging is on, so tracing is not bridged to it
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sidewalk crowding analysis");

    let logger = init_logger(&config.logging);
    let source = FilesystemScenarioSource::new(None);
    let groups = source.load_groups(&args.scenario)?;
    info!("Loaded scenario {} with {} groups", args.scenario, groups.len());

    let request = AnalysisRequest {
        groups,
        params: config.analysis.to_params(),
    };
    let service = CrowdingService::new(logger).with_workers(config.runtime.workers);
    let report = service.execute(&request, config.runtime.parallel).await?;

    for group in &report.groups {
        info!(
            group = %group.name,
            collisions = group.collision_count,
            cells = group.metrics.iter().flatten().count(),
            "group summary"
        );
    }

    let json = report.to_json()?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json).await?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
