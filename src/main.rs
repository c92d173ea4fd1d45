use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use nowgrid::classify::classify;
use nowgrid::config::load_config;
use nowgrid::merge::{MergeOptions, merge_artifacts};
use nowgrid::model::Artifact;
use nowgrid::probe::probe_document;
use nowgrid::report::scan_artifacts;
use nowgrid::store::save_artifact;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nowgrid", about = "Nowcast scrape classifier and normalizer")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Capture {
        #[arg(long)]
        html: PathBuf,
        #[arg(long)]
        city: String,
        #[arg(long)]
        city_id: String,
        #[arg(long)]
        scrape_time: Option<DateTime<Utc>>,
        #[arg(long, default_value = "data/crawled")]
        output_dir: PathBuf,
    },
    Merge {
        #[arg(long)]
        input_dir: PathBuf,
        #[arg(long, default_value = "data/out/nowcast_data.csv")]
        output: PathBuf,
        #[arg(long)]
        stations: Option<PathBuf>,
    },
    Report {
        #[arg(long)]
        input_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Capture {
            html,
            city,
            city_id,
            scrape_time,
            output_dir,
        } => {
            let page = std::fs::read_to_string(&html)
                .with_context(|| format!("failed to read page capture {}", html.display()))?;
            let report = probe_document(&page);
            let raw = classify(&report);
            let artifact = Artifact::from_raw(
                &city,
                &city_id,
                scrape_time.unwrap_or_else(Utc::now),
                &raw,
            );
            let path = save_artifact(&output_dir, &artifact)?;
            info!(file = %path.display(), kind = ?artifact.kind, "artifact saved");
        }
        Commands::Merge {
            input_dir,
            output,
            stations,
        } => {
            let stations_path = stations.or_else(|| config.stations.list_path.clone());
            let report = merge_artifacts(&MergeOptions {
                input_dir,
                output_path: output,
                stations_path,
                normalize: config.normalize.clone(),
            })?;

            if report.wrote_output() {
                info!(
                    files = report.files,
                    skipped = report.skipped,
                    records = report.records,
                    "merge complete"
                );
            } else {
                println!("no data");
            }
        }
        Commands::Report { input_dir } => {
            let scan = scan_artifacts(&input_dir)?;
            println!("{}", serde_json::to_string_pretty(&scan)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
