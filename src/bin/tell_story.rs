//! Tells a legend for one region from the terminal.

use clap::Parser;
use folklore_map::config::{Config, ConfigError};
use folklore_map::markers::{CatalogError, find_marker, load_markers};
use folklore_map::story::StoryService;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(version, about = "Ask the storyteller for a legend of one region")]
struct Args {
    /// Region id or name, e.g. `misiones` or "Sgo. del Estero"
    #[arg(required_unless_present = "list")]
    region: Option<String>,

    /// Folklore hints for the region; required for regions not on the map
    #[arg(long)]
    context: Option<String>,

    /// Print the regions on the map and exit
    #[arg(long)]
    list: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generative model used for the legend
    #[arg(long)]
    model: Option<String>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("'{0}' is not on the map; pass --context to describe it")]
    UnknownRegion(String),
}

async fn run(args: Args) -> Result<(), CliError> {
    let markers = load_markers()?;

    if args.list {
        for marker in &markers {
            println!("{:<16} {:<18} {}", marker.id, marker.label, marker.region_context);
        }
        return Ok(());
    }

    let Some(query) = args.region else {
        return Ok(());
    };

    let (region, context) = match (find_marker(&markers, &query), args.context) {
        (Some(marker), Some(context)) => (marker.label.clone(), context),
        (Some(marker), None) => (marker.label.clone(), marker.region_context.clone()),
        (None, Some(context)) => (query, context),
        (None, None) => return Err(CliError::UnknownRegion(query)),
    };

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.model = model;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Consultando los archivos de {region}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let service = StoryService::new(config.story_client());
    let outcome = service.fetch_story(&region, Some(&context)).await;
    spinner.finish_and_clear();

    if outcome.is_fallback() {
        log::warn!("the storyteller was unavailable; telling the archived legend");
    }

    let story = outcome.story();
    println!("{}", story.title);
    println!("{}", story.footer());
    println!();
    for paragraph in story.paragraphs() {
        println!("{paragraph}");
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
