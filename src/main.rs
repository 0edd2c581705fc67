mod console;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use shelf_core::{BookSource, ExplanationSource, PresentationSink};
use shelf_engine::{Navigator, NavigatorConfig, RandomSource, SeededRandom, ThreadRandom};
use shelf_settings::loader::parse_source_kind;
use shelf_settings::{validate, LoadedSettings, LoggingSettings, ShelfSettings, SourceKind};
use shelf_sources::{EmbeddedExplanations, PreloadedCatalog, RemoteCatalog};
use shelf_telemetry::{init_telemetry, parse_level, TelemetryConfig};

use crate::console::{Command, ConsoleSink, HELP};

/// Page through a book collection: forward to a random book, back through history.
#[derive(Debug, Parser)]
#[command(name = "shelf", version)]
struct Cli {
    /// Settings file (defaults to ~/.shelf/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where books come from: remote or preloaded.
    #[arg(long, value_parser = parse_source_arg)]
    source: Option<SourceKind>,
    /// Base URL of the book API (remote source).
    #[arg(long)]
    base_url: Option<String>,
    /// JSON dataset with embedded explanations (preloaded source).
    #[arg(long)]
    dataset: Option<String>,
    /// Index shown first.
    #[arg(long)]
    start: Option<usize>,
    /// Fixed RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Disable background warming of the next book.
    #[arg(long)]
    no_prefetch: bool,
    /// Log as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

fn parse_source_arg(val: &str) -> Result<SourceKind, String> {
    parse_source_kind(val).ok_or_else(|| format!("unknown source '{val}' (remote|preloaded)"))
}

impl Cli {
    fn apply(&self, settings: &mut ShelfSettings) {
        if let Some(kind) = self.source {
            settings.source.kind = kind;
        }
        if let Some(url) = &self.base_url {
            settings.source.base_url = url.clone();
        }
        if let Some(path) = &self.dataset {
            settings.source.dataset_path = path.clone();
        }
        if let Some(start) = self.start {
            settings.navigator.start_index = start;
        }
        if let Some(seed) = self.seed {
            settings.navigator.seed = Some(seed);
        }
        if self.no_prefetch {
            settings.source.prefetch = Some(false);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }

    /// Flags are the last layer, so validation waits until they are applied.
    fn layer_over(&self, mut loaded: LoadedSettings) -> anyhow::Result<LoadedSettings> {
        self.apply(&mut loaded.settings);
        validate(&loaded.settings)?;
        Ok(loaded)
    }
}

fn telemetry_config(logging: &LoggingSettings) -> TelemetryConfig {
    let defaults = TelemetryConfig::default();
    TelemetryConfig {
        log_level: parse_level(&logging.level).unwrap_or(defaults.log_level),
        module_levels: logging
            .modules
            .iter()
            .filter_map(|(module, level)| Some((module.clone(), parse_level(level)?)))
            .collect(),
        json: logging.json,
    }
}

fn navigator_config(settings: &ShelfSettings) -> NavigatorConfig {
    let display = &settings.display;
    NavigatorConfig {
        start_index: settings.navigator.start_index,
        prefetch: settings.source.prefetch_enabled(),
        loading_title: display.loading_title.clone(),
        loading_description: display.loading_description.clone(),
        pending_description: display.pending_description.clone(),
        fallback_description: display.fallback_description.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => shelf_settings::load_settings_from_path(path)?,
        None => shelf_settings::load_settings()?,
    };
    let loaded = cli.layer_over(loaded)?;

    init_telemetry(&telemetry_config(&loaded.settings.logging))?;
    loaded.report();
    let settings = loaded.settings;
    tracing::info!(source = ?settings.source.kind, "starting shelf");

    let sink: Arc<dyn PresentationSink> = Arc::new(ConsoleSink);

    let (books, explanations): (Arc<dyn BookSource>, Arc<dyn ExplanationSource>) =
        match settings.source.kind {
            SourceKind::Remote => {
                let catalog = Arc::new(RemoteCatalog::new(
                    settings.source.base_url.as_str(),
                    Duration::from_millis(settings.source.request_timeout_ms),
                )?);
                let books: Arc<dyn BookSource> = catalog.clone();
                let explanations: Arc<dyn ExplanationSource> = catalog;
                (books, explanations)
            }
            SourceKind::Preloaded => match PreloadedCatalog::load(&settings.source.dataset_path).await {
                Ok(catalog) => {
                    let books: Arc<dyn BookSource> = Arc::new(catalog);
                    let explanations: Arc<dyn ExplanationSource> = Arc::new(EmbeddedExplanations);
                    (books, explanations)
                }
                Err(e) => {
                    tracing::error!(
                        path = %settings.source.dataset_path,
                        error = %e,
                        "failed to load dataset"
                    );
                    sink.show_error(&settings.display.dataset_error_message);
                    return Ok(());
                }
            },
        };

    let rng: Arc<dyn RandomSource> = match settings.navigator.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };
    let nav = Arc::new(
        Navigator::new(books, explanations, sink.clone(), navigator_config(&settings))
            .with_random(rng),
    );

    nav.start().await;
    println!("\n{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        // Each input runs as its own task; a slow render is superseded by a
        // newer one rather than blocking the prompt.
        match Command::parse(&line) {
            Some(Command::Forward) => {
                let nav = Arc::clone(&nav);
                tokio::spawn(async move { nav.navigate_forward().await });
            }
            Some(Command::Backward) => {
                let nav = Arc::clone(&nav);
                tokio::spawn(async move { nav.navigate_backward().await });
            }
            Some(Command::Help) | None => println!("{HELP}"),
            Some(Command::Quit) => break,
        }
    }

    tracing::info!(
        history_depth = nav.history().len(),
        memoized = nav.memo().len(),
        "Shutting down"
    );
    Ok(())
}
