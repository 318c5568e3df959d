use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lazyimg::application::{ImageLoader, LazyImageBinder};
use lazyimg::infrastructure::{
    AppConfig, CliArgs, ConfigStore, DecoderFormatProbe, HttpImageFetcher, PageManifest,
    QueryUrlTransformer, ViewportTracker,
};
use lazyimg::presentation::LoadReport;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let store = ConfigStore::discover()?;
    let mut config = store.load(args.config.as_deref())?;
    config.merge_with_args(args);
    config.lazy.validate()?;

    if args.save_config {
        let path = store.save(&config, args.config.as_deref())?;
        eprintln!("Saved configuration to {}", path.display());
    }

    Ok(config)
}

async fn run_page(config: &AppConfig, args: &CliArgs, manifest: &PageManifest) -> Result<LoadReport> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let loader = ImageLoader::new(
        Arc::new(QueryUrlTransformer::new(&config.transform)),
        Arc::new(HttpImageFetcher::new(&config.fetch)?),
        DecoderFormatProbe::shared(),
        Arc::new(config.lazy.clone()),
    )
    .with_events(&event_tx);
    drop(event_tx);

    let tracker = Arc::new(if args.no_intersection {
        ViewportTracker::unsupported(manifest.viewport_height)
    } else {
        ViewportTracker::new(manifest.viewport_height).with_root_margin(manifest.root_margin)
    });

    let elements = manifest.elements()?;
    for (element, span) in &elements {
        tracker.place(element.id().clone(), *span);
    }

    let binder = LazyImageBinder::new(loader, tracker.clone());
    for (element, _) in &elements {
        binder.attach(Arc::clone(element));
    }
    binder.wait_triggered(&tracker.intersecting()).await;

    let offsets = args.scroll.clone().unwrap_or_else(|| manifest.scroll.clone());
    for offset in offsets {
        debug!(offset, "Scrolling viewport");
        tracker.scroll_to(offset);
        binder.wait_triggered(&tracker.intersecting()).await;
    }

    binder.loader().wait_idle().await;

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }

    let elements: Vec<_> = elements.into_iter().map(|(element, _)| element).collect();
    Ok(LoadReport::build(&elements, events))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = lazyimg::VERSION, "Starting lazyimg");

    let manifest = PageManifest::load(&args.page)?;
    let report = run_page(&config, &args, &manifest).await?;

    print!("{}", report.render(args.report)?);

    Ok(())
}
