mod browse;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    pagination::{paginate, total_pages},
    CountrySource, DetailController, DetailViewState, ListController, ListViewState,
    RestCountriesSource,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Browse the REST Countries catalog")]
struct Args {
    /// Config file, `catalog.toml` in the working directory when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the full catalog.
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print one page of countries whose name matches `query`.
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print everything known about one country code.
    Show { code: String },
    /// Search and page interactively.
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut settings, mut warnings) = config::load_settings(args.config.as_deref())?;
    settings.apply_overrides(args.api_url, args.page_size, &mut warnings);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    for warning in &warnings {
        warn!("config: {warning}");
    }
    info!(
        api = %settings.api_base_url,
        page_size = %settings.page_size,
        debounce_ms = settings.debounce_ms,
        "catalog starting"
    );

    let source: Arc<dyn CountrySource> = Arc::new(
        RestCountriesSource::new(&settings.api_base_url, settings.request_timeout())
            .context("failed to set up the catalog client")?,
    );

    match args.command {
        Command::List { page } => list(source, &settings, page).await,
        Command::Search { query, page } => search(source.as_ref(), &settings, &query, page).await,
        Command::Show { code } => show(source, code).await,
        Command::Browse => browse::run(source, settings.list_config()).await,
    }
}

async fn list(source: Arc<dyn CountrySource>, settings: &Settings, page: usize) -> Result<()> {
    let controller = ListController::new(source, settings.list_config());
    let mut states = controller.subscribe();
    let state = states
        .wait_for(|state| !matches!(state, ListViewState::Loading))
        .await
        .context("list controller stopped")?
        .clone();
    if let ListViewState::Error { message } = &state {
        bail!("{message}");
    }
    if page != 1 && !controller.go_to_page(page) {
        bail!("page {page} is not available");
    }
    print!("{}", render::list_state(&controller.state()));
    Ok(())
}

async fn search(
    source: &dyn CountrySource,
    settings: &Settings,
    query: &str,
    page: usize,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("search needs a non-empty query");
    }
    let countries = match source.search_by_name(query).await {
        Ok(countries) => countries,
        Err(failure) if failure.is_not_found() => Vec::new(),
        Err(failure) => {
            warn!(kind = ?failure.kind, detail = %failure.detail, "search failed");
            bail!("{}", failure.user_message());
        }
    };
    if !(1..=total_pages(countries.len(), settings.page_size)).contains(&page) {
        bail!("page {page} is not available");
    }
    let state = ListViewState::from(paginate(&countries, page, settings.page_size));
    print!("{}", render::list_state(&state));
    Ok(())
}

async fn show(source: Arc<dyn CountrySource>, code: String) -> Result<()> {
    let detail = DetailController::new(source, Some(code));
    let state = browse::settled_detail(&detail).await?;
    if let DetailViewState::Error { message } = &state {
        bail!("{message}");
    }
    print!("{}", render::detail_state(&state));
    Ok(())
}
