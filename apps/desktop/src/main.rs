use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpListingSource, ObserverHandle, OverviewViewModel};
use shared::{
    domain::{ApiStatus, ListingFilter},
    protocol::Listing,
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod detail;
mod render;

use config::load_settings;
use detail::DetailViewModel;

#[derive(Parser, Debug)]
#[command(about = "Browse real-estate listings")]
struct Args {
    /// Config file; ./client.toml is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    /// all, rent or buy
    #[arg(long)]
    filter: Option<ListingFilter>,
    /// Open the detail view for this listing id.
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    let filter = args.filter.unwrap_or(settings.default_filter);

    let source = HttpListingSource::with_timeout(&settings.api_base_url, settings.request_timeout())
        .with_context(|| {
            format!(
                "failed to configure listings source for '{}'",
                settings.api_base_url
            )
        })?;
    info!(endpoint = %source.endpoint(), %filter, "loading listings");

    let mut overview = OverviewViewModel::new(Arc::new(source), Handle::current());
    let mut navigator = DetailNavigator::attach(&overview, &Handle::current());
    overview.fetch(filter);

    let status = wait_until_settled(&overview).await;
    if status != Some(ApiStatus::Done) {
        overview.teardown();
        return Ok(ExitCode::FAILURE);
    }

    let listings = overview.listings().get();
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render::listing_grid(&listings))?;

    if let Some(id) = args.select.as_deref() {
        match listings.iter().find(|listing| listing.id().as_str() == id) {
            Some(listing) => {
                overview.select(listing.clone());
                navigator.navigate(&overview, &mut stdout).await?;
            }
            None => warn!(id, "no listing with that id in the current results"),
        }
    }

    overview.teardown();
    Ok(ExitCode::SUCCESS)
}

/// Renders each status change until the fetch settles. Returns `None` if
/// the view model went away first.
async fn wait_until_settled(overview: &OverviewViewModel) -> Option<ApiStatus> {
    let mut status = overview.status().subscribe();
    let mut current = status.current();
    loop {
        if let Some(line) = render::status_line(current) {
            eprintln!("{line}");
        }
        if matches!(current, Some(settled) if settled.is_settled()) {
            return current;
        }
        current = status.changed().await?;
    }
}

/// Observes the selection signal and shows the detail view for each
/// listing selected while attached.
struct DetailNavigator {
    _observer: ObserverHandle,
    selected: mpsc::UnboundedReceiver<Listing>,
}

impl DetailNavigator {
    fn attach(overview: &OverviewViewModel, runtime: &Handle) -> Self {
        let (tx, selected) = mpsc::unbounded_channel();
        let observer = overview.selection().observe(runtime, move |selection| {
            if let Some(listing) = selection {
                let _ = tx.send(listing.clone());
            }
        });
        Self {
            _observer: observer,
            selected,
        }
    }

    /// Waits for the next selection, renders it and consumes it so a
    /// re-attached navigator does not show it again. Returns `false` if the
    /// selection signal went away first.
    async fn navigate(
        &mut self,
        overview: &OverviewViewModel,
        out: &mut impl Write,
    ) -> io::Result<bool> {
        let Some(listing) = self.selected.recv().await else {
            return Ok(false);
        };
        let detail = DetailViewModel::new(listing);
        write!(out, "\n{}", render::detail_view(&detail))?;
        overview.consume_selection();
        Ok(true)
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
