pub mod actions;
pub mod api;
pub mod auth;
pub mod booking;
pub mod client;
pub mod config;
pub mod csrf;
pub mod error;
pub mod events;
pub mod guests;
pub mod models;
pub mod notify;
pub mod page;
pub mod pages;
pub mod render;
pub mod session;
pub mod status;
mod utils;

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use actions::{delegate, RefreshTarget, UiAction};
pub use booking::{BookingForm, BookingSession, BookingState};
pub use client::{Dispatched, ViewClient};
pub use config::{ConfigStore, ViewConfig};
pub use error::ViewError;
pub use events::EventForm;
pub use guests::GuestForm;
pub use page::{Page, PageKind};
pub use session::{EventScope, ScopeKind};
pub use status::{BookingStatusField, Control, GuestRef, Refresh, RsvpField};

/// Loads a server-rendered Evently page against the API and prints the
/// resulting container contents.
#[derive(Debug, Parser)]
#[command(name = "evently-view", version)]
struct Args {
    /// Server-rendered HTML of the page to initialize.
    #[arg(long)]
    page_file: PathBuf,
    /// API origin; overrides the config file and EVENTLY_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Path and query the page was served at.
    #[arg(long, default_value = "/")]
    location: String,
    /// Cookie header to send, e.g. "sessionid=...; csrftoken=...".
    #[arg(long, default_value = "")]
    cookies: String,
    /// Config file to use instead of the one in the data directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print only these containers.
    #[arg(long = "container")]
    containers: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let store = match &args.config {
        Some(path) => ConfigStore::load_from(path.clone()),
        None => ConfigStore::load(),
    };
    let mut config = store.read().with_env();
    if let Some(base_url) = args.base_url.clone() {
        config.base_url = base_url;
    }

    let document = fs::read_to_string(&args.page_file)
        .with_context(|| format!("reading page {:?}", args.page_file))?;
    let page = Page::parse(&document, &args.location, &args.cookies);
    let client = ViewClient::new(config, page.clone()).context("building view client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    let kind = runtime.block_on(client.init_page());
    if kind.is_none() {
        tracing::warn!("page has no recognised data-page; nothing was loaded");
    }

    for (id, container) in page.snapshot() {
        if !args.containers.is_empty() && !args.containers.contains(&id) {
            continue;
        }
        let hidden = if container.hidden { " (hidden)" } else { "" };
        println!("#{id}{hidden}\n{}\n", container.html);
    }
    for toast in page.toasts() {
        println!("[{}] {}", toast.kind.title(), toast.message);
    }
    Ok(())
}
