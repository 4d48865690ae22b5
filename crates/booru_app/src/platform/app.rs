use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use booru_core::{default_tabs, LoadStatus, ProfileRequest};
use booru_engine::{Pager, ProfileAggregator, ReqwestTransport, Transport};
use booru_logging::{booru_info, booru_warn};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use super::config::{AppConfig, DEFAULT_CONFIG_PATH};
use super::logging;
use super::render::{describe_entry, describe_post, status_line, ListRenderer};

#[derive(Debug, Parser)]
#[command(name = "booru", version, about = "Browse an image board feed or a user profile")]
struct Cli {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Page through one of the home feed tabs.
    Feed {
        #[arg(long, value_enum, default_value_t = Tab::Newest)]
        tab: Tab,
        /// Extra search terms, e.g. "landscape order:score".
        #[arg(long)]
        tags: Option<String>,
        /// Number of pages to load before stopping.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Aggregate a user profile. Without a name, the configured account is used.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        id: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tab {
    Newest,
    Day,
    Week,
    Month,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Newest => 0,
            Tab::Day => 1,
            Tab::Week => 2,
            Tab::Month => 3,
        }
    }
}

pub async fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);
    booru_info!("booru starting against {}", config.site);

    let transport: Arc<dyn Transport> = Arc::new(
        ReqwestTransport::new(config.transport_settings())
            .with_context(|| format!("invalid site {:?}", config.site))?,
    );

    match cli.command {
        Command::Feed { tab, tags, pages } => {
            run_feed(transport, &config, tab, tags.as_deref(), pages).await
        }
        Command::Profile { name, id } => run_profile(transport, &config, name, id).await,
    }
}

async fn run_feed(
    transport: Arc<dyn Transport>,
    config: &AppConfig,
    tab: Tab,
    tags: Option<&str>,
    pages: usize,
) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let (title, mut query) = default_tabs(today)
        .into_iter()
        .nth(tab.index())
        .context("unknown feed tab")?;
    if let Some(tags) = tags {
        query = query.with_tag(tags);
    }
    println!("{title}: {query}");

    let pager = Pager::for_query(transport, query, config.pager_config());
    let mut snapshots = pager.stream();
    let mut renderer = ListRenderer::new(describe_post);
    let mut previous = LoadStatus::Idle;
    let mut loaded = 0;

    while let Some(snapshot) = snapshots.next().await {
        for line in renderer.update(&snapshot.items) {
            println!("{line}");
        }
        if let Some(status) = status_line(&snapshot) {
            println!("{status}");
        }

        match snapshot.status {
            // The first snapshot may already hold a page loaded before subscribing.
            LoadStatus::Idle
                if previous == LoadStatus::Loading || (loaded == 0 && !snapshot.items.is_empty()) =>
            {
                loaded += 1;
                if loaded >= pages {
                    break;
                }
                pager.load_more();
            }
            LoadStatus::Error => {
                let message = snapshot.retry_message().unwrap_or("unknown error");
                bail!("feed page failed: {message}");
            }
            LoadStatus::EndOfStream => break,
            _ => {}
        }
        previous = snapshot.status;
    }

    Ok(())
}

async fn run_profile(
    transport: Arc<dyn Transport>,
    config: &AppConfig,
    name: Option<String>,
    id: Option<u64>,
) -> anyhow::Result<()> {
    let request = ProfileRequest { name, user_id: id };
    let aggregator = ProfileAggregator::new(
        transport,
        Arc::new(config.identity()),
        request,
        config.profile_settings(),
    );

    let mut entries = aggregator.entries();
    let mut renderer = ListRenderer::new(describe_entry);
    let mut run = tokio::spawn({
        let aggregator = aggregator.clone();
        async move { aggregator.aggregate().await }
    });

    let resolved = loop {
        tokio::select! {
            finished = &mut run => break finished?,
            Some(snapshot) = entries.next() => {
                for line in renderer.update(&snapshot) {
                    println!("{line}");
                }
            }
        }
    };
    if !resolved {
        bail!("no profile to show: pass --name or configure an account");
    }
    for line in renderer.update(&aggregator.snapshot()) {
        println!("{line}");
    }

    if let Some((name, user_id)) = aggregator.resolve().await {
        match aggregator.face_url(user_id) {
            Some(face) => println!("{name} ({user_id}) avatar: {face}"),
            None => booru_warn!("no avatar url for user {}", user_id),
        }
    }
    Ok(())
}
