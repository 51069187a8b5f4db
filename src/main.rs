//! Lotwatch daemon binary.
//!
//! A thin harness around the engine: registers the criteria given on
//! the command line for a single local user, then either runs one
//! search or monitors until interrupted. The real inbound surface (a
//! chat frontend) lives outside this crate and talks to the same
//! library API.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lotwatch::application::monitor::Notifier;
use lotwatch::application::{MonitorRegistry, SearchEngine, SettingsStore, UserId};
use lotwatch::domain::{validate_category_url, Lot};
use lotwatch::infrastructure::logging;
use lotwatch::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const LOCAL_USER: UserId = 0;

struct CliArgs {
    config_path: Option<PathBuf>,
    keywords: String,
    min_price: Option<String>,
    max_price: Option<String>,
    watch: bool,
    categories: Vec<String>,
}

/// Logs each new lot; a chat frontend would deliver a message instead.
struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_new_lot(&self, user: UserId, lot: &Lot, keyword: &str) {
        info!(
            "New lot for user {}: [{}] {} - {}",
            user,
            keyword,
            lot.title,
            lot.link_or_category()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => AppConfig::load(path).await?,
        None => AppConfig::load_or_default(&PathBuf::from("lotwatch.json")).await?,
    };
    logging::init_logging_with_config(&config.logging)?;

    let store = SettingsStore::new();
    store
        .update(LOCAL_USER, |settings| -> Result<()> {
            settings.set_keywords(&args.keywords)?;

            match (&args.min_price, &args.max_price) {
                (Some(min), Some(max)) => {
                    settings.set_price_range(&[min.as_str(), max.as_str()])?;
                }
                (None, Some(max)) => settings.set_price_range(&[max.as_str()])?,
                (Some(min), None) => settings.set_price_range(&[min.as_str(), "0"])?,
                (None, None) => {}
            }

            for url in &args.categories {
                validate_category_url(
                    url,
                    &config.marketplace.host,
                    &config.marketplace.category_path_markers,
                )?;
                settings.add_category(url.clone())?;
            }
            Ok(())
        })
        .await
        .context("invalid search criteria")?;

    let snapshot = store
        .snapshot(LOCAL_USER)
        .await
        .context("settings vanished")?;
    info!("Criteria: {}", snapshot.summary());

    let engine = SearchEngine::new(&config)?;

    if args.watch {
        let registry = Arc::new(MonitorRegistry::new(
            Arc::new(engine),
            store,
            Arc::new(LogNotifier),
            config.monitor.clone(),
        ));
        registry.start(LOCAL_USER).await;
        info!(
            "Monitoring every {}s, press Ctrl-C to stop",
            config.monitor.poll_interval_secs
        );

        tokio::signal::ctrl_c().await?;
        registry.stop(LOCAL_USER).await;
        info!("Monitoring stopped");
    } else {
        let matches = engine.search(&snapshot).await;
        if matches.is_empty() {
            info!("No lots matched the criteria");
        } else {
            info!("Found {} matching lot(s):", matches.len());
            for (i, m) in matches.iter().enumerate() {
                info!(
                    "{}. {} - {} ({})",
                    i + 1,
                    m.lot.price_display(),
                    m.lot.title,
                    m.lot.link_or_category()
                );
            }
        }
    }

    Ok(())
}

fn parse_args() -> Result<CliArgs> {
    let mut args = CliArgs {
        config_path: None,
        keywords: String::new(),
        min_price: None,
        max_price: None,
        watch: false,
        categories: Vec::new(),
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                args.config_path = Some(PathBuf::from(value));
            }
            "--keywords" => {
                args.keywords = iter.next().context("--keywords requires a value")?;
            }
            "--min" => args.min_price = Some(iter.next().context("--min requires a value")?),
            "--max" => args.max_price = Some(iter.next().context("--max requires a value")?),
            "--watch" => args.watch = true,
            "--help" | "-h" => {
                eprintln!(
                    "usage: lotwatch [--config PATH] [--watch] --keywords \"kw1,kw2\" \
                     [--min N] [--max N] CATEGORY_URL..."
                );
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown flag: {other}"),
            url => args.categories.push(url.to_string()),
        }
    }

    if args.keywords.is_empty() {
        bail!("--keywords is required");
    }
    if args.categories.is_empty() {
        bail!("at least one category URL is required");
    }

    Ok(args)
}
