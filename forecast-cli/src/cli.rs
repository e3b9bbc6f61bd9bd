use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, FileStore, KeyValueStore, ScreenController, ScreenHandle, provider_from_config,
};
use inquire::{Password, Text, validator::Validation};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast for a searchable city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and the default city.
    Configure,

    /// Print the forecast once, for CITY or the remembered/default city.
    Show {
        /// City name; defaults to the last selected city.
        city: Option<String>,
    },

    /// List cities matching QUERY.
    Search {
        query: String,
    },

    /// Interactive screen: type to search, `:N` to pick a result.
    Screen,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::Search { query } => search(&query).await,
            Command::Screen => screen().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let key = Password::new("WeatherAPI.com key:")
        .without_confirmation()
        .with_validator(|input: &str| {
            Ok(if input.trim().is_empty() {
                Validation::Invalid("the key must not be empty".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()?;
    cfg.set_api_key(key.trim().to_string());

    let city = Text::new("Default city:")
        .with_default(&cfg.default_city)
        .prompt()?;
    cfg.default_city = city.trim().to_string();

    cfg.validate()?;
    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(city: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let api = provider_from_config(&cfg)?;

    let snapshot = match city {
        Some(city) => api.get_forecast(&city, cfg.forecast_days).await?,
        None => {
            // Same path as activating the screen: remembered city, else default.
            let (handle, task) =
                ScreenController::new(api, open_store()?, cfg.screen_settings()).spawn();
            let state = handle.wait_for(|s| !s.loading).await?;
            handle.shutdown().await?;
            task.await?;

            if let Some(error) = state.error {
                bail!(error);
            }
            state
                .snapshot
                .context("forecast finished without a snapshot")?
        }
    };

    print!("{}", render::snapshot(&snapshot));
    Ok(())
}

async fn search(query: &str) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    if query.chars().count() <= cfg.screen.min_query_len {
        bail!(
            "query must be longer than {} characters",
            cfg.screen.min_query_len
        );
    }

    let api = provider_from_config(&cfg)?;
    let candidates = api.search_locations(query).await?;
    if candidates.is_empty() {
        println!("No cities match '{query}'.");
    }
    for candidate in candidates {
        println!("{}", candidate.label());
    }
    Ok(())
}

async fn screen() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let api = provider_from_config(&cfg)?;
    let (handle, task) = ScreenController::new(api, open_store()?, cfg.screen_settings()).spawn();

    println!("Type a city to search (:s search box, :N pick, :r retry, :q quit)");

    let mut updates = handle.subscribe();
    let painter = tokio::spawn(async move {
        loop {
            let frame = render::screen(&updates.borrow_and_update());
            println!("\n{frame}");
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = ScreenInput::parse(&line);
        tracing::debug!(?input, "screen input");
        match input {
            ScreenInput::Quit => break,
            ScreenInput::ToggleSearch => handle.toggle_search().await?,
            ScreenInput::Retry => handle.retry().await?,
            ScreenInput::Pick(n) => pick(&handle, n).await?,
            ScreenInput::Query(text) => {
                if handle.state().show_search {
                    handle.query_changed(text).await?;
                } else {
                    println!("Open the search box with :s first.");
                }
            }
            ScreenInput::Unknown(cmd) => println!("Unknown command :{cmd}"),
        }
    }

    handle.shutdown().await?;
    task.await?;
    painter.await?;
    Ok(())
}

async fn pick(handle: &ScreenHandle, n: usize) -> anyhow::Result<()> {
    let state = handle.state();
    match n.checked_sub(1).and_then(|i| state.visible_candidates().get(i)) {
        Some(candidate) => handle.select_city(candidate.clone()).await,
        None => {
            println!("No search result #{n}.");
            Ok(())
        }
    }
}

fn open_store() -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store = FileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "using store");
    Ok(Arc::new(store))
}

/// One line of input on the interactive screen.
#[derive(Debug, PartialEq, Eq)]
enum ScreenInput {
    Query(String),
    Pick(usize),
    ToggleSearch,
    Retry,
    Quit,
    Unknown(String),
}

impl ScreenInput {
    fn parse(line: &str) -> Self {
        let Some(cmd) = line.trim().strip_prefix(':') else {
            // Keep inner spaces: "New York" is a query.
            return Self::Query(line.trim_end_matches(['\r', '\n']).to_string());
        };

        match cmd.trim() {
            "s" => Self::ToggleSearch,
            "r" => Self::Retry,
            "q" => Self::Quit,
            other => other
                .parse()
                .map(Self::Pick)
                .unwrap_or_else(|_| Self::Unknown(other.to_string())),
        }
    }
}
