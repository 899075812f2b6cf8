//! Render a page as an indented thread

use anyhow::{Context, Result};
use chrono::Utc;
use cli_lib::render::{self, Line, Tone};
use cli_lib::settings;
use content::view::{self, Row, RowKind, ViewOptions, ViewState};
use content::{Client, DispatchOutcome, Loader, LoaderDispatcher};
use futures::future::join_all;
use hackernews::HackerNewsClient;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct PageOptions {
    pub expand: bool,
    pub max_depth: usize,
    pub thread_single_replies: bool,
    pub rounds: usize,
    pub bodies: bool,
}

pub async fn run(path: &str, options: PageOptions) -> Result<()> {
    let config = settings::load()?;
    let client = HackerNewsClient::new(config.hackernews)
        .context("Failed to create Hacker News client")?;
    let client: Arc<dyn Client> = Arc::new(client);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Fetching {}", path));

    let page = client.get_page(path).await;
    let dispatcher = LoaderDispatcher::new(client, page);
    let pivot = dispatcher.pivot();
    let state = ViewState::new();
    let view_options = ViewOptions {
        max_depth: options.max_depth,
        thread_single_replies: options.thread_single_replies,
    };

    for round in 1..=options.rounds {
        let rows = dispatcher.with_content(|c| view::flatten(c, &pivot, &state, view_options));
        let loaders: Vec<&dyn Loader> = rows
            .iter()
            .filter_map(|row| match &row.kind {
                RowKind::Loader(loader) if options.expand || loader.base().autoload => {
                    Some(loader as &dyn Loader)
                }
                _ => None,
            })
            .collect();
        if loaders.is_empty() {
            break;
        }

        spinner.set_message(format!("Resolving {} loader(s), round {}", loaders.len(), round));
        let outcomes = join_all(loaders.iter().map(|loader| dispatcher.resolve(*loader))).await;
        let fetched = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, DispatchOutcome::Fetched(_)))
            .count();
        debug!(round, loaders = loaders.len(), fetched, "loader round finished");
        if fetched == 0 {
            break;
        }
    }
    spinner.finish_and_clear();

    let now = Utc::now();
    let lines = dispatcher.with_content(|c| {
        let rows: Vec<Row> = view::flatten(c, &pivot, &state, view_options);
        render::render_rows(c, &rows, now, options.bodies)
    });

    for line in &lines {
        print_line(line);
    }

    Ok(())
}

fn print_line(line: &Line) {
    let indent = "  ".repeat(line.depth);
    let headline = match line.tone {
        Tone::Pivot => line.headline.bold().to_string(),
        Tone::Ancestor => line.headline.dimmed().to_string(),
        Tone::Reply => line.headline.clone(),
        Tone::Action => line.headline.cyan().to_string(),
        Tone::Muted => line.headline.dimmed().to_string(),
        Tone::Error => line.headline.red().to_string(),
    };
    println!("{}{}", indent, headline);

    if let Some(meta) = &line.meta {
        if !meta.is_empty() {
            println!("{}  {}", indent, meta.dimmed());
        }
    }
    for body_line in &line.body {
        println!("{}  {}", indent, body_line);
    }
}
