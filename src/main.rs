use std::{
    fs::OpenOptions,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Context};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod classify;
mod cli;
mod config;
mod controller;
mod discovery;
mod entry;
mod normalize;
mod remote;
mod search;
#[cfg(test)]
mod tests;
mod tui;

use classify::{Bucket, Classifier};
use config::{Config, SearchMode};
use entry::Corpus;
use remote::{PocketBase, RecordSource};

fn init_logging(interactive: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (log_file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // stderr would draw over the alternate screen
        (None, true) => builder.with_writer(std::io::sink).init(),
        (None, false) => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Corpus a one-shot command should search. Server mode narrows remotely,
/// client mode pulls everything.
fn fetch_corpus(config: &Config, source: &dyn RecordSource, query: &str) -> anyhow::Result<Corpus> {
    let remote_query = match config.search.mode {
        SearchMode::Server => query,
        SearchMode::Client => "",
    };

    Ok(remote::fetch_all(source, remote_query)?)
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let command = args
        .command
        .unwrap_or(cli::Command::Browse { log_file: None });

    match &command {
        cli::Command::Browse { log_file } => init_logging(true, log_file.as_deref())?,
        _ => init_logging(false, None)?,
    }

    let config = Config::load()?;

    match command {
        cli::Command::Config {} => {
            print!("{}", serde_yml::to_string(&config)?);
            Ok(())
        }

        cli::Command::Browse { .. } => {
            // built outside the runtime: the blocking client must not be
            // created or dropped on an async thread
            let source: Arc<dyn RecordSource> = Arc::new(PocketBase::new(&config.remote)?);
            tui::start(&config, source.clone())
        }

        cli::Command::Search {
            query,
            bucket,
            count,
        } => {
            let query = query.unwrap_or_default();
            let bucket = bucket
                .map(|name| Bucket::parse(&name).ok_or_else(|| anyhow!("unknown bucket {name:?}")))
                .transpose()?;

            let source = PocketBase::new(&config.remote)?;
            let corpus = fetch_corpus(&config, &source, &query)?;
            let results = search::search(&corpus, &query, &config.search);
            let buckets = Classifier::new(&config.classifier)?.classify(&results);

            if count {
                for (bucket, entries) in buckets.iter() {
                    println!("{bucket}: {}", entries.len());
                }
                println!("total: {}", buckets.len());
                return Ok(());
            }

            let output = match bucket {
                Some(bucket) => serde_json::to_value(buckets.get(bucket))?,
                None => json!({
                    "query": query,
                    "total": results.len(),
                    "buckets": {
                        "primary-source": buckets.primary_source,
                        "domain": buckets.domain,
                        "general": buckets.general,
                    },
                }),
            };

            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }

        cli::Command::Discover { count } => {
            let source = PocketBase::new(&config.remote)?;
            let corpus = remote::fetch_all(&source, "")?;
            let n = count.unwrap_or(config.discovery.sample_size);
            let sample = discovery::sample(&corpus, n);

            println!("{}", serde_json::to_string_pretty(&sample)?);
            Ok(())
        }

        cli::Command::Suggest { count } => {
            let source = PocketBase::new(&config.remote)?;
            let corpus = remote::fetch_all(&source, "")?;
            let k = count.unwrap_or(config.discovery.suggestion_count);

            let terms = discovery::suggest_terms(
                &corpus,
                k,
                config.discovery.suggestion_pool,
                Duration::from_secs(config.discovery.rotation_secs),
            );
            for term in terms {
                println!("{term}");
            }
            Ok(())
        }
    }
}
