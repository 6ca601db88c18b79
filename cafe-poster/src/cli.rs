//! # cafe-poster CLI Interface (Module)
//!
//! Command parsing and the async [`run`] entrypoint. All pipeline logic lives in
//! `cafe-poster-core`; this module only loads configuration, wires the HTTP clients
//! into the orchestrator and prints the outcome.
//!
//! ## How To Use
//! - Command line: `cafe-poster publish --config accounts.yaml [--test] [-d] [-w] [-c]`.
//! - Programmatic/integration use: call [`run`] with a constructed [`Cli`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use cafe_poster_core::config::TypeFilter;
use cafe_poster_core::contract::{Collaborators, InstrumentType};
use cafe_poster_core::orchestrate::Orchestrator;
use cafe_poster_core::pacing::SleepPacer;
use clap::{Args, Parser, Subcommand};

use crate::cafe::CafeClient;
use crate::handler::HandlerResponse;
use crate::load_config::{load_config, RunOptions};
use crate::pflow::PflowClient;

/// CLI for cafe-poster: publish generated market articles to cafe boards.
#[derive(Parser)]
#[clap(
    name = "cafe-poster",
    version,
    about = "Generate one article per ranked stock or coin and post it to cafe boards for every account"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the publishing batch for every configured account
    Publish(PublishArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct PublishArgs {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,

    /// Post every article to the configured test board
    #[clap(long)]
    pub test: bool,

    /// Only process domestic stocks
    #[clap(short = 'd', long)]
    pub domestic: bool,

    /// Only process world stocks
    #[clap(short = 'w', long)]
    pub world: bool,

    /// Only process crypto
    #[clap(short = 'c', long)]
    pub crypto: bool,

    /// Print the full run report as JSON instead of the summary
    #[clap(long)]
    pub json: bool,

    /// Print a handler-style `{statusCode, body}` response
    #[clap(long)]
    pub handler_response: bool,
}

impl PublishArgs {
    pub fn run_options(&self) -> RunOptions {
        let selected = [
            (self.domestic, InstrumentType::Domestic),
            (self.world, InstrumentType::World),
            (self.crypto, InstrumentType::Crypto),
        ];
        RunOptions {
            test_mode: self.test,
            type_filter: TypeFilter::from_selection(
                selected
                    .into_iter()
                    .filter_map(|(on, kind)| on.then_some(kind)),
            ),
        }
    }
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish(args) => publish(args).await,
    }
}

async fn publish(args: PublishArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let options = args.run_options();
    tracing::info!(
        command = "publish",
        test_mode = options.test_mode,
        filter = ?options.type_filter,
        "Starting publishing run"
    );
    let publish_config = config.to_publish_config(&options)?;
    publish_config.trace_loaded();

    let pflow = PflowClient::new(&config.backend.base_url)
        .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))?;
    let cafe = CafeClient::new(&config.cafe.api_base)
        .map_err(|e| anyhow::anyhow!("failed to build cafe client: {e}"))?;
    let pacer = SleepPacer::new(publish_config.delays);
    let services = Collaborators {
        accounts: &pflow,
        tokens: &pflow,
        content: &pflow,
        images: &cafe,
        articles: &cafe,
        pacer: &pacer,
    };

    let outcome = Orchestrator::new(publish_config, services)
        .run()
        .await
        .context("publishing run failed");

    if args.handler_response {
        let response = HandlerResponse::from_outcome(&outcome);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return outcome.map(|_| ());
    }

    let report = outcome?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    tracing::info!(
        command = "publish",
        success = report.success_count(),
        failed = report.fail_count(),
        "Publishing run complete"
    );
    Ok(())
}
