//! Command-line interface
//!
//! One run of the binary executes both pipelines against the roots named in
//! the config file and exits non-zero on the first failure. There is no
//! retry and no partial rollback: a failed later write can leave earlier
//! tables already overwritten.

use crate::config::AppConfig;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::pipeline;
use clap::Parser;
use std::path::PathBuf;

/// Batch ETL job that builds a music-streaming star schema
#[derive(Parser, Debug)]
#[command(name = "playlake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file (YAML)
    #[arg(short, long, default_value = "etl.yaml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load the config, create the context, and run both pipelines
pub async fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_path(&cli.config)?;
    let ctx = ExecutionContext::create(&config)?;

    pipeline::process_catalog(&ctx, ctx.input(), ctx.output()).await?;
    pipeline::process_events(&ctx, ctx.input(), ctx.output()).await?;

    tracing::info!("run complete");
    Ok(())
}
