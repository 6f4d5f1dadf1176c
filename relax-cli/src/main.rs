//! Command-line driver for kite-mesh relaxation.
//!
//! This binary parses arguments with clap, sets up tracing, and delegates
//! mesh setup and the relaxation loop to [`Runner`] from the `runner` module.

mod runner;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use runner::{Args, Runner};

fn main() -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();

    let args = Args::parse();
    let print_grid = args.print_grid;

    let mut runner = Runner::new(&args)?;
    let outcome = runner.run();

    if print_grid {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        runner.write_grid(&mut out)?;
        out.flush()?;
    }

    if !outcome.converged {
        tracing::warn!(
            iterations = outcome.iterations,
            displacement = outcome.final_displacement,
            "mesh did not settle; raise --max-iterations or --tolerance"
        );
    }

    Ok(())
}
