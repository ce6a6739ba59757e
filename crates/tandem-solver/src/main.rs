// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tandem_bnb::{render, report::SolutionReport};
use tandem_model::loading::InstanceLoader;
use tandem_solver::solver::{SolverBuilder, resolve_config};
use tracing_subscriber::EnvFilter;

/// Places relay stations between two gateways with minimal noncoverage.
#[derive(Debug, Parser)]
#[command(name = "tandem", version, about)]
struct Args {
    /// Instance document (JSON).
    #[arg(long)]
    instance: PathBuf,

    /// Search configuration (TOML); replaces the instance's `configuration`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the report.
    #[arg(long, default_value = "solution.json")]
    output: PathBuf,

    /// Also write the search tree as Graphviz DOT.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Wall-clock limit of the search in seconds.
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Seconds between progress lines.
    #[arg(long, default_value_t = 1)]
    log_interval_secs: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let instance = InstanceLoader::new()
        .from_path(&args.instance)
        .with_context(|| format!("failed to load instance `{}`", args.instance.display()))?;

    let toml = args
        .config
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("failed to read config `{}`", path.display()))
        })
        .transpose()?;
    let config = resolve_config(&instance, toml.as_deref()).context("invalid search configuration")?;

    let mut builder = SolverBuilder::new(config).with_progress_log(Duration::from_secs(args.log_interval_secs));
    if let Some(secs) = args.time_limit_secs {
        builder = builder.with_time_limit(Duration::from_secs(secs));
    }
    let mut solver = builder.build();

    let outcome = solver.solve(&instance.model).context("search failed")?;
    tracing::info!("{}", outcome.statistics());

    SolutionReport::from_outcome(&instance.model, &outcome)
        .write_to_path(&args.output)
        .context("failed to write report")?;
    if let Some(path) = &args.dot {
        render::write_dot(outcome.tree(), outcome.schedule(), path).context("failed to write tree")?;
    }

    match outcome.best_record() {
        Some(best) => tracing::info!(
            kind = %best.kind,
            noncoverage = best.noncoverage,
            cost = best.cost,
            delay = best.delay,
            pattern = %best.pattern,
            "best placement"
        ),
        None => tracing::warn!("no record accepted"),
    }
    Ok(())
}
