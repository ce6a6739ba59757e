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

//! # Search Orchestration
//!
//! A facade that turns a loaded instance into a finished search: it resolves
//! the configuration, selects the bound strategy, assembles the monitor
//! stack and runs the branch-and-bound engine.
//!
//! ## Highlights
//!
//! - Configuration precedence: an explicit TOML document replaces the
//!   `configuration` object embedded in the instance; without either the
//!   defaults apply (exact branch-and-bound with the ILP bound).
//! - Monitor stack, in order:
//!   - `InterruptMonitor` on a shared flag, so another thread (or a signal
//!     handler) can stop the run.
//!   - `TimeLimitMonitor` if a time limit is set.
//!   - `RecordLimitMonitor` if a record limit is set.
//!   - `LogMonitor` for periodic progress lines.
//!
//! ## Usage
//!
//! ```rust
//! use tandem_model::loading::InstanceLoader;
//! use tandem_solver::solver::{SolverBuilder, resolve_config};
//!
//! let json = r#"{
//!     "placement": [0, 10],
//!     "gateway_placement": [-5, 15],
//!     "cost_limit": 10,
//!     "delay_limit": 5.0,
//!     "arrival_rate": 0.5,
//!     "average_packet_size": 1.0,
//!     "sta": [{"cost": 1, "throughput": 10}, {"cost": 1, "throughput": 10}],
//!     "coverage": [5, 5],
//!     "link_distance": [[0, 20], [20, 0]],
//!     "link_distance2gateway": [20, 20],
//!     "gateway2link_distance": [20, 20]
//! }"#;
//! let instance = InstanceLoader::new().from_str(json).unwrap();
//! let config = resolve_config(&instance, None).unwrap();
//!
//! let mut solver = SolverBuilder::new(config).build();
//! let outcome = solver.solve(&instance.model).unwrap();
//! assert_eq!(outcome.schedule().best_optimal(), 0.0);
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tandem_bnb::{
    bnb::BnbSolver,
    bound::strategy_for,
    config::{ConfigError, SearchConfig},
    error::SearchError,
    monitor::{
        composite::CompositeMonitor, interrupt::InterruptMonitor, log::LogMonitor, solution::RecordLimitMonitor,
        time::TimeLimitMonitor,
    },
    result::BnbSolverOutcome,
};
use tandem_model::{loading::Instance, model::Model};

/// Resolves the search configuration of `instance`.
///
/// `toml` replaces the instance's embedded `configuration` object entirely.
pub fn resolve_config(instance: &Instance, toml: Option<&str>) -> Result<SearchConfig, ConfigError> {
    match (toml, &instance.configuration) {
        (Some(document), _) => SearchConfig::from_toml_str(document),
        (None, Some(embedded)) => SearchConfig::from_json_value(embedded.clone()),
        (None, None) => Ok(SearchConfig::default()),
    }
}

pub struct Solver {
    config: SearchConfig,
    stop_signal: Arc<AtomicBool>,
    record_limit: Option<u64>,
    log_interval: Option<Duration>,
    engine: BnbSolver,
}

impl Solver {
    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the flag that stops a running search when raised.
    #[inline]
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.config.time_limit
    }

    #[inline]
    pub fn record_limit(&self) -> Option<u64> {
        self.record_limit
    }

    /// Runs one search on `model`.
    pub fn solve(&mut self, model: &Model) -> Result<BnbSolverOutcome, SearchError> {
        self.stop_signal.store(false, Ordering::Relaxed);

        let mut strategy = strategy_for(&self.config);
        let mut monitor = CompositeMonitor::with_capacity(4);
        monitor.add_monitor(InterruptMonitor::new(Arc::clone(&self.stop_signal)));
        if let Some(limit) = self.config.time_limit {
            monitor.add_monitor(TimeLimitMonitor::new(limit));
        }
        if let Some(limit) = self.record_limit {
            monitor.add_monitor(RecordLimitMonitor::new(limit));
        }
        if let Some(interval) = self.log_interval {
            monitor.add_monitor(LogMonitor::new(interval, 0xFF));
        }

        tracing::info!(
            config = %self.config,
            strategy = strategy.name(),
            monitors = monitor.len(),
            "starting search"
        );

        let outcome = self.engine.solve(model, &self.config, strategy.as_mut(), &mut monitor)?;
        tracing::info!(
            termination = %outcome.termination_reason(),
            best = outcome.schedule().best_optimal(),
            records = outcome.schedule().num_records(),
            "search finished"
        );
        Ok(outcome)
    }
}

pub struct SolverBuilder {
    config: SearchConfig,
    stop_signal: Option<Arc<AtomicBool>>,
    record_limit: Option<u64>,
    log_interval: Option<Duration>,
}

impl SolverBuilder {
    #[inline]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            stop_signal: None,
            record_limit: None,
            log_interval: None,
        }
    }

    /// Overrides the configured search time limit.
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_record_limit(mut self, limit: u64) -> Self {
        self.record_limit = Some(limit);
        self
    }

    /// Emits a progress line at most once per `interval`.
    #[inline]
    pub fn with_progress_log(mut self, interval: Duration) -> Self {
        self.log_interval = Some(interval);
        self
    }

    /// Uses an externally owned stop flag, e.g. one raised by a signal handler.
    #[inline]
    pub fn with_stop_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    #[inline]
    pub fn build(self) -> Solver {
        Solver {
            config: self.config,
            stop_signal: self.stop_signal.unwrap_or_default(),
            record_limit: self.record_limit,
            log_interval: self.log_interval,
            engine: BnbSolver::new(),
        }
    }
}
