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

//! Search configuration.
//!
//! `SearchConfigInput` mirrors the keys of a configuration file (TOML, or the
//! `configuration` object embedded in an instance document) and is resolved
//! into a typed, validated `SearchConfig`.
//!
//! ```
//! use tandem_bnb::config::{BoundMethod, SearchConfig, SearchMethod};
//!
//! let config = SearchConfig::from_toml_str(
//!     r#"
//!     method = "bab"
//!     estimation_method = "knapsack"
//!     relative_deviation = 0.1
//!     last_optimal_noncoverage = 12.0
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.method, SearchMethod::BranchAndBound);
//! assert_eq!(config.bound_method, BoundMethod::Knapsack);
//! assert_eq!(config.relative_deviation, Some(0.1));
//! ```

use crate::incumbent::{IncumbentMode, SolutionCriterion};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};
use tandem_model::model::Model;
use tandem_relax::SolveBudget;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown search method `{0}` (expected `bab`, `branch-and-bound`, `bf` or `brute-force`)")]
    UnknownSearchMethod(String),
    #[error("unknown bound method `{0}` (expected `ILP`, `knapsack` or `LP`)")]
    UnknownBoundMethod(String),
    #[error("relative deviation must be a non-negative finite number (got {0})")]
    InvalidDeviation(f64),
    #[error("a relative deviation needs `last_optimal_noncoverage` as its baseline")]
    MissingDeviationBaseline,
    #[error("`last_optimal_noncoverage` must be a non-negative finite number (got {0})")]
    InvalidBaseline(f64),
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the tree is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMethod {
    /// Depth-first with bound pruning.
    #[default]
    BranchAndBound,
    /// Depth-first over the whole feasible tree.
    BruteForce,
}

impl FromStr for SearchMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bab" | "bnb" | "branch-and-bound" => Ok(SearchMethod::BranchAndBound),
            "bf" | "brute-force" => Ok(SearchMethod::BruteForce),
            _ => Err(ConfigError::UnknownSearchMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMethod::BranchAndBound => write!(f, "branch-and-bound"),
            SearchMethod::BruteForce => write!(f, "brute-force"),
        }
    }
}

/// Which relaxation bounds the coverage of the vacant stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundMethod {
    #[default]
    Ilp,
    Knapsack,
    Lp,
}

impl FromStr for BoundMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ilp" => Ok(BoundMethod::Ilp),
            "knapsack" => Ok(BoundMethod::Knapsack),
            "lp" => Ok(BoundMethod::Lp),
            _ => Err(ConfigError::UnknownBoundMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for BoundMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundMethod::Ilp => write!(f, "ILP"),
            BoundMethod::Knapsack => write!(f, "knapsack"),
            BoundMethod::Lp => write!(f, "LP"),
        }
    }
}

/// Configuration as written in a file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfigInput {
    pub method: Option<String>,
    pub estimation_method: Option<String>,
    pub place_all_station: bool,
    pub relative_deviation: Option<f64>,
    pub last_optimal_noncoverage: Option<f64>,
    pub solver_time_limit_ms: Option<u64>,
    pub solver_max_nodes: Option<usize>,
    pub time_limit_ms: Option<u64>,
}

impl SearchConfigInput {
    /// Validates the input and converts it into a `SearchConfig`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unknown method names and for invalid
    /// deviation settings.
    pub fn resolve(&self) -> Result<SearchConfig, ConfigError> {
        let mut config = SearchConfig::default();
        if let Some(method) = &self.method {
            config.method = method.parse()?;
        }
        if let Some(bound) = &self.estimation_method {
            config.bound_method = bound.parse()?;
        }
        config.place_all_stations = self.place_all_station;
        config.relative_deviation = self.relative_deviation;
        config.last_optimal_noncoverage = self.last_optimal_noncoverage;
        if let Some(ms) = self.solver_time_limit_ms {
            config.solver_budget = config.solver_budget.with_time_limit(Duration::from_millis(ms));
        }
        if let Some(nodes) = self.solver_max_nodes {
            config.solver_budget = config.solver_budget.with_max_nodes(nodes);
        }
        config.time_limit = self.time_limit_ms.map(Duration::from_millis);
        config.validate()?;
        Ok(config)
    }
}

/// Validated search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub method: SearchMethod,
    pub bound_method: BoundMethod,
    /// Accept only nodes with every station placed as solutions.
    pub place_all_stations: bool,
    /// Tolerance relative to the gateway span; `None` or zero searches exactly.
    pub relative_deviation: Option<f64>,
    /// Best noncoverage known from an earlier run, the baseline of the tolerance.
    pub last_optimal_noncoverage: Option<f64>,
    /// Budget of each bound solve.
    pub solver_budget: SolveBudget,
    /// Wall-clock limit of the whole search.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            method: SearchMethod::BranchAndBound,
            bound_method: BoundMethod::Ilp,
            place_all_stations: false,
            relative_deviation: None,
            last_optimal_noncoverage: None,
            solver_budget: SolveBudget::default(),
            time_limit: None,
        }
    }
}

impl SearchConfig {
    /// Parses and resolves a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<SearchConfigInput>(s)?.resolve()
    }

    /// Resolves a JSON object such as an instance's `configuration` entry.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value::<SearchConfigInput>(value)?.resolve()
    }

    #[inline]
    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    #[inline]
    pub fn with_bound_method(mut self, bound_method: BoundMethod) -> Self {
        self.bound_method = bound_method;
        self
    }

    #[inline]
    pub fn with_place_all_stations(mut self, place_all: bool) -> Self {
        self.place_all_stations = place_all;
        self
    }

    /// Switches to tolerance mode with `relative_deviation` around `baseline`.
    #[inline]
    pub fn with_tolerance(mut self, relative_deviation: f64, baseline: f64) -> Self {
        self.relative_deviation = Some(relative_deviation);
        self.last_optimal_noncoverage = Some(baseline);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Returns `true` if a non-zero deviation is configured.
    #[inline]
    pub fn is_tolerance_mode(&self) -> bool {
        self.relative_deviation.is_some_and(|d| d != 0.0)
    }

    /// Checks the deviation settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(deviation) = self.relative_deviation {
            if !(deviation.is_finite() && deviation >= 0.0) {
                return Err(ConfigError::InvalidDeviation(deviation));
            }
        }
        if let Some(baseline) = self.last_optimal_noncoverage {
            if !(baseline.is_finite() && baseline >= 0.0) {
                return Err(ConfigError::InvalidBaseline(baseline));
            }
        }
        if self.is_tolerance_mode() && self.last_optimal_noncoverage.is_none() {
            return Err(ConfigError::MissingDeviationBaseline);
        }
        Ok(())
    }

    /// Returns the incumbent mode for `model`; the absolute deviation is
    /// the relative one times the gateway span.
    pub fn incumbent_mode(&self, model: &Model) -> Result<IncumbentMode, ConfigError> {
        self.validate()?;
        match (self.relative_deviation, self.last_optimal_noncoverage) {
            (Some(relative), Some(baseline)) if relative != 0.0 => Ok(IncumbentMode::Tolerance {
                deviation: relative * model.span(),
                baseline,
            }),
            _ => Ok(IncumbentMode::Exact),
        }
    }

    /// Returns what makes a node a solution.
    #[inline]
    pub fn solution_criterion(&self) -> SolutionCriterion {
        if self.place_all_stations {
            SolutionCriterion::AllStationsPlaced
        } else {
            SolutionCriterion::GatewayConnected
        }
    }
}

impl std::fmt::Display for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchConfig(method: {}, bound: {}", self.method, self.bound_method)?;
        if self.place_all_stations {
            write!(f, ", place all")?;
        }
        if let Some(deviation) = self.relative_deviation.filter(|&d| d != 0.0) {
            write!(f, ", relative deviation: {}", deviation)?;
        }
        write!(f, ")")
    }
}
