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

//! The persisted search result.
//!
//! A `SolutionReport` lists every accepted record together with the range
//! tables the search ran on, so a report can be read without the instance
//! it came from.
//!
//! ```json
//! {
//!   "coverage": [5.0, 5.0],
//!   "link": { "link_distance": [[0.0, 20.0], [20.0, 0.0]], ... },
//!   "records": [{ "type": "Optimal", "noncoverage": 0.0, ... }]
//! }
//! ```

use crate::{
    error::ReportError,
    incumbent::{IncumbentRecord, RecordKind},
    result::BnbSolverOutcome,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tandem_model::model::Model;

/// Communication ranges of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTables {
    pub link_distance: Vec<Vec<f64>>,
    #[serde(rename = "link_distance2gateway")]
    pub link_distance_to_gateway: Vec<f64>,
    #[serde(rename = "gateway2link_distance")]
    pub gateway_to_link_distance: Vec<f64>,
}

/// One accepted record as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub noncoverage: f64,
    pub cost: f64,
    pub delay: f64,
    pub node_key: usize,
    /// One label per placement point: `"-"` or `"S<k>"`, 1-based.
    pub placement: Vec<String>,
}

impl From<&IncumbentRecord> for ReportRecord {
    fn from(record: &IncumbentRecord) -> Self {
        Self {
            kind: record.kind,
            noncoverage: record.noncoverage,
            cost: record.cost,
            delay: record.delay,
            node_key: record.node.get(),
            placement: record.pattern.labels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    pub coverage: Vec<f64>,
    pub link: LinkTables,
    pub records: Vec<ReportRecord>,
}

impl SolutionReport {
    /// Builds the report of `outcome`, which was searched on `model`.
    pub fn from_outcome(model: &Model, outcome: &BnbSolverOutcome) -> Self {
        let tables = model.range_tables();
        Self {
            coverage: tables.coverage,
            link: LinkTables {
                link_distance: tables.link_distance,
                link_distance_to_gateway: tables.link_distance_to_gateway,
                gateway_to_link_distance: tables.gateway_to_link_distance,
            },
            records: outcome.schedule().records().iter().map(ReportRecord::from).collect(),
        }
    }

    /// Returns the record with the smallest noncoverage, the earliest on ties.
    pub fn best(&self) -> Option<&ReportRecord> {
        self.records
            .iter()
            .fold(None, |best: Option<&ReportRecord>, record| match best {
                Some(b) if b.noncoverage <= record.noncoverage => Some(b),
                _ => Some(record),
            })
    }

    pub fn to_json_string(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as pretty-printed JSON to `path`.
    pub fn write_to_path<P>(&self, path: P) -> Result<(), ReportError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), records = self.records.len(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bnb::BnbSolver, bound::trivial::TrivialBound, config::SearchConfig, monitor::no_op::NoOpMonitor};
    use tandem_model::{index::StationIndex, model::ModelBuilder};

    fn solved() -> (Model, BnbSolverOutcome) {
        let mut builder = ModelBuilder::new(2, 2);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.0)
            .set_uniform_link_range(20.0);
        for s in 0..2 {
            builder.set_station_coverage(StationIndex::new(s), 5.0);
        }
        let model = builder.build().expect("model should be valid");
        let outcome = BnbSolver::new()
            .solve(&model, &SearchConfig::default(), &mut TrivialBound::new(), NoOpMonitor::new())
            .expect("search should start");
        (model, outcome)
    }

    #[test]
    fn test_report_layout() {
        let (model, outcome) = solved();
        let report = SolutionReport::from_outcome(&model, &outcome);

        assert_eq!(report.coverage, vec![5.0, 5.0]);
        assert_eq!(report.link.link_distance, vec![vec![0.0, 20.0], vec![20.0, 0.0]]);
        assert_eq!(report.records.len(), outcome.schedule().num_records());
        assert_eq!(report.records[0].placement, vec!["-", "-"]);

        let best = report.best().expect("records should exist");
        assert_eq!(best.noncoverage, 0.0);
        assert_eq!(best.placement, vec!["S1", "S2"]);

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_string().expect("report should serialize")).expect("valid json");
        assert_eq!(value["records"][0]["type"], "Optimal");
        assert!(value["link"]["link_distance2gateway"].is_array());
        assert!(value["link"]["gateway2link_distance"].is_array());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let (model, outcome) = solved();
        let report = SolutionReport::from_outcome(&model, &outcome);
        let path = std::env::temp_dir().join("tandem-missing-dir").join("nested").join("solution.json");
        assert!(matches!(report.write_to_path(&path), Err(ReportError::Io { .. })));
    }
}
