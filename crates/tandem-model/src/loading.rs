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

//! JSON instance loader.
//!
//! Reads the instance document layout used by the placement tool chain:
//!
//! ```json
//! {
//!   "placement": [0, 10],
//!   "gateway_placement": [-5, 15],
//!   "cost_limit": 10, "delay_limit": 1.0,
//!   "arrival_rate": 0.1, "average_packet_size": 1000,
//!   "sta": [{ "cost": 1, "throughput": 1e6, "Ptr_link": 20, ... }],
//!   "gateway": { "Ptr": 20, "Gtr": 5, "Precv": -80, "Grecv": 5, "Lrecv": 1 },
//!   "user_device": { "Ptr": 20, "Gtr": 5, "Ltr": 1 },
//!   "frequency": 2437, "link_som": 10, "coverage_som": 14,
//!   "configuration": { "method": "bab", "estimation_method": "ILP" }
//! }
//! ```
//!
//! Ranges come from the link budget of the radio parameters unless the
//! document carries explicit `coverage`, `link_distance`,
//! `link_distance2gateway` and `gateway2link_distance` tables, which then take
//! precedence. The optional `configuration` object is handed back untouched
//! so the search layer can interpret it.

use crate::{
    index::{PlacementIndex, StationIndex},
    model::{Model, ModelBuilder, ModelError},
    radio::{
        GatewayRadio, LinkBudget, RadioParameterProvider, RangeTables, StationRadio,
        UserDeviceRadio, DEFAULT_FREQUENCY_MHZ, DEFAULT_SOM_DB,
    },
};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The error type for the instance loading process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read instance file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed instance document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`gateway_placement` must hold exactly two coordinates (got {0})")]
    GatewayCount(usize),
    /// Neither explicit range tables nor the radio parameters to compute them are present.
    #[error("instance has no range tables and lacks radio parameter `{0}`")]
    MissingRadioParameters(String),
    #[error("invalid instance: {0}")]
    Model(#[from] ModelError),
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn unit() -> f64 {
    1.0
}

/// One entry of the `sta` array.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDocument {
    pub cost: f64,
    #[serde(default = "unbounded")]
    pub throughput: f64,
    #[serde(flatten)]
    pub radio: Option<StationRadio>,
}

/// The raw instance document, as deserialized from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceDocument {
    pub placement: Vec<f64>,
    pub gateway_placement: Vec<f64>,
    #[serde(default = "unbounded")]
    pub cost_limit: f64,
    #[serde(default = "unbounded")]
    pub delay_limit: f64,
    #[serde(default)]
    pub arrival_rate: f64,
    #[serde(default = "unit")]
    pub average_packet_size: f64,
    pub sta: Vec<StationDocument>,
    #[serde(default)]
    pub gateway: Option<GatewayRadio>,
    #[serde(default)]
    pub user_device: Option<UserDeviceRadio>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub link_som: Option<f64>,
    #[serde(default)]
    pub coverage_som: Option<f64>,
    #[serde(default)]
    pub coverage: Option<Vec<f64>>,
    #[serde(default)]
    pub link_distance: Option<Vec<Vec<f64>>>,
    #[serde(default, rename = "link_distance2gateway")]
    pub link_distance_to_gateway: Option<Vec<f64>>,
    #[serde(default, rename = "gateway2link_distance")]
    pub gateway_to_link_distance: Option<Vec<f64>>,
    #[serde(default)]
    pub configuration: Option<serde_json::Value>,
}

impl InstanceDocument {
    /// Returns the explicit range tables if the document carries all four.
    fn explicit_tables(&self) -> Option<RangeTables> {
        Some(RangeTables {
            coverage: self.coverage.clone()?,
            link_distance: self.link_distance.clone()?,
            link_distance_to_gateway: self.link_distance_to_gateway.clone()?,
            gateway_to_link_distance: self.gateway_to_link_distance.clone()?,
        })
    }

    /// Builds the link budget provider from the document's radio parameters.
    fn link_budget(&self) -> Result<LinkBudget, LoadError> {
        let gateway = self
            .gateway
            .ok_or_else(|| LoadError::MissingRadioParameters("gateway".to_string()))?;
        let user_device = self
            .user_device
            .ok_or_else(|| LoadError::MissingRadioParameters("user_device".to_string()))?;
        let stations = self
            .sta
            .iter()
            .enumerate()
            .map(|(i, s)| {
                s.radio
                    .ok_or_else(|| LoadError::MissingRadioParameters(format!("sta[{i}]")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LinkBudget::new(stations, gateway, user_device)
            .with_frequency(self.frequency.unwrap_or(DEFAULT_FREQUENCY_MHZ))
            .with_margins(
                self.link_som.unwrap_or(DEFAULT_SOM_DB),
                self.coverage_som.unwrap_or(DEFAULT_SOM_DB),
            ))
    }

    /// Returns the range tables, explicit ones taking precedence.
    pub fn range_tables(&self) -> Result<RangeTables, LoadError> {
        match self.explicit_tables() {
            Some(tables) => Ok(tables),
            None => Ok(self.link_budget()?.range_tables()),
        }
    }
}

/// A loaded instance: the validated model plus the embedded configuration.
#[derive(Debug, Clone)]
pub struct Instance {
    pub model: Model,
    pub configuration: Option<serde_json::Value>,
}

/// Loader for JSON instance documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Validates a deserialized document and builds the `Model`.
    pub fn from_document(&self, document: InstanceDocument) -> Result<Instance, LoadError> {
        if document.gateway_placement.len() != 2 {
            return Err(LoadError::GatewayCount(document.gateway_placement.len()));
        }
        let tables = document.range_tables()?;

        let mut builder = ModelBuilder::new(document.placement.len(), document.sta.len());
        builder
            .set_gateways(document.gateway_placement[0], document.gateway_placement[1])
            .set_cost_limit(document.cost_limit)
            .set_delay_limit(document.delay_limit)
            .set_arrival(document.arrival_rate, document.average_packet_size);
        for (p, &x) in document.placement.iter().enumerate() {
            builder.set_placement_coordinate(PlacementIndex::new(p), x);
        }
        for (s, station) in document.sta.iter().enumerate() {
            builder
                .set_station_cost(StationIndex::new(s), station.cost)
                .set_station_throughput(StationIndex::new(s), station.throughput);
        }
        builder.set_range_tables(&tables)?;

        Ok(Instance {
            model: builder.build()?,
            configuration: document.configuration,
        })
    }

    /// Loads an instance from a JSON string.
    pub fn from_str(&self, json: &str) -> Result<Instance, LoadError> {
        let document: InstanceDocument = serde_json::from_str(json)?;
        self.from_document(document)
    }

    /// Loads an instance from any reader.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Instance, LoadError> {
        let document: InstanceDocument = serde_json::from_reader(reader)?;
        self.from_document(document)
    }

    /// Loads an instance from a file path.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Instance, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.from_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_INSTANCE: &str = r#"{
        "placement": [0, 10],
        "gateway_placement": [-5, 15],
        "cost_limit": 10,
        "delay_limit": 5.0,
        "arrival_rate": 0.5,
        "average_packet_size": 100,
        "sta": [
            { "cost": 1, "throughput": 1000000 },
            { "cost": 2, "throughput": 1000000 }
        ],
        "coverage": [5, 5],
        "link_distance": [[0, 20], [20, 0]],
        "link_distance2gateway": [20, 20],
        "gateway2link_distance": [20, 20],
        "configuration": { "method": "bab", "estimation_method": "ILP" }
    }"#;

    const RADIO_INSTANCE: &str = r#"{
        "placement": [0, 50, 100],
        "gateway_placement": [-40, 140],
        "cost_limit": 100,
        "delay_limit": 1.0,
        "arrival_rate": 0.1,
        "average_packet_size": 1000,
        "sta": [
            { "cost": 10, "throughput": 1000000, "Ptr_link": 20, "Gtr_link": 5, "Precv_link": -80,
              "L_link": 1, "L_coverage": 0, "Precv_coverage": -67, "Grecv_coverage": 1 }
        ],
        "gateway": { "Ptr": 20, "Gtr": 5, "Precv": -80, "Grecv": 5, "Lrecv": 1 },
        "user_device": { "Ptr": 20, "Gtr": 5, "Ltr": 1 },
        "frequency": 2437,
        "link_som": 10,
        "coverage_som": 14
    }"#;

    #[test]
    fn test_load_instance_with_explicit_tables() {
        let instance = InstanceLoader::new().from_str(TABLE_INSTANCE).expect("valid instance");
        let model = &instance.model;
        assert_eq!(model.num_placements(), 2);
        assert_eq!(model.num_stations(), 2);
        assert_eq!(model.span(), 20.0);
        assert_eq!(model.station_cost(StationIndex::new(1)), 2.0);
        assert_eq!(model.coverage(StationIndex::new(0)), 5.0);
        assert_eq!(model.packet_size(), 100.0);
        let config = instance.configuration.expect("configuration present");
        assert_eq!(config["method"], "bab");
    }

    #[test]
    fn test_load_instance_from_radio_parameters() {
        let instance = InstanceLoader::new().from_str(RADIO_INSTANCE).expect("valid instance");
        let model = &instance.model;
        assert_eq!(model.num_stations(), 1);
        assert_eq!(model.coverage(StationIndex::new(0)), 78.0);
        assert!(model.uplink_range(StationIndex::new(0)) > 0.0);
        assert!(instance.configuration.is_none());
    }

    #[test]
    fn test_missing_radio_parameters_are_reported() {
        let json = r#"{
            "placement": [0], "gateway_placement": [-1, 1],
            "sta": [{ "cost": 1 }],
            "gateway": { "Ptr": 20, "Gtr": 5, "Precv": -80, "Grecv": 5, "Lrecv": 1 },
            "user_device": { "Ptr": 20, "Gtr": 5, "Ltr": 1 }
        }"#;
        let err = InstanceLoader::new().from_str(json).unwrap_err();
        assert!(
            matches!(err, LoadError::MissingRadioParameters(ref name) if name == "sta[0]"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_wrong_gateway_count_is_rejected() {
        let json = TABLE_INSTANCE.replace("[-5, 15]", "[-5, 15, 30]");
        assert!(matches!(
            InstanceLoader::new().from_str(&json),
            Err(LoadError::GatewayCount(3))
        ));
    }

    #[test]
    fn test_model_validation_errors_are_wrapped() {
        let json = TABLE_INSTANCE.replace("[0, 10]", "[10, 0]");
        assert!(matches!(
            InstanceLoader::new().from_str(&json),
            Err(LoadError::Model(ModelError::NonIncreasingPlacement { .. }))
        ));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        assert!(matches!(
            InstanceLoader::new().from_str("{ not json"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = InstanceLoader::new()
            .from_path("/definitely/not/here.json")
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
