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

//! Radio parameter provider.
//!
//! Turns physical transmitter/receiver parameters into the coverage radii and
//! communication ranges consumed by the search. Distances follow the link
//! budget equation
//!
//! `Ptr - Ltr + Gtr - Lfs + Grecv - Lrecv = SOM + Precv`
//!
//! solved for the free-space path loss `Lfs = 20·lg(f) + 20·lg(R) + K` with
//! `f` in MHz and `R` in metres (`K = -27.55`).

use serde::{Deserialize, Serialize};

/// Free-space path loss constant for a frequency in MHz and a distance in metres.
pub const FSPL_CONSTANT_MHZ_M: f64 = -27.55;

/// Default radio centre frequency (2.4 GHz Wi-Fi channel 6) in MHz.
pub const DEFAULT_FREQUENCY_MHZ: f64 = 2437.0;

/// Default system operating margin in dB.
pub const DEFAULT_SOM_DB: f64 = 10.0;

/// Coverage radii and communication ranges, indexed by station.
///
/// Field names follow the persisted report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTables {
    pub coverage: Vec<f64>,
    /// Directional station-to-station range, `link_distance[from][to]`.
    pub link_distance: Vec<Vec<f64>>,
    #[serde(rename = "link_distance2gateway")]
    pub link_distance_to_gateway: Vec<f64>,
    #[serde(rename = "gateway2link_distance")]
    pub gateway_to_link_distance: Vec<f64>,
}

/// A source of coverage radii and communication ranges.
pub trait RadioParameterProvider {
    fn range_tables(&self) -> RangeTables;
}

impl RadioParameterProvider for RangeTables {
    #[inline]
    fn range_tables(&self) -> RangeTables {
        self.clone()
    }
}

/// One side of a radio link in dB / dBm / dBi units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEnd {
    /// Output power (transmitter) or sensitivity (receiver).
    pub power: f64,
    pub gain: f64,
    pub loss: f64,
}

/// Returns the distance in metres at which the link budget is exhausted,
/// rounded half-to-even to whole metres.
///
/// # Examples
///
/// ```rust
/// # use tandem_model::radio::{link_distance, LinkEnd};
/// let tx = LinkEnd { power: 20.0, gain: 5.0, loss: 1.0 };
/// let rx = LinkEnd { power: -67.0, gain: 1.0, loss: 0.0 };
/// assert_eq!(link_distance(tx, rx, 14.0, 2437.0), 78.0);
/// ```
pub fn link_distance(transmitter: LinkEnd, receiver: LinkEnd, som: f64, frequency_mhz: f64) -> f64 {
    let budget = transmitter.power - transmitter.loss + transmitter.gain + receiver.gain
        - receiver.loss
        - receiver.power
        - som;
    let exponent = (budget - 20.0 * frequency_mhz.log10() - FSPL_CONSTANT_MHZ_M) / 20.0;
    10.0_f64.powf(exponent).round_ties_even()
}

/// Radio parameters of one station type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationRadio {
    #[serde(rename = "Ptr_link")]
    pub link_power: f64,
    #[serde(rename = "Gtr_link")]
    pub link_gain: f64,
    #[serde(rename = "Precv_link")]
    pub link_sensitivity: f64,
    #[serde(rename = "L_link")]
    pub link_loss: f64,
    #[serde(rename = "L_coverage")]
    pub coverage_loss: f64,
    #[serde(rename = "Precv_coverage")]
    pub coverage_sensitivity: f64,
    #[serde(rename = "Grecv_coverage")]
    pub coverage_gain: f64,
}

impl StationRadio {
    #[inline]
    fn link_transmitter(&self) -> LinkEnd {
        LinkEnd {
            power: self.link_power,
            gain: self.link_gain,
            loss: self.link_loss,
        }
    }

    #[inline]
    fn link_receiver(&self) -> LinkEnd {
        LinkEnd {
            power: self.link_sensitivity,
            gain: self.link_gain,
            loss: self.link_loss,
        }
    }

    #[inline]
    fn coverage_receiver(&self) -> LinkEnd {
        LinkEnd {
            power: self.coverage_sensitivity,
            gain: self.coverage_gain,
            loss: self.coverage_loss,
        }
    }
}

/// Radio parameters shared by both gateways.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatewayRadio {
    #[serde(rename = "Ptr")]
    pub power: f64,
    #[serde(rename = "Gtr")]
    pub transmit_gain: f64,
    #[serde(rename = "Precv")]
    pub sensitivity: f64,
    #[serde(rename = "Grecv")]
    pub receive_gain: f64,
    #[serde(rename = "Lrecv")]
    pub loss: f64,
}

/// Radio parameters of the user devices a station must cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserDeviceRadio {
    #[serde(rename = "Ptr")]
    pub power: f64,
    #[serde(rename = "Gtr")]
    pub gain: f64,
    #[serde(rename = "Ltr")]
    pub loss: f64,
}

/// Link-budget based `RadioParameterProvider`.
#[derive(Debug, Clone)]
pub struct LinkBudget {
    stations: Vec<StationRadio>,
    gateway: GatewayRadio,
    user_device: UserDeviceRadio,
    frequency_mhz: f64,
    link_som: f64,
    coverage_som: f64,
}

impl LinkBudget {
    /// Creates a link budget at the default frequency and margins.
    pub fn new(stations: Vec<StationRadio>, gateway: GatewayRadio, user_device: UserDeviceRadio) -> Self {
        Self {
            stations,
            gateway,
            user_device,
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            link_som: DEFAULT_SOM_DB,
            coverage_som: DEFAULT_SOM_DB,
        }
    }

    pub fn with_frequency(mut self, frequency_mhz: f64) -> Self {
        self.frequency_mhz = frequency_mhz;
        self
    }

    /// Sets the operating margins for station links and for user coverage.
    pub fn with_margins(mut self, link_som: f64, coverage_som: f64) -> Self {
        self.link_som = link_som;
        self.coverage_som = coverage_som;
        self
    }

    #[inline]
    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    fn station_link(&self, from: &StationRadio, to: &StationRadio) -> f64 {
        link_distance(from.link_transmitter(), to.link_receiver(), self.link_som, self.frequency_mhz)
    }

    fn uplink(&self, station: &StationRadio) -> f64 {
        let gateway_receiver = LinkEnd {
            power: self.gateway.sensitivity,
            gain: self.gateway.receive_gain,
            loss: self.gateway.loss,
        };
        link_distance(station.link_transmitter(), gateway_receiver, self.link_som, self.frequency_mhz)
    }

    fn downlink(&self, station: &StationRadio) -> f64 {
        // Gateways report a single loss figure; it applies to both directions.
        let gateway_transmitter = LinkEnd {
            power: self.gateway.power,
            gain: self.gateway.transmit_gain,
            loss: self.gateway.loss,
        };
        link_distance(gateway_transmitter, station.link_receiver(), self.link_som, self.frequency_mhz)
    }

    fn coverage(&self, station: &StationRadio) -> f64 {
        let device = LinkEnd {
            power: self.user_device.power,
            gain: self.user_device.gain,
            loss: self.user_device.loss,
        };
        link_distance(device, station.coverage_receiver(), self.coverage_som, self.frequency_mhz)
    }
}

impl RadioParameterProvider for LinkBudget {
    fn range_tables(&self) -> RangeTables {
        let link_distance = self
            .stations
            .iter()
            .enumerate()
            .map(|(a, from)| {
                self.stations
                    .iter()
                    .enumerate()
                    .map(|(b, to)| if a == b { 0.0 } else { self.station_link(from, to) })
                    .collect()
            })
            .collect();

        RangeTables {
            coverage: self.stations.iter().map(|s| self.coverage(s)).collect(),
            link_distance,
            link_distance_to_gateway: self.stations.iter().map(|s| self.uplink(s)).collect(),
            gateway_to_link_distance: self.stations.iter().map(|s| self.downlink(s)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(power: f64, sensitivity: f64) -> StationRadio {
        StationRadio {
            link_power: power,
            link_gain: 5.0,
            link_sensitivity: sensitivity,
            link_loss: 1.0,
            coverage_loss: 0.0,
            coverage_sensitivity: -67.0,
            coverage_gain: 1.0,
        }
    }

    fn budget(stations: Vec<StationRadio>) -> LinkBudget {
        let gateway = GatewayRadio {
            power: 20.0,
            transmit_gain: 5.0,
            sensitivity: -80.0,
            receive_gain: 5.0,
            loss: 1.0,
        };
        let device = UserDeviceRadio {
            power: 20.0,
            gain: 5.0,
            loss: 1.0,
        };
        LinkBudget::new(stations, gateway, device).with_margins(10.0, 14.0)
    }

    #[test]
    fn test_link_distance_matches_reference_values() {
        let tx = LinkEnd { power: 20.0, gain: 5.0, loss: 1.0 };
        let rx = LinkEnd { power: -67.0, gain: 1.0, loss: 0.0 };
        assert_eq!(link_distance(tx, rx, 14.0, DEFAULT_FREQUENCY_MHZ), 78.0);

        let tx = LinkEnd { power: 9.0, gain: 1.0, loss: 0.0 };
        let rx = LinkEnd { power: -77.0, gain: 5.0, loss: 1.0 };
        assert_eq!(link_distance(tx, rx, 14.0, DEFAULT_FREQUENCY_MHZ), 69.0);
    }

    #[test]
    fn test_link_distance_grows_with_budget() {
        let rx = LinkEnd { power: -70.0, gain: 2.0, loss: 1.0 };
        let weak = link_distance(LinkEnd { power: 10.0, gain: 2.0, loss: 1.0 }, rx, 10.0, 2437.0);
        let strong = link_distance(LinkEnd { power: 16.0, gain: 2.0, loss: 1.0 }, rx, 10.0, 2437.0);
        // +6 dB roughly doubles the free-space distance.
        assert!(strong > 1.9 * weak && strong < 2.1 * weak, "weak {weak}, strong {strong}");
    }

    #[test]
    fn test_range_tables_shape_and_diagonal() {
        let provider = budget(vec![station(20.0, -80.0), station(15.0, -75.0), station(18.0, -90.0)]);
        let tables = provider.range_tables();
        assert_eq!(tables.coverage.len(), 3);
        assert_eq!(tables.link_distance.len(), 3);
        assert_eq!(tables.link_distance_to_gateway.len(), 3);
        assert_eq!(tables.gateway_to_link_distance.len(), 3);
        for (a, row) in tables.link_distance.iter().enumerate() {
            assert_eq!(row.len(), 3);
            assert_eq!(row[a], 0.0, "station {a} must not link to itself");
        }
        // Identical coverage receivers give identical coverage radii.
        assert_eq!(tables.coverage[0], tables.coverage[1]);
        assert_eq!(tables.coverage[0], 78.0);
    }

    #[test]
    fn test_station_links_are_directional() {
        let provider = budget(vec![station(20.0, -70.0), station(10.0, -90.0)]);
        let tables = provider.range_tables();
        // 0 -> 1: strong transmitter, sensitive receiver. 1 -> 0: the opposite.
        assert!(tables.link_distance[0][1] > tables.link_distance[1][0]);
    }

    #[test]
    fn test_range_tables_are_their_own_provider() {
        let tables = budget(vec![station(20.0, -80.0)]).range_tables();
        assert_eq!(tables.range_tables(), tables);
    }

    #[test]
    fn test_tables_serialize_with_report_keys() {
        let tables = RangeTables {
            coverage: vec![1.0],
            link_distance: vec![vec![0.0]],
            link_distance_to_gateway: vec![2.0],
            gateway_to_link_distance: vec![3.0],
        };
        let json = serde_json::to_value(&tables).unwrap();
        assert_eq!(json["link_distance2gateway"][0], 2.0);
        assert_eq!(json["gateway2link_distance"][0], 3.0);
    }
}
