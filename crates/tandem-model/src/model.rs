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

use crate::index::{PlacementIndex, StationIndex};
use crate::radio::RangeTables;
use thiserror::Error;

#[inline(always)]
fn flatten_index(num_stations: usize, from: StationIndex, to: StationIndex) -> usize {
    from.get() * num_stations + to.get()
}

/// Errors raised while validating a `Model`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The instance has no placement points or no station types.
    #[error("model needs at least one placement point and one station (got {placements} points, {stations} stations)")]
    InvalidDimensions { placements: usize, stations: usize },
    /// Placement coordinates must be strictly increasing with the index.
    #[error("placement {index} at {value} does not lie strictly right of the previous placement at {previous}")]
    NonIncreasingPlacement {
        index: usize,
        previous: f64,
        value: f64,
    },
    /// The gateways must satisfy `left < right`.
    #[error("gateway coordinates must satisfy left < right (got left = {left}, right = {right})")]
    InvalidGateways { left: f64, right: f64 },
    /// A placement point lies outside the gateway segment.
    #[error("placement {index} at {value} lies outside the gateway segment [{left}, {right}]")]
    PlacementOutsideSegment {
        index: usize,
        value: f64,
        left: f64,
        right: f64,
    },
    /// A numeric parameter is negative or NaN.
    #[error("parameter `{name}`{} must be a non-negative number (got {value})", .index.map(|i| format!("[{i}]")).unwrap_or_default())]
    InvalidParameter {
        name: &'static str,
        index: Option<usize>,
        value: f64,
    },
    /// The average packet size must be strictly positive and finite.
    #[error("average packet size must be positive and finite (got {0})")]
    InvalidPacketSize(f64),
    /// A range table does not match the model dimensions.
    #[error("table `{name}` has {found} entries but the model expects {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}

#[inline]
fn ensure_non_negative(name: &'static str, index: Option<usize>, value: f64) -> Result<(), ModelError> {
    if value.is_nan() || value < 0.0 {
        return Err(ModelError::InvalidParameter { name, index, value });
    }
    Ok(())
}

/// The size of the placement search space.
///
/// Counts every partial injective assignment of stations to points,
/// $\sum_{k=0}^{\min(n,m)} \binom{n}{k} \frac{m!}{(m-k)!}$, stored as a
/// base-10 logarithm since the value overflows quickly.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Complexity {
    log_val: f64,
}

impl Complexity {
    /// Calculates the complexity for `n` placement points and `m` stations.
    pub fn new(num_placements: usize, num_stations: usize) -> Self {
        let log10_add = |a: f64, b: f64| -> f64 {
            let max = a.max(b);
            let min = a.min(b);
            max + (1.0 + 10.0_f64.powf(min - max)).log10()
        };

        // term_k = term_{k-1} * (n - k + 1) / k * (m - k + 1)
        let mut term_log = 0.0;
        let mut total_log = 0.0;
        for k in 1..=num_placements.min(num_stations) {
            let points = (num_placements - k + 1) as f64;
            let stations = (num_stations - k + 1) as f64;
            term_log += points.log10() - (k as f64).log10() + stations.log10();
            total_log = log10_add(total_log, term_log);
        }

        Complexity { log_val: total_log }
    }

    /// Returns the percentage of the search space covered by `nodes` tree nodes,
    /// or `None` if the space is too large to represent.
    pub fn coverage(&self, nodes: u64) -> Option<f64> {
        if self.log_val > 15.0 {
            return None;
        }
        let total = 10.0_f64.powf(self.log_val);
        Some((nodes as f64 / total) * 100.0)
    }

    /// Returns the exponent (order of magnitude).
    #[inline]
    pub fn exponent(&self) -> u64 {
        self.log_val.floor() as u64
    }

    /// Returns the mantissa (coefficient).
    #[inline]
    pub fn mantissa(&self) -> f64 {
        10.0_f64.powf(self.log_val - self.log_val.floor())
    }

    /// Returns the raw log10 value.
    #[inline]
    pub fn raw(&self) -> f64 {
        self.log_val
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} × 10^{}", self.mantissa(), self.exponent())
    }
}

impl std::fmt::Debug for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Complexity(log10={:.4})", self.log_val)
    }
}

/// The immutable data model of a tandem placement instance.
///
/// Data is stored as flat vectors indexed by `PlacementIndex` or
/// `StationIndex`:
/// - `placements[p]`: coordinate of placement point `p`, strictly increasing.
/// - `coverage[s]`, `costs[s]`, `throughputs[s]`: per-station parameters.
/// - `link_ranges[from * num_stations + to]`: directional station-to-station
///   communication range (diagonal is zero).
/// - `uplink_ranges[s]` / `downlink_ranges[s]`: station-to-gateway and
///   gateway-to-station communication range.
///
/// Construction goes through `ModelBuilder::build`, which validates every
/// invariant the search relies on.
#[derive(Clone)]
pub struct Model {
    placements: Vec<f64>,      // len = num_placements
    gateway_left: f64,
    gateway_right: f64,
    coverage: Vec<f64>,        // len = num_stations
    costs: Vec<f64>,           // len = num_stations
    throughputs: Vec<f64>,     // len = num_stations
    link_ranges: Vec<f64>,     // len = num_stations * num_stations
    uplink_ranges: Vec<f64>,   // len = num_stations
    downlink_ranges: Vec<f64>, // len = num_stations
    cost_limit: f64,
    delay_limit: f64,
    arrival_rate: f64,
    packet_size: f64,
}

impl Model {
    /// Returns the number of placement points.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tandem_model::model::ModelBuilder;
    /// let model = ModelBuilder::new(3, 2).build().unwrap();
    /// assert_eq!(model.num_placements(), 3);
    /// ```
    #[inline]
    pub fn num_placements(&self) -> usize {
        self.placements.len()
    }

    /// Returns the number of station types.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tandem_model::model::ModelBuilder;
    /// let model = ModelBuilder::new(3, 2).build().unwrap();
    /// assert_eq!(model.num_stations(), 2);
    /// ```
    #[inline]
    pub fn num_stations(&self) -> usize {
        self.coverage.len()
    }

    /// Returns the size of the placement search space.
    #[inline]
    pub fn complexity(&self) -> Complexity {
        Complexity::new(self.num_placements(), self.num_stations())
    }

    /// Returns the coordinate of a placement point.
    ///
    /// # Panics
    ///
    /// Panics if `placement` is not in `0..num_placements()`.
    #[inline]
    pub fn placement(&self, placement: PlacementIndex) -> f64 {
        let index = placement.get();
        debug_assert!(
            index < self.num_placements(),
            "called `Model::placement` with placement index out of bounds: the len is {} but the index is {}",
            self.num_placements(),
            index
        );
        self.placements[index]
    }

    /// Returns all placement coordinates.
    #[inline]
    pub fn placements(&self) -> &[f64] {
        &self.placements
    }

    #[inline]
    pub fn gateway_left(&self) -> f64 {
        self.gateway_left
    }

    #[inline]
    pub fn gateway_right(&self) -> f64 {
        self.gateway_right
    }

    /// Returns the gateway-to-gateway segment length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tandem_model::model::ModelBuilder;
    /// # use tandem_model::index::PlacementIndex;
    /// let mut builder = ModelBuilder::new(1, 1);
    /// builder.set_gateways(-5.0, 15.0).set_placement_coordinate(PlacementIndex::new(0), 0.0);
    /// let model = builder.build().unwrap();
    /// assert_eq!(model.span(), 20.0);
    /// ```
    #[inline]
    pub fn span(&self) -> f64 {
        self.gateway_right - self.gateway_left
    }

    /// Returns the coverage radius of a station.
    ///
    /// # Panics
    ///
    /// Panics if `station` is not in `0..num_stations()`.
    #[inline]
    pub fn coverage(&self, station: StationIndex) -> f64 {
        let index = station.get();
        debug_assert!(
            index < self.num_stations(),
            "called `Model::coverage` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            index
        );
        self.coverage[index]
    }

    /// Returns all coverage radii.
    #[inline]
    pub fn coverages(&self) -> &[f64] {
        &self.coverage
    }

    /// Returns the sum of all coverage diameters.
    #[inline]
    pub fn total_coverage_diameter(&self) -> f64 {
        self.coverage.iter().map(|c| 2.0 * c).sum()
    }

    /// Returns the monetary cost of a station.
    ///
    /// # Panics
    ///
    /// Panics if `station` is not in `0..num_stations()`.
    #[inline]
    pub fn station_cost(&self, station: StationIndex) -> f64 {
        let index = station.get();
        debug_assert!(
            index < self.num_stations(),
            "called `Model::station_cost` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            index
        );
        self.costs[index]
    }

    #[inline]
    pub fn station_costs(&self) -> &[f64] {
        &self.costs
    }

    /// Returns the throughput of a station.
    #[inline]
    pub fn throughput(&self, station: StationIndex) -> f64 {
        let index = station.get();
        debug_assert!(
            index < self.num_stations(),
            "called `Model::throughput` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            index
        );
        self.throughputs[index]
    }

    /// Returns the directional communication range from one station to another.
    #[inline]
    pub fn link_range(&self, from: StationIndex, to: StationIndex) -> f64 {
        debug_assert!(
            from.get() < self.num_stations() && to.get() < self.num_stations(),
            "called `Model::link_range` with station index out of bounds: the len is {} but the indices are {} and {}",
            self.num_stations(),
            from.get(),
            to.get()
        );
        self.link_ranges[flatten_index(self.num_stations(), from, to)]
    }

    /// Returns the range over which two stations can relay in both directions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tandem_model::model::ModelBuilder;
    /// # use tandem_model::index::StationIndex;
    /// let mut builder = ModelBuilder::new(1, 2);
    /// builder
    ///     .set_link_range(StationIndex::new(0), StationIndex::new(1), 30.0)
    ///     .set_link_range(StationIndex::new(1), StationIndex::new(0), 20.0);
    /// let model = builder.build().unwrap();
    /// assert_eq!(model.hop_range(StationIndex::new(0), StationIndex::new(1)), 20.0);
    /// ```
    #[inline]
    pub fn hop_range(&self, a: StationIndex, b: StationIndex) -> f64 {
        self.link_range(a, b).min(self.link_range(b, a))
    }

    /// Returns the station-to-gateway range.
    #[inline]
    pub fn uplink_range(&self, station: StationIndex) -> f64 {
        self.uplink_ranges[station.get()]
    }

    /// Returns the gateway-to-station range.
    #[inline]
    pub fn downlink_range(&self, station: StationIndex) -> f64 {
        self.downlink_ranges[station.get()]
    }

    /// Returns the range over which a station and a gateway can talk both ways.
    #[inline]
    pub fn gateway_hop_range(&self, station: StationIndex) -> f64 {
        self.uplink_range(station).min(self.downlink_range(station))
    }

    /// Returns the best gateway hop range over all stations.
    pub fn max_gateway_hop_range(&self) -> f64 {
        (0..self.num_stations())
            .map(|s| self.gateway_hop_range(StationIndex::new(s)))
            .fold(0.0, f64::max)
    }

    /// Returns the best hop range over all pairs of distinct stations,
    /// or `0.0` if the model has fewer than two stations.
    pub fn max_station_hop_range(&self) -> f64 {
        let m = self.num_stations();
        let mut best = 0.0_f64;
        for a in 0..m {
            for b in (a + 1)..m {
                best = best.max(self.hop_range(StationIndex::new(a), StationIndex::new(b)));
            }
        }
        best
    }

    #[inline]
    pub fn cost_limit(&self) -> f64 {
        self.cost_limit
    }

    #[inline]
    pub fn delay_limit(&self) -> f64 {
        self.delay_limit
    }

    /// Returns the Poisson arrival rate each placed station contributes.
    #[inline]
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    #[inline]
    pub fn packet_size(&self) -> f64 {
        self.packet_size
    }

    /// Returns the range tables in their row-major reporting layout.
    pub fn range_tables(&self) -> RangeTables {
        let m = self.num_stations();
        RangeTables {
            coverage: self.coverage.clone(),
            link_distance: self.link_ranges.chunks(m.max(1)).map(<[f64]>::to_vec).collect(),
            link_distance_to_gateway: self.uplink_ranges.clone(),
            gateway_to_link_distance: self.downlink_ranges.clone(),
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("placements", &self.placements)
            .field("gateway_left", &self.gateway_left)
            .field("gateway_right", &self.gateway_right)
            .field("coverage", &self.coverage)
            .field("costs", &self.costs)
            .field("cost_limit", &self.cost_limit)
            .field("delay_limit", &self.delay_limit)
            .finish()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(num_placements: {}, num_stations: {}, span: {})",
            self.num_placements(),
            self.num_stations(),
            self.span()
        )
    }
}

/// A mutable builder for `Model`.
///
/// Defaults: placements at `0, 1, …, n-1`, gateways at `-1` and `n`, zero
/// coverage, cost and communication ranges, unbounded throughput, cost limit
/// and delay limit, zero arrival rate, unit packet size.
#[derive(Clone)]
pub struct ModelBuilder {
    placements: Vec<f64>,
    gateway_left: f64,
    gateway_right: f64,
    coverage: Vec<f64>,
    costs: Vec<f64>,
    throughputs: Vec<f64>,
    link_ranges: Vec<f64>,
    uplink_ranges: Vec<f64>,
    downlink_ranges: Vec<f64>,
    cost_limit: f64,
    delay_limit: f64,
    arrival_rate: f64,
    packet_size: f64,
}

impl ModelBuilder {
    /// Creates a new builder for `num_placements` points and `num_stations` station types.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tandem_model::model::ModelBuilder;
    /// let builder = ModelBuilder::new(4, 3);
    /// assert_eq!(builder.num_placements(), 4);
    /// assert_eq!(builder.num_stations(), 3);
    /// ```
    pub fn new(num_placements: usize, num_stations: usize) -> Self {
        Self {
            placements: (0..num_placements).map(|p| p as f64).collect(),
            gateway_left: -1.0,
            gateway_right: num_placements as f64,
            coverage: vec![0.0; num_stations],
            costs: vec![0.0; num_stations],
            throughputs: vec![f64::INFINITY; num_stations],
            link_ranges: vec![0.0; num_stations * num_stations],
            uplink_ranges: vec![0.0; num_stations],
            downlink_ranges: vec![0.0; num_stations],
            cost_limit: f64::INFINITY,
            delay_limit: f64::INFINITY,
            arrival_rate: 0.0,
            packet_size: 1.0,
        }
    }

    #[inline]
    pub fn num_placements(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn num_stations(&self) -> usize {
        self.coverage.len()
    }

    /// Sets the coordinate of a placement point.
    ///
    /// # Panics
    ///
    /// Panics if `placement` is not in `0..num_placements()`.
    #[inline]
    pub fn set_placement_coordinate(&mut self, placement: PlacementIndex, coordinate: f64) -> &mut Self {
        let index = placement.get();
        debug_assert!(
            index < self.num_placements(),
            "called `ModelBuilder::set_placement_coordinate` with placement index out of bounds: the len is {} but the index is {}",
            self.num_placements(),
            index
        );
        self.placements[index] = coordinate;
        self
    }

    /// Sets all placement coordinates at once.
    pub fn set_placement_coordinates(&mut self, coordinates: &[f64]) -> &mut Self {
        debug_assert_eq!(
            coordinates.len(),
            self.num_placements(),
            "called `ModelBuilder::set_placement_coordinates` with {} coordinates for {} placements",
            coordinates.len(),
            self.num_placements()
        );
        self.placements.copy_from_slice(coordinates);
        self
    }

    #[inline]
    pub fn set_gateways(&mut self, left: f64, right: f64) -> &mut Self {
        self.gateway_left = left;
        self.gateway_right = right;
        self
    }

    #[inline]
    pub fn set_station_coverage(&mut self, station: StationIndex, radius: f64) -> &mut Self {
        debug_assert!(
            station.get() < self.num_stations(),
            "called `ModelBuilder::set_station_coverage` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            station.get()
        );
        self.coverage[station.get()] = radius;
        self
    }

    #[inline]
    pub fn set_station_cost(&mut self, station: StationIndex, cost: f64) -> &mut Self {
        debug_assert!(
            station.get() < self.num_stations(),
            "called `ModelBuilder::set_station_cost` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            station.get()
        );
        self.costs[station.get()] = cost;
        self
    }

    #[inline]
    pub fn set_station_throughput(&mut self, station: StationIndex, throughput: f64) -> &mut Self {
        debug_assert!(
            station.get() < self.num_stations(),
            "called `ModelBuilder::set_station_throughput` with station index out of bounds: the len is {} but the index is {}",
            self.num_stations(),
            station.get()
        );
        self.throughputs[station.get()] = throughput;
        self
    }

    /// Sets the directional range from station `from` to station `to`.
    #[inline]
    pub fn set_link_range(&mut self, from: StationIndex, to: StationIndex, range: f64) -> &mut Self {
        let m = self.num_stations();
        debug_assert!(
            from.get() < m && to.get() < m,
            "called `ModelBuilder::set_link_range` with station index out of bounds: the len is {} but the indices are {} and {}",
            m,
            from.get(),
            to.get()
        );
        self.link_ranges[flatten_index(m, from, to)] = range;
        self
    }

    /// Sets the same range in both directions between two stations.
    #[inline]
    pub fn set_symmetric_link_range(&mut self, a: StationIndex, b: StationIndex, range: f64) -> &mut Self {
        self.set_link_range(a, b, range).set_link_range(b, a, range)
    }

    #[inline]
    pub fn set_uplink_range(&mut self, station: StationIndex, range: f64) -> &mut Self {
        self.uplink_ranges[station.get()] = range;
        self
    }

    #[inline]
    pub fn set_downlink_range(&mut self, station: StationIndex, range: f64) -> &mut Self {
        self.downlink_ranges[station.get()] = range;
        self
    }

    /// Gives every ordered pair of distinct stations, and every station in
    /// both gateway directions, the same communication range.
    pub fn set_uniform_link_range(&mut self, range: f64) -> &mut Self {
        let m = self.num_stations();
        for a in 0..m {
            for b in 0..m {
                self.link_ranges[a * m + b] = if a == b { 0.0 } else { range };
            }
        }
        self.uplink_ranges.fill(range);
        self.downlink_ranges.fill(range);
        self
    }

    /// Copies coverage and communication ranges from precomputed tables.
    pub fn set_range_tables(&mut self, tables: &RangeTables) -> Result<&mut Self, ModelError> {
        let m = self.num_stations();
        let check = |name: &'static str, found: usize| {
            if found != m {
                Err(ModelError::DimensionMismatch {
                    name,
                    expected: m,
                    found,
                })
            } else {
                Ok(())
            }
        };
        check("coverage", tables.coverage.len())?;
        check("link_distance", tables.link_distance.len())?;
        check("link_distance2gateway", tables.link_distance_to_gateway.len())?;
        check("gateway2link_distance", tables.gateway_to_link_distance.len())?;
        for row in &tables.link_distance {
            check("link_distance row", row.len())?;
        }

        self.coverage.copy_from_slice(&tables.coverage);
        for (a, row) in tables.link_distance.iter().enumerate() {
            self.link_ranges[a * m..(a + 1) * m].copy_from_slice(row);
        }
        self.uplink_ranges.copy_from_slice(&tables.link_distance_to_gateway);
        self.downlink_ranges.copy_from_slice(&tables.gateway_to_link_distance);
        Ok(self)
    }

    #[inline]
    pub fn set_cost_limit(&mut self, limit: f64) -> &mut Self {
        self.cost_limit = limit;
        self
    }

    #[inline]
    pub fn set_delay_limit(&mut self, limit: f64) -> &mut Self {
        self.delay_limit = limit;
        self
    }

    /// Sets the per-station Poisson arrival rate and the average packet size.
    #[inline]
    pub fn set_arrival(&mut self, rate: f64, packet_size: f64) -> &mut Self {
        self.arrival_rate = rate;
        self.packet_size = packet_size;
        self
    }

    /// Validates the collected data and builds the `Model`.
    ///
    /// # Errors
    ///
    /// Returns a `ModelError` describing the first violated invariant.
    pub fn build(self) -> Result<Model, ModelError> {
        let n = self.num_placements();
        let m = self.num_stations();
        if n == 0 || m == 0 {
            return Err(ModelError::InvalidDimensions {
                placements: n,
                stations: m,
            });
        }

        let (left, right) = (self.gateway_left, self.gateway_right);
        if !(left.is_finite() && right.is_finite() && left < right) {
            return Err(ModelError::InvalidGateways { left, right });
        }

        for (index, &value) in self.placements.iter().enumerate() {
            if !value.is_finite() || value < left || value > right {
                return Err(ModelError::PlacementOutsideSegment {
                    index,
                    value,
                    left,
                    right,
                });
            }
            if index > 0 {
                let previous = self.placements[index - 1];
                if value <= previous {
                    return Err(ModelError::NonIncreasingPlacement {
                        index,
                        previous,
                        value,
                    });
                }
            }
        }

        for s in 0..m {
            ensure_non_negative("coverage", Some(s), self.coverage[s])?;
            ensure_non_negative("cost", Some(s), self.costs[s])?;
            ensure_non_negative("throughput", Some(s), self.throughputs[s])?;
            ensure_non_negative("link_distance2gateway", Some(s), self.uplink_ranges[s])?;
            ensure_non_negative("gateway2link_distance", Some(s), self.downlink_ranges[s])?;
        }
        for (i, &range) in self.link_ranges.iter().enumerate() {
            ensure_non_negative("link_distance", Some(i), range)?;
        }
        ensure_non_negative("cost_limit", None, self.cost_limit)?;
        ensure_non_negative("delay_limit", None, self.delay_limit)?;
        ensure_non_negative("arrival_rate", None, self.arrival_rate)?;
        if !(self.packet_size.is_finite() && self.packet_size > 0.0) {
            return Err(ModelError::InvalidPacketSize(self.packet_size));
        }

        Ok(Model {
            placements: self.placements,
            gateway_left: left,
            gateway_right: right,
            coverage: self.coverage,
            costs: self.costs,
            throughputs: self.throughputs,
            link_ranges: self.link_ranges,
            uplink_ranges: self.uplink_ranges,
            downlink_ranges: self.downlink_ranges,
            cost_limit: self.cost_limit,
            delay_limit: self.delay_limit,
            arrival_rate: self.arrival_rate,
            packet_size: self.packet_size,
        })
    }
}

impl std::fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("num_placements", &self.num_placements())
            .field("num_stations", &self.num_stations())
            .finish()
    }
}

impl std::fmt::Display for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ModelBuilder(num_placements: {}, num_stations: {})",
            self.num_placements(),
            self.num_stations()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point_builder() -> ModelBuilder {
        let mut builder = ModelBuilder::new(2, 2);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.0)
            .set_uniform_link_range(20.0)
            .set_cost_limit(10.0);
        for s in 0..2 {
            builder
                .set_station_coverage(StationIndex::new(s), 5.0)
                .set_station_cost(StationIndex::new(s), 1.0);
        }
        builder
    }

    #[test]
    fn test_build_valid_model_exposes_inputs() {
        let model = two_point_builder().build().expect("valid model");
        assert_eq!(model.num_placements(), 2);
        assert_eq!(model.num_stations(), 2);
        assert_eq!(model.span(), 20.0);
        assert_eq!(model.placement(PlacementIndex::new(1)), 10.0);
        assert_eq!(model.total_coverage_diameter(), 20.0);
        assert_eq!(model.hop_range(StationIndex::new(0), StationIndex::new(1)), 20.0);
        assert_eq!(model.link_range(StationIndex::new(0), StationIndex::new(0)), 0.0);
        assert_eq!(model.max_gateway_hop_range(), 20.0);
        assert_eq!(model.max_station_hop_range(), 20.0);
    }

    #[test]
    fn test_non_increasing_placements_are_rejected() {
        let mut builder = two_point_builder();
        builder.set_placement_coordinates(&[10.0, 10.0]);
        let err = builder.build().unwrap_err();
        assert!(
            matches!(err, ModelError::NonIncreasingPlacement { index: 1, .. }),
            "expected NonIncreasingPlacement, got {err:?}"
        );
    }

    #[test]
    fn test_reversed_gateways_are_rejected() {
        let mut builder = two_point_builder();
        builder.set_gateways(15.0, -5.0);
        assert!(matches!(builder.build(), Err(ModelError::InvalidGateways { .. })));
    }

    #[test]
    fn test_placement_outside_segment_is_rejected() {
        let mut builder = two_point_builder();
        builder.set_placement_coordinates(&[0.0, 16.0]);
        assert!(matches!(
            builder.build(),
            Err(ModelError::PlacementOutsideSegment { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_parameters_are_rejected_with_name() {
        let mut builder = two_point_builder();
        builder.set_station_cost(StationIndex::new(1), -1.0);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidParameter {
                name: "cost",
                index: Some(1),
                value: -1.0
            }
        );
        assert_eq!(err.to_string(), "parameter `cost`[1] must be a non-negative number (got -1)");
    }

    #[test]
    fn test_zero_packet_size_is_rejected() {
        let mut builder = two_point_builder();
        builder.set_arrival(1.0, 0.0);
        assert_eq!(builder.build().unwrap_err(), ModelError::InvalidPacketSize(0.0));
    }

    #[test]
    fn test_empty_dimensions_are_rejected() {
        assert!(matches!(
            ModelBuilder::new(0, 3).build(),
            Err(ModelError::InvalidDimensions { placements: 0, stations: 3 })
        ));
    }

    #[test]
    fn test_range_tables_round_trip_through_builder() {
        let model = two_point_builder().build().unwrap();
        let tables = model.range_tables();
        let mut builder = ModelBuilder::new(2, 2);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.0)
            .set_range_tables(&tables)
            .expect("dimensions match");
        let rebuilt = builder.build().unwrap();
        assert_eq!(rebuilt.range_tables(), tables);
    }

    #[test]
    fn test_range_tables_with_wrong_shape_are_rejected() {
        let mut tables = two_point_builder().build().unwrap().range_tables();
        tables.link_distance[1].pop();
        let mut builder = ModelBuilder::new(2, 2);
        let err = builder.set_range_tables(&tables).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_single_station_has_no_station_hop() {
        let mut builder = ModelBuilder::new(2, 1);
        builder.set_uniform_link_range(50.0);
        let model = builder.build().unwrap();
        assert_eq!(model.max_station_hop_range(), 0.0);
        assert_eq!(model.max_gateway_hop_range(), 50.0);
    }

    #[test]
    fn test_complexity_counts_partial_assignments() {
        // n = 2, m = 2: 1 + C(2,1)*2 + C(2,2)*2 = 1 + 4 + 2 = 7
        let c = Complexity::new(2, 2);
        assert!((10f64.powf(c.raw()) - 7.0).abs() < 1e-9, "got {}", 10f64.powf(c.raw()));
        assert_eq!(Complexity::new(0, 5).raw(), 0.0);
        let coverage = c.coverage(7).expect("small space");
        assert!((coverage - 100.0).abs() < 1e-6);
    }
}
