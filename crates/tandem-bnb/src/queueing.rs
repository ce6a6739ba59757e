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

//! End-to-end delay of the relay chain.
//!
//! Each station is an M/M/1 queue. By Burke's theorem the output of a
//! stable M/M/1 queue is again Poisson, so the traffic entering the `k`-th
//! relay is the superposition of `k` Poisson flows of rate `arrival_rate`.
//! The mean sojourn time of a station then follows from Little's law.

use tandem_model::{index::StationIndex, model::Model};

/// Utilization above which a station is treated as saturated.
pub const MAX_UTILIZATION: f64 = 0.9;

/// Service rate of `station` in packets per unit time.
#[inline]
pub fn departure_rate(model: &Model, station: StationIndex) -> f64 {
    model.throughput(station) / model.packet_size()
}

/// Total arrival rate once `placed_count` stations relay traffic.
#[inline]
pub fn total_arrival_rate(model: &Model, placed_count: usize) -> f64 {
    model.arrival_rate() * placed_count as f64
}

/// Mean time a packet spends at `station` when it is the `placed_count`-th
/// relay, or `+∞` if the queue is saturated.
pub fn sojourn_time(model: &Model, station: StationIndex, placed_count: usize) -> f64 {
    let departure = departure_rate(model, station);
    let arrival = total_arrival_rate(model, placed_count);
    if departure <= 0.0 {
        return f64::INFINITY;
    }
    let utilization = arrival / departure;
    if utilization > MAX_UTILIZATION {
        return f64::INFINITY;
    }
    // rho / (1 - rho) / lambda, which stays finite for lambda = 0.
    1.0 / (departure - arrival)
}

/// Delay of a child node: the parent's delay plus the new station's sojourn time.
#[inline]
pub fn accumulated_delay(model: &Model, parent_delay: f64, station: StationIndex, placed_count: usize) -> f64 {
    parent_delay + sojourn_time(model, station, placed_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_model::model::ModelBuilder;

    fn build_model(throughput: f64, arrival_rate: f64, packet_size: f64) -> Model {
        let mut builder = ModelBuilder::new(1, 1);
        builder
            .set_gateways(-1.0, 1.0)
            .set_station_throughput(StationIndex::new(0), throughput)
            .set_arrival(arrival_rate, packet_size);
        builder.build().expect("model should be valid")
    }

    #[test]
    fn test_little_law_matches_closed_form() {
        let model = build_model(100.0, 10.0, 2.0);
        let s = StationIndex::new(0);
        // departure 50, arrival 20, rho 0.4.
        let rho: f64 = 0.4;
        let expected = rho / (1.0 - rho) / 20.0;
        assert!((sojourn_time(&model, s, 2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_arrival_is_service_time() {
        let model = build_model(8.0, 0.0, 2.0);
        assert_eq!(sojourn_time(&model, StationIndex::new(0), 3), 0.25);
    }

    #[test]
    fn test_saturated_queue_is_infinite() {
        let model = build_model(10.0, 5.0, 1.0);
        let s = StationIndex::new(0);
        assert!(sojourn_time(&model, s, 1).is_finite());
        // rho = 1.0 > 0.9
        assert_eq!(sojourn_time(&model, s, 2), f64::INFINITY);
    }

    #[test]
    fn test_utilization_limit_is_inclusive() {
        let model = build_model(10.0, 9.0, 1.0);
        assert!((sojourn_time(&model, StationIndex::new(0), 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_throughput_is_infinite() {
        let model = build_model(0.0, 0.0, 1.0);
        assert_eq!(sojourn_time(&model, StationIndex::new(0), 1), f64::INFINITY);
    }

    #[test]
    fn test_accumulates_over_parent() {
        let model = build_model(8.0, 0.0, 2.0);
        assert_eq!(accumulated_delay(&model, 1.0, StationIndex::new(0), 1), 1.25);
    }
}
