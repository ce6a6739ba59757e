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

//! # Tandem Model
//!
//! **Problem data for placing relay stations in tandem between two gateways.**
//!
//! A line segment is bounded by two gateways. Stations of different types
//! (coverage radius, communication ranges, cost, throughput) can be sited at
//! a finite set of candidate points on it. This crate holds that data and
//! hands it to the search engine (`tandem_bnb`) in a validated, read-only form.
//!
//! ## Architecture
//!
//! * **`index`**: Strongly-typed indices (`PlacementIndex`, `StationIndex`).
//! * **`model`**: The immutable `Model` and the mutable `ModelBuilder` that validates it.
//! * **`radio`**: The link budget that turns radio parameters into coverage radii and ranges.
//! * **`loading`**: The JSON instance loader.
//! * **`solution`**: `PlacementPattern`, the per-point station assignment used for reporting.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: a `StationIndex` cannot be used where a `PlacementIndex` is expected.
//! 2.  **Memory Layout**: per-station and per-point data live in flat vectors; the
//!     station link matrix is a single row-major vector.
//! 3.  **Fail-Fast**: `ModelBuilder::build` rejects inconsistent data so the search
//!     never sees an invalid instance.

pub mod index;
pub mod loading;
pub mod model;
pub mod radio;
pub mod solution;
