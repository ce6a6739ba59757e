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

use crate::bound::strategy::{BoundQuery, BoundStrategy};
use tandem_relax::RelaxError;

/// Claims nothing: the estimate of a node is its own noncoverage.
///
/// Exact only when nothing further can be placed, so the search never prunes
/// on it. Used by the brute-force method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrivialBound;

impl TrivialBound {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl BoundStrategy for TrivialBound {
    fn name(&self) -> &str {
        "TrivialBound"
    }

    #[inline]
    fn covered_length(&mut self, _query: &BoundQuery<'_>) -> Result<f64, RelaxError> {
        Ok(0.0)
    }
}
