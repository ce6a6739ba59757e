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

use crate::tree::NodeKey;

/// A LIFO stack of deferred forbid children.
///
/// Every branching step pushes the forbid child here and descends into the
/// assign child, so the stack holds exactly the unexplored right siblings of
/// the current path. Popping resumes the most recent one.
#[derive(Clone, Debug, Default)]
pub struct DeferredStack {
    entries: Vec<NodeKey>,
    high_water: usize,
}

impl DeferredStack {
    /// Creates a new, empty `DeferredStack`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            high_water: 0,
        }
    }

    /// Creates a stack with room for a full-depth path of an `n × m` instance.
    #[inline]
    pub fn preallocated(num_placements: usize, num_stations: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_placements.saturating_mul(num_stations)),
            high_water: 0,
        }
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The largest number of entries held at once since the last reset.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    #[inline]
    pub fn push(&mut self, key: NodeKey) {
        self.entries.push(key);
        self.high_water = self.high_water.max(self.entries.len());
    }

    #[inline]
    pub fn pop(&mut self) -> Option<NodeKey> {
        self.entries.pop()
    }

    #[inline]
    pub fn peek(&self) -> Option<NodeKey> {
        self.entries.last().copied()
    }

    /// Clears all entries but keeps the allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.high_water = 0;
    }
}

impl std::fmt::Display for DeferredStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeferredStack(entries: {})", self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = DeferredStack::new();
        stack.push(NodeKey::new(2));
        stack.push(NodeKey::new(4));
        assert_eq!(stack.peek(), Some(NodeKey::new(4)));
        assert_eq!(stack.pop(), Some(NodeKey::new(4)));
        assert_eq!(stack.pop(), Some(NodeKey::new(2)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_high_water_and_reset() {
        let mut stack = DeferredStack::preallocated(3, 2);
        stack.push(NodeKey::new(2));
        stack.push(NodeKey::new(4));
        stack.pop();
        stack.push(NodeKey::new(6));
        assert_eq!(stack.high_water(), 2);
        assert_eq!(stack.num_entries(), 2);

        stack.reset();
        assert!(stack.is_empty());
        assert_eq!(stack.high_water(), 0);
    }
}
