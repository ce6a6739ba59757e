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

//! # Strongly Typed Indices
//!
//! Phantom-tagged wrappers around `usize` so placement points and station
//! types cannot be swapped by accident. `TypedIndex<T>` compiles down to a
//! plain `usize` (`#[repr(transparent)]`) and prints as `Name(i)`.
//!
//! ```rust
//! use tandem_model::index::{PlacementIndex, StationIndex};
//!
//! let p = PlacementIndex::new(2);
//! let s = StationIndex::new(0);
//! assert_eq!(p.get(), 2);
//! assert_eq!(format!("{}", s), "StationIndex(0)");
//! ```

/// A trait to tag typed indices with a name for debugging and display purposes.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A strongly typed index that is associated with a specific tag type `T`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Creates a new `TypedIndex` with the given `usize` index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the underlying `usize` index.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.index
    }
}

impl<T> From<usize> for TypedIndex<T> {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    #[inline(always)]
    fn from(index: TypedIndex<T>) -> Self {
        index.index
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

/// A tag type for placement point indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlacementIndexTag;

impl TypedIndexTag for PlacementIndexTag {
    const NAME: &'static str = "PlacementIndex";
}

/// A typed index for candidate placement points (matrix rows).
pub type PlacementIndex = TypedIndex<PlacementIndexTag>;

/// A tag type for station type indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StationIndexTag;

impl TypedIndexTag for StationIndexTag {
    const NAME: &'static str = "StationIndex";
}

/// A typed index for station types (matrix columns).
pub type StationIndex = TypedIndex<StationIndexTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_debug_use_tag_name() {
        let p = PlacementIndex::new(7);
        assert_eq!(format!("{}", p), "PlacementIndex(7)");
        assert_eq!(format!("{:?}", p), "PlacementIndex(7)");
        let s = StationIndex::from(3);
        assert_eq!(format!("{}", s), "StationIndex(3)");
    }

    #[test]
    fn test_conversions_round_trip_through_usize() {
        let s = StationIndex::new(11);
        let raw: usize = s.into();
        assert_eq!(raw, 11);
        assert_eq!(StationIndex::from(raw), s);
    }

    #[test]
    fn test_ordering_follows_underlying_index() {
        let mut v = vec![
            PlacementIndex::new(3),
            PlacementIndex::new(0),
            PlacementIndex::new(2),
        ];
        v.sort();
        assert_eq!(
            v.iter().map(|p| p.get()).collect::<Vec<_>>(),
            vec![0, 2, 3],
            "typed indices must sort by their raw value"
        );
    }
}
