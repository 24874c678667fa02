//! Handles to planes and piles.
//!
//! Handles are plain `Copy` values. Once the referenced plane or pile is
//! destroyed every operation taking the handle fails with
//! [`Error::InvalidHandle`](crate::Error::InvalidHandle).

use super::arena::Key;

/// Handle to a plane owned by a [`Scene`](super::Scene).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub(crate) Key);

/// Handle to a pile owned by a [`Scene`](super::Scene).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PileId(pub(crate) Key);

impl std::fmt::Debug for PlaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlaneId({}v{})", self.0.index, self.0.generation)
    }
}

impl std::fmt::Debug for PileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PileId({}v{})", self.0.index, self.0.generation)
    }
}
