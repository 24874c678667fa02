//! Pile bookkeeping: per-pile z-lists and roots.
//!
//! Every plane carries `above`/`below` links; the pile records both ends.
//! All splices are O(1).
//!
//! ```text
//!   top ──► [C] ◄──► [A] ◄──► [root] ◄── bottom
//!           above ──────────────────► below
//! ```

use super::id::{PileId, PlaneId};
use super::Scene;
use crate::error::{Error, Result};

/// An independently rendered stack of planes.
#[derive(Debug)]
pub(crate) struct Pile {
    pub(crate) rows: u32,
    pub(crate) cols: u32,
    pub(crate) top: Option<PlaneId>,
    pub(crate) bottom: Option<PlaneId>,
    /// Planes with no binding parent, in creation order.
    pub(crate) roots: Vec<PlaneId>,
    pub(crate) len: usize,
}

impl Pile {
    pub(crate) const fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            top: None,
            bottom: None,
            roots: Vec::new(),
            len: 0,
        }
    }
}

/// Where to splice a plane into a z-list.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Splice {
    Top,
    Bottom,
    Above(PlaneId),
    Below(PlaneId),
}

impl Scene {
    pub(crate) fn pile_ref(&self, id: PileId) -> Result<&Pile> {
        self.piles.get(id.0).ok_or(Error::InvalidHandle)
    }

    pub(crate) fn pile_mut(&mut self, id: PileId) -> Result<&mut Pile> {
        self.piles.get_mut(id.0).ok_or(Error::InvalidHandle)
    }

    /// Remove `id` from its pile's z-list. Its pile field is left untouched.
    pub(crate) fn unlink(&mut self, id: PlaneId) -> Result<()> {
        let links = &self.node(id)?.links;
        let (pile, above, below) = (links.pile, links.above, links.below);

        match above {
            Some(a) => self.node_mut(a)?.links.below = below,
            None => self.pile_mut(pile)?.top = below,
        }
        match below {
            Some(b) => self.node_mut(b)?.links.above = above,
            None => self.pile_mut(pile)?.bottom = above,
        }
        self.pile_mut(pile)?.len -= 1;

        let links = &mut self.node_mut(id)?.links;
        links.above = None;
        links.below = None;
        Ok(())
    }

    /// Insert an unlinked `id` into `pile` and record the membership.
    pub(crate) fn link(&mut self, id: PlaneId, pile: PileId, at: Splice) -> Result<()> {
        let (above, below) = match at {
            Splice::Top => (None, self.pile_ref(pile)?.top),
            Splice::Bottom => (self.pile_ref(pile)?.bottom, None),
            Splice::Above(anchor) => (self.node(anchor)?.links.above, Some(anchor)),
            Splice::Below(anchor) => (Some(anchor), self.node(anchor)?.links.below),
        };

        match above {
            Some(a) => self.node_mut(a)?.links.below = Some(id),
            None => self.pile_mut(pile)?.top = Some(id),
        }
        match below {
            Some(b) => self.node_mut(b)?.links.above = Some(id),
            None => self.pile_mut(pile)?.bottom = Some(id),
        }
        self.pile_mut(pile)?.len += 1;

        let links = &mut self.node_mut(id)?.links;
        links.pile = pile;
        links.above = above;
        links.below = below;
        Ok(())
    }

    /// Unlink and relink `id` within its own pile.
    pub(crate) fn restack(&mut self, id: PlaneId, at: Splice) -> Result<()> {
        let pile = self.node(id)?.links.pile;
        if let Splice::Above(anchor) | Splice::Below(anchor) = at {
            if anchor == id {
                return Err(Error::InvalidArgument("plane cannot be stacked against itself"));
            }
            if self.node(anchor)?.links.pile != pile {
                return Err(Error::InvalidArgument("planes are in different piles"));
            }
        }
        self.unlink(id)?;
        self.link(id, pile, at)
    }

    /// Free `pile` if no plane is left in it.
    pub(crate) fn release_if_empty(&mut self, pile: PileId) {
        if self.piles.get(pile.0).is_some_and(|p| p.len == 0) {
            log::trace!("releasing empty {pile:?}");
            self.piles.remove(pile.0);
        }
    }
}

/// Iterator over a pile's planes from top to bottom.
pub struct ZIter<'a> {
    pub(crate) scene: &'a Scene,
    pub(crate) next: Option<PlaneId>,
}

impl Iterator for ZIter<'_> {
    type Item = PlaneId;

    fn next(&mut self) -> Option<PlaneId> {
        let id = self.next?;
        self.next = self.scene.node(id).ok().and_then(|n| n.links.below);
        Some(id)
    }
}
