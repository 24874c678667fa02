//! Scene: the owner of every plane and pile.
//!
//! Two independent structures link the planes:
//!
//! - the **binding tree** (parent/children) decides coordinates: a plane's
//!   absolute position is its offset plus its parent's absolute position;
//! - the **z-list** of each pile decides paint order, top to bottom.
//!
//! Reparenting changes the tree without restacking, except when a plane
//! crosses into another pile, where it lands directly above its new parent.
//!
//! ```text
//!   binding tree            z-list (pile 0)
//!
//!     root                    top ──► B
//!     ├── A                           A
//!     │   └── B                       root ◄── bottom
//! ```

mod arena;
mod id;
mod pile;
mod plane;

pub use id::{PileId, PlaneId};
pub use pile::ZIter;
pub use plane::{Plane, PlaneOptions};

use crate::buffer::Framebuffer;
use crate::error::{Error, Result};
use crate::geom::Rect;
use arena::Arena;
use pile::{Pile, Splice};
use std::collections::HashSet;

#[derive(Debug)]
pub(crate) struct Links {
    pub(crate) pile: PileId,
    pub(crate) parent: Option<PlaneId>,
    pub(crate) children: Vec<PlaneId>,
    pub(crate) above: Option<PlaneId>,
    pub(crate) below: Option<PlaneId>,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) plane: Plane,
    pub(crate) links: Links,
}

/// All planes and piles, addressed through generational handles.
///
/// Distinct piles share no mutable state, so a `&Scene` can be rendered on
/// several threads at once, one pile per thread.
pub struct Scene {
    nodes: Arena<Node>,
    pub(crate) piles: Arena<Pile>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene.
    pub const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            piles: Arena::new(),
        }
    }

    pub(crate) fn node(&self, id: PlaneId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::InvalidHandle)
    }

    pub(crate) fn node_mut(&mut self, id: PlaneId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::InvalidHandle)
    }

    /// Store `plane` and register it with its parent (or as a pile root).
    /// The new plane is not yet in any z-list.
    fn insert(&mut self, plane: Plane, pile: PileId, parent: Option<PlaneId>) -> Result<PlaneId> {
        let id = PlaneId(self.nodes.insert(Node {
            plane,
            links: Links {
                pile,
                parent,
                children: Vec::new(),
                above: None,
                below: None,
            },
        }));
        match parent {
            Some(p) => self.node_mut(p)?.links.children.push(id),
            None => self.pile_mut(pile)?.roots.push(id),
        }
        Ok(id)
    }

    /// Remove `id` from its parent's children, or from its pile's roots.
    fn detach(&mut self, id: PlaneId) -> Result<()> {
        let links = &self.node(id)?.links;
        let (pile, parent) = (links.pile, links.parent);
        let siblings = match parent {
            Some(p) => &mut self.node_mut(p)?.links.children,
            None => &mut self.pile_mut(pile)?.roots,
        };
        siblings.retain(|&s| s != id);
        Ok(())
    }

    /// Hand `id`'s children to its own parent, keeping their absolute position.
    fn promote_children(&mut self, id: PlaneId) -> Result<()> {
        let node = self.node_mut(id)?;
        let children = std::mem::take(&mut node.links.children);
        let (dy, dx) = node.plane.yx();
        let (pile, parent) = (node.links.pile, node.links.parent);
        for &child in &children {
            let c = self.node_mut(child)?;
            c.links.parent = parent;
            c.plane.shift(dy, dx);
        }
        match parent {
            Some(p) => self.node_mut(p)?.links.children.extend(children),
            None => self.pile_mut(pile)?.roots.extend(children),
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Creation and destruction
    // ─────────────────────────────────────────────────────────────────

    /// Create a new pile whose root is built from `opts`.
    ///
    /// The pile's render extent starts out as the root's dimensions.
    pub fn create_pile(&mut self, opts: PlaneOptions) -> Result<PlaneId> {
        let plane = Plane::new(opts)?;
        let (rows, cols) = plane.dims();
        let pile = PileId(self.piles.insert(Pile::new(rows, cols)));
        let id = self.insert(plane, pile, None)?;
        self.link(id, pile, Splice::Top)?;
        log::trace!("created {pile:?} rooted at {id:?} ({rows}x{cols})");
        Ok(id)
    }

    /// Create a plane bound to `parent`, on top of the parent's pile.
    pub fn create_plane(&mut self, parent: PlaneId, opts: PlaneOptions) -> Result<PlaneId> {
        let pile = self.node(parent)?.links.pile;
        let plane = Plane::new(opts)?;
        let id = self.insert(plane, pile, Some(parent))?;
        self.link(id, pile, Splice::Top)?;
        log::trace!("created {id:?} under {parent:?}");
        Ok(id)
    }

    /// Duplicate a plane's geometry, content and working state.
    ///
    /// The copy is bound to the same parent and stacked directly above the
    /// original. Children and user data are not copied.
    pub fn dup(&mut self, id: PlaneId) -> Result<PlaneId> {
        let node = self.node(id)?;
        let plane = node.plane.duplicate();
        let (pile, parent) = (node.links.pile, node.links.parent);
        let copy = self.insert(plane, pile, parent)?;
        self.link(copy, pile, Splice::Above(id))?;
        Ok(copy)
    }

    /// Destroy a plane. Its children are promoted to its parent and keep
    /// their absolute positions; children of a root become roots.
    pub fn destroy(&mut self, id: PlaneId) -> Result<()> {
        let pile = self.node(id)?.links.pile;
        self.promote_children(id)?;
        self.unlink(id)?;
        self.detach(id)?;
        self.nodes.remove(id.0);
        self.release_if_empty(pile);
        log::trace!("destroyed {id:?}");
        Ok(())
    }

    /// Destroy a plane and everything bound beneath it.
    pub fn destroy_family(&mut self, id: PlaneId) -> Result<()> {
        let pile = self.node(id)?.links.pile;
        let family = self.family(id)?;
        self.detach(id)?;
        for &member in &family {
            self.unlink(member)?;
            self.nodes.remove(member.0);
        }
        self.release_if_empty(pile);
        log::trace!("destroyed {id:?} and {} descendants", family.len() - 1);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────────

    /// Bind `id` alone to `parent`, or make it the root of a new pile when
    /// `parent` is `None`.
    ///
    /// `id`'s own children are promoted to its former parent first. Its
    /// offset is kept and now reads as relative to the new parent. Moving to
    /// another pile stacks it directly above the new parent.
    pub fn reparent(&mut self, id: PlaneId, parent: Option<PlaneId>) -> Result<()> {
        self.node(id)?;
        if let Some(p) = parent {
            self.node(p)?;
            if p == id {
                return Err(Error::InvalidArgument("plane cannot be its own parent"));
            }
        }
        self.promote_children(id)?;
        self.detach(id)?;
        self.attach(id, parent, &[id])
    }

    /// Bind `id` and its whole subtree to `parent` (or to a new pile).
    ///
    /// Across piles the subtree keeps its relative stacking order and is
    /// spliced in directly above the new parent.
    pub fn reparent_family(&mut self, id: PlaneId, parent: Option<PlaneId>) -> Result<()> {
        let family = self.family(id)?;
        if let Some(p) = parent {
            self.node(p)?;
            if family.contains(&p) {
                return Err(Error::InvalidArgument("cannot bind a plane beneath itself"));
            }
        }
        self.detach(id)?;
        self.attach(id, parent, &family)
    }

    /// Bind a detached `id` and move `members` to the destination pile.
    fn attach(&mut self, id: PlaneId, parent: Option<PlaneId>, members: &[PlaneId]) -> Result<()> {
        let old_pile = self.node(id)?.links.pile;
        let set: HashSet<PlaneId> = members.iter().copied().collect();
        let mut ordered: Vec<PlaneId> = self.planes(old_pile).filter(|m| set.contains(m)).collect();
        ordered.reverse();

        let (pile, mut at) = match parent {
            None => {
                let (rows, cols) = self.node(id)?.plane.dims();
                (PileId(self.piles.insert(Pile::new(rows, cols))), None)
            }
            Some(p) => (self.node(p)?.links.pile, Some(p)),
        };
        self.node_mut(id)?.links.parent = parent;
        match parent {
            Some(p) => self.node_mut(p)?.links.children.push(id),
            None => self.pile_mut(pile)?.roots.push(id),
        }

        if pile != old_pile {
            for member in ordered {
                self.unlink(member)?;
                let splice = at.map_or(Splice::Top, Splice::Above);
                self.link(member, pile, splice)?;
                at = Some(member);
            }
            self.release_if_empty(old_pile);
            log::trace!("moved {id:?} from {old_pile:?} to {pile:?}");
        }
        Ok(())
    }

    /// `id` followed by all its descendants, depth first.
    pub fn family(&self, id: PlaneId) -> Result<Vec<PlaneId>> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend_from_slice(&self.node(out[i])?.links.children);
            i += 1;
        }
        Ok(out)
    }

    /// The plane `id` is bound to, `None` for pile roots.
    pub fn parent(&self, id: PlaneId) -> Result<Option<PlaneId>> {
        Ok(self.node(id)?.links.parent)
    }

    /// Planes bound directly to `id`.
    pub fn children(&self, id: PlaneId) -> Result<&[PlaneId]> {
        Ok(&self.node(id)?.links.children)
    }

    /// Absolute position relative to the pile origin.
    pub fn abs_yx(&self, id: PlaneId) -> Result<(i32, i32)> {
        let mut node = self.node(id)?;
        let (mut y, mut x) = node.plane.yx();
        while let Some(p) = node.links.parent {
            node = self.node(p)?;
            let (py, px) = node.plane.yx();
            y = y.saturating_add(py);
            x = x.saturating_add(px);
        }
        Ok((y, x))
    }

    /// Convert `(y, x)` relative to `src` into coordinates relative to `dst`.
    ///
    /// # Errors
    ///
    /// Fails on a stale handle, or with `InvalidArgument` when the result
    /// does not fit an `i32`.
    pub fn translate(&self, src: PlaneId, dst: PlaneId, y: i32, x: i32) -> Result<(i32, i32)> {
        let (sy, sx) = self.abs_yx(src)?;
        let (dy, dx) = self.abs_yx(dst)?;
        let shift = |v: i32, from: i32, to: i32| {
            i32::try_from(i64::from(v) + i64::from(from) - i64::from(to))
                .map_err(|_| Error::InvalidArgument("translated coordinate out of range"))
        };
        Ok((shift(y, sy, dy)?, shift(x, sx, dx)?))
    }

    // ─────────────────────────────────────────────────────────────────
    // Planes and piles
    // ─────────────────────────────────────────────────────────────────

    /// Borrow a plane.
    pub fn plane(&self, id: PlaneId) -> Result<&Plane> {
        Ok(&self.node(id)?.plane)
    }

    /// Borrow a plane mutably.
    pub fn plane_mut(&mut self, id: PlaneId) -> Result<&mut Plane> {
        Ok(&mut self.node_mut(id)?.plane)
    }

    /// The pile `id` belongs to.
    pub fn pile_of(&self, id: PlaneId) -> Result<PileId> {
        Ok(self.node(id)?.links.pile)
    }

    /// Number of live planes.
    pub const fn plane_count(&self) -> usize {
        self.nodes.len()
    }

    /// All live piles.
    pub fn piles(&self) -> impl Iterator<Item = PileId> + '_ {
        self.piles.keys().map(PileId)
    }

    /// Planes with no parent in `pile`.
    pub fn roots(&self, pile: PileId) -> Result<&[PlaneId]> {
        Ok(&self.pile_ref(pile)?.roots)
    }

    /// The pile's render extent.
    pub fn pile_dims(&self, pile: PileId) -> Result<(u32, u32)> {
        let p = self.pile_ref(pile)?;
        Ok((p.rows, p.cols))
    }

    /// Change the pile's render extent.
    pub fn set_pile_dims(&mut self, pile: PileId, rows: u32, cols: u32) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_dims(rows, cols));
        }
        let p = self.pile_mut(pile)?;
        p.rows = rows;
        p.cols = cols;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Stacking
    // ─────────────────────────────────────────────────────────────────

    /// Topmost plane of `pile`, `None` for a stale pile.
    pub fn top(&self, pile: PileId) -> Option<PlaneId> {
        self.piles.get(pile.0)?.top
    }

    /// Bottommost plane of `pile`, `None` for a stale pile.
    pub fn bottom(&self, pile: PileId) -> Option<PlaneId> {
        self.piles.get(pile.0)?.bottom
    }

    /// The plane directly above `id`.
    pub fn above(&self, id: PlaneId) -> Result<Option<PlaneId>> {
        Ok(self.node(id)?.links.above)
    }

    /// The plane directly below `id`.
    pub fn below(&self, id: PlaneId) -> Result<Option<PlaneId>> {
        Ok(self.node(id)?.links.below)
    }

    /// The planes of `pile`, top to bottom. Empty for a stale pile.
    pub fn planes(&self, pile: PileId) -> ZIter<'_> {
        ZIter {
            scene: self,
            next: self.top(pile),
        }
    }

    /// Raise `id` to the top of its pile.
    pub fn move_top(&mut self, id: PlaneId) -> Result<()> {
        self.restack(id, Splice::Top)
    }

    /// Lower `id` to the bottom of its pile.
    pub fn move_bottom(&mut self, id: PlaneId) -> Result<()> {
        self.restack(id, Splice::Bottom)
    }

    /// Place `id` directly above `anchor`, which must share its pile.
    pub fn move_above(&mut self, id: PlaneId, anchor: PlaneId) -> Result<()> {
        self.restack(id, Splice::Above(anchor))
    }

    /// Place `id` directly below `anchor`, which must share its pile.
    pub fn move_below(&mut self, id: PlaneId, anchor: PlaneId) -> Result<()> {
        self.restack(id, Splice::Below(anchor))
    }

    // ─────────────────────────────────────────────────────────────────
    // Composition
    // ─────────────────────────────────────────────────────────────────

    /// Flatten `pile` at its own extent.
    pub fn render(&self, pile: PileId) -> Result<Framebuffer> {
        let (rows, cols) = self.pile_dims(pile)?;
        crate::compositor::render(self, pile, rows, cols)
    }

    /// Flatten `pile` into a `rows` x `cols` framebuffer.
    pub fn render_to(&self, pile: PileId, rows: u32, cols: u32) -> Result<Framebuffer> {
        self.pile_ref(pile)?;
        crate::compositor::render(self, pile, rows, cols)
    }

    /// Blend `region` of `src` onto `dst` with its top-left at `(dst_y, dst_x)`.
    ///
    /// `src` is treated as stacked above `dst`. `region` must lie within
    /// `src` and the target area within `dst`.
    pub fn mergedown(
        &mut self,
        src: PlaneId,
        dst: PlaneId,
        region: Rect,
        dst_y: u32,
        dst_x: u32,
    ) -> Result<()> {
        if src == dst {
            return Err(Error::InvalidArgument("cannot merge a plane onto itself"));
        }
        let (s, d) = (self.plane(src)?, self.plane(dst)?);
        if region.is_empty() {
            return Ok(());
        }
        if !Rect::from_size(s.rows(), s.cols()).contains_rect(&region) {
            return Err(Error::out_of_bounds(region.bottom(), region.right(), s.rows(), s.cols()));
        }
        let target = Rect::new(dst_y, dst_x, region.rows, region.cols);
        if !Rect::from_size(d.rows(), d.cols()).contains_rect(&target) {
            return Err(Error::out_of_bounds(target.bottom(), target.right(), d.rows(), d.cols()));
        }
        let patch = crate::compositor::mergedown(s, d, region, dst_y, dst_x)?;
        self.plane_mut(dst)?.write_patch(dst_y, dst_x, &patch)
    }

    /// Merge all of `src` that overlaps `dst`, at their absolute positions.
    ///
    /// Planes in different piles overlap by pile-relative coordinates.
    pub fn mergedown_simple(&mut self, src: PlaneId, dst: PlaneId) -> Result<()> {
        let (sy, sx) = self.abs_yx(src)?;
        let (dy, dx) = self.abs_yx(dst)?;
        let (srows, scols) = self.plane(src)?.dims();
        let (drows, dcols) = self.plane(dst)?.dims();

        let top = i64::from(sy.max(dy));
        let left = i64::from(sx.max(dx));
        let bottom = (i64::from(sy) + i64::from(srows)).min(i64::from(dy) + i64::from(drows));
        let right = (i64::from(sx) + i64::from(scols)).min(i64::from(dx) + i64::from(dcols));
        if bottom <= top || right <= left {
            return Ok(());
        }
        let region = Rect::new(
            (top - i64::from(sy)) as u32,
            (left - i64::from(sx)) as u32,
            (bottom - top) as u32,
            (right - left) as u32,
        );
        let (ty, tx) = ((top - i64::from(dy)) as u32, (left - i64::from(dx)) as u32);
        self.mergedown(src, dst, region, ty, tx)
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("planes", &self.nodes.len())
            .field("piles", &self.piles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_root(rows: u32, cols: u32) -> (Scene, PlaneId, PileId) {
        let mut scene = Scene::new();
        let root = scene.create_pile(PlaneOptions::new(rows, cols)).unwrap();
        let pile = scene.pile_of(root).unwrap();
        (scene, root, pile)
    }

    fn order(scene: &Scene, pile: PileId) -> Vec<PlaneId> {
        scene.planes(pile).collect()
    }

    #[test]
    fn test_create_stacks_on_top() {
        let (mut scene, root, pile) = scene_with_root(10, 10);
        let a = scene.create_plane(root, PlaneOptions::new(2, 2)).unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(2, 2)).unwrap();
        assert_eq!(order(&scene, pile), vec![b, a, root]);
        assert_eq!(scene.top(pile), Some(b));
        assert_eq!(scene.bottom(pile), Some(root));
        assert_eq!(scene.pile_dims(pile).unwrap(), (10, 10));
        assert_eq!(scene.plane_count(), 3);
    }

    #[test]
    fn test_zero_dims_rejected() {
        let (mut scene, root, _) = scene_with_root(2, 2);
        assert!(matches!(
            scene.create_plane(root, PlaneOptions::new(0, 1)),
            Err(Error::Construction(_))
        ));
        assert!(scene.create_pile(PlaneOptions::new(1, 0)).is_err());
        assert_eq!(scene.plane_count(), 1);
    }

    #[test]
    fn test_move_top_bottom() {
        let (mut scene, root, pile) = scene_with_root(4, 4);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let c = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();

        scene.move_top(a).unwrap();
        assert_eq!(scene.top(pile), Some(a));
        assert_eq!(order(&scene, pile), vec![a, c, b, root]);

        scene.move_bottom(c).unwrap();
        assert_eq!(scene.bottom(pile), Some(c));
        assert_eq!(order(&scene, pile), vec![a, b, root, c]);
    }

    #[test]
    fn test_move_above_below() {
        let (mut scene, root, pile) = scene_with_root(4, 4);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();

        scene.move_below(b, root).unwrap();
        assert_eq!(order(&scene, pile), vec![a, root, b]);
        scene.move_above(b, a).unwrap();
        assert_eq!(order(&scene, pile), vec![b, a, root]);
        assert_eq!(scene.above(a).unwrap(), Some(b));
        assert_eq!(scene.below(a).unwrap(), Some(root));
        assert!(scene.move_above(a, a).is_err());
    }

    #[test]
    fn test_move_across_piles_rejected() {
        let (mut scene, root, _) = scene_with_root(4, 4);
        let other = scene.create_pile(PlaneOptions::new(2, 2)).unwrap();
        assert!(matches!(
            scene.move_above(root, other),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_abs_and_translate() {
        let (mut scene, root, _) = scene_with_root(20, 20);
        scene.plane_mut(root).unwrap().move_yx(1, 1);
        let a = scene
            .create_plane(root, PlaneOptions::new(5, 5).at(2, 3))
            .unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(2, 2).at(-1, 4)).unwrap();
        assert_eq!(scene.abs_yx(b).unwrap(), (2, 8));
        assert_eq!(scene.translate(b, root, 0, 0).unwrap(), (1, 7));
    }

    #[test]
    fn test_translate_out_of_range() {
        let (mut scene, root, _) = scene_with_root(2, 2);
        let far = scene
            .create_plane(root, PlaneOptions::new(1, 1).at(i32::MAX, 0))
            .unwrap();
        assert!(matches!(
            scene.translate(far, root, 1, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(scene.translate(far, root, -1, 0).unwrap(), (i32::MAX - 1, 0));
        assert_eq!(scene.translate(root, far, 0, 0).unwrap(), (-i32::MAX, 0));
    }

    #[test]
    fn test_destroy_promotes_children() {
        let (mut scene, root, pile) = scene_with_root(20, 20);
        let a = scene
            .create_plane(root, PlaneOptions::new(5, 5).at(2, 2))
            .unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(1, 1).at(1, 1)).unwrap();

        scene.destroy(a).unwrap();
        assert_eq!(scene.parent(b).unwrap(), Some(root));
        assert_eq!(scene.children(root).unwrap(), &[b]);
        assert_eq!(scene.abs_yx(b).unwrap(), (3, 3));
        assert_eq!(order(&scene, pile), vec![b, root]);
        assert!(matches!(scene.plane(a), Err(Error::InvalidHandle)));
        assert!(matches!(scene.destroy(a), Err(Error::InvalidHandle)));
    }

    #[test]
    fn test_destroy_root_keeps_pile() {
        let (mut scene, root, pile) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        scene.destroy(root).unwrap();
        assert_eq!(scene.roots(pile).unwrap(), &[a]);
        assert_eq!(scene.pile_of(a).unwrap(), pile);

        scene.destroy(a).unwrap();
        assert!(scene.pile_dims(pile).is_err());
        assert_eq!(scene.piles().count(), 0);
    }

    #[test]
    fn test_destroy_family() {
        let (mut scene, root, pile) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(1, 1)).unwrap();
        let c = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        scene.destroy_family(a).unwrap();
        assert!(scene.plane(b).is_err());
        assert_eq!(order(&scene, pile), vec![c, root]);
        assert_eq!(scene.children(root).unwrap(), &[c]);
    }

    #[test]
    fn test_reparent_within_pile_keeps_stacking() {
        let (mut scene, root, pile) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let before = order(&scene, pile);
        scene.reparent(a, Some(b)).unwrap();
        assert_eq!(scene.parent(a).unwrap(), Some(b));
        assert_eq!(order(&scene, pile), before);
    }

    #[test]
    fn test_reparent_promotes_own_children() {
        let (mut scene, root, _) = scene_with_root(8, 8);
        let a = scene
            .create_plane(root, PlaneOptions::new(4, 4).at(1, 1))
            .unwrap();
        let child = scene.create_plane(a, PlaneOptions::new(1, 1).at(1, 1)).unwrap();
        let other = scene.create_pile(PlaneOptions::new(3, 3)).unwrap();

        scene.reparent(a, Some(other)).unwrap();
        assert_eq!(scene.parent(child).unwrap(), Some(root));
        assert_eq!(scene.abs_yx(child).unwrap(), (2, 2));
        assert_eq!(scene.pile_of(a).unwrap(), scene.pile_of(other).unwrap());
        assert_eq!(scene.above(other).unwrap(), Some(a));
    }

    #[test]
    fn test_reparent_to_new_pile() {
        let (mut scene, root, pile) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(2, 3)).unwrap();
        scene.reparent(a, None).unwrap();
        let new_pile = scene.pile_of(a).unwrap();
        assert_ne!(new_pile, pile);
        assert_eq!(scene.pile_dims(new_pile).unwrap(), (2, 3));
        assert_eq!(scene.roots(new_pile).unwrap(), &[a]);
        assert_eq!(order(&scene, pile), vec![root]);
        assert!(scene.reparent(a, Some(a)).is_err());
    }

    #[test]
    fn test_reparent_family_across_piles() {
        let (mut scene, root, _) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(1, 1)).unwrap();
        scene.move_below(b, a).unwrap();
        let unrelated = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();

        let dst_root = scene.create_pile(PlaneOptions::new(4, 4)).unwrap();
        let dst_pile = scene.pile_of(dst_root).unwrap();
        let top = scene.create_plane(dst_root, PlaneOptions::new(1, 1)).unwrap();

        scene.reparent_family(a, Some(dst_root)).unwrap();
        assert_eq!(order(&scene, dst_pile), vec![top, a, b, dst_root]);
        assert_eq!(scene.pile_of(b).unwrap(), dst_pile);
        assert_eq!(scene.parent(b).unwrap(), Some(a));
        assert_eq!(scene.children(root).unwrap(), &[unrelated]);
    }

    #[test]
    fn test_reparent_family_beneath_itself_rejected() {
        let (mut scene, root, _) = scene_with_root(8, 8);
        let a = scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        let b = scene.create_plane(a, PlaneOptions::new(1, 1)).unwrap();
        assert!(matches!(
            scene.reparent_family(a, Some(b)),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(scene.parent(a).unwrap(), Some(root));
    }

    #[test]
    fn test_dup() {
        let (mut scene, root, pile) = scene_with_root(4, 4);
        let a = scene.create_plane(root, PlaneOptions::new(1, 2)).unwrap();
        scene.create_plane(root, PlaneOptions::new(1, 1)).unwrap();
        scene.plane_mut(a).unwrap().putstr_yx(0, 0, "hi").unwrap();
        scene.plane_mut(a).unwrap().set_user_data(1u8);

        let copy = scene.dup(a).unwrap();
        assert_eq!(scene.above(a).unwrap(), Some(copy));
        assert_eq!(scene.parent(copy).unwrap(), Some(root));
        assert_eq!(scene.plane(copy).unwrap().framebuffer().to_text(), "hi");
        assert!(scene.plane(copy).unwrap().user_data::<u8>().is_none());
        assert_eq!(order(&scene, pile).len(), 4);
    }

    #[test]
    fn test_set_pile_dims() {
        let (mut scene, _, pile) = scene_with_root(4, 4);
        scene.set_pile_dims(pile, 2, 9).unwrap();
        assert_eq!(scene.pile_dims(pile).unwrap(), (2, 9));
        assert!(scene.set_pile_dims(pile, 0, 9).is_err());
    }

    #[test]
    fn test_stale_pile_queries() {
        let (mut scene, root, pile) = scene_with_root(4, 4);
        scene.destroy(root).unwrap();
        assert_eq!(scene.top(pile), None);
        assert_eq!(scene.planes(pile).count(), 0);
        assert!(matches!(scene.render(pile), Err(Error::InvalidHandle)));
    }
}
