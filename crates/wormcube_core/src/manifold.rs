//! Antipodal ("manifold") correspondence between stickers, and flips.
//!
//! Every sticker is connected through a wormhole to the sticker diametrically
//! opposite it through the center of the cube: the position reflected through
//! the center, facing the opposite way. This correspondence is purely
//! geometric and does not depend on the colors currently shown.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::{CubeState, Direction, Sign, StickerPos};

/// Lookup table from each sticker position to its antipodal partner.
///
/// The table only stores positions, so it stays valid across flips. It is
/// tied to the cube size; [`CubeState::flip_sticker_pair()`] rebuilds it if
/// it was built for a cube of a different size.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManifoldMap {
    size: u8,
    partners: HashMap<StickerPos, StickerPos>,
}
impl ManifoldMap {
    /// Builds the manifold map for a cube state.
    ///
    /// Only positions where both the sticker and its antipode exist are
    /// included.
    pub fn build(state: &CubeState) -> Self {
        let size = state.size();
        let partners = state
            .stickers()
            .filter_map(|(pos, _)| {
                let antipode = pos.antipode(size);
                state.sticker(antipode)?;
                Some((pos, antipode))
            })
            .collect();
        Self { size, partners }
    }

    /// Returns the size of the cube that the map was built for.
    pub fn size(&self) -> u8 {
        self.size
    }
    /// Returns the number of sticker positions in the map.
    pub fn len(&self) -> usize {
        self.partners.len()
    }
    /// Returns whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Returns the antipodal partner of a sticker position, or `None` if the
    /// position has no sticker.
    pub fn partner(&self, pos: StickerPos) -> Option<StickerPos> {
        self.partners.get(&pos).copied()
    }
    /// Iterates over all pairs `(position, partner)`. Each pair appears twice,
    /// once in each order.
    pub fn iter(&self) -> impl Iterator<Item = (StickerPos, StickerPos)> + '_ {
        self.partners.iter().map(|(&a, &b)| (a, b))
    }

    /// Returns whether the map can be used with `state`.
    pub fn is_valid_for(&self, state: &CubeState) -> bool {
        self.size == state.size()
    }
}

/// Builds the manifold map for a cube state. See [`ManifoldMap::build()`].
pub fn build_manifold_grid_map(state: &CubeState) -> ManifoldMap {
    ManifoldMap::build(state)
}

impl CubeState {
    /// Flips a sticker and its antipodal partner: each one's current color
    /// becomes the antipode of its current color, and each one's flip counter
    /// is incremented.
    ///
    /// If there is no sticker at `pos` or it has no partner, the state is
    /// returned unchanged.
    #[must_use]
    pub fn flip_sticker_pair(&self, pos: StickerPos, manifold: &ManifoldMap) -> Self {
        let rebuilt;
        let manifold = if manifold.is_valid_for(self) {
            manifold
        } else {
            log::debug!(
                "rebuilding manifold map for size {} (was built for size {})",
                self.size(),
                manifold.size(),
            );
            rebuilt = ManifoldMap::build(self);
            &rebuilt
        };

        let Some(partner) = manifold.partner(pos) else {
            return self.clone();
        };
        let mut ret = self.clone();
        for p in [pos, partner] {
            match ret.sticker_mut(p) {
                Some(sticker) => sticker.flip(),
                None => return self.clone(),
            }
        }
        ret
    }

    /// Returns the antipodal partner of `pos` only if the colors of the two
    /// stickers agree with it: each sticker's original color must be the
    /// antipode of the other's.
    ///
    /// The geometric partner from [`ManifoldMap`] is canonical. This is a
    /// consistency check on top of it.
    pub fn color_consistent_partner(
        &self,
        pos: StickerPos,
        manifold: &ManifoldMap,
    ) -> Option<StickerPos> {
        let partner = manifold.partner(pos)?;
        let a = self.sticker(pos)?;
        let b = self.sticker(partner)?;
        (a.orig.antipodal() == b.orig).then_some(partner)
    }
}

/// Flips a sticker and its antipodal partner. See
/// [`CubeState::flip_sticker_pair()`].
pub fn flip_sticker_pair(state: &CubeState, pos: StickerPos, manifold: &ManifoldMap) -> CubeState {
    state.flip_sticker_pair(pos, manifold)
}

/// Returns the directions in which a sticker facing `dir` can step along the
/// surface.
fn in_plane_directions(dir: Direction) -> [Direction; 4] {
    let (a, b) = dir.face_axes();
    [
        Direction::new(a, Sign::Pos),
        Direction::new(a, Sign::Neg),
        Direction::new(b, Sign::Pos),
        Direction::new(b, Sign::Neg),
    ]
}

/// Returns the sticker positions adjacent to `pos` on the surface of a cube of
/// the given size, including across edges onto neighboring faces.
///
/// A step that stays on the face moves to the neighboring cubie. A step off
/// the edge of the face lands on the same cubie, on the face that points in
/// the direction of the step. Every surface position has exactly four
/// neighbors; positions not on the surface have none.
pub fn manifold_neighbors(pos: StickerPos, size: u8) -> SmallVec<[StickerPos; 4]> {
    if !pos.is_on_surface(size) {
        return SmallVec::new();
    }
    in_plane_directions(pos.dir)
        .into_iter()
        .map(|step| match pos.pos.step(step, size) {
            Some(new_pos) => StickerPos {
                pos: new_pos,
                dir: pos.dir,
            },
            None => StickerPos {
                pos: pos.pos,
                dir: step,
            },
        })
        .collect()
}

/// Returns the sticker positions adjacent to `pos` on the same face, without
/// crossing edges. There are 2 to 4 of them for `N ≥ 2`.
pub fn face_neighbors(pos: StickerPos, size: u8) -> SmallVec<[StickerPos; 4]> {
    if !pos.is_on_surface(size) {
        return SmallVec::new();
    }
    in_plane_directions(pos.dir)
        .into_iter()
        .filter_map(|step| {
            Some(StickerPos {
                pos: pos.pos.step(step, size)?,
                dir: pos.dir,
            })
        })
        .collect()
}

/// Returns the sticker positions adjacent to `pos`. See
/// [`manifold_neighbors()`].
pub fn get_manifold_neighbors(x: u8, y: u8, z: u8, dir: Direction, size: u8) -> Vec<StickerPos> {
    manifold_neighbors(StickerPos::new(x, y, z, dir), size).into_vec()
}
