//! Fixed-capacity tile pools with first-in first-out reuse.

use std::collections::{BTreeMap, VecDeque};

use box_dash_core::{TileId, TileKind};

use crate::tile::Tile;

/// Arena of pre-instantiated tiles organized into one reuse ring per kind.
///
/// Capacities are fixed at registration; reuse never allocates. Requesting
/// more concurrently live instances than a category holds silently
/// repurposes the oldest handle, so categories are sized for the worst case
/// at registration time.
#[derive(Debug, Default)]
pub(crate) struct TilePool {
    tiles: Vec<Tile>,
    rings: BTreeMap<TileKind, VecDeque<TileId>>,
}

impl TilePool {
    /// Creates an empty pool with no registered categories.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a category and eagerly instantiates `capacity` tiles for
    /// it. Registering an existing category is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero; an empty ring could never serve a
    /// reuse request.
    pub(crate) fn register(&mut self, kind: TileKind, capacity: u32) {
        assert!(capacity > 0, "tile pool category {kind:?} needs capacity");
        if self.capacity_of(kind) > 0 {
            return;
        }

        let mut ring = VecDeque::with_capacity(capacity as usize);
        for _ in 0..capacity {
            let id = TileId::new(u32::try_from(self.tiles.len()).unwrap_or(u32::MAX));
            self.tiles.push(Tile::new(id, kind));
            ring.push_back(id);
        }
        let _ = self.rings.insert(kind, ring);
    }

    /// Hands out the oldest instance of the category and re-queues it at
    /// the back of the ring.
    ///
    /// # Panics
    ///
    /// Panics when the category was never registered; that is a wiring bug
    /// surfaced at the first request rather than silently absorbed.
    pub(crate) fn reuse(&mut self, kind: TileKind) -> TileId {
        let ring = self
            .rings
            .get_mut(&kind)
            .unwrap_or_else(|| panic!("no tile pool registered for {kind:?}"));
        let id = ring.pop_front().expect("registered rings are never empty");
        ring.push_back(id);
        self.tiles[id.get() as usize].on_reuse();
        id
    }

    /// Shared access to the instance behind `id`.
    pub(crate) fn get(&self, id: TileId) -> &Tile {
        &self.tiles[id.get() as usize]
    }

    /// Exclusive access to the instance behind `id`.
    pub(crate) fn get_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.get() as usize]
    }

    /// Number of instances held by the category's ring.
    pub(crate) fn capacity_of(&self, kind: TileKind) -> usize {
        self.rings.get(&kind).map_or(0, VecDeque::len)
    }
}
