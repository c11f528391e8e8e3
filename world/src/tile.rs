//! Lifecycle state for a single pooled tile instance.

use box_dash_core::{FallSpin, TileColor, TileId, TileKind, TileLocation};

/// One tile slot backed by the pool arena.
///
/// Instances are created once per pool category and never change kind; a
/// track slot changes type by swapping in an instance from another
/// category's ring.
#[derive(Clone, Debug)]
pub(crate) struct Tile {
    pub(crate) id: TileId,
    pub(crate) kind: TileKind,
    pub(crate) location: TileLocation,
    pub(crate) color: TileColor,
    original_color: TileColor,
    pub(crate) active: bool,
    pub(crate) visible: bool,
    pub(crate) collapsed: bool,
    pub(crate) fall: Option<FallSpin>,
    pub(crate) animating: bool,
    pub(crate) epoch: u32,
}

impl Tile {
    /// Creates an inactive instance waiting in its category ring.
    pub(crate) fn new(id: TileId, kind: TileKind) -> Self {
        let placeholder = TileColor::from_rgb(u8::MAX, u8::MAX, u8::MAX);
        Self {
            id,
            kind,
            location: TileLocation::new(0, 0),
            color: placeholder,
            original_color: placeholder,
            active: false,
            visible: false,
            collapsed: false,
            fall: None,
            animating: false,
            epoch: 0,
        }
    }

    /// Reuse hook run by the pool when the ring hands the instance out.
    pub(crate) fn on_reuse(&mut self) {
        self.active = true;
        self.color = self.original_color;
    }

    /// Re-initializes the instance for a freshly assigned track slot.
    ///
    /// Any residual collapse motion from the previous placement stops, the
    /// row color becomes the new flicker baseline, and holes stay hidden
    /// because a hole renders as the absence of a tile.
    pub(crate) fn init(&mut self, location: TileLocation, color: TileColor) {
        self.epoch = self.epoch.wrapping_add(1);
        self.location = location;
        self.color = color;
        self.original_color = color;
        self.collapsed = false;
        self.fall = None;
        self.visible = self.kind != TileKind::Hole;
        self.animating = self.kind.is_hazard();
    }

    /// Marks the tile as stepped on, recoloring it with the player trace.
    pub(crate) fn apply_trace(&mut self, trace: TileColor) {
        self.color = trace;
    }

    /// Starts the collapse animation with the provided spin.
    ///
    /// Returns `false` when the tile already collapsed. Walls only ever
    /// animate the fall and never change type or passability; floor spikes
    /// retract and sky spikes freeze mid-swing.
    pub(crate) fn collapse(&mut self, spin: FallSpin) -> bool {
        if self.collapsed {
            return false;
        }
        self.collapsed = true;
        self.fall = Some(spin);
        self.animating = false;
        true
    }

    /// Deferred reset fired one stabilize delay after the collapse: the
    /// fall motion stops and the tile disappears from the track surface.
    pub(crate) fn stabilize(&mut self) {
        self.fall = None;
        self.visible = false;
    }

    /// Removes the tile from sight without animating a fall.
    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns the instance to the inactive state while it waits in the
    /// ring for its next placement.
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.fall = None;
        self.animating = false;
    }
}
