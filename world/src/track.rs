//! Double-buffered track storage with modular row addressing.

use box_dash_core::{RowParity, TileId, TileLocation, TrackError};

/// Fixed window of track buffers cycled along an unbounded row axis.
///
/// The absolute row `r` lives in buffer `(r / track_length) % track_count`
/// at offset `r % track_length`. Each buffer remembers which track ordinal
/// it currently holds, so lookups against rows that were recycled away or
/// never generated fail instead of aliasing stale tiles.
#[derive(Debug)]
pub(crate) struct TrackStore {
    track_length: u32,
    track_count: u32,
    row_width: u32,
    buffers: Vec<TrackBuffer>,
}

#[derive(Debug)]
struct TrackBuffer {
    ordinal: Option<u64>,
    rows: Vec<Vec<TileId>>,
}

impl TrackStore {
    /// Creates an empty store; every buffer awaits its first fill pass.
    pub(crate) fn new(track_length: u32, track_count: u32, row_width: u32) -> Self {
        let buffers = (0..track_count)
            .map(|_| TrackBuffer {
                ordinal: None,
                rows: Vec::with_capacity(track_length as usize),
            })
            .collect();
        Self {
            track_length,
            track_count,
            row_width,
            buffers,
        }
    }

    pub(crate) fn ordinal_of(&self, row: u64) -> u64 {
        row / u64::from(self.track_length)
    }

    pub(crate) fn offset_of(&self, row: u64) -> u32 {
        (row % u64::from(self.track_length)) as u32
    }

    fn slot_of(&self, row: u64) -> usize {
        (self.ordinal_of(row) % u64::from(self.track_count)) as usize
    }

    /// Number of tiles the row at the provided index holds.
    pub(crate) fn width_of(&self, row: u64) -> u32 {
        RowParity::of(row).width(self.row_width)
    }

    /// Tile identifiers of a resident row, ordered left to right.
    pub(crate) fn row_tiles(&self, row: u64) -> Result<&[TileId], TrackError> {
        let buffer = &self.buffers[self.slot_of(row)];
        if buffer.ordinal != Some(self.ordinal_of(row)) {
            return Err(TrackError::RowNotResident { row });
        }
        Ok(&buffer.rows[self.offset_of(row) as usize])
    }

    /// Resolves a location to the pooled instance occupying it.
    pub(crate) fn tile_at(&self, location: TileLocation) -> Result<TileId, TrackError> {
        let row = location.row();
        let tiles = self.row_tiles(row)?;
        if location.column() >= self.width_of(row) {
            return Err(TrackError::ColumnOutOfRange {
                column: location.column(),
                row,
            });
        }
        Ok(tiles[location.column() as usize])
    }

    /// Chooses the buffer for the next recycle pass and the track ordinal
    /// it will hold: the first unfilled buffer during bootstrap, afterwards
    /// the oldest resident one.
    pub(crate) fn begin_recycle(&self) -> (usize, u64) {
        for (slot, buffer) in self.buffers.iter().enumerate() {
            if buffer.ordinal.is_none() {
                return (slot, slot as u64);
            }
        }

        let mut oldest_slot = 0;
        let mut oldest = u64::MAX;
        let mut newest = 0;
        for (slot, buffer) in self.buffers.iter().enumerate() {
            if let Some(ordinal) = buffer.ordinal {
                if ordinal < oldest {
                    oldest = ordinal;
                    oldest_slot = slot;
                }
                newest = newest.max(ordinal);
            }
        }
        (oldest_slot, newest + 1)
    }

    /// Occupants of the buffer about to be rebuilt, row by row.
    pub(crate) fn slot_rows(&self, slot: usize) -> &[Vec<TileId>] {
        &self.buffers[slot].rows
    }

    /// Drops the buffer's residency while its rows are rewritten.
    pub(crate) fn clear_residency(&mut self, slot: usize) {
        self.buffers[slot].ordinal = None;
    }

    /// Stores one rebuilt row, growing the buffer on the first fill pass
    /// and overwriting in place on later passes.
    pub(crate) fn set_row(&mut self, slot: usize, offset: u32, tiles: Vec<TileId>) {
        let rows = &mut self.buffers[slot].rows;
        let offset = offset as usize;
        if offset == rows.len() {
            rows.push(tiles);
        } else {
            rows[offset] = tiles;
        }
    }

    /// Marks the rebuilt buffer as holding `ordinal`.
    pub(crate) fn commit_recycle(&mut self, slot: usize, ordinal: u64) {
        debug_assert_eq!(
            self.buffers[slot].rows.len(),
            self.track_length as usize,
            "recycle must rebuild every row before committing"
        );
        self.buffers[slot].ordinal = Some(ordinal);
    }
}
