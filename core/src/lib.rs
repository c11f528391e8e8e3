#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Box Dash runner core.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Box Dash.";

/// Number of simulation ticks that make up one second of track time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Label of the deterministic stream that drives hazard tile rolls.
pub const RNG_STREAM_TILE_ROLLS: &str = "tile-rolls";

/// Label of the deterministic stream that drives safe-path coin flips.
pub const RNG_STREAM_SAFE_PATH: &str = "safe-path";

/// Lifecycle phase of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Track is configured but the player has not started running yet.
    Idle,
    /// The run is live and the collapse sweep is chasing the player.
    Running,
    /// The run ended; only a full reconfiguration starts a new one.
    Over,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the track storage and tile pools from the provided layout.
    ConfigureTrack {
        /// Geometry, theme, and timing parameters for the new track window.
        config: TrackConfig,
    },
    /// Starts the run, arming the collapse sweep behind the player.
    StartRun,
    /// Advances the simulation clock by one fixed step.
    Tick,
    /// Reports that the external player controller landed on a tile.
    PlayerMoved {
        /// Tile the player now occupies.
        location: TileLocation,
    },
    /// Ends the run with the provided cause.
    EndRun {
        /// Terminal classification reported to collaborators.
        cause: CauseOfGameOver,
    },
    /// Rebuilds the oldest track buffer from generator-supplied row plans.
    RecycleTrack {
        /// One plan per row of the track, ordered front to back.
        plans: Vec<RowPlan>,
    },
    /// Collapses every tile in the addressed row.
    CollapseRow {
        /// Absolute row index targeted by the collapse sweep.
        row: u64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Requests that the generation system plan rows for a track buffer.
    TrackRecycleNeeded {
        /// Ordinal of the track that needs a fresh set of row plans.
        ordinal: u64,
    },
    /// Confirms that a track buffer was rebuilt with new rows.
    TrackRecycled {
        /// Ordinal of the track the buffer now holds.
        ordinal: u64,
        /// First absolute row covered by the rebuilt buffer.
        first_row: u64,
        /// Last absolute row covered by the rebuilt buffer.
        last_row: u64,
    },
    /// Announces that the run went live.
    RunStarted,
    /// Announces that the run ended.
    RunEnded {
        /// Terminal classification of the run.
        cause: CauseOfGameOver,
    },
    /// Confirms that the player landed on a tile.
    PlayerAdvanced {
        /// Tile the player now occupies.
        location: TileLocation,
        /// Kind of the tile the player landed on.
        kind: TileKind,
    },
    /// Confirms that a row of tiles collapsed.
    RowCollapsed {
        /// Absolute row index that collapsed.
        row: u64,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Tick index after the advance.
        tick: u64,
    },
    /// Publishes a refreshed scoring report.
    StatsUpdated {
        /// Snapshot of the run statistics after the latest fold.
        report: StatsReport,
    },
}

/// Closed set of tile variants that can occupy a track slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain walkable tile.
    Floor,
    /// Border tile that blocks movement and never changes type.
    Wall,
    /// Missing tile; stepping onto it ends the run.
    Hole,
    /// Ground-mounted spike hazard.
    FloorSpikes,
    /// Overhead spike hazard.
    SkySpikes,
}

impl TileKind {
    /// Reports whether the player may land on this tile.
    ///
    /// Holes accept the step; the lethal outcome is classified from the
    /// landing event rather than by blocking the move.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Reports whether the tile is a spike hazard.
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::FloorSpikes | Self::SkySpikes)
    }
}

/// Terminal classifications for a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseOfGameOver {
    /// The player stepped onto a hole and fell through the track.
    FellInHole,
    /// The collapse sweep reached the row the player was standing on.
    CollapsedUnderfoot,
    /// An external collaborator reported a spike strike.
    SpikeHazard,
}

/// Unique identifier assigned to a pooled tile instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile expressed as column and absolute row.
///
/// Columns are bounded by the track width; rows grow without bound as the
/// player advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileLocation {
    column: u32,
    row: u64,
}

impl TileLocation {
    /// Creates a new tile location.
    #[must_use]
    pub const fn new(column: u32, row: u64) -> Self {
        Self { column, row }
    }

    /// Zero-based column index within the row.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Absolute row index along the track.
    #[must_use]
    pub const fn row(&self) -> u64 {
        self.row
    }

    /// Parity of the row this location sits on.
    #[must_use]
    pub const fn parity(&self) -> RowParity {
        RowParity::of(self.row)
    }

    /// Destination of a diagonal step toward the upper left, if the track
    /// geometry permits one.
    ///
    /// Steps that would land on a border wall or off the row edge yield
    /// `None`.
    #[must_use]
    pub const fn step_up_left(&self, row_width: u32) -> Option<TileLocation> {
        match self.parity() {
            RowParity::Full => {
                if self.column == 0 || self.column >= row_width {
                    None
                } else {
                    Some(TileLocation::new(self.column - 1, self.row + 1))
                }
            }
            RowParity::Staggered => {
                if self.column == 0 || self.column + 1 >= row_width {
                    None
                } else {
                    Some(TileLocation::new(self.column, self.row + 1))
                }
            }
        }
    }

    /// Destination of a diagonal step toward the upper right, if the track
    /// geometry permits one.
    ///
    /// Steps that would land on a border wall or off the row edge yield
    /// `None`.
    #[must_use]
    pub const fn step_up_right(&self, row_width: u32) -> Option<TileLocation> {
        match self.parity() {
            RowParity::Full => {
                if self.column + 1 >= row_width {
                    None
                } else {
                    Some(TileLocation::new(self.column, self.row + 1))
                }
            }
            RowParity::Staggered => {
                if self.column + 2 >= row_width {
                    None
                } else {
                    Some(TileLocation::new(self.column + 1, self.row + 1))
                }
            }
        }
    }
}

/// Alternating layout of track rows.
///
/// Even absolute rows span the full track width and carry walls in both
/// border columns; odd rows sit offset by half a tile and are one tile
/// narrower, with no walls at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowParity {
    /// Full-width row with a wall at each border column.
    Full,
    /// Offset row one tile narrower than the full width.
    Staggered,
}

impl RowParity {
    /// Parity of the provided absolute row index.
    #[must_use]
    pub const fn of(row: u64) -> Self {
        if row % 2 == 0 {
            Self::Full
        } else {
            Self::Staggered
        }
    }

    /// Number of tiles a row of this parity holds for the given full width.
    #[must_use]
    pub const fn width(self, row_width: u32) -> u32 {
        match self {
            Self::Full => row_width,
            Self::Staggered => row_width.saturating_sub(1),
        }
    }
}

/// Presentation color carried by every tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl TileColor {
    /// Creates a fully opaque color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: u8::MAX,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Returns the color with its brightness corrected by `factor`.
    ///
    /// Negative factors scale the channels toward black, positive factors
    /// blend them toward white, and the alpha channel passes through
    /// untouched. Factors are clamped to `[-1.0, 1.0]`.
    #[must_use]
    pub fn shade(&self, factor: f32) -> Self {
        let factor = factor.clamp(-1.0, 1.0);
        let correct = |channel: u8| -> u8 {
            let value = f32::from(channel);
            let corrected = if factor < 0.0 {
                value * (1.0 + factor)
            } else {
                (255.0 - value) * factor + value
            };
            corrected.round() as u8
        };
        Self {
            red: correct(self.red),
            green: correct(self.green),
            blue: correct(self.blue),
            alpha: self.alpha,
        }
    }
}

/// Geometry, theme, and timing parameters of the track window.
///
/// The defaults reproduce the classic layout: two buffers of thirty rows,
/// seven tiles across, a white theme, and a one second stabilize delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackConfig {
    /// Number of rows held by each track buffer. Must be even and at least
    /// two so every buffer starts on a full-width row boundary.
    pub track_length: u32,
    /// Number of track buffers cycled through the window. Must be at least
    /// two so one buffer can be rebuilt while the player crosses another.
    pub track_count: u32,
    /// Tile count of a full-width row, border walls included. Must be at
    /// least three to leave interior tiles between the walls.
    pub row_width: u32,
    /// Absolute row the player spawns on after a reconfiguration.
    pub spawn_row: u64,
    /// Base color applied to full-width rows; derived shades cover walls,
    /// staggered rows, and the player trace.
    pub theme: TileColor,
    /// Ticks a collapsed tile keeps falling before it re-stabilizes.
    pub stabilize_delay_ticks: u64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            track_length: 30,
            track_count: 2,
            row_width: 7,
            spawn_row: 5,
            theme: TileColor::from_rgb(u8::MAX, u8::MAX, u8::MAX),
            stabilize_delay_ticks: u64::from(TICKS_PER_SECOND),
        }
    }
}

/// Generator output for a single track row.
///
/// Plans carry the complete width of their row's parity; full-width rows
/// hold `Wall` in both border slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPlan {
    kinds: Vec<TileKind>,
}

impl RowPlan {
    /// Creates a row plan from the provided tile kinds.
    #[must_use]
    pub fn new(kinds: Vec<TileKind>) -> Self {
        Self { kinds }
    }

    /// Tile kinds of the row, ordered left to right.
    #[must_use]
    pub fn kinds(&self) -> &[TileKind] {
        &self.kinds
    }
}

/// Angular velocity applied to a tile while it falls away from the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallSpin {
    x: f32,
    y: f32,
    z: f32,
}

impl FallSpin {
    /// Creates a new angular velocity from its axis components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Angular velocity around the x axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Angular velocity around the y axis.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Angular velocity around the z axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }
}

/// Immutable representation of a single tile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Identifier of the pooled instance backing the tile.
    pub id: TileId,
    /// Kind currently occupying the track slot.
    pub kind: TileKind,
    /// Location of the tile on the track.
    pub location: TileLocation,
    /// Live presentation color of the tile.
    pub color: TileColor,
    /// Whether the player may land on the tile.
    pub passable: bool,
    /// Whether the collapse sweep already consumed the tile.
    pub collapsed: bool,
    /// Whether the tile is currently shown.
    pub visible: bool,
    /// Whether a spike sweep animation is currently playing.
    pub animating: bool,
    /// Spin applied by an ongoing collapse animation, if any.
    pub fall: Option<FallSpin>,
}

/// Read-only snapshot of the track state handed to systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackView {
    player: TileLocation,
    phase: RunPhase,
    track_length: u32,
    track_count: u32,
    row_width: u32,
}

impl TrackView {
    /// Captures a new view over the provided track state.
    #[must_use]
    pub const fn new(
        player: TileLocation,
        phase: RunPhase,
        track_length: u32,
        track_count: u32,
        row_width: u32,
    ) -> Self {
        Self {
            player,
            phase,
            track_length,
            track_count,
            row_width,
        }
    }

    /// Tile the player currently occupies.
    #[must_use]
    pub const fn player(&self) -> TileLocation {
        self.player
    }

    /// Lifecycle phase of the current run.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Number of rows held by each track buffer.
    #[must_use]
    pub const fn track_length(&self) -> u32 {
        self.track_length
    }

    /// Number of track buffers in the window.
    #[must_use]
    pub const fn track_count(&self) -> u32 {
        self.track_count
    }

    /// Tile count of a full-width row.
    #[must_use]
    pub const fn row_width(&self) -> u32 {
        self.row_width
    }

    /// Ordinal of the track that covers the provided absolute row.
    #[must_use]
    pub const fn ordinal_of(&self, row: u64) -> u64 {
        row / self.track_length as u64
    }

    /// Offset of the provided absolute row within its track.
    #[must_use]
    pub const fn row_in_track(&self, row: u64) -> u32 {
        (row % self.track_length as u64) as u32
    }

    /// Number of tiles the row at the provided index holds.
    #[must_use]
    pub const fn width_of_row(&self, row: u64) -> u32 {
        RowParity::of(row).width(self.row_width)
    }

    /// Row offset within a fresh track at which the refill check fires.
    #[must_use]
    pub const fn refill_offset(&self) -> u32 {
        self.track_length / 3
    }
}

/// Accumulated scoring figures for the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Highest absolute row the player has reached.
    pub max_distance: u64,
    /// Number of rows consumed by the collapse sweep.
    pub rows_collapsed: u64,
    /// Number of track buffers rebuilt since configuration.
    pub tracks_recycled: u64,
    /// Number of spike tiles the player has landed on.
    pub hazard_contacts: u64,
}

/// Reasons a track lookup may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum TrackError {
    /// The requested column does not exist on the addressed row.
    #[error("column {column} is out of range for row {row}")]
    ColumnOutOfRange {
        /// Column index that failed the width check.
        column: u32,
        /// Absolute row index the lookup addressed.
        row: u64,
    },
    /// The requested row is not held by any track buffer.
    #[error("row {row} is not resident in any track buffer")]
    RowNotResident {
        /// Absolute row index the lookup addressed.
        row: u64,
    },
}
