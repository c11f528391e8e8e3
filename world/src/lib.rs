#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative track state management for Box Dash.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use box_dash_core::{
    Command, Event, FallSpin, RowParity, RowPlan, RunPhase, TileId, TileKind, TileLocation,
    TrackConfig, WELCOME_BANNER,
};

use crate::pool::TilePool;
use crate::track::TrackStore;

mod pool;
mod tile;
mod track;

const FALL_IMPULSE_SEED: u64 = 0x6c07_8965_2f4a_91b3;

const WALL_SHADE: f32 = -0.3;
const STAGGERED_ROW_SHADE: f32 = -0.2;
const FULL_TRACE_SHADE: f32 = -0.45;
const STAGGERED_TRACE_SHADE: f32 = -0.35;

/// Represents the authoritative Box Dash world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: TrackConfig,
    store: TrackStore,
    pool: TilePool,
    player: TileLocation,
    phase: RunPhase,
    tick_index: u64,
    fall_rng: u64,
    stabilize: StabilizeQueue,
}

impl World {
    /// Creates a new Box Dash world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let config = TrackConfig::default();
        Self {
            banner: WELCOME_BANNER,
            store: TrackStore::new(config.track_length, config.track_count, config.row_width),
            pool: build_pool(&config),
            player: spawn_location_for(&config),
            phase: RunPhase::Idle,
            tick_index: 0,
            fall_rng: FALL_IMPULSE_SEED,
            stabilize: StabilizeQueue::new(),
            config,
        }
    }

    fn configure(&mut self, config: TrackConfig, out_events: &mut Vec<Event>) {
        assert!(
            config.track_count >= 2,
            "track window needs at least two buffers"
        );
        assert!(
            config.track_length >= 2 && config.track_length % 2 == 0,
            "track length must be even so every buffer starts on a full row"
        );
        assert!(
            config.row_width >= 3,
            "rows need interior tiles between the border walls"
        );
        let resident_rows = u64::from(config.track_length) * u64::from(config.track_count);
        assert!(
            config.spawn_row < resident_rows,
            "spawn row must land inside the initial track window"
        );

        self.config = config;
        self.store = TrackStore::new(config.track_length, config.track_count, config.row_width);
        self.pool = build_pool(&config);
        self.stabilize.clear();
        self.fall_rng = FALL_IMPULSE_SEED;
        self.phase = RunPhase::Idle;
        self.player = spawn_location_for(&config);

        for ordinal in 0..u64::from(config.track_count) {
            out_events.push(Event::TrackRecycleNeeded { ordinal });
        }
    }

    fn player_moved(&mut self, location: TileLocation, out_events: &mut Vec<Event>) {
        let id = match self.store.tile_at(location) {
            Ok(id) => id,
            Err(error) => panic!("player landed outside the resident window: {error}"),
        };
        debug_assert!(
            location.row() >= self.player.row(),
            "player only advances forward"
        );

        let trace = match location.parity() {
            RowParity::Full => self.config.theme.shade(FULL_TRACE_SHADE),
            RowParity::Staggered => self.config.theme.shade(STAGGERED_TRACE_SHADE),
        };
        let tile = self.pool.get_mut(id);
        assert!(tile.kind.is_passable(), "player may never land on a wall");
        debug_assert!(tile.active, "resident rows only hold active tiles");

        let kind = tile.kind;
        if kind != TileKind::Hole {
            tile.apply_trace(trace);
        }
        self.player = location;
        out_events.push(Event::PlayerAdvanced { location, kind });
    }

    fn recycle_track(&mut self, plans: &[RowPlan], out_events: &mut Vec<Event>) {
        assert_eq!(
            plans.len(),
            self.config.track_length as usize,
            "track plan must cover every row of the buffer"
        );

        let (slot, ordinal) = self.store.begin_recycle();
        for row_ids in self.store.slot_rows(slot) {
            for id in row_ids {
                self.pool.get_mut(*id).deactivate();
            }
        }
        self.store.clear_residency(slot);

        let first_row = ordinal * u64::from(self.config.track_length);
        for (offset, plan) in plans.iter().enumerate() {
            let row = first_row + offset as u64;
            let tiles = self.build_row(row, plan);
            self.store.set_row(slot, offset as u32, tiles);
        }
        self.store.commit_recycle(slot, ordinal);

        out_events.push(Event::TrackRecycled {
            ordinal,
            first_row,
            last_row: first_row + u64::from(self.config.track_length) - 1,
        });
    }

    fn build_row(&mut self, row: u64, plan: &RowPlan) -> Vec<TileId> {
        let width = self.store.width_of(row) as usize;
        assert_eq!(
            plan.kinds().len(),
            width,
            "row plan width must match the row parity"
        );

        let parity = RowParity::of(row);
        let base = match parity {
            RowParity::Full => self.config.theme,
            RowParity::Staggered => self.config.theme.shade(STAGGERED_ROW_SHADE),
        };
        let wall_color = self.config.theme.shade(WALL_SHADE);

        let mut tiles = Vec::with_capacity(width);
        for (column, planned) in plan.kinds().iter().copied().enumerate() {
            let border = parity == RowParity::Full && (column == 0 || column + 1 == width);
            debug_assert_eq!(
                border,
                planned == TileKind::Wall,
                "walls occupy exactly the border slots of full rows"
            );
            let kind = if border { TileKind::Wall } else { planned };
            let id = self.pool.reuse(kind);
            let color = if kind == TileKind::Wall { wall_color } else { base };
            self.pool
                .get_mut(id)
                .init(TileLocation::new(column as u32, row), color);
            tiles.push(id);
        }
        tiles
    }

    fn collapse_row(&mut self, row: u64, out_events: &mut Vec<Event>) {
        let ids = match self.store.row_tiles(row) {
            Ok(ids) => ids.to_vec(),
            Err(error) => panic!("collapse sweep addressed an unavailable row: {error}"),
        };

        let due = self.tick_index.saturating_add(self.config.stabilize_delay_ticks);
        for id in ids {
            let spin = self.next_fall_spin();
            let tile = self.pool.get_mut(id);
            if tile.collapse(spin) {
                let epoch = tile.epoch;
                self.stabilize.schedule(due, id, epoch);
            }
        }

        if self.player.row() == row {
            if let Ok(id) = self.store.tile_at(self.player) {
                self.pool.get_mut(id).hide();
            }
        }

        out_events.push(Event::RowCollapsed { row });
    }

    fn process_stabilize_queue(&mut self) {
        while let Some(entry) = self.stabilize.pop_due(self.tick_index) {
            let tile = self.pool.get_mut(entry.tile);
            if tile.epoch == entry.epoch {
                tile.stabilize();
            }
        }
    }

    fn next_fall_spin(&mut self) -> FallSpin {
        self.fall_rng = next_random(self.fall_rng);
        let x = unit_from(self.fall_rng);
        self.fall_rng = next_random(self.fall_rng);
        let y = unit_from(self.fall_rng);
        self.fall_rng = next_random(self.fall_rng);
        let z = unit_from(self.fall_rng);
        self.fall_rng = next_random(self.fall_rng);
        let magnitude = (1 + self.fall_rng % 9) as f32;
        FallSpin::new(x * magnitude, y * magnitude, z * magnitude)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// # Panics
///
/// Panics when a command breaks the track contract: a configuration with
/// degenerate dimensions, a recycle plan that does not cover the buffer, a
/// player move onto a wall or a non-resident row, or a collapse aimed
/// outside the resident window. These are wiring bugs in the caller, not
/// recoverable runtime conditions.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTrack { config } => {
            world.configure(config, out_events);
        }
        Command::StartRun => {
            if world.phase == RunPhase::Idle {
                world.phase = RunPhase::Running;
                out_events.push(Event::RunStarted);
            }
        }
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.process_stabilize_queue();
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::PlayerMoved { location } => {
            if world.phase != RunPhase::Over {
                world.player_moved(location, out_events);
            }
        }
        Command::EndRun { cause } => {
            if world.phase != RunPhase::Over {
                world.phase = RunPhase::Over;
                out_events.push(Event::RunEnded { cause });
            }
        }
        Command::RecycleTrack { plans } => {
            if world.phase != RunPhase::Over {
                world.recycle_track(&plans, out_events);
            }
        }
        Command::CollapseRow { row } => {
            if world.phase == RunPhase::Running {
                world.collapse_row(row, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use box_dash_core::{
        RunPhase, TileLocation, TileSnapshot, TrackConfig, TrackError, TrackView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Resolves the tile occupying the provided location.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackError`] when the row is not resident in the track
    /// window or the column is out of range for the row's parity.
    pub fn tile(world: &World, location: TileLocation) -> Result<TileSnapshot, TrackError> {
        let id = world.store.tile_at(location)?;
        let tile = world.pool.get(id);
        Ok(TileSnapshot {
            id: tile.id,
            kind: tile.kind,
            location: tile.location,
            color: tile.color,
            passable: tile.kind.is_passable(),
            collapsed: tile.collapsed,
            visible: tile.visible,
            animating: tile.animating,
            fall: tile.fall,
        })
    }

    /// Captures the track snapshot handed to systems each frame.
    #[must_use]
    pub fn track_view(world: &World) -> TrackView {
        TrackView::new(
            world.player,
            world.phase,
            world.config.track_length,
            world.config.track_count,
            world.config.row_width,
        )
    }

    /// Tile the player currently occupies.
    #[must_use]
    pub fn player(world: &World) -> TileLocation {
        world.player
    }

    /// Lifecycle phase of the current run.
    #[must_use]
    pub fn run_phase(world: &World) -> RunPhase {
        world.phase
    }

    /// Tick index of the simulation clock.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick_index
    }

    /// Active track configuration.
    #[must_use]
    pub fn track_config(world: &World) -> TrackConfig {
        world.config
    }

    /// Location the player respawns at after a reconfiguration.
    #[must_use]
    pub fn spawn_location(world: &World) -> TileLocation {
        super::spawn_location_for(&world.config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct StabilizeEntry {
    due_tick: u64,
    tile: TileId,
    epoch: u32,
}

/// Delay queue that re-stabilizes collapsed tiles one delay after the fall.
///
/// Entries carry the tile's reuse epoch so an entry queued before a recycle
/// can never hide the fresh tile that took over the instance.
#[derive(Debug, Default)]
struct StabilizeQueue {
    entries: BinaryHeap<Reverse<StabilizeEntry>>,
}

impl StabilizeQueue {
    fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn schedule(&mut self, due_tick: u64, tile: TileId, epoch: u32) {
        self.entries.push(Reverse(StabilizeEntry {
            due_tick,
            tile,
            epoch,
        }));
    }

    fn pop_due(&mut self, now: u64) -> Option<StabilizeEntry> {
        match self.entries.peek() {
            Some(Reverse(entry)) if entry.due_tick <= now => {
                self.entries.pop().map(|Reverse(entry)| entry)
            }
            _ => None,
        }
    }
}

fn build_pool(config: &TrackConfig) -> TilePool {
    let full_rows = u64::from(config.track_length / 2);
    let staggered_rows = u64::from(config.track_length / 2);
    let tracks = u64::from(config.track_count);

    let interior_per_track = full_rows * u64::from(config.row_width - 2)
        + staggered_rows * u64::from(config.row_width - 1);
    let interior = u32::try_from(interior_per_track * tracks).unwrap_or(u32::MAX);
    let walls = u32::try_from(full_rows * 2 * tracks).unwrap_or(u32::MAX);

    let mut pool = TilePool::new();
    pool.register(TileKind::Floor, interior);
    pool.register(TileKind::Wall, walls);
    pool.register(TileKind::Hole, interior);
    pool.register(TileKind::FloorSpikes, interior);
    pool.register(TileKind::SkySpikes, interior);
    pool
}

fn spawn_location_for(config: &TrackConfig) -> TileLocation {
    let parity = RowParity::of(config.spawn_row);
    let width = parity.width(config.row_width);
    let column = config.row_width / 2;
    let column = match parity {
        RowParity::Full => column.clamp(1, width - 2),
        RowParity::Staggered => column.min(width - 1),
    };
    TileLocation::new(column, config.spawn_row)
}

fn next_random(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1)
}

fn unit_from(state: u64) -> f32 {
    const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
    (((state >> 11) as f64) * SCALE) as f32
}
