#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic track generation for the endless zig-zag strip.
//!
//! The system owns two pieces of run state the world never sees: the hazard
//! probability ladder that climbs as the player survives tracks, and the
//! safe-path cursor that drifts one legal diagonal step per row so every
//! generated row keeps at least one plain floor tile reachable from the row
//! below. It consumes buffer-fill requests and player landings, and answers
//! with [`Command::RecycleTrack`] plans or a terminal [`Command::EndRun`]
//! when the player drops into a hole.

use box_dash_core::{
    CauseOfGameOver, Command, Event, RowParity, RowPlan, TileKind, TileLocation, TrackView,
    RNG_STREAM_SAFE_PATH, RNG_STREAM_TILE_ROLLS,
};
use sha2::{Digest, Sha256};

/// Climb parameters for one hazard probability tier, in whole percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierRamp {
    initial: u32,
    step: u32,
    cap: u32,
}

impl TierRamp {
    /// Creates a ramp that starts at `initial` percent and climbs by `step`
    /// percent per difficulty raise until it reaches `cap`.
    ///
    /// # Panics
    ///
    /// Panics when `initial` exceeds `cap` or `cap` exceeds 100.
    #[must_use]
    pub fn new(initial: u32, step: u32, cap: u32) -> Self {
        assert!(initial <= cap, "tier must start at or below its cap");
        assert!(cap <= 100, "tier caps are percentages");
        Self { initial, step, cap }
    }

    /// Percent chance the tier starts the run at.
    #[must_use]
    pub const fn initial(&self) -> u32 {
        self.initial
    }

    /// Percent added to the chance on each difficulty raise.
    #[must_use]
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Percent chance the tier never climbs past.
    #[must_use]
    pub const fn cap(&self) -> u32 {
        self.cap
    }
}

/// Stacked probability bands for the three hazard kinds.
///
/// The bands partition the roll space `[0, 100)`. Holes claim low rolls,
/// floor spikes claim rolls above the hole cap, and sky spikes claim rolls
/// above the floor-spike cap. Because every band starts where the band
/// below it tops out, a hazard kind only appears once each cheaper kind has
/// finished climbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardTiers {
    hole: TierRamp,
    floor_spikes: TierRamp,
    sky_spikes: TierRamp,
}

impl HazardTiers {
    /// Stacks the three ramps into one band layout.
    ///
    /// # Panics
    ///
    /// Panics when a ramp does not start at or above the cap of the ramp
    /// below it, which would let two bands claim the same rolls.
    #[must_use]
    pub fn new(hole: TierRamp, floor_spikes: TierRamp, sky_spikes: TierRamp) -> Self {
        assert!(
            floor_spikes.initial() >= hole.cap(),
            "floor-spike band must start above the hole cap"
        );
        assert!(
            sky_spikes.initial() >= floor_spikes.cap(),
            "sky-spike band must start above the floor-spike cap"
        );
        Self {
            hole,
            floor_spikes,
            sky_spikes,
        }
    }

    /// Ramp governing hole tiles.
    #[must_use]
    pub const fn hole(&self) -> TierRamp {
        self.hole
    }

    /// Ramp governing floor-spike tiles.
    #[must_use]
    pub const fn floor_spikes(&self) -> TierRamp {
        self.floor_spikes
    }

    /// Ramp governing sky-spike tiles.
    #[must_use]
    pub const fn sky_spikes(&self) -> TierRamp {
        self.sky_spikes
    }
}

impl Default for HazardTiers {
    fn default() -> Self {
        Self::new(
            TierRamp::new(10, 5, 30),
            TierRamp::new(30, 5, 55),
            TierRamp::new(55, 5, 75),
        )
    }
}

/// Configuration parameters required to construct the generation system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    tiers: HazardTiers,
}

impl Config {
    /// Creates a configuration from a run seed and a band layout.
    #[must_use]
    pub const fn new(rng_seed: u64, tiers: HazardTiers) -> Self {
        Self { rng_seed, tiers }
    }
}

/// Live percent chance of each hazard tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HazardLadder {
    hole: u32,
    floor_spikes: u32,
    sky_spikes: u32,
}

impl HazardLadder {
    fn starting_at(tiers: &HazardTiers) -> Self {
        Self {
            hole: tiers.hole().initial(),
            floor_spikes: tiers.floor_spikes().initial(),
            sky_spikes: tiers.sky_spikes().initial(),
        }
    }

    /// Climbs the cheapest tier that still has room. Upper tiers hold their
    /// starting chance until every tier below them is capped.
    fn raise(&mut self, tiers: &HazardTiers) {
        if self.hole < tiers.hole().cap() {
            self.hole = (self.hole + tiers.hole().step()).min(tiers.hole().cap());
        } else if self.floor_spikes < tiers.floor_spikes().cap() {
            self.floor_spikes =
                (self.floor_spikes + tiers.floor_spikes().step()).min(tiers.floor_spikes().cap());
        } else if self.sky_spikes < tiers.sky_spikes().cap() {
            self.sky_spikes =
                (self.sky_spikes + tiers.sky_spikes().step()).min(tiers.sky_spikes().cap());
        }
    }
}

/// Maps one uniform roll in `[0, 100)` onto the stacked hazard bands.
///
/// A roll that lands outside every live band, including the dead zone at a
/// band edge, degrades to plain floor; row planning cannot fail.
fn kind_for_roll(roll: u32, ladder: &HazardLadder, tiers: &HazardTiers) -> TileKind {
    if ladder.sky_spikes > roll && roll > tiers.floor_spikes().cap() {
        TileKind::SkySpikes
    } else if ladder.floor_spikes > roll && roll > tiers.hole().cap() {
        TileKind::FloorSpikes
    } else if ladder.hole > roll {
        TileKind::Hole
    } else {
        TileKind::Floor
    }
}

/// Pure system that plans track contents and classifies lethal landings.
#[derive(Debug)]
pub struct Generation {
    rng_seed: u64,
    tiers: HazardTiers,
    tile_rolls: SplitMix64,
    safe_coins: SplitMix64,
    ladder: HazardLadder,
    safe_column: u32,
    next_track: u64,
}

impl Generation {
    /// Creates a generation system for the provided configuration.
    ///
    /// Stream state is derived immediately so the instance is usable, and
    /// re-derived from scratch whenever the world requests a fill for track
    /// zero, which only happens on reconfiguration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let Config { rng_seed, tiers } = config;
        Self {
            rng_seed,
            tiers,
            tile_rolls: SplitMix64::new(derive_labeled_seed(rng_seed, RNG_STREAM_TILE_ROLLS)),
            safe_coins: SplitMix64::new(derive_labeled_seed(rng_seed, RNG_STREAM_SAFE_PATH)),
            ladder: HazardLadder::starting_at(&tiers),
            safe_column: 0,
            next_track: 0,
        }
    }

    /// Consumes world events and the current track view, emitting commands.
    ///
    /// Buffer-fill requests are answered in track order with fully planned
    /// row layouts. Player landings either end the run, when the landing
    /// tile is a hole, or rebuild the oldest buffer once the player is a
    /// third of the way into the newest track.
    pub fn handle(&mut self, events: &[Event], view: &TrackView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TrackRecycleNeeded { ordinal } => {
                    if *ordinal == 0 {
                        self.reset(view);
                    }
                    debug_assert_eq!(
                        *ordinal,
                        self.next_track,
                        "buffer fills must be requested in track order"
                    );
                    let plans = self.plan_track(*ordinal, view);
                    out.push(Command::RecycleTrack { plans });
                }
                Event::PlayerAdvanced { location, kind } => {
                    if *kind == TileKind::Hole {
                        out.push(Command::EndRun {
                            cause: CauseOfGameOver::FellInHole,
                        });
                    } else {
                        self.refill_after_landing(*location, view, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn reset(&mut self, view: &TrackView) {
        self.tile_rolls =
            SplitMix64::new(derive_labeled_seed(self.rng_seed, RNG_STREAM_TILE_ROLLS));
        self.safe_coins = SplitMix64::new(derive_labeled_seed(self.rng_seed, RNG_STREAM_SAFE_PATH));
        self.ladder = HazardLadder::starting_at(&self.tiers);
        self.safe_column = view.row_width() / 2;
        self.next_track = 0;
    }

    fn refill_after_landing(
        &mut self,
        location: TileLocation,
        view: &TrackView,
        out: &mut Vec<Command>,
    ) {
        let ordinal = view.ordinal_of(location.row());
        let consumed = view.row_in_track(location.row());
        if ordinal + 1 == self.next_track && consumed == view.refill_offset() {
            self.ladder.raise(&self.tiers);
            let plans = self.plan_track(self.next_track, view);
            out.push(Command::RecycleTrack { plans });
        }
    }

    fn plan_track(&mut self, ordinal: u64, view: &TrackView) -> Vec<RowPlan> {
        let first_row = ordinal * u64::from(view.track_length());
        // Track zero is the hazard-free runway the player spawns on.
        let warm_up = ordinal == 0;
        let mut plans = Vec::with_capacity(view.track_length() as usize);
        for offset in 0..view.track_length() {
            let row = first_row + u64::from(offset);
            plans.push(self.plan_row(row, view.row_width(), warm_up));
            self.advance_safe_column(row, view.row_width());
        }
        self.next_track = ordinal + 1;
        plans
    }

    fn plan_row(&mut self, row: u64, row_width: u32, warm_up: bool) -> RowPlan {
        let parity = RowParity::of(row);
        let width = parity.width(row_width);
        let mut kinds = Vec::with_capacity(width as usize);
        for column in 0..width {
            let border = parity == RowParity::Full && (column == 0 || column + 1 == width);
            let kind = if border {
                TileKind::Wall
            } else if warm_up || column == self.safe_column {
                // The safe column never consumes a roll, so hazard layouts
                // replay identically no matter where the corridor drifts.
                TileKind::Floor
            } else {
                let roll = sample_uniform_inclusive(&mut self.tile_rolls, 0, 99);
                kind_for_roll(roll, &self.ladder, &self.tiers)
            };
            kinds.push(kind);
        }
        RowPlan::new(kinds)
    }

    /// Drifts the corridor one legal diagonal step, reflecting away from a
    /// border instead of stepping into it. Exactly one coin is consumed per
    /// row so the corridor replays identically for a given seed.
    fn advance_safe_column(&mut self, row: u64, row_width: u32) {
        let here = TileLocation::new(self.safe_column, row);
        let heads = self.safe_coins.next_u64() & 1 == 0;
        let target = if heads {
            here.step_up_left(row_width)
                .or_else(|| here.step_up_right(row_width))
        } else {
            here.step_up_right(row_width)
                .or_else(|| here.step_up_left(row_width))
        };
        let next = target.expect("corridor always has a legal diagonal step");
        self.safe_column = next.column();
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

fn sample_uniform_inclusive(rng: &mut SplitMix64, min: u32, max: u32) -> u32 {
    if min == max {
        return min;
    }

    let range = u64::from(max.saturating_sub(min)) + 1;
    let value = rng.next_u64();
    let offset = value % range;
    min.saturating_add(offset as u32)
}

#[derive(Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use box_dash_core::RunPhase;

    fn running_view(track_length: u32, row_width: u32, player_row: u64) -> TrackView {
        TrackView::new(
            TileLocation::new(row_width / 2, player_row),
            RunPhase::Running,
            track_length,
            2,
            row_width,
        )
    }

    fn lethal_tiers() -> HazardTiers {
        HazardTiers::new(
            TierRamp::new(100, 0, 100),
            TierRamp::new(100, 0, 100),
            TierRamp::new(100, 0, 100),
        )
    }

    fn floor_only_tiers() -> HazardTiers {
        HazardTiers::new(
            TierRamp::new(0, 0, 0),
            TierRamp::new(0, 0, 0),
            TierRamp::new(0, 0, 0),
        )
    }

    fn bootstrap(generation: &mut Generation, view: &TrackView) -> Vec<Command> {
        let events = vec![
            Event::TrackRecycleNeeded { ordinal: 0 },
            Event::TrackRecycleNeeded { ordinal: 1 },
        ];
        let mut out = Vec::new();
        generation.handle(&events, view, &mut out);
        out
    }

    #[test]
    fn ladder_climbs_tiers_in_strict_order() {
        let tiers = HazardTiers::default();
        let mut ladder = HazardLadder::starting_at(&tiers);
        assert_eq!(ladder.hole, 10);
        assert_eq!(ladder.floor_spikes, 30);
        assert_eq!(ladder.sky_spikes, 55);

        for expected in [15, 20, 25, 30] {
            ladder.raise(&tiers);
            assert_eq!(ladder.hole, expected, "hole tier climbs first");
            assert_eq!(ladder.floor_spikes, 30, "upper tiers wait for the hole cap");
            assert_eq!(ladder.sky_spikes, 55);
        }

        for expected in [35, 40, 45, 50, 55] {
            ladder.raise(&tiers);
            assert_eq!(ladder.hole, 30, "capped tiers hold their value");
            assert_eq!(ladder.floor_spikes, expected);
            assert_eq!(ladder.sky_spikes, 55);
        }

        for expected in [60, 65, 70, 75] {
            ladder.raise(&tiers);
            assert_eq!(ladder.floor_spikes, 55);
            assert_eq!(ladder.sky_spikes, expected);
        }

        ladder.raise(&tiers);
        assert_eq!(
            ladder,
            HazardLadder {
                hole: 30,
                floor_spikes: 55,
                sky_spikes: 75
            },
            "a fully capped ladder is stable under further raises"
        );
    }

    #[test]
    fn raise_clamps_to_the_cap_on_an_uneven_step() {
        let tiers = HazardTiers::new(
            TierRamp::new(10, 7, 30),
            TierRamp::new(30, 5, 55),
            TierRamp::new(55, 5, 75),
        );
        let mut ladder = HazardLadder::starting_at(&tiers);
        for _ in 0..3 {
            ladder.raise(&tiers);
        }
        assert_eq!(ladder.hole, 30, "overshooting raises clamp to the cap");
        assert_eq!(ladder.floor_spikes, 30);
    }

    #[test]
    fn bands_stay_shut_until_lower_tiers_cap() {
        let tiers = HazardTiers::default();
        let mut ladder = HazardLadder::starting_at(&tiers);
        ladder.raise(&tiers);

        for roll in 0..100 {
            let kind = kind_for_roll(roll, &ladder, &tiers);
            if roll < 15 {
                assert_eq!(kind, TileKind::Hole, "roll {roll}");
            } else {
                assert_eq!(kind, TileKind::Floor, "roll {roll}");
            }
        }
    }

    #[test]
    fn bands_partition_the_roll_space_when_fully_raised() {
        let tiers = HazardTiers::default();
        let mut ladder = HazardLadder::starting_at(&tiers);
        for _ in 0..13 {
            ladder.raise(&tiers);
        }

        for roll in 0..100 {
            let kind = kind_for_roll(roll, &ladder, &tiers);
            let expected = if roll < 30 {
                TileKind::Hole
            } else if roll > 30 && roll < 55 {
                TileKind::FloorSpikes
            } else if roll > 55 && roll < 75 {
                TileKind::SkySpikes
            } else {
                // Band edges are dead zones under strict comparison and
                // always degrade to floor, as do rolls past the top cap.
                TileKind::Floor
            };
            assert_eq!(kind, expected, "roll {roll}");
        }
    }

    #[test]
    fn partially_raised_bands_leave_upper_rolls_on_floor() {
        let tiers = HazardTiers::default();
        let mut ladder = HazardLadder::starting_at(&tiers);
        for _ in 0..6 {
            ladder.raise(&tiers);
        }
        assert_eq!(ladder.floor_spikes, 40);

        for roll in 0..100 {
            let kind = kind_for_roll(roll, &ladder, &tiers);
            let expected = if roll < 30 {
                TileKind::Hole
            } else if roll > 30 && roll < 40 {
                TileKind::FloorSpikes
            } else {
                TileKind::Floor
            };
            assert_eq!(kind, expected, "roll {roll}");
        }
    }

    #[test]
    #[should_panic(expected = "floor-spike band must start above the hole cap")]
    fn overlapping_bands_are_rejected() {
        let _ = HazardTiers::new(
            TierRamp::new(10, 5, 40),
            TierRamp::new(30, 5, 55),
            TierRamp::new(55, 5, 75),
        );
    }

    #[test]
    #[should_panic(expected = "tier must start at or below its cap")]
    fn inverted_ramp_is_rejected() {
        let _ = TierRamp::new(40, 5, 30);
    }

    #[test]
    fn corridor_stays_on_the_single_interior_column() {
        let view = running_view(6, 3, 0);
        let mut generation = Generation::new(Config::new(7, HazardTiers::default()));
        generation.reset(&view);

        // Width three leaves one interior column on full rows and two on
        // staggered rows, so the corridor must bounce between them.
        for row in 0..40_u64 {
            match RowParity::of(row) {
                RowParity::Full => assert_eq!(generation.safe_column, 1, "row {row}"),
                RowParity::Staggered => {
                    assert!(generation.safe_column <= 1, "row {row}");
                }
            }
            generation.advance_safe_column(row, 3);
        }
    }

    #[test]
    fn corridor_transitions_are_legal_diagonal_steps() {
        let row_width = 7;
        let view = running_view(8, row_width, 0);
        let mut generation = Generation::new(Config::new(99, HazardTiers::default()));
        generation.reset(&view);

        let mut previous = TileLocation::new(generation.safe_column, 0);
        for row in 0..200_u64 {
            generation.advance_safe_column(row, row_width);
            let current = TileLocation::new(generation.safe_column, row + 1);

            let reachable = [
                previous.step_up_left(row_width),
                previous.step_up_right(row_width),
            ];
            assert!(
                reachable.contains(&Some(current)),
                "corridor jumped from {previous:?} to {current:?}"
            );
            if RowParity::of(row + 1) == RowParity::Full {
                assert!(
                    current.column() > 0 && current.column() + 1 < row_width,
                    "corridor drifted onto a border wall at {current:?}"
                );
            }
            previous = current;
        }
    }

    #[test]
    fn planned_rows_pin_walls_and_the_safe_column() {
        let mut generation = Generation::new(Config::new(3, lethal_tiers()));
        generation.safe_column = 3;

        let plan = generation.plan_row(4, 7, false);
        assert_eq!(
            plan.kinds(),
            [
                TileKind::Wall,
                TileKind::Hole,
                TileKind::Hole,
                TileKind::Floor,
                TileKind::Hole,
                TileKind::Hole,
                TileKind::Wall,
            ],
            "full rows carry border walls and one guaranteed floor"
        );

        generation.safe_column = 0;
        let plan = generation.plan_row(5, 7, false);
        assert_eq!(plan.kinds().len(), 6, "staggered rows are one tile short");
        assert_eq!(plan.kinds()[0], TileKind::Floor);
        assert!(
            plan.kinds()[1..]
                .iter()
                .all(|kind| *kind == TileKind::Hole),
            "staggered rows have no border walls"
        );
    }

    #[test]
    fn warm_up_track_is_all_floor() {
        let view = running_view(6, 5, 0);
        let mut generation = Generation::new(Config::new(11, lethal_tiers()));
        let mut out = Vec::new();
        generation.handle(&[Event::TrackRecycleNeeded { ordinal: 0 }], &view, &mut out);

        assert_eq!(out.len(), 1);
        let Command::RecycleTrack { plans } = &out[0] else {
            panic!("expected a recycle command, got {out:?}");
        };
        assert_eq!(plans.len(), 6);
        for (offset, plan) in plans.iter().enumerate() {
            let parity = RowParity::of(offset as u64);
            assert_eq!(plan.kinds().len() as u32, parity.width(5));
            for (column, kind) in plan.kinds().iter().enumerate() {
                let border = parity == RowParity::Full
                    && (column == 0 || column + 1 == plan.kinds().len());
                if border {
                    assert_eq!(*kind, TileKind::Wall, "offset {offset} column {column}");
                } else {
                    assert_eq!(*kind, TileKind::Floor, "offset {offset} column {column}");
                }
            }
        }
    }

    #[test]
    fn bootstrap_fills_arrive_in_track_order() {
        let view = running_view(6, 5, 0);
        let mut generation = Generation::new(Config::new(42, HazardTiers::default()));
        let out = bootstrap(&mut generation, &view);

        assert_eq!(out.len(), 2, "one recycle command per requested buffer");
        assert!(out
            .iter()
            .all(|command| matches!(command, Command::RecycleTrack { .. })));
        assert_eq!(generation.next_track, 2);
    }

    #[test]
    fn reconfiguration_replays_the_same_layouts() {
        let view = running_view(6, 5, 0);
        let mut generation = Generation::new(Config::new(42, HazardTiers::default()));
        let first = bootstrap(&mut generation, &view);
        // A second ordinal-zero request rewinds every stream.
        let second = bootstrap(&mut generation, &view);
        assert_eq!(first, second);
    }

    #[test]
    fn hole_landings_are_terminal() {
        let view = running_view(6, 5, 7);
        let mut generation = Generation::new(Config::new(42, HazardTiers::default()));
        let _ = bootstrap(&mut generation, &view);

        let mut out = Vec::new();
        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(2, 7),
                kind: TileKind::Hole,
            }],
            &view,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::EndRun {
                cause: CauseOfGameOver::FellInHole
            }]
        );
    }

    #[test]
    fn spike_landings_emit_nothing() {
        let view = running_view(6, 5, 7);
        let mut generation = Generation::new(Config::new(42, HazardTiers::default()));
        let _ = bootstrap(&mut generation, &view);

        let mut out = Vec::new();
        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(2, 7),
                kind: TileKind::FloorSpikes,
            }],
            &view,
            &mut out,
        );
        assert!(
            out.is_empty(),
            "spike landings are survivable until the caller decides otherwise"
        );
    }

    #[test]
    fn refill_fires_a_third_into_the_newest_track() {
        let view = running_view(30, 7, 0);
        let mut generation = Generation::new(Config::new(42, floor_only_tiers()));
        let _ = bootstrap(&mut generation, &view);
        assert_eq!(view.refill_offset(), 10);

        let mut out = Vec::new();
        // Landing at the refill offset of the spawn track must not refill:
        // the newest planned track is still ahead of the player.
        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 10),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert!(out.is_empty(), "spawn track landings never trigger a refill");

        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 39),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert!(out.is_empty(), "one row short of the offset is too early");

        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 40),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert_eq!(out.len(), 1, "row 40 is a third of the way into track 1");
        assert!(matches!(out[0], Command::RecycleTrack { .. }));
        assert_eq!(generation.next_track, 3);

        out.clear();
        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 41),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert!(out.is_empty(), "each track refills exactly once");

        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 70),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert_eq!(out.len(), 1, "the next refill waits for track 2's offset");
    }

    #[test]
    fn refills_raise_the_ladder_once() {
        let view = running_view(30, 7, 0);
        let mut generation = Generation::new(Config::new(42, HazardTiers::default()));
        let _ = bootstrap(&mut generation, &view);
        assert_eq!(generation.ladder.hole, 10);

        let mut out = Vec::new();
        generation.handle(
            &[Event::PlayerAdvanced {
                location: TileLocation::new(3, 40),
                kind: TileKind::Floor,
            }],
            &view,
            &mut out,
        );
        assert_eq!(generation.ladder.hole, 15, "one raise per planned track");
    }
}
