#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs scripted Box Dash sessions.
//!
//! The binary wires the pure systems to the track world and drives them
//! with an automatic player: every few ticks it steps diagonally onto the
//! most survivable neighbouring tile. Runs are fully reproducible; the
//! printed challenge code replays the same track on any machine.

mod run_code;

use anyhow::{bail, Context};
use box_dash_core::{
    CauseOfGameOver, Command, Event, RunPhase, TileKind, TileLocation, TrackConfig,
};
use box_dash_system_analytics::Analytics;
use box_dash_system_collapse::{Collapse, Config as CollapseConfig};
use box_dash_system_generation::{Config as GenerationConfig, Generation, HazardTiers};
use box_dash_world::{apply, query, World};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::run_code::RunCode;

#[derive(Debug, Parser)]
#[command(name = "box-dash", about = "Deterministic auto-runner for the endless track engine")]
struct Args {
    /// Seed for the generation streams; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of simulation ticks to run before stopping.
    #[arg(long, default_value_t = 3600)]
    ticks: u32,
    /// Rows held by each track buffer.
    #[arg(long, default_value_t = 30)]
    track_length: u32,
    /// Track buffers cycled through the window.
    #[arg(long, default_value_t = 2)]
    track_count: u32,
    /// Tiles in a full-width row, border walls included.
    #[arg(long, default_value_t = 7)]
    row_width: u32,
    /// Whole ticks between collapse sweeps.
    #[arg(long, default_value_t = 30)]
    collapse_interval: u32,
    /// Whole ticks between automatic player steps.
    #[arg(long, default_value_t = 12)]
    step_interval: u32,
    /// Challenge code to replay instead of the track flags above.
    #[arg(long)]
    challenge: Option<String>,
}

/// Fully resolved session parameters after challenge codes and defaults.
#[derive(Clone, Copy, Debug)]
struct Settings {
    seed: u64,
    ticks: u32,
    track_length: u32,
    track_count: u32,
    row_width: u32,
    collapse_interval: u32,
    step_interval: u32,
}

impl Settings {
    fn resolve(args: Args) -> anyhow::Result<Self> {
        let mut settings = Self {
            seed: args.seed.unwrap_or_else(rand::random),
            ticks: args.ticks,
            track_length: args.track_length,
            track_count: args.track_count,
            row_width: args.row_width,
            collapse_interval: args.collapse_interval,
            step_interval: args.step_interval,
        };

        if let Some(code) = &args.challenge {
            let code = RunCode::decode(code).context("challenge code rejected")?;
            settings.seed = code.seed;
            settings.track_length = code.track_length;
            settings.track_count = code.track_count;
            settings.row_width = code.row_width;
            settings.collapse_interval = code.collapse_interval;
        }

        if settings.track_count < 2 {
            bail!("at least two track buffers are required");
        }
        if settings.track_length < 2 || settings.track_length % 2 != 0 {
            bail!("track length must be even and at least two");
        }
        if settings.row_width < 3 {
            bail!("row width must leave interior tiles between the border walls");
        }
        if settings.step_interval == 0 {
            bail!("the player cannot step more often than once per tick");
        }

        Ok(settings)
    }

    fn run_code(&self) -> RunCode {
        RunCode {
            seed: self.seed,
            track_length: self.track_length,
            track_count: self.track_count,
            row_width: self.row_width,
            collapse_interval: self.collapse_interval,
        }
    }

    fn track_config(&self) -> TrackConfig {
        TrackConfig {
            track_length: self.track_length,
            track_count: self.track_count,
            row_width: self.row_width,
            spawn_row: u64::from(self.track_length / 6),
            ..TrackConfig::default()
        }
    }
}

/// Entry point for the Box Dash command-line interface.
fn main() -> anyhow::Result<()> {
    let settings = Settings::resolve(Args::parse())?;
    run(settings)
}

fn run(settings: Settings) -> anyhow::Result<()> {
    let mut world = World::new();
    let mut generation = Generation::new(GenerationConfig::new(
        settings.seed,
        HazardTiers::default(),
    ));
    let mut collapse = Collapse::new(CollapseConfig::new(settings.collapse_interval));
    let mut analytics = Analytics::new();
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);

    println!("{}", query::welcome_banner(&world));
    println!("challenge code: {}", settings.run_code().encode());

    let config = settings.track_config();
    let events = dispatch(
        &mut world,
        &mut generation,
        &mut collapse,
        Command::ConfigureTrack { config },
    );
    observe(&events, &mut analytics);

    let spawn = query::spawn_location(&world);
    let events = dispatch(
        &mut world,
        &mut generation,
        &mut collapse,
        Command::PlayerMoved { location: spawn },
    );
    observe(&events, &mut analytics);

    let events = dispatch(&mut world, &mut generation, &mut collapse, Command::StartRun);
    observe(&events, &mut analytics);

    let mut step_countdown = settings.step_interval;
    for _ in 0..settings.ticks {
        if query::run_phase(&world) == RunPhase::Over {
            break;
        }

        step_countdown -= 1;
        if step_countdown == 0 {
            step_countdown = settings.step_interval;
            step_player(
                &mut world,
                &mut generation,
                &mut collapse,
                &mut analytics,
                &mut rng,
            );
        }

        let events = dispatch(&mut world, &mut generation, &mut collapse, Command::Tick);
        observe(&events, &mut analytics);
    }

    if query::run_phase(&world) != RunPhase::Over {
        println!("tick budget exhausted after {} ticks", settings.ticks);
    }
    if let Some(report) = analytics.last_report() {
        println!(
            "final stats: distance {}, rows collapsed {}, tracks rebuilt {}, hazard contacts {}",
            report.max_distance,
            report.rows_collapsed,
            report.tracks_recycled,
            report.hazard_contacts
        );
    }

    Ok(())
}

/// Applies a command and routes the fallout through the pure systems until
/// the exchange settles, returning every event raised along the way.
fn dispatch(
    world: &mut World,
    generation: &mut Generation,
    collapse: &mut Collapse,
    command: Command,
) -> Vec<Event> {
    let mut log = Vec::new();
    apply(world, command, &mut log);
    let mut cursor = 0;
    while cursor < log.len() {
        let view = query::track_view(world);
        let mut commands = Vec::new();
        generation.handle(&log[cursor..], &view, &mut commands);
        collapse.handle(&log[cursor..], &view, &mut commands);
        cursor = log.len();
        for command in commands {
            apply(world, command, &mut log);
        }
    }
    log
}

/// Narrates notable events and feeds the batch to the scoring system.
fn observe(events: &[Event], analytics: &mut Analytics) {
    for event in events {
        match event {
            Event::RunStarted => println!("run started"),
            Event::TrackRecycled {
                ordinal,
                first_row,
                last_row,
            } => println!("track {ordinal} rebuilt across rows {first_row}..={last_row}"),
            Event::RunEnded { cause } => println!("run over: {}", describe(*cause)),
            _ => {}
        }
    }

    let mut published = Vec::new();
    analytics.handle(events, &mut published);
}

/// Steps the automatic player onto the most survivable neighbouring tile.
fn step_player(
    world: &mut World,
    generation: &mut Generation,
    collapse: &mut Collapse,
    analytics: &mut Analytics,
    rng: &mut ChaCha8Rng,
) {
    let Some(target) = choose_step(world, rng) else {
        return;
    };
    let events = dispatch(
        world,
        generation,
        collapse,
        Command::PlayerMoved { location: target },
    );
    observe(&events, analytics);

    // Spikes only kill while their animation is live; the world records the
    // contact and leaves the verdict to the adapter.
    let spiked = events.iter().any(|event| {
        matches!(event, Event::PlayerAdvanced { kind, .. } if kind.is_hazard())
    });
    if spiked && query::tile(world, target).map_or(false, |tile| tile.animating) {
        let fallout = dispatch(
            world,
            generation,
            collapse,
            Command::EndRun {
                cause: CauseOfGameOver::SpikeHazard,
            },
        );
        observe(&fallout, analytics);
    }
}

/// Picks a diagonal step, preferring plain floor and falling back to any
/// passable tile before giving up.
fn choose_step(world: &World, rng: &mut ChaCha8Rng) -> Option<TileLocation> {
    let player = query::player(world);
    let width = query::track_config(world).row_width;
    let candidates: Vec<TileLocation> = [player.step_up_left(width), player.step_up_right(width)]
        .into_iter()
        .flatten()
        .filter(|target| query::tile(world, *target).map_or(false, |tile| tile.passable))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let floors: Vec<TileLocation> = candidates
        .iter()
        .copied()
        .filter(|target| {
            query::tile(world, *target).map_or(false, |tile| tile.kind == TileKind::Floor)
        })
        .collect();
    let pool = if floors.is_empty() { &candidates } else { &floors };
    Some(pool[rng.gen_range(0..pool.len())])
}

fn describe(cause: CauseOfGameOver) -> &'static str {
    match cause {
        CauseOfGameOver::FellInHole => "fell into a hole",
        CauseOfGameOver::CollapsedUnderfoot => "the track collapsed underfoot",
        CauseOfGameOver::SpikeHazard => "ran into live spikes",
    }
}
