#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cadence-driven collapse sweep that chases the player up the track.
//!
//! While a run is live the sweep destabilises one row per cadence window,
//! strictly in ascending row order. The cursor fast-forwards past tracks
//! the player has already left behind, and the run ends the moment the
//! sweep consumes the exact row the player is standing on.

use box_dash_core::{CauseOfGameOver, Command, Event, TrackView};

/// Configuration parameters required to construct the collapse system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval_ticks: u32,
}

impl Config {
    /// Creates a configuration that collapses one row each time
    /// `interval_ticks` whole ticks have elapsed since the previous sweep.
    #[must_use]
    pub const fn new(interval_ticks: u32) -> Self {
        Self { interval_ticks }
    }
}

/// Position of the sweep within the endless row sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SweepCursor {
    ordinal: u64,
    offset: u32,
}

impl SweepCursor {
    const fn row(&self, track_length: u32) -> u64 {
        self.ordinal * track_length as u64 + self.offset as u64
    }

    fn advance(&mut self, track_length: u32) {
        self.offset += 1;
        if self.offset == track_length {
            self.offset = 0;
            self.ordinal += 1;
        }
    }
}

/// Pure system that schedules row collapses behind the running player.
#[derive(Debug)]
pub struct Collapse {
    interval_ticks: u32,
    counter: u32,
    armed: bool,
    cursor: SweepCursor,
}

impl Collapse {
    /// Creates a disarmed collapse system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval_ticks: config.interval_ticks,
            counter: 0,
            armed: false,
            cursor: SweepCursor::default(),
        }
    }

    /// Reports whether the sweep is currently chasing the player.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes world events and the current track view, emitting commands.
    ///
    /// The sweep arms on [`Event::RunStarted`], disarms on
    /// [`Event::RunEnded`], and while armed counts whole ticks until the
    /// cadence interval elapses, at which point exactly one row collapses.
    pub fn handle(&mut self, events: &[Event], view: &TrackView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStarted => {
                    self.armed = true;
                    self.counter = 0;
                    self.cursor = SweepCursor::default();
                }
                Event::RunEnded { .. } => {
                    self.armed = false;
                }
                Event::TimeAdvanced { .. } if self.armed => {
                    self.counter += 1;
                    if self.counter > self.interval_ticks {
                        self.counter = 0;
                        self.sweep(view, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn sweep(&mut self, view: &TrackView, out: &mut Vec<Command>) {
        let player = view.player();
        let player_ordinal = view.ordinal_of(player.row());
        // Rows behind the player's current track are already queued for a
        // rebuild; sweeping them would address non-resident buffers.
        if self.cursor.ordinal < player_ordinal {
            self.cursor = SweepCursor {
                ordinal: player_ordinal,
                offset: 0,
            };
        }

        let row = self.cursor.row(view.track_length());
        out.push(Command::CollapseRow { row });
        self.cursor.advance(view.track_length());

        if player.row() == row {
            out.push(Command::EndRun {
                cause: CauseOfGameOver::CollapsedUnderfoot,
            });
            self.armed = false;
        }
    }
}
