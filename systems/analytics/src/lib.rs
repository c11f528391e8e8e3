#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic scoring system that folds run events into a report.

mod metrics;

use box_dash_core::{Event, StatsReport};

/// Pure system that tracks run scoring and republishes it on a tick cadence.
#[derive(Debug, Default)]
pub struct Analytics {
    report: StatsReport,
    published: Option<StatsReport>,
    dirty: bool,
}

impl Analytics {
    /// Creates an analytics system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&StatsReport> {
        self.published.as_ref()
    }

    /// Consumes world events and republishes the scoring report.
    ///
    /// Counters fold immediately, but [`Event::StatsUpdated`] is emitted at
    /// most once per call and only when a tick (`Event::TimeAdvanced`) has
    /// been observed *and* a counter changed since the previous publication.
    /// A fill request for track zero only happens on reconfiguration, so it
    /// restarts the scoring run from an empty report.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let mut tick_observed = false;

        for event in events {
            match event {
                Event::TrackRecycleNeeded { ordinal: 0 } => {
                    self.report = StatsReport::default();
                    self.published = None;
                    self.dirty = false;
                }
                Event::TimeAdvanced { .. } => {
                    tick_observed = true;
                }
                other => {
                    if metrics::fold(&mut self.report, other) {
                        self.dirty = true;
                    }
                }
            }
        }

        if !tick_observed || !self.dirty {
            return;
        }

        self.dirty = false;
        self.published = Some(self.report);
        out.push(Event::StatsUpdated {
            report: self.report,
        });
    }
}
