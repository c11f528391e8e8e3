use box_dash_core::{
    Command, Event, RowParity, RowPlan, StatsReport, TileKind, TileLocation, TrackConfig,
};
use box_dash_system_analytics::Analytics;
use box_dash_world::{apply, query, World};

fn small_config() -> TrackConfig {
    TrackConfig {
        track_length: 4,
        track_count: 2,
        row_width: 5,
        spawn_row: 1,
        ..TrackConfig::default()
    }
}

fn plans(
    config: &TrackConfig,
    first_row: u64,
    overrides: &[(TileLocation, TileKind)],
) -> Vec<RowPlan> {
    (0..u64::from(config.track_length))
        .map(|offset| {
            let row = first_row + offset;
            let parity = RowParity::of(row);
            let width = parity.width(config.row_width) as usize;
            let kinds = (0..width)
                .map(|column| {
                    let location = TileLocation::new(column as u32, row);
                    let border =
                        parity == RowParity::Full && (column == 0 || column + 1 == width);
                    if border {
                        TileKind::Wall
                    } else {
                        overrides
                            .iter()
                            .find(|(at, _)| *at == location)
                            .map_or(TileKind::Floor, |(_, kind)| *kind)
                    }
                })
                .collect();
            RowPlan::new(kinds)
        })
        .collect()
}

fn apply_one(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn build_world(config: TrackConfig, overrides: &[(TileLocation, TileKind)]) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = apply_one(&mut world, Command::ConfigureTrack { config });
    for ordinal in 0..u64::from(config.track_count) {
        let first_row = ordinal * u64::from(config.track_length);
        events.extend(apply_one(
            &mut world,
            Command::RecycleTrack {
                plans: plans(&config, first_row, overrides),
            },
        ));
    }
    (world, events)
}

#[test]
fn stats_follow_a_scripted_session() {
    let config = small_config();
    let (mut world, bootstrap) = build_world(config, &[]);
    let mut analytics = Analytics::new();
    let mut published = Vec::new();

    analytics.handle(&bootstrap, &mut published);
    assert!(
        published.is_empty(),
        "bootstrap counters wait for the first tick"
    );

    let spawn = query::spawn_location(&world);
    let mut batch = apply_one(&mut world, Command::PlayerMoved { location: spawn });
    batch.extend(apply_one(&mut world, Command::StartRun));
    batch.extend(apply_one(&mut world, Command::Tick));
    analytics.handle(&batch, &mut published);
    assert_eq!(published.len(), 1);
    assert_eq!(
        analytics.last_report(),
        Some(&StatsReport {
            max_distance: 1,
            rows_collapsed: 0,
            tracks_recycled: 2,
            hazard_contacts: 0,
        })
    );

    let mut batch = apply_one(
        &mut world,
        Command::PlayerMoved {
            location: TileLocation::new(2, 2),
        },
    );
    batch.extend(apply_one(&mut world, Command::Tick));
    analytics.handle(&batch, &mut published);
    assert_eq!(published.len(), 2);

    let mut batch = apply_one(&mut world, Command::CollapseRow { row: 0 });
    batch.extend(apply_one(&mut world, Command::Tick));
    analytics.handle(&batch, &mut published);
    assert_eq!(published.len(), 3);
    assert_eq!(
        analytics.last_report(),
        Some(&StatsReport {
            max_distance: 2,
            rows_collapsed: 1,
            tracks_recycled: 2,
            hazard_contacts: 0,
        })
    );

    let batch = apply_one(&mut world, Command::Tick);
    analytics.handle(&batch, &mut published);
    assert_eq!(published.len(), 3, "an uneventful tick publishes nothing");
}

#[test]
fn spike_landings_accumulate_hazard_contacts() {
    let config = small_config();
    let spikes = [
        (TileLocation::new(2, 2), TileKind::FloorSpikes),
        (TileLocation::new(2, 3), TileKind::SkySpikes),
    ];
    let (mut world, bootstrap) = build_world(config, &spikes);
    let mut analytics = Analytics::new();
    let mut published = Vec::new();
    analytics.handle(&bootstrap, &mut published);

    let spawn = query::spawn_location(&world);
    let mut batch = apply_one(&mut world, Command::PlayerMoved { location: spawn });
    batch.extend(apply_one(&mut world, Command::StartRun));
    for target in [TileLocation::new(2, 2), TileLocation::new(2, 3)] {
        batch.extend(apply_one(&mut world, Command::PlayerMoved { location: target }));
        batch.extend(apply_one(&mut world, Command::Tick));
    }
    analytics.handle(&batch, &mut published);

    let report = analytics.last_report().expect("published report");
    assert_eq!(report.hazard_contacts, 2);
    assert_eq!(report.max_distance, 3);
}
