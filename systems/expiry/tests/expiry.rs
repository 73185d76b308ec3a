use std::time::Duration;

use reflex_arcade_core::{Command, Event, RemovalCause, SurfacePoint, TargetId, Timestamp};
use reflex_arcade_system_expiry::Expiry;
use reflex_arcade_world::{self as world, query, World};

const LIFETIME: Duration = Duration::from_millis(1_050);

struct Harness {
    world: World,
    expiry: Expiry,
    events: Vec<Event>,
}

impl Harness {
    fn started() -> Self {
        let mut harness = Self {
            world: World::new(),
            expiry: Expiry::new(),
            events: Vec::new(),
        };
        harness.submit(Command::StartRound {
            at: Timestamp::ORIGIN,
        });
        harness
    }

    fn spawn(&mut self, is_penalty: bool) -> TargetId {
        self.submit(Command::SpawnTarget {
            position: SurfacePoint::new(200.0, 150.0),
            is_penalty,
            lifetime: LIFETIME,
        });
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::TargetSpawned { target } => Some(target.id),
                _ => None,
            })
            .expect("spawn event")
    }

    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.expiry.handle(
                &events,
                query::phase(&self.world),
                &query::target_view(&self.world),
                query::round_time(&self.world),
                &mut pending,
            );
            self.events.extend(events);
        }
    }

    fn frame(&mut self, millis: u64) {
        self.submit(Command::Frame {
            at: Timestamp::from_millis(millis),
        });
    }

    fn removal_of(&self, target: TargetId) -> Vec<RemovalCause> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::TargetRemoved { target: id, cause } if *id == target => Some(*cause),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn unclicked_target_resets_streak_after_lifetime() {
    let mut harness = Harness::started();
    let warmup = harness.spawn(false);
    harness.submit(Command::HitTarget { target: warmup });
    assert_eq!(query::streak(&harness.world), 1);

    let target = harness.spawn(false);
    harness.frame(1_000);
    assert!(query::target(&harness.world, target).is_some());
    assert_eq!(query::streak(&harness.world), 1);

    harness.frame(1_050);
    assert!(query::target(&harness.world, target).is_none());
    assert_eq!(harness.removal_of(target), vec![RemovalCause::Expired]);
    assert_eq!(query::streak(&harness.world), 0);
    assert_eq!(query::score(&harness.world), 10);
}

#[test]
fn expired_penalty_target_has_no_effect() {
    let mut harness = Harness::started();
    let warmup = harness.spawn(false);
    harness.submit(Command::HitTarget { target: warmup });

    let penalty = harness.spawn(true);
    harness.frame(2_000);

    assert_eq!(harness.removal_of(penalty), vec![RemovalCause::Expired]);
    assert_eq!(query::streak(&harness.world), 1);
    assert_eq!(query::score(&harness.world), 10);
}

#[test]
fn hit_before_expiry_wins() {
    let mut harness = Harness::started();
    let target = harness.spawn(false);
    harness.frame(500);
    harness.submit(Command::HitTarget { target });
    harness.frame(2_000);

    assert_eq!(harness.removal_of(target), vec![RemovalCause::Hit]);
    assert_eq!(query::streak(&harness.world), 1);
    assert_eq!(harness.expiry.pending(), 0);
}

#[test]
fn late_hit_after_expiry_is_ignored() {
    let mut harness = Harness::started();
    let target = harness.spawn(false);
    harness.frame(1_100);
    harness.submit(Command::HitTarget { target });

    assert_eq!(harness.removal_of(target), vec![RemovalCause::Expired]);
    assert_eq!(query::score(&harness.world), 0);
    assert_eq!(query::streak(&harness.world), 0);
}

#[test]
fn stale_expiry_request_is_a_no_op() {
    let mut harness = Harness::started();
    let target = harness.spawn(false);
    harness.submit(Command::HitTarget { target });

    harness.frame(1_200);
    harness.submit(Command::ExpireTarget { target });

    assert_eq!(harness.removal_of(target), vec![RemovalCause::Hit]);
    assert_eq!(query::streak(&harness.world), 1);
}

#[test]
fn paused_targets_do_not_age() {
    let mut harness = Harness::started();
    let target = harness.spawn(false);
    harness.frame(500);
    harness.submit(Command::PauseRound);
    harness.frame(10_000);
    harness.submit(Command::ResumeRound {
        at: Timestamp::from_millis(10_000),
    });
    harness.frame(10_400);

    assert!(query::target(&harness.world, target).is_some());
    assert_eq!(query::round_time(&harness.world), Duration::from_millis(900));

    harness.frame(10_600);
    assert!(query::target(&harness.world, target).is_none());
}
