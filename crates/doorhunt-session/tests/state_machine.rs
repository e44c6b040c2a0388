//! Round state machine driven by a virtual clock.

mod common;

use std::sync::Arc;

use common::{Broken, Harness, HOLDING, LOBBY, SPAWN};
use doorhunt_arena::ArenaDefaults;
use doorhunt_clock::Scheduler;
use doorhunt_session::{Services, SessionConfig, SessionError};
use doorhunt_types::{LocationRef, Outcome, Phase, PlayerId, RoundOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn p(id: u64) -> PlayerId {
    PlayerId(id)
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

#[test]
fn test_join_second_player_starts_countdown() {
    let mut h = Harness::new(common::arena());

    h.join(1);
    assert_eq!(h.session.phase(), Phase::Waiting);
    assert_eq!(h.clock.live_timers(), 0);

    h.join(2);
    assert_eq!(h.session.phase(), Phase::Countdown);
    assert_eq!(h.session.remaining(), 10);
    assert_eq!(h.clock.live_timers(), 1);
}

#[test]
fn test_leave_during_countdown_returns_to_waiting() {
    let mut h = Harness::new(common::arena());
    h.join_all([1, 2]);
    h.advance(3);
    assert_eq!(h.session.remaining(), 7);

    h.session.leave(p(1), false).unwrap();

    assert_eq!(h.session.phase(), Phase::Waiting);
    assert_eq!(h.session.remaining(), 0);
    assert_eq!(h.clock.live_timers(), 0);
    assert!(!h.session.has_timers());

    h.advance(30);
    assert_eq!(h.session.phase(), Phase::Waiting, "no round should start");
}

#[test]
fn test_countdown_announces_tens_and_last_five() {
    let mut arena = common::arena();
    arena.recruit_countdown_secs = 12;
    let mut h = Harness::new(arena);
    h.join_all([1, 2]);
    h.recorder.clear();

    h.advance(11);

    let announced: Vec<String> = h
        .recorder
        .broadcasts()
        .into_iter()
        .filter(|text| text.starts_with("Round starts in"))
        .collect();
    assert_eq!(
        announced,
        vec![
            "Round starts in 10s",
            "Round starts in 5s",
            "Round starts in 4s",
            "Round starts in 3s",
            "Round starts in 2s",
            "Round starts in 1s",
        ]
    );
}

#[test]
fn test_zero_recruit_countdown_starts_round_on_join() {
    let mut arena = common::arena();
    arena.recruit_countdown_secs = 0;
    let mut h = Harness::new(arena);

    h.join_all([1, 2]);

    assert_eq!(h.session.phase(), Phase::Preparing);
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[test]
fn test_join_unconfigured_arena_rejected() {
    let mut arena = common::arena();
    arena.hunter_holding = None;
    let mut h = Harness::new(arena);

    let err = h.session.join(p(1)).unwrap_err();
    assert!(matches!(err, SessionError::ArenaNotConfigured(_)));
    assert!(h.session.roster().is_empty());
}

#[test]
fn test_join_twice_rejected() {
    let mut h = Harness::new(common::arena());
    h.join(1);
    assert_eq!(
        h.session.join(p(1)),
        Err(SessionError::AlreadyInSession(p(1)))
    );
}

#[test]
fn test_join_at_capacity_returns_session_full() {
    let mut h = Harness::new(common::arena());
    h.join_all(1..=8);

    let err = h.session.join(p(9)).unwrap_err();
    assert!(matches!(err, SessionError::SessionFull(_)));
    assert_eq!(h.session.roster().len(), 8);
}

#[test]
fn test_join_running_round_returns_session_busy() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);

    let err = h.session.join(p(3)).unwrap_err();
    assert!(matches!(err, SessionError::SessionBusy(_)));
}

#[test]
fn test_join_relocates_to_lobby_and_mirrors_evaders() {
    let mut h = Harness::new(common::arena());
    h.join(1);

    assert_eq!(h.recorder.last_location_of(p(1)), Some(LocationRef::new(LOBBY)));
    assert_eq!(h.evaders(), vec![p(1)]);
    assert!(h.hunters().is_empty());
    h.assert_partition();
}

#[test]
fn test_leave_unknown_player_returns_not_in_session() {
    let mut h = Harness::new(common::arena());
    assert_eq!(
        h.session.leave(p(4), false),
        Err(SessionError::NotInSession(p(4)))
    );
}

#[test]
fn test_leave_clears_index_and_returns_player() {
    let mut h = Harness::new(common::arena());
    h.join_all([1, 2, 3]);

    h.session.leave(p(2), true).unwrap();

    assert!(!h.index.contains(p(2)));
    assert!(h.index.contains(p(1)));
    assert_eq!(h.recorder.last_location_of(p(2)), Some(LocationRef::new(LOBBY)));
    assert!(
        !h.recorder.broadcasts().iter().any(|text| text.contains("left")),
        "silent leave must not broadcast"
    );
}

#[test]
fn test_return_location_overrides_arena_lobby() {
    let config = SessionConfig {
        return_location: Some(LocationRef::new("hub")),
        ..common::session_config()
    };
    let mut h = Harness::with_config(common::arena(), config);
    h.join(1);

    h.session.leave(p(1), false).unwrap();

    assert_eq!(h.recorder.last_location_of(p(1)), Some(LocationRef::new("hub")));
}

#[test]
fn test_roster_empty_in_live_resets_immediately() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);
    h.release_hunters();

    h.session.leave(p(1), false).unwrap();
    h.session.leave(p(2), false).unwrap();

    assert_eq!(h.session.phase(), Phase::Waiting);
    assert!(h.session.roster().is_empty());
    assert_eq!(h.clock.live_timers(), 0);
    assert!(h.index.is_empty());
}

#[test]
fn test_last_evader_leaving_hands_round_to_hunters() {
    let mut h = Harness::new(common::arena());
    h.start_round(3);
    h.release_hunters();

    for evader in h.evaders() {
        h.session.leave(evader, false).unwrap();
    }

    assert_eq!(h.session.phase(), Phase::Ending);
    let summary = h.session.last_summary().unwrap();
    assert_eq!(summary.outcome, RoundOutcome::HuntersWin);
}

// ---------------------------------------------------------------------------
// Full round
// ---------------------------------------------------------------------------

#[test]
fn test_full_round_runs_every_phase() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);

    let hunters = h.hunters();
    let evaders = h.evaders();
    assert_eq!(hunters.len(), 1);
    assert_eq!(evaders.len(), 1);
    assert_eq!(h.session.remaining(), 5);
    h.assert_partition();

    h.advance(5);
    assert_eq!(h.session.phase(), Phase::Hiding);
    assert_eq!(h.recorder.last_location_of(hunters[0]), Some(LocationRef::new(HOLDING)));
    assert_eq!(h.recorder.last_location_of(evaders[0]), Some(LocationRef::new(SPAWN)));
    assert_eq!(h.recorder.equips_of(hunters[0]), 0, "hunters are equipped on release");

    h.advance(5);
    assert_eq!(h.session.phase(), Phase::Live);
    assert_eq!(h.session.remaining(), 60);
    assert_eq!(h.recorder.last_location_of(hunters[0]), Some(LocationRef::new(SPAWN)));
    assert_eq!(h.recorder.equips_of(hunters[0]), 1);

    h.advance(60);
    assert_eq!(h.session.phase(), Phase::Ending);
    let summary = h.session.last_summary().unwrap().clone();
    assert_eq!(summary.outcome, RoundOutcome::EvadersWin);
    assert_eq!(summary.survivors, evaders);

    h.advance(1);
    assert_eq!(h.session.phase(), Phase::Cooldown);
    assert_eq!(h.session.remaining(), 10);

    h.advance(10);
    assert_eq!(h.session.phase(), Phase::Waiting);
    assert!(h.session.roster().is_empty());
    assert!(h.index.is_empty());
    assert_eq!(h.clock.live_timers(), 0);
    assert_eq!(h.recorder.last_location_of(p(1)), Some(LocationRef::new(LOBBY)));
    assert_eq!(h.session.last_summary(), Some(&summary), "summary kept for display");
}

#[test]
fn test_live_timer_expiry_evaders_win() {
    let mut h = Harness::new(common::arena());
    h.start_round(4);
    h.release_hunters();

    h.advance(59);
    assert_eq!(h.session.phase(), Phase::Live);
    assert_eq!(h.session.remaining(), 1);

    h.advance(1);
    assert_eq!(h.session.phase(), Phase::Ending);
    assert_eq!(
        h.session.last_summary().map(|s| s.outcome),
        Some(RoundOutcome::EvadersWin)
    );
}

#[test]
fn test_zero_prepare_and_hide_skip_straight_to_live() {
    let mut h = Harness::new(common::arena_with(ArenaDefaults {
        min_players: 2,
        max_players: 8,
        recruit_countdown_secs: 3,
        prepare_secs: 0,
        hide_secs: 0,
        live_secs: 30,
    }));
    h.join_all([1, 2]);

    h.advance(3);

    assert_eq!(h.session.phase(), Phase::Live);
    assert_eq!(h.session.remaining(), 30);
    assert_eq!(h.clock.live_timers(), 1);
}

#[test]
fn test_status_pushed_on_every_tick() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);
    h.release_hunters();
    h.recorder.clear();

    h.advance(3);

    let remaining: Vec<u32> = h
        .recorder
        .statuses()
        .iter()
        .map(|status| status.remaining_secs)
        .collect();
    assert_eq!(remaining, vec![59, 58, 57]);
    assert!(h.recorder.statuses().iter().all(|s| s.phase == Phase::Live));
}

// ---------------------------------------------------------------------------
// Eliminations
// ---------------------------------------------------------------------------

#[test]
fn test_eliminating_every_evader_ends_round_immediately() {
    let mut h = Harness::new(common::arena());
    h.start_round(3);
    h.release_hunters();

    let hunter = h.hunters()[0];
    for evader in h.evaders() {
        assert_eq!(h.session.eliminate(hunter, evader), Outcome::Applied);
        h.assert_partition();
    }

    assert_eq!(h.session.phase(), Phase::Ending);
    assert_eq!(h.session.kill_count(hunter), 2);
    let summary = h.session.last_summary().unwrap();
    assert_eq!(summary.outcome, RoundOutcome::HuntersWin);
    assert_eq!(summary.leaderboard, vec![(hunter, 2)]);
    // Only the announce one-shot is left; the live timer is gone.
    assert_eq!(h.clock.live_timers(), 1);
}

#[test]
fn test_eliminate_non_evader_is_noop() {
    let mut h = Harness::new(common::arena());
    h.start_round(5);
    h.release_hunters();
    let hunter = h.hunters()[0];
    let before = h.session.snapshot();

    assert_eq!(h.session.eliminate(hunter, hunter), Outcome::Ignored);
    assert_eq!(h.session.eliminate(hunter, p(99)), Outcome::Ignored);

    assert_eq!(h.session.snapshot(), before);
}

#[test]
fn test_eliminate_outside_active_play_is_noop() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);
    let hunter = h.hunters()[0];
    let evader = h.evaders()[0];

    assert_eq!(h.session.phase(), Phase::Preparing);
    assert_eq!(h.session.eliminate(hunter, evader), Outcome::Ignored);
    assert_eq!(h.evaders(), vec![evader]);
    assert_eq!(h.session.kill_count(hunter), 0);
}

#[test]
fn test_eliminate_during_hiding_equips_victim_once() {
    let mut h = Harness::new(common::arena());
    h.start_round(5);
    h.advance(5);
    assert_eq!(h.session.phase(), Phase::Hiding);

    let hunter = h.hunters()[0];
    let victim = h.evaders()[0];
    h.session.eliminate(hunter, victim);
    assert_eq!(h.recorder.equips_of(victim), 1);

    h.advance(5);
    assert_eq!(h.session.phase(), Phase::Live);
    assert_eq!(h.recorder.equips_of(victim), 1, "converted hunters are not re-released");
    assert_eq!(h.recorder.equips_of(hunter), 1);
}

#[test]
fn test_record_attack_requires_hunter_on_evader() {
    let mut h = Harness::new(common::arena());
    h.start_round(5);
    h.release_hunters();
    let hunter = h.hunters()[0];
    let evaders = h.evaders();

    assert_eq!(h.session.record_attack(evaders[0], evaders[1]), Outcome::Ignored);
    assert_eq!(h.session.record_attack(hunter, hunter), Outcome::Ignored);
    assert_eq!(h.session.record_attack(hunter, evaders[0]), Outcome::Applied);
    assert_eq!(h.session.pending_attacker(evaders[0]), Some(hunter));
}

#[test]
fn test_resolve_indirect_without_record_gives_no_credit() {
    let mut h = Harness::new(common::arena());
    h.start_round(5);
    h.release_hunters();
    let victim = h.evaders()[0];

    assert_eq!(h.session.resolve_indirect_elimination(victim), Outcome::Applied);

    assert!(h.hunters().contains(&victim));
    assert!(h.session.snapshot().kill_counts.is_empty());
    h.assert_partition();
}

#[test]
fn test_resolve_indirect_with_recorded_hunter_credits_attacker() {
    let mut h = Harness::new(common::arena());
    h.start_round(5);
    h.release_hunters();
    let hunter = h.hunters()[0];
    let victim = h.evaders()[0];

    h.session.record_attack(hunter, victim);
    h.session.resolve_indirect_elimination(victim);

    assert_eq!(h.session.kill_count(hunter), 1);
    assert_eq!(h.session.pending_attacker(victim), None);
}

#[test]
fn test_resolve_indirect_after_attacker_left_gives_no_credit() {
    let mut h = Harness::new(common::arena());
    h.start_round(10);
    h.release_hunters();
    let hunters = h.hunters();
    assert_eq!(hunters.len(), 2);
    let victim = h.evaders()[0];

    h.session.record_attack(hunters[0], victim);
    h.session.leave(hunters[0], false).unwrap();
    h.session.resolve_indirect_elimination(victim);

    assert!(h.hunters().contains(&victim));
    assert_eq!(h.session.kill_count(hunters[0]), 0);
    assert_eq!(h.session.kill_count(hunters[1]), 0);
}

#[test]
fn test_resolve_indirect_for_non_evader_is_noop() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);
    h.release_hunters();
    let hunter = h.hunters()[0];

    assert_eq!(h.session.resolve_indirect_elimination(hunter), Outcome::Ignored);
}

#[test]
fn test_partition_holds_under_random_event_sequences() {
    let mut rng = StdRng::seed_from_u64(0x00d0_0d1e);
    let mut h = Harness::new(common::arena_with(ArenaDefaults {
        min_players: 2,
        max_players: 8,
        recruit_countdown_secs: 2,
        prepare_secs: 1,
        hide_secs: 1,
        live_secs: 6,
    }));

    for _ in 0..500 {
        let player = p(rng.random_range(1..=10));
        match rng.random_range(0..5) {
            0 => {
                if h.index.reserve(player, h.session.arena_id().clone()).is_ok()
                    && h.session.join(player).is_err()
                {
                    h.index.release(player, &h.session.arena_id().clone());
                }
            }
            1 => {
                let _ = h.session.leave(player, rng.random_bool(0.5));
            }
            2 => {
                let attacker = p(rng.random_range(1..=10));
                h.session.eliminate(attacker, player);
            }
            3 => {
                let attacker = p(rng.random_range(1..=10));
                h.session.record_attack(attacker, player);
                h.session.resolve_indirect_elimination(player);
            }
            _ => h.advance(1),
        }
        h.assert_partition();
        assert_eq!(h.index.len(), h.session.roster().len());
    }
}

// ---------------------------------------------------------------------------
// Abort & timers
// ---------------------------------------------------------------------------

/// Drives a fresh harness to `phase`.
fn harness_in(phase: Phase) -> Harness {
    let mut h = Harness::new(common::arena());
    match phase {
        Phase::Waiting => {
            h.join(1);
        }
        Phase::Countdown => h.join_all([1, 2]),
        Phase::Preparing => h.start_round(3),
        Phase::Hiding => {
            h.start_round(3);
            h.advance(5);
        }
        Phase::Live => {
            h.start_round(3);
            h.release_hunters();
        }
        Phase::Ending => {
            h.start_round(3);
            h.release_hunters();
            h.advance(60);
        }
        Phase::Cooldown => {
            h.start_round(3);
            h.release_hunters();
            h.advance(61);
        }
    }
    assert_eq!(h.session.phase(), phase);
    h
}

#[test]
fn test_force_end_from_every_phase_resets() {
    for phase in [
        Phase::Waiting,
        Phase::Countdown,
        Phase::Preparing,
        Phase::Hiding,
        Phase::Live,
        Phase::Ending,
        Phase::Cooldown,
    ] {
        let mut h = harness_in(phase);

        assert_eq!(h.session.force_end(), Outcome::Applied, "from {phase}");
        assert_eq!(h.session.phase(), Phase::Waiting, "from {phase}");
        assert!(h.session.roster().is_empty());
        assert!(h.session.hunters().is_empty());
        assert!(h.session.evaders().is_empty());
        assert!(!h.session.has_timers());
        assert_eq!(h.clock.live_timers(), 0, "from {phase}");
        assert!(h.index.is_empty());

        assert_eq!(h.session.force_end(), Outcome::Ignored, "repeat from {phase}");
        h.advance(120);
        assert_eq!(h.session.phase(), Phase::Waiting);
    }
}

#[test]
fn test_force_end_on_idle_session_is_ignored() {
    let mut h = Harness::new(common::arena());
    assert_eq!(h.session.force_end(), Outcome::Ignored);
    assert_eq!(h.session.phase(), Phase::Waiting);
}

#[test]
fn test_stale_timer_delivery_is_ignored() {
    let mut h = Harness::new(common::arena());
    h.join_all([1, 2]);
    let foreign = h.clock.clone().schedule_once(std::time::Duration::from_secs(1));

    assert_eq!(h.session.on_timer(foreign), Outcome::Ignored);
    assert_eq!(h.session.remaining(), 10);
}

#[test]
fn test_shutdown_returns_players_without_broadcast() {
    let mut h = harness_in(Phase::Live);
    h.recorder.clear();

    h.session.shutdown();

    assert_eq!(h.session.phase(), Phase::Waiting);
    assert!(h.recorder.broadcasts().is_empty());
    assert_eq!(h.recorder.last_location_of(p(1)), Some(LocationRef::new(LOBBY)));
    assert_eq!(h.clock.live_timers(), 0);
}

// ---------------------------------------------------------------------------
// Arena snapshots & collaborators
// ---------------------------------------------------------------------------

#[test]
fn test_adopt_arena_only_between_rounds() {
    let mut h = Harness::new(common::arena());
    h.start_round(2);

    let mut edited = common::arena();
    edited.live_secs = 5;
    assert!(!h.session.adopt_arena(Arc::new(edited.clone())));
    h.release_hunters();
    assert_eq!(h.session.remaining(), 60, "running round keeps its snapshot");

    h.session.force_end();
    assert!(h.session.adopt_arena(Arc::new(edited)));
    assert_eq!(h.session.arena().live_secs, 5);
}

#[test]
fn test_adopt_arena_rejects_smaller_capacity_than_roster() {
    let mut h = Harness::new(common::arena());
    h.join(1);
    let mut edited = common::arena();
    edited.min_players = 3;
    edited.max_players = 3;
    assert!(h.session.adopt_arena(Arc::new(edited)));

    h.join_all([2, 3]);
    let mut tiny = common::arena();
    tiny.min_players = 1;
    tiny.max_players = 1;
    h.session.leave(p(3), false).unwrap();
    assert!(!h.session.adopt_arena(Arc::new(tiny)));
}

#[test]
fn test_failing_collaborators_do_not_stop_the_round() {
    let broken = Arc::new(Broken);
    let services = Services::new(broken.clone(), broken.clone(), broken);
    let mut h = Harness::with_services(
        common::arena(),
        common::session_config(),
        services,
        Arc::default(),
    );

    h.start_round(3);
    h.release_hunters();
    let hunter = h.hunters()[0];
    for evader in h.evaders() {
        h.session.eliminate(hunter, evader);
    }

    assert_eq!(h.session.phase(), Phase::Ending);
    h.advance(11);
    assert_eq!(h.session.phase(), Phase::Waiting);
}
