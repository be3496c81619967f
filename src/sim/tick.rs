//! Fixed timestep simulation tick
//!
//! The single scheduling loop. Spawn cadence, per-bug expiry and the
//! offscreen sweep all run from here against accumulators owned by the
//! session, so leaving the Playing phase halts every one of them at once -
//! there are no free-floating timers to cancel.

use super::spawn;
use super::state::{BugState, GameEvent, GamePhase, GameSession, SquashResult};
use crate::consts::*;

/// Input stimuli the shell gathered since the last tick.
///
/// One-shot: the shell clears it after the tick runs.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Bug ids tapped this frame, in arrival order
    pub squashes: Vec<u32>,
    /// Start/restart command (play and play-again buttons)
    pub start: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    if input.start {
        session.start();
    }

    // Idle and terminal sessions run nothing. This guard is what halts the
    // spawn scheduler and the sweep the instant the phase leaves Playing.
    if session.phase != GamePhase::Playing {
        return;
    }

    session.time_ticks += 1;

    // Squash stimuli first: taps were queued before this tick ran, so a tap
    // and an expiry landing on the same tick resolve in the player's favor.
    // The Alive guard makes the losing stimulus a no-op either way.
    for &id in &input.squashes {
        match session.squash_bug(id) {
            SquashResult::Scored { kind, points } => {
                session.score += points;
                session.events.push(GameEvent::Squashed {
                    id,
                    kind,
                    points,
                    score: session.score,
                });
                if session.score >= TARGET_SCORE {
                    finish(session, GamePhase::Won);
                    return;
                }
            }
            SquashResult::TooLate => {}
        }
    }

    // Age every bug; Alive bugs that run out their lifetime escape
    let mut escaped: Vec<u32> = Vec::new();
    for bug in &mut session.bugs {
        bug.age += dt;
        if bug.state == BugState::Alive && bug.age >= bug.lifetime {
            bug.state = BugState::Escaped;
            escaped.push(bug.id);
        }
    }
    for id in escaped {
        session.misses += 1;
        session.events.push(GameEvent::Escaped {
            id,
            misses: session.misses,
        });
        if session.misses >= MISS_LIMIT {
            finish(session, GamePhase::Lost);
            return;
        }
    }

    // Retire finished bugs: escaped ones immediately, squashed ones after
    // the pop-animation linger
    let events = &mut session.events;
    session.bugs.retain_mut(|bug| match bug.state {
        BugState::Alive => true,
        BugState::Escaped => {
            events.push(GameEvent::Retired { id: bug.id });
            false
        }
        BugState::Squashed { ref mut despawn } => {
            *despawn -= dt;
            if *despawn <= 0.0 {
                events.push(GameEvent::Retired { id: bug.id });
                false
            } else {
                true
            }
        }
    });

    // Spawn cadence
    session.spawn_acc += dt;
    while session.spawn_acc >= session.tuning.spawn_period {
        session.spawn_acc -= session.tuning.spawn_period;
        let _ = spawn::try_spawn(session);
    }

    // Defensive sweep for anything that slipped past the paths above
    session.sweep_acc += dt;
    if session.sweep_acc >= SWEEP_PERIOD {
        session.sweep_acc = 0.0;
        let swept = session.sweep_offscreen(|b| b.rise_progress() > OFFSCREEN_PROGRESS);
        if swept > 0 {
            log::debug!("Sweep removed {swept} stalled bugs");
        }
    }
}

/// Enter a terminal phase: freeze counters, destroy all entities and
/// cadences, notify the shell with the final score.
fn finish(session: &mut GameSession, phase: GamePhase) {
    debug_assert!(phase.is_terminal());
    session.phase = phase;
    session.bugs.clear();
    session.spawn_acc = 0.0;
    session.sweep_acc = 0.0;
    match phase {
        GamePhase::Won => {
            log::info!("Victory with {} points", session.score);
            session.events.push(GameEvent::Won {
                score: session.score,
            });
        }
        _ => {
            log::info!(
                "Defeat after {} misses ({} points)",
                session.misses,
                session.score
            );
            session.events.push(GameEvent::Lost {
                score: session.score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BugKind;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Preset that never spawns on its own, so tests control the bug set
    fn no_spawn() -> Tuning {
        Tuning {
            base_chance: 0.0,
            max_boost: 0.0,
            ..Tuning::classic()
        }
    }

    fn playing(tuning: Tuning) -> GameSession {
        let mut session = GameSession::new(1234, tuning);
        session.start();
        let _ = session.drain_events();
        session
    }

    fn squash(id: u32) -> TickInput {
        TickInput {
            squashes: vec![id],
            ..Default::default()
        }
    }

    /// Run ticks until the session leaves Playing or the time is up
    fn run_secs(session: &mut GameSession, secs: f32) {
        let steps = (secs / 0.05).ceil() as u32;
        for _ in 0..steps {
            if session.phase != GamePhase::Playing {
                return;
            }
            tick(session, &TickInput::default(), 0.05);
        }
    }

    #[test]
    fn test_idle_session_is_inert() {
        let mut session = GameSession::new(1, Tuning::classic());
        for _ in 0..100 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert_eq!(session.phase, GamePhase::Idle);
        assert_eq!(session.time_ticks, 0);
        assert!(session.bugs.is_empty());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_start_via_input() {
        let mut session = GameSession::new(1, Tuning::classic());
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.time_ticks, 1);
    }

    #[test]
    fn test_twenty_regular_squashes_win() {
        let mut session = playing(Tuning::classic());
        for n in 1..=20 {
            let id = spawn::spawn(&mut session, BugKind::Regular);
            tick(&mut session, &squash(id), SIM_DT);
            if n < 20 {
                assert_eq!(session.score, n * 1000);
                assert_eq!(session.phase, GamePhase::Playing);
            }
        }
        assert_eq!(session.score, 20_000);
        assert_eq!(session.misses, 0);
        assert_eq!(session.phase, GamePhase::Won);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::Won { score: 20_000 })
        );
        assert!(session.bugs.is_empty());
    }

    #[test]
    fn test_ten_escapes_lose() {
        let mut session = playing(no_spawn());
        for _ in 0..10 {
            let _ = spawn::spawn(&mut session, BugKind::Regular);
        }
        // Longest regular lifetime is under 6.5 s
        run_secs(&mut session, 8.0);
        assert_eq!(session.phase, GamePhase::Lost);
        assert_eq!(session.misses, 10);
        assert_eq!(session.score, 0);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::Lost { score: 0 })
        );
    }

    #[test]
    fn test_one_fast_squash_nine_escapes_still_playing() {
        let mut session = playing(no_spawn());
        let id = spawn::spawn(&mut session, BugKind::Fast);
        tick(&mut session, &squash(id), SIM_DT);
        assert_eq!(session.score, 2000);

        for _ in 0..9 {
            let _ = spawn::spawn(&mut session, BugKind::Regular);
        }
        run_secs(&mut session, 8.0);
        assert_eq!(session.score, 2000);
        assert_eq!(session.misses, 9);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_double_fire_scores_once() {
        let mut session = playing(no_spawn());
        let id = spawn::spawn(&mut session, BugKind::Regular);
        let _ = session.drain_events();

        let input = TickInput {
            squashes: vec![id, id],
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        assert_eq!(session.score, 1000);
        let squashes = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Squashed { .. }))
            .count();
        assert_eq!(squashes, 1);

        // And again on a later tick
        tick(&mut session, &squash(id), SIM_DT);
        assert_eq!(session.score, 1000);
    }

    #[test]
    fn test_overshoot_still_wins() {
        let mut session = playing(no_spawn());
        session.score = 19_500;
        let id = spawn::spawn(&mut session, BugKind::Fast);
        tick(&mut session, &squash(id), SIM_DT);
        assert_eq!(session.phase, GamePhase::Won);
        assert_eq!(session.score, 21_500);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::Won { score: 21_500 })
        );
    }

    #[test]
    fn test_terminal_session_ignores_stale_stimuli() {
        let mut session = playing(no_spawn());
        for _ in 0..10 {
            let _ = spawn::spawn(&mut session, BugKind::Regular);
        }
        let stale_id = session.bugs[0].id;
        run_secs(&mut session, 8.0);
        assert_eq!(session.phase, GamePhase::Lost);
        let _ = session.drain_events();

        let (score, misses, ticks) = (session.score, session.misses, session.time_ticks);
        for _ in 0..100 {
            tick(&mut session, &squash(stale_id), 0.05);
        }
        assert_eq!(session.phase, GamePhase::Lost);
        assert_eq!(session.score, score);
        assert_eq!(session.misses, misses);
        assert_eq!(session.time_ticks, ticks);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_scheduler_halts_after_terminal() {
        // Aggressive spawning while playing, then confirm silence after loss
        let tuning = Tuning {
            base_chance: 1.0,
            ..Tuning::classic()
        };
        let mut session = playing(tuning);
        run_secs(&mut session, 60.0);
        assert_eq!(session.phase, GamePhase::Lost);
        let _ = session.drain_events();

        // Ticks keep arriving from the shell, but nothing runs anymore
        for _ in 0..200 {
            tick(&mut session, &TickInput::default(), 0.05);
        }
        assert!(session.drain_events().is_empty());
        assert!(session.bugs.is_empty());
    }

    #[test]
    fn test_restart_after_loss() {
        let mut session = playing(no_spawn());
        for _ in 0..10 {
            let _ = spawn::spawn(&mut session, BugKind::Regular);
        }
        run_secs(&mut session, 8.0);
        assert_eq!(session.phase, GamePhase::Lost);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.misses, 0);
        assert!(session.bugs.is_empty());
    }

    #[test]
    fn test_squashed_bug_lingers_then_retires() {
        let mut session = playing(no_spawn());
        let id = spawn::spawn(&mut session, BugKind::Regular);
        tick(&mut session, &squash(id), SIM_DT);
        // Still present for the pop animation
        assert_eq!(session.bugs.len(), 1);

        run_secs(&mut session, 0.3);
        assert!(session.bugs.is_empty());
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::Retired { id })
        );
    }

    #[test]
    fn test_sweep_removes_stalled_bug_without_scoring() {
        let mut session = playing(no_spawn());
        let id = spawn::spawn(&mut session, BugKind::Regular);
        // Simulate a stalled despawn: squashed long ago, way past the top
        {
            let bug = session.bugs.iter_mut().find(|b| b.id == id).unwrap();
            bug.state = BugState::Squashed { despawn: 999.0 };
            bug.age = bug.lifetime * 2.0;
        }
        let _ = session.drain_events();

        run_secs(&mut session, 2.5);
        assert!(session.bugs.is_empty());
        assert_eq!(session.score, 0);
        assert_eq!(session.misses, 0);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::Retired { id })
        );
    }

    #[test]
    fn test_score_and_misses_monotonic_while_playing() {
        let tuning = Tuning {
            base_chance: 1.0,
            ..Tuning::classic()
        };
        let mut session = playing(tuning);
        let (mut last_score, mut last_misses) = (0, 0);
        for step in 0..600 {
            // Tap some alive bug every few ticks
            let input = if step % 3 == 0 {
                session
                    .bugs
                    .iter()
                    .find(|b| b.is_alive())
                    .map(|b| squash(b.id))
                    .unwrap_or_default()
            } else {
                TickInput::default()
            };
            tick(&mut session, &input, SIM_DT);
            if session.phase != GamePhase::Playing {
                break;
            }
            assert!(session.score >= last_score);
            assert!(session.misses >= last_misses);
            last_score = session.score;
            last_misses = session.misses;
        }
    }

    #[test]
    fn test_determinism() {
        // Same seed and same inputs must produce identical sessions
        let mut a = playing(Tuning::classic());
        let mut b = playing(Tuning::classic());
        for step in 0..600u32 {
            let input = if step % 7 == 0 {
                a.bugs
                    .iter()
                    .find(|bug| bug.is_alive())
                    .map(|bug| squash(bug.id))
                    .unwrap_or_default()
            } else {
                TickInput::default()
            };
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.misses, b.misses);
        assert_eq!(a.bugs.len(), b.bugs.len());
        for (x, y) in a.bugs.iter().zip(&b.bugs) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.lifetime, y.lifetime);
        }
    }

    proptest! {
        /// For any interleaving of taps and time on a single bug, exactly
        /// one of {score, miss} happens - never both, never neither.
        #[test]
        fn prop_single_bug_exactly_one_outcome(
            tap_ticks in proptest::collection::vec(0u32..240, 0..6)
        ) {
            let mut session = playing(no_spawn());
            let id = spawn::spawn(&mut session, BugKind::Regular);
            let _ = session.drain_events();

            let mut scored = 0u32;
            let mut missed = 0u32;
            // 12 s of 50 ms ticks comfortably outlives any regular bug
            for t in 0..240u32 {
                let input = if tap_ticks.contains(&t) {
                    squash(id)
                } else {
                    TickInput::default()
                };
                tick(&mut session, &input, 0.05);
                for event in session.drain_events() {
                    match event {
                        GameEvent::Squashed { .. } => scored += 1,
                        GameEvent::Escaped { .. } => missed += 1,
                        _ => {}
                    }
                }
            }
            prop_assert_eq!(scored + missed, 1);
            prop_assert!(scored == 0 || missed == 0);
            prop_assert_eq!(session.phase, GamePhase::Playing);
        }
    }
}
