//! Spawn scheduling
//!
//! Probabilistic spawning with a score-driven difficulty ramp. The cadence
//! itself (one decision every `spawn_period`) is driven by the tick loop;
//! this module owns the per-decision logic.

use rand::Rng;

use super::state::{Bug, BugKind, BugState, GameEvent, GameSession};
use crate::consts::*;
use crate::tuning::Tuning;

/// Spawn probability for a single scheduler decision.
///
/// Monotonically increasing in score, capped at `base_chance + max_boost`.
pub fn spawn_chance(tuning: &Tuning, score: u32) -> f32 {
    tuning.base_chance + (score as f32 / tuning.score_scale).min(tuning.max_boost)
}

/// One scheduler decision: maybe introduce a new bug.
///
/// Skips when the preset's concurrency cap is reached. Otherwise draws a
/// uniform value against the ramped chance, then a second weighted draw for
/// the kind (~10% fast).
pub(crate) fn try_spawn(session: &mut GameSession) -> Option<u32> {
    if let Some(cap) = session.tuning.max_active {
        if session.alive_count() >= cap {
            return None;
        }
    }

    let chance = spawn_chance(&session.tuning, session.score);
    if session.rng.random::<f32>() >= chance {
        return None;
    }

    let kind = if session.rng.random::<f32>() < session.tuning.fast_chance {
        BugKind::Fast
    } else {
        BugKind::Regular
    };
    Some(spawn(session, kind))
}

/// Create a bug of the given kind with randomized lifetime and position.
///
/// Lifetime comes from the preset's kind-dependent range and is fixed for
/// the bug's whole life; position and depth are cosmetic.
pub(crate) fn spawn(session: &mut GameSession, kind: BugKind) -> u32 {
    let (lo, hi) = match kind {
        BugKind::Regular => session.tuning.regular_lifetime,
        BugKind::Fast => session.tuning.fast_lifetime,
    };
    let lifetime = session.rng.random_range(lo..hi);
    let x = session.rng.random_range(LANE_MIN_X..LANE_MAX_X);
    let depth = session.rng.random_range(DEPTH_MIN..DEPTH_MAX);

    let id = session.next_entity_id();
    session.bugs.push(Bug {
        id,
        kind,
        lifetime,
        age: 0.0,
        x,
        depth,
        state: BugState::Alive,
    });
    session.events.push(GameEvent::Spawned { id, kind });
    id
}
