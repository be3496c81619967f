//! Game state and core simulation types
//!
//! The session owns everything mutable: score, misses, phase, the live bug
//! set, the seeded RNG and all cadence accumulators. There is no state
//! outside it.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen, nothing running yet
    Idle,
    /// Active gameplay
    Playing,
    /// Target score reached
    Won,
    /// Miss limit reached
    Lost,
}

impl GamePhase {
    /// Won and Lost only leave via an explicit restart
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Bug variety - fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugKind {
    Regular,
    /// Rare (~10%), shorter lifetime, double points
    Fast,
}

impl BugKind {
    /// Points awarded for squashing this kind
    pub fn points(self) -> u32 {
        match self {
            BugKind::Regular => POINTS_REGULAR,
            BugKind::Fast => POINTS_FAST,
        }
    }
}

/// Bug lifecycle state - Alive is left exactly once
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BugState {
    /// Rising, can still be squashed or escape
    Alive,
    /// Tapped in time; lingers briefly for the pop animation
    Squashed { despawn: f32 },
    /// Reached the top unsquashed; counted as a miss
    Escaped,
}

/// A bug entity
#[derive(Debug, Clone)]
pub struct Bug {
    pub id: u32,
    pub kind: BugKind,
    /// Seconds from spawn to escape if left alone
    pub lifetime: f32,
    /// Seconds since spawn
    pub age: f32,
    /// Horizontal position in percent of screen width (cosmetic)
    pub x: f32,
    /// Stacking layer (cosmetic z-ordering)
    pub depth: u8,
    pub state: BugState,
}

impl Bug {
    pub fn is_alive(&self) -> bool {
        self.state == BugState::Alive
    }

    /// Fraction of the climb completed, 0.0 at the bottom, 1.0 at the top
    pub fn rise_progress(&self) -> f32 {
        self.age / self.lifetime
    }
}

/// Outcome of a squash attempt on a bug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquashResult {
    /// Bug was alive; points to award
    Scored { kind: BugKind, points: u32 },
    /// Bug already squashed, escaped, or unknown - nothing to score
    TooLate,
}

/// Notifications the shell drains after each tick.
///
/// The shell maps these to DOM element creation/removal, HUD updates and
/// sound effects. None of them feed back into the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Spawned {
        id: u32,
        kind: BugKind,
    },
    Squashed {
        id: u32,
        kind: BugKind,
        points: u32,
        score: u32,
    },
    Escaped {
        id: u32,
        misses: u32,
    },
    /// Entity fully retired; the shell should drop its visual handle
    Retired {
        id: u32,
    },
    Won {
        score: u32,
    },
    Lost {
        score: u32,
    },
}

/// Complete game session (deterministic)
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u32,
    pub misses: u32,
    /// Live and lingering bugs, in spawn order
    pub bugs: Vec<Bug>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) spawn_acc: f32,
    pub(crate) sweep_acc: f32,
    next_id: u32,
}

impl GameSession {
    /// Create an idle session with the given seed and balance preset
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            tuning,
            phase: GamePhase::Idle,
            score: 0,
            misses: 0,
            bugs: Vec::new(),
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            spawn_acc: 0.0,
            sweep_acc: 0.0,
            next_id: 1,
        }
    }

    /// Enter Playing with fresh counters.
    ///
    /// Valid from any phase: starting mid-game is a full reset, not an
    /// error. The RNG stream is not reseeded, so a scripted sequence of
    /// ticks stays reproducible across restarts.
    pub fn start(&mut self) {
        self.score = 0;
        self.misses = 0;
        self.bugs.clear();
        self.time_ticks = 0;
        self.spawn_acc = 0.0;
        self.sweep_acc = 0.0;
        self.phase = GamePhase::Playing;
        log::info!("Session started (seed {})", self.seed);
    }

    /// Restart from a terminal screen - same command as `start`
    pub fn restart(&mut self) {
        self.start();
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Bugs still in play, used by the scheduler's concurrency cap
    pub fn alive_count(&self) -> usize {
        self.bugs.iter().filter(|b| b.is_alive()).count()
    }

    /// Attempt to squash a bug. Idempotent: only an Alive bug scores, and
    /// it scores exactly once no matter how fast taps arrive.
    pub(crate) fn squash_bug(&mut self, id: u32) -> SquashResult {
        let Some(bug) = self.bugs.iter_mut().find(|b| b.id == id) else {
            return SquashResult::TooLate;
        };
        if bug.state != BugState::Alive {
            return SquashResult::TooLate;
        }
        bug.state = BugState::Squashed {
            despawn: DESPAWN_DELAY,
        };
        SquashResult::Scored {
            kind: bug.kind,
            points: bug.kind.points(),
        }
    }

    /// Force-remove lingering entities the predicate marks offscreen.
    ///
    /// Defensive cleanup only: never scores, never counts a miss. Emits a
    /// `Retired` event per removal so the shell can drop stray visuals.
    /// Returns the number of bugs removed.
    pub fn sweep_offscreen(&mut self, offscreen: impl Fn(&Bug) -> bool) -> usize {
        let before = self.bugs.len();
        let events = &mut self.events;
        self.bugs.retain(|bug| {
            if offscreen(bug) {
                events.push(GameEvent::Retired { id: bug.id });
                false
            } else {
                true
            }
        });
        before - self.bugs.len()
    }

    /// Take the pending events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
