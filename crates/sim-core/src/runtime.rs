//! External collaborators the simulation is parameterized over: a clock, a
//! random source, and a fire-and-forget notification sink. Core logic never
//! reads wall time or entropy directly; binaries wire the system
//! implementations, tests wire the manual ones.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A source of the current time in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time from the operating system.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            Err(_) => 0,
        }
    }
}

/// A clock tests can set and advance explicitly.
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now_ms.set(ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// A source of uniform random numbers in [0, 1).
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index into a collection of `len` elements. `len` must be > 0.
    fn pick(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// Seeded ChaCha8 stream; the same seed reproduces the same session.
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// A scripted sequence for tests. Once the script runs out, every roll
/// returns 1.0 - epsilon, which suppresses all chance-gated behavior.
pub struct ScriptedRandom {
    values: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(1.0 - f64::EPSILON)
    }
}

/// Messages the core emits for a UI collaborator to render. The core never
/// waits on delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    /// Managers banked a batch of completed cycles.
    AutoCollected { amount: f64 },
    /// A random event is waiting for the player's decision.
    EventSurfaced { event_id: String },
    /// A timed modifier went live.
    EventStarted { event_id: String, duration_secs: u64 },
    /// A timed modifier expired.
    EventEnded { modifier_id: String },
    SeasonalStarted { event_id: String },
    SeasonalEnded { event_id: String },
    AchievementUnlocked { achievement_id: String },
    CustomerArrived { profile_id: String },
    DailyRewardReady,
    StreakMilestone { days: u32, reward: f64 },
    StreakProtectionUsed { missed_days: i64 },
    StreakProtectionReplenished,
}

/// Fire-and-forget notification sink.
pub trait Notices {
    fn notify(&mut self, notice: Notice);
}

/// Discards every notice.
pub struct NullNotices;

impl Notices for NullNotices {
    fn notify(&mut self, _notice: Notice) {}
}
