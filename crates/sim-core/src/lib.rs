#![deny(warnings)]

//! Core domain models and invariants for Bean Tycoon.
//!
//! This crate defines serializable types used across the simulation with
//! validation helpers to guarantee basic invariants, plus the external
//! collaborator traits (clock, randomness, notifications) the runtime is
//! parameterized over.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod catalog;
pub mod runtime;

pub use catalog::Catalog;
pub use runtime::{
    Clock, ManualClock, Notice, Notices, NullNotices, RandomSource, ScriptedRandom, SeededRandom,
    SystemClock,
};

/// Unique identifier for a business archetype, e.g. "coffee_cart".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BusinessId(pub String);

impl BusinessId {
    pub fn new(id: &str) -> Self {
        BusinessId(id.to_string())
    }
}

/// A catalog entry describing one type of income-generating unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessArchetype {
    /// Archetype identifier, e.g. "roastery".
    pub id: BusinessId,
    /// Display name.
    pub name: String,
    /// Cost of the first unit in dollars.
    pub base_cost: f64,
    /// Revenue per completed cycle per unit owned.
    pub base_revenue: f64,
    /// Seconds one production cycle takes at speed 1.
    pub base_time_secs: f64,
    /// Geometric cost growth per unit owned (> 1).
    pub cost_multiplier: f64,
    /// Revenue scaling hook carried from the catalog source; no formula
    /// reads it today.
    pub revenue_multiplier: f64,
}

/// Mutable per-archetype state. One exists for every catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessState {
    /// Units owned.
    pub owned: u32,
    /// Whether a manager auto-runs this business.
    pub has_manager: bool,
    /// Multiplicative cycle-speed factor (>= 1).
    pub speed_multiplier: f64,
    /// Multiplicative profit factor (>= 1).
    pub profit_multiplier: f64,
    /// Start of the current cycle in epoch ms; None when idle.
    pub last_collected_ms: Option<i64>,
    /// Percentage of the current cycle elapsed, 0..=100.
    /// Meaningful only while owned > 0.
    pub progress: f64,
}

impl Default for BusinessState {
    fn default() -> Self {
        Self {
            owned: 0,
            has_manager: false,
            speed_multiplier: 1.0,
            profit_multiplier: 1.0,
            last_collected_ms: None,
            progress: 0.0,
        }
    }
}

/// A purchasable automation flag for one business.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manager {
    pub id: String,
    pub business_id: BusinessId,
    pub name: String,
    pub cost: f64,
    pub description: String,
}

/// Which multiplier an upgrade raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    Speed,
    Profit,
}

/// What an upgrade applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTarget {
    Business(BusinessId),
    All,
}

/// A one-time purchasable multiplier for a business (or all of them).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub target: UpgradeTarget,
    pub name: String,
    pub cost: f64,
    pub multiplier: f64,
    pub kind: UpgradeKind,
    pub description: String,
}

/// Permanent effect granted by a prestige upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrestigeEffect {
    /// Multiply every business's speed multiplier.
    SpeedAll(f64),
    /// Multiply every business's profit multiplier.
    ProfitAll(f64),
    /// Cash granted after each prestige reset.
    StartingCash(f64),
    /// The first N catalog businesses start managed.
    AutoManagers(usize),
    /// Factor applied to offline earnings.
    OfflineMultiplier(f64),
    /// Factor applied to customer tips.
    TipMultiplier(f64),
    /// Factor applied to mini-game rewards.
    MinigameMultiplier(f64),
}

/// An upgrade bought with prestige points; survives every reset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrestigeUpgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost_points: u32,
    pub effect: PrestigeEffect,
}

/// A temporary or permanent multiplicative bonus to global income.
///
/// `expires_at_ms = None` marks a permanent modifier (achievement rewards);
/// timed modifiers are removed once the clock passes their expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    /// Multiplicative factor contributed to the global multiplier.
    pub factor: f64,
    pub expires_at_ms: Option<i64>,
}

/// Prestige progression. `level` never decreases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeState {
    pub level: u32,
    pub points: u32,
    pub owned_upgrades: BTreeSet<String>,
}

impl Default for PrestigeState {
    fn default() -> Self {
        Self {
            level: 1,
            points: 0,
            owned_upgrades: BTreeSet::new(),
        }
    }
}

/// One calendar day in the streak log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakEntry {
    /// Midnight of the day in epoch ms.
    pub date_ms: i64,
    pub claimed: bool,
}

/// Daily-login streak state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub last_claim_ms: Option<i64>,
    /// Append-only log of claimed and missed days.
    pub history: Vec<StreakEntry>,
    /// Grace days that bridge a gap without breaking the streak (0..=3).
    pub protection_days: u32,
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            current: 0,
            last_claim_ms: None,
            history: Vec::new(),
            protection_days: 1,
        }
    }
}

/// What unlocks an achievement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AchievementRequirement {
    /// Lifetime earnings reach the threshold.
    Earnings(f64),
    /// Any single business reaches the owned count.
    BusinessCount(u32),
    /// Any mini-game high score reaches the threshold.
    MinigameScore(u32),
    /// Customers served reaches the threshold.
    CustomersServed(u64),
    /// Prestige level reaches the threshold.
    PrestigeLevel(u32),
}

/// What an achievement pays out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AchievementReward {
    Cash(f64),
    /// Permanent global multiplier.
    Multiplier(f64),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirement: AchievementRequirement,
    pub reward: AchievementReward,
}

/// A calendar-driven event with a global multiplier and optional special
/// catalog additions active only while the event runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeasonalEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    /// First active month, 1..=12.
    pub start_month: u32,
    /// Last active month, 1..=12. May be smaller than `start_month` for
    /// events spanning the year boundary.
    pub end_month: u32,
    /// When set, the event is active only on this day of `start_month`.
    pub single_day: Option<u32>,
    pub global_multiplier: f64,
    pub special_business: Option<BusinessArchetype>,
    pub special_upgrades: Vec<Upgrade>,
}

/// Outcome of choosing one option of a choice event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptionOutcome {
    /// Guaranteed cash grant.
    Cash(f64),
    /// Cash grant with the given win probability, nothing otherwise.
    GambleCash { amount: f64, win_chance: f64 },
    /// Cash now, plus a temporary income penalty.
    CashWithPenalty {
        amount: f64,
        penalty_factor: f64,
        duration_secs: u64,
    },
    Nothing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventOption {
    pub text: String,
    pub effect_text: String,
    pub outcome: OptionOutcome,
}

/// Payload of a random event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EventKind {
    /// Timed global multiplier change. The resulting modifier factor is
    /// `1 + value`, so value 2.0 triples income and value -0.5 halves it.
    Timed { value: f64, duration_secs: u64 },
    /// The player picks one of several outcomes.
    Choice { options: Vec<EventOption> },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: EventKind,
}

/// Customer preference weights, 0..=1 each.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerPreferences {
    pub quality: f64,
    pub price: f64,
    pub speed: f64,
    pub loyalty: f64,
}

/// A catalog profile for one kind of walk-in customer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub preferences: CustomerPreferences,
    pub spending_limit: f64,
    pub visit_frequency: f64,
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Bookkeeping tick period in ms.
    pub fast_tick_ms: i64,
    /// Accounting/stochastic tick period in ms.
    pub slow_tick_ms: i64,
    /// Seed for the session RNG.
    pub rng_seed: u64,
    /// Cap on the offline-reconciliation window in ms.
    pub offline_cap_ms: i64,
    /// Per-second chance a random event surfaces.
    pub random_event_chance: f64,
    /// Per-second chance a customer walks in.
    pub customer_spawn_chance: f64,
    /// Concurrent customer cap.
    pub max_customers: usize,
    /// Seconds between daily rewards.
    pub daily_reward_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fast_tick_ms: 100,
            slow_tick_ms: 1_000,
            rng_seed: 42,
            offline_cap_ms: 24 * 60 * 60 * 1_000,
            random_event_chance: 0.01,
            customer_spawn_chance: 0.05,
            max_customers: 3,
            daily_reward_secs: 24.0 * 60.0 * 60.0,
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
    /// Price or revenue must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Cycle time must be strictly positive.
    #[error("cycle time must be > 0")]
    NonPositiveTime,
    /// Cost growth must be strictly greater than 1.
    #[error("cost multiplier must be > 1")]
    CostMultiplierTooLow,
    /// Duplicate id in a catalog section.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// Manager or upgrade points at a business the catalog does not have.
    #[error("unknown business: {0}")]
    UnknownBusiness(String),
    /// Month fields must be within 1..=12.
    #[error("month {0} is out of range [1, 12]")]
    MonthOutOfRange(u32),
}

/// Validate a single business archetype.
pub fn validate_archetype(a: &BusinessArchetype) -> Result<(), ValidationError> {
    if !(a.base_cost.is_finite()
        && a.base_revenue.is_finite()
        && a.base_time_secs.is_finite()
        && a.cost_multiplier.is_finite()
        && a.revenue_multiplier.is_finite())
    {
        return Err(ValidationError::NonFinite);
    }
    if a.base_cost < 0.0 || a.base_revenue < 0.0 {
        return Err(ValidationError::NegativeMoney);
    }
    if a.base_time_secs <= 0.0 {
        return Err(ValidationError::NonPositiveTime);
    }
    if a.cost_multiplier <= 1.0 {
        return Err(ValidationError::CostMultiplierTooLow);
    }
    Ok(())
}

/// Validate the full catalog, including cross-references from managers and
/// upgrades to business archetypes.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&BusinessId> = BTreeSet::new();
    for b in &catalog.businesses {
        validate_archetype(b)?;
        if !ids.insert(&b.id) {
            return Err(ValidationError::DuplicateId(b.id.0.clone()));
        }
    }
    for m in &catalog.managers {
        if !ids.contains(&m.business_id) {
            return Err(ValidationError::UnknownBusiness(m.business_id.0.clone()));
        }
        if m.cost < 0.0 {
            return Err(ValidationError::NegativeMoney);
        }
    }
    for u in &catalog.upgrades {
        if let UpgradeTarget::Business(id) = &u.target {
            if !ids.contains(id) {
                return Err(ValidationError::UnknownBusiness(id.0.clone()));
            }
        }
        if u.cost < 0.0 {
            return Err(ValidationError::NegativeMoney);
        }
        if !u.multiplier.is_finite() || u.multiplier < 1.0 {
            return Err(ValidationError::NonFinite);
        }
    }
    for s in &catalog.seasonal_events {
        if !(1..=12).contains(&s.start_month) {
            return Err(ValidationError::MonthOutOfRange(s.start_month));
        }
        if !(1..=12).contains(&s.end_month) {
            return Err(ValidationError::MonthOutOfRange(s.end_month));
        }
        if let Some(special) = &s.special_business {
            validate_archetype(special)?;
        }
    }
    Ok(())
}
