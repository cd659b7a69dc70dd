#![deny(warnings)]

//! Economic models: cost curves, revenue, prestige and streak formulas for
//! Bean Tycoon.
//!
//! This module provides validated utilities for:
//! - Geometric purchase pricing and greedy bulk-buy affordability
//! - Cycle timing and revenue under the multiplier stack
//! - Prestige level thresholds and streak reward scaling
//! - Mini-game reward contracts (scoring stays with the UI)

use sim_core::{BusinessArchetype, BusinessState};
use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Cash on hand must be finite and non-negative.
    #[error("invalid cash amount: {0}")]
    InvalidCash(f64),
}

/// Cost of the next single unit when `owned` are already held.
///
/// Example:
/// let cart = &Catalog::standard().businesses[0];
/// assert_eq!(unit_cost(cart, 0), 4.0);
pub fn unit_cost(archetype: &BusinessArchetype, owned: u32) -> f64 {
    archetype.base_cost * archetype.cost_multiplier.powi(owned as i32)
}

/// Total cost of buying `amount` more units starting from `owned`.
///
/// This is the exact geometric sum Σ base_cost × growth^(owned+i), summed
/// unit by unit. The closed form drifts from per-unit pricing once floats
/// round, so bulk purchases must accumulate exactly like repeated single
/// purchases do.
pub fn purchase_cost(archetype: &BusinessArchetype, owned: u32, amount: u32) -> f64 {
    let mut total = 0.0;
    for i in 0..amount {
        total += unit_cost(archetype, owned + i);
    }
    total
}

/// Largest `n` whose cumulative cost fits in `cash`, by greedy accumulation.
///
/// Each next unit is priced from the running owned+purchased count. The
/// result brackets the budget: purchase_cost(owned, n) <= cash <
/// purchase_cost(owned, n + 1).
pub fn max_affordable(
    archetype: &BusinessArchetype,
    owned: u32,
    cash: f64,
) -> Result<u32, EconError> {
    if !cash.is_finite() || cash < 0.0 {
        return Err(EconError::InvalidCash(cash));
    }
    let mut count = 0u32;
    let mut total = 0.0;
    loop {
        let next = unit_cost(archetype, owned + count);
        if total + next > cash {
            return Ok(count);
        }
        total += next;
        count += 1;
    }
}

/// Seconds one cycle takes under the state's speed multiplier.
pub fn cycle_time_secs(archetype: &BusinessArchetype, state: &BusinessState) -> f64 {
    archetype.base_time_secs / state.speed_multiplier
}

/// Revenue of one completed cycle:
/// base_revenue × owned × profit × prestige level × global multiplier.
pub fn cycle_revenue(
    archetype: &BusinessArchetype,
    state: &BusinessState,
    prestige_level: u32,
    global_multiplier: f64,
) -> f64 {
    archetype.base_revenue
        * state.owned as f64
        * state.profit_multiplier
        * prestige_level as f64
        * global_multiplier
}

/// Steady-state income per second of a managed business.
pub fn income_per_second(
    archetype: &BusinessArchetype,
    state: &BusinessState,
    prestige_level: u32,
    global_multiplier: f64,
) -> f64 {
    if state.owned == 0 || !state.has_manager {
        return 0.0;
    }
    cycle_revenue(archetype, state, prestige_level, global_multiplier)
        / cycle_time_secs(archetype, state)
}

/// Lifetime earnings required before the first prestige.
pub const PRESTIGE_THRESHOLD: f64 = 1_000_000.0;

/// Whether lifetime earnings qualify for a prestige reset.
pub fn prestige_eligible(total_earnings: f64) -> bool {
    total_earnings >= PRESTIGE_THRESHOLD
}

/// Prestige level earned by lifetime earnings:
/// max(1, floor(log10(total / 1e6))).
///
/// Example: 1e8 lifetime earnings yield level 2.
pub fn prestige_level_for(total_earnings: f64) -> u32 {
    let magnitude = (total_earnings / PRESTIGE_THRESHOLD).log10().floor();
    if !magnitude.is_finite() || magnitude < 1.0 {
        1
    } else {
        magnitude as u32
    }
}

/// Streak reward in dollars: a step table scaled by prestige level.
pub fn streak_reward(streak_days: u32, prestige_level: u32) -> f64 {
    let base: f64 = if streak_days >= 365 {
        50_000.0
    } else if streak_days >= 180 {
        20_000.0
    } else if streak_days >= 90 {
        10_000.0
    } else if streak_days >= 30 {
        5_000.0
    } else if streak_days >= 14 {
        2_000.0
    } else if streak_days >= 7 {
        1_000.0
    } else if streak_days >= 3 {
        500.0
    } else {
        200.0
    };
    (base * prestige_level as f64).floor()
}

/// Streak lengths celebrated as milestones.
pub const STREAK_MILESTONES: [u32; 7] = [3, 7, 14, 30, 90, 180, 365];

/// Consecutive days between protection-day replenishments.
pub const PROTECTION_REPLENISH_DAYS: u32 = 7;

/// Maximum banked protection days.
pub const MAX_PROTECTION_DAYS: u32 = 3;

/// Bean-sorting reward contract: accuracy times base and difficulty,
/// floored. Scoring itself happens in the mini-game's own input loop.
pub fn bean_sorting_reward(score: u32, total_beans: u32, base_reward: f64, difficulty: u32) -> f64 {
    if total_beans == 0 {
        return 0.0;
    }
    let accuracy = score as f64 / total_beans as f64;
    (base_reward * difficulty as f64 * accuracy).floor()
}

/// Latte-art reward contract: pattern reward scaled by the 0-100 score and
/// difficulty, floored.
pub fn latte_art_reward(score: u32, pattern_reward: f64, difficulty: u32) -> f64 {
    (pattern_reward * (score.min(100) as f64 / 100.0) * difficulty as f64).floor()
}
