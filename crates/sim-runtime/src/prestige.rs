//! The prestige reset: trade the current run for a permanent level
//! multiplier and spendable points.

use crate::{GameError, Session};
use serde::Serialize;
use sim_core::{BusinessState, PrestigeEffect};
use tracing::info;

/// Result of a prestige reset (or a preview of one).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrestigeOutcome {
    pub previous_level: u32,
    pub new_level: u32,
    pub points_gained: u32,
    pub starting_cash: f64,
}

impl Session {
    /// Whether lifetime earnings qualify for a prestige reset.
    pub fn prestige_eligible(&self) -> bool {
        sim_econ::prestige_eligible(self.total_earnings)
    }

    /// What a prestige performed right now would yield. The level never
    /// goes down and points gained never go negative, so a stale run
    /// cannot damage the prestige state.
    pub fn prestige_preview(&self) -> PrestigeOutcome {
        let previous_level = self.prestige.level;
        let new_level = sim_econ::prestige_level_for(self.total_earnings).max(previous_level);
        PrestigeOutcome {
            previous_level,
            new_level,
            points_gained: new_level - previous_level,
            starting_cash: self.starting_cash,
        }
    }

    /// Reset the run in exchange for the new prestige level.
    ///
    /// Lifetime earnings, achievements, statistics, streaks, and active
    /// modifiers all survive; the ledger, run upgrades, and auto-brewers
    /// do not. Auto-managers from prestige upgrades are re-granted only
    /// after the ledger reset has fully completed.
    pub fn perform_prestige(&mut self) -> Result<PrestigeOutcome, GameError> {
        if !self.prestige_eligible() {
            return Err(GameError::InvalidState(
                "prestige requires $1M lifetime earnings",
            ));
        }
        let outcome = self.prestige_preview();
        self.prestige.points += outcome.points_gained;
        self.prestige.level = outcome.new_level;

        for state in self.businesses.values_mut() {
            *state = BusinessState::default();
        }
        self.owned_upgrades.clear();
        self.auto_brewers = 0;
        self.passive_rate = 0.0;
        self.income_multiplier = 1.0;
        self.last_passive_credit_ms = None;
        self.cash = self.starting_cash;

        let granted: Vec<_> = self
            .catalog
            .businesses
            .iter()
            .take(self.auto_manager_count)
            .map(|b| b.id.clone())
            .collect();
        for id in granted {
            if let Some(state) = self.businesses.get_mut(&id) {
                state.has_manager = true;
            }
        }

        info!(
            level = outcome.new_level,
            points = outcome.points_gained,
            "prestige performed"
        );
        Ok(outcome)
    }

    /// Spend prestige points on a permanent upgrade.
    pub fn buy_prestige_upgrade(&mut self, upgrade_id: &str) -> Result<(), GameError> {
        let upgrade = self
            .catalog
            .prestige_upgrade(upgrade_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownId(upgrade_id.to_string()))?;
        if self.prestige.owned_upgrades.contains(upgrade_id) {
            return Err(GameError::InvalidState("prestige upgrade already owned"));
        }
        if self.prestige.points < upgrade.cost_points {
            return Err(GameError::InsufficientFunds {
                required: upgrade.cost_points as f64,
                available: self.prestige.points as f64,
            });
        }
        self.prestige.points -= upgrade.cost_points;
        self.prestige.owned_upgrades.insert(upgrade.id.clone());
        match upgrade.effect {
            PrestigeEffect::SpeedAll(factor) => {
                for state in self.businesses.values_mut() {
                    state.speed_multiplier *= factor;
                }
            }
            PrestigeEffect::ProfitAll(factor) => {
                for state in self.businesses.values_mut() {
                    state.profit_multiplier *= factor;
                }
            }
            PrestigeEffect::StartingCash(amount) => self.starting_cash = amount,
            PrestigeEffect::AutoManagers(count) => self.auto_manager_count = count,
            PrestigeEffect::OfflineMultiplier(factor) => self.offline_multiplier = factor,
            PrestigeEffect::TipMultiplier(factor) => self.tip_multiplier = factor,
            PrestigeEffect::MinigameMultiplier(factor) => self.minigame_multiplier = factor,
        }
        info!(upgrade = %upgrade.id, "prestige upgrade purchased");
        Ok(())
    }
}
