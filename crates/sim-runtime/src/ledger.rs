//! Purchase, collection, and upgrade operations on the business ledger.

use crate::{GameError, Session};
use serde::Serialize;
use sim_core::{BusinessId, BusinessState, UpgradeKind, UpgradeTarget};
use tracing::debug;

/// Result of a successful business purchase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub business_id: BusinessId,
    pub amount: u32,
    pub cost: f64,
    /// True when a prestige auto-manager took over on the first purchase.
    pub auto_managed: bool,
}

/// Result of a successful manual collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectReceipt {
    pub business_id: BusinessId,
    pub revenue: f64,
}

impl Session {
    /// Total cost of buying `amount` units of a business right now.
    pub fn purchase_cost(&self, id: &BusinessId, amount: u32) -> Result<f64, GameError> {
        let arch = self
            .archetype(id)
            .ok_or_else(|| GameError::UnknownId(id.0.clone()))?;
        let owned = self.businesses.get(id).map_or(0, |s| s.owned);
        Ok(sim_econ::purchase_cost(arch, owned, amount))
    }

    /// Buy `amount` units. On the business's very first purchase, a
    /// prestige auto-manager takes over when the archetype sits within the
    /// granted catalog prefix.
    pub fn buy_business(
        &mut self,
        id: &BusinessId,
        amount: u32,
    ) -> Result<PurchaseReceipt, GameError> {
        if amount == 0 {
            return Err(GameError::InvalidState("purchase amount must be positive"));
        }
        let cost = self.purchase_cost(id, amount)?;
        if self.cash < cost {
            return Err(GameError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }
        let auto_managed = {
            let owned = self.businesses.get(id).map_or(0, |s| s.owned);
            owned == 0
                && self
                    .catalog
                    .business_index(id)
                    .is_some_and(|i| i < self.auto_manager_count)
        };
        let now = self.clock.now_ms();
        self.cash -= cost;
        let state = self.businesses.entry(id.clone()).or_default();
        state.owned += amount;
        if auto_managed {
            state.has_manager = true;
            state.last_collected_ms = Some(now);
            state.progress = 0.1;
        }
        debug!(business = %id.0, amount, cost, "business purchased");
        Ok(PurchaseReceipt {
            business_id: id.clone(),
            amount,
            cost,
            auto_managed,
        })
    }

    /// Buy as many units as the cash on hand covers.
    pub fn buy_max(&mut self, id: &BusinessId) -> Result<PurchaseReceipt, GameError> {
        let arch = self
            .archetype(id)
            .ok_or_else(|| GameError::UnknownId(id.0.clone()))?;
        let owned = self.businesses.get(id).map_or(0, |s| s.owned);
        let affordable = sim_econ::max_affordable(arch, owned, self.cash)
            .map_err(|_| GameError::InvalidState("cash is out of range"))?;
        if affordable == 0 {
            return Err(GameError::InsufficientFunds {
                required: sim_econ::unit_cost(arch, owned),
                available: self.cash,
            });
        }
        self.buy_business(id, affordable)
    }

    /// Collect a finished cycle by hand. Managed businesses self-collect on
    /// the tick and reject manual collection.
    pub fn collect(&mut self, id: &BusinessId) -> Result<CollectReceipt, GameError> {
        let level = self.prestige.level;
        let global = self.modifiers.global();
        let arch = self
            .archetype(id)
            .cloned()
            .ok_or_else(|| GameError::UnknownId(id.0.clone()))?;
        let state = self
            .businesses
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownId(id.0.clone()))?;
        if state.owned == 0 {
            return Err(GameError::InvalidState("business not owned"));
        }
        if state.has_manager {
            return Err(GameError::InvalidState("managed businesses self-collect"));
        }
        if state.progress < 100.0 {
            return Err(GameError::InvalidState("cycle not complete"));
        }
        let revenue = sim_econ::cycle_revenue(&arch, state, level, global);
        state.progress = 0.0;
        state.last_collected_ms = None;
        self.cash += revenue;
        self.total_earnings += revenue;
        debug!(business = %id.0, revenue, "cycle collected");
        Ok(CollectReceipt {
            business_id: id.clone(),
            revenue,
        })
    }

    /// Start an idle business's cycle by hand.
    pub fn start_business(&mut self, id: &BusinessId) -> Result<(), GameError> {
        let now = self.clock.now_ms();
        let state = self
            .businesses
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownId(id.0.clone()))?;
        if state.owned == 0 {
            return Err(GameError::InvalidState("business not owned"));
        }
        if state.has_manager {
            return Err(GameError::InvalidState("managed businesses run themselves"));
        }
        if state.progress != 0.0 {
            return Err(GameError::InvalidState("cycle already running"));
        }
        state.last_collected_ms = Some(now);
        // Non-zero sentinel distinguishing "started" from "never started".
        state.progress = 0.1;
        Ok(())
    }

    /// Hire the manager for a business; its cycle starts immediately.
    pub fn hire_manager(&mut self, manager_id: &str) -> Result<(), GameError> {
        let manager = self
            .catalog
            .manager(manager_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownId(manager_id.to_string()))?;
        let now = self.clock.now_ms();
        let owned = self
            .businesses
            .get(&manager.business_id)
            .map_or(0, |s| s.owned);
        if owned == 0 {
            return Err(GameError::InvalidState("business not owned"));
        }
        let state = self
            .businesses
            .get_mut(&manager.business_id)
            .ok_or_else(|| GameError::UnknownId(manager.business_id.0.clone()))?;
        if state.has_manager {
            return Err(GameError::InvalidState("manager already hired"));
        }
        if self.cash < manager.cost {
            return Err(GameError::InsufficientFunds {
                required: manager.cost,
                available: self.cash,
            });
        }
        self.cash -= manager.cost;
        state.has_manager = true;
        state.last_collected_ms = Some(now);
        state.progress = 0.1;
        debug!(manager = %manager.id, business = %manager.business_id.0, "manager hired");
        Ok(())
    }

    /// Buy a one-time upgrade and apply its multiplier to the target
    /// business, or to every business for an `All` upgrade.
    pub fn buy_upgrade(&mut self, upgrade_id: &str) -> Result<(), GameError> {
        let upgrade = self
            .find_upgrade(upgrade_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownId(upgrade_id.to_string()))?;
        if self.owned_upgrades.contains(upgrade_id) {
            return Err(GameError::InvalidState("upgrade already owned"));
        }
        if self.cash < upgrade.cost {
            return Err(GameError::InsufficientFunds {
                required: upgrade.cost,
                available: self.cash,
            });
        }
        self.cash -= upgrade.cost;
        self.owned_upgrades.insert(upgrade.id.clone());
        match &upgrade.target {
            UpgradeTarget::All => {
                for state in self.businesses.values_mut() {
                    apply_upgrade_kind(state, upgrade.kind, upgrade.multiplier);
                }
            }
            UpgradeTarget::Business(id) => {
                let state = self.businesses.entry(id.clone()).or_default();
                apply_upgrade_kind(state, upgrade.kind, upgrade.multiplier);
            }
        }
        debug!(upgrade = %upgrade.id, "upgrade purchased");
        Ok(())
    }
}

fn apply_upgrade_kind(state: &mut BusinessState, kind: UpgradeKind, multiplier: f64) {
    match kind {
        UpgradeKind::Speed => state.speed_multiplier *= multiplier,
        UpgradeKind::Profit => state.profit_multiplier *= multiplier,
    }
}
