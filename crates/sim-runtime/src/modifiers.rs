//! Active income modifiers and the combined global multiplier.
//!
//! The multiplier is recomputed synchronously inside every mutation, so a
//! reader can never observe a stale value between a modifier change and the
//! next recalculation.

use sim_core::Modifier;

/// Stack of multiplicative modifiers plus the seasonal factor.
#[derive(Debug)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
    seasonal_factor: f64,
    global: f64,
}

impl Default for ModifierStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierStack {
    pub fn new() -> Self {
        Self {
            modifiers: Vec::new(),
            seasonal_factor: 1.0,
            global: 1.0,
        }
    }

    /// The current combined multiplier: the product of every active
    /// modifier factor times the seasonal factor.
    pub fn global(&self) -> f64 {
        self.global
    }

    pub fn active(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Add or refresh a modifier. A modifier with the same id replaces the
    /// existing one, which is how a re-triggered event extends its run.
    pub fn add(&mut self, modifier: Modifier) {
        self.modifiers.retain(|m| m.id != modifier.id);
        self.modifiers.push(modifier);
        self.recalculate();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.id != id);
        let removed = self.modifiers.len() != before;
        if removed {
            self.recalculate();
        }
        removed
    }

    /// Install the active seasonal event's multiplier (1.0 when none).
    pub fn set_seasonal(&mut self, factor: f64) {
        self.seasonal_factor = factor;
        self.recalculate();
    }

    /// Drop every timed modifier whose expiry has passed. Returns the ids
    /// of the expired modifiers; the multiplier is already recomputed when
    /// any were dropped.
    pub fn expire(&mut self, now_ms: i64) -> Vec<String> {
        let mut expired = Vec::new();
        self.modifiers.retain(|m| match m.expires_at_ms {
            Some(t) if t <= now_ms => {
                expired.push(m.id.clone());
                false
            }
            _ => true,
        });
        if !expired.is_empty() {
            self.recalculate();
        }
        expired
    }

    /// Recompute the combined multiplier from scratch. Idempotent.
    pub fn recalculate(&mut self) {
        self.global = self.modifiers.iter().map(|m| m.factor).product::<f64>()
            * self.seasonal_factor;
    }
}
