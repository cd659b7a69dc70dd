//! Counter service: walk-in customers, the daily reward, auto-brewer
//! passive income, and the mini-game reward contracts.

use crate::{GameError, Session};
use serde::Serialize;
use sim_core::Notice;
use tracing::debug;

/// A customer currently waiting at the counter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActiveCustomer {
    pub id: u64,
    pub profile_id: String,
}

/// Result of serving a customer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServeReceipt {
    pub customer_id: u64,
    pub amount: f64,
    pub tip: f64,
    /// How many of the customer's three preferences the drink matched.
    pub matches: u8,
}

impl Session {
    pub(crate) fn spawn_customer(&mut self) {
        let count = self.catalog.customers.len();
        if count == 0 {
            return;
        }
        let index = self.rng.pick(count);
        let profile_id = self.catalog.customers[index].id.clone();
        let id = self.next_customer_id;
        self.next_customer_id += 1;
        self.customers.push(ActiveCustomer {
            id,
            profile_id: profile_id.clone(),
        });
        self.notices.notify(Notice::CustomerArrived { profile_id });
    }

    /// Serve a waiting customer. `matches` counts how many of the three
    /// drink preferences were hit and drives the tip factor; base amount
    /// and tip come from the order the UI assembled.
    pub fn serve_customer(
        &mut self,
        customer_id: u64,
        base_amount: f64,
        base_tip: f64,
        matches: u8,
    ) -> Result<ServeReceipt, GameError> {
        let position = self
            .customers
            .iter()
            .position(|c| c.id == customer_id)
            .ok_or_else(|| GameError::UnknownId(customer_id.to_string()))?;
        let match_factor = match matches.min(3) {
            3 => 2.0,
            2 => 1.5,
            1 => 1.0,
            _ => 0.5,
        };
        let level = self.prestige.level as f64;
        let global = self.modifiers.global();
        let amount = (base_amount * level * global).floor();
        let tip = (base_tip * match_factor * level * global * self.tip_multiplier).floor();
        self.cash += amount + tip;
        self.total_earnings += amount + tip;
        self.customers_served += 1;
        self.customers.remove(position);
        debug!(customer = customer_id, amount, tip, "customer served");
        Ok(ServeReceipt {
            customer_id,
            amount,
            tip,
            matches: matches.min(3),
        })
    }

    /// A customer got tired of waiting and left.
    pub fn customer_left(&mut self, customer_id: u64) -> bool {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != customer_id);
        self.customers.len() != before
    }

    /// Claim the daily reward: 10% of cash on hand, at least $100.
    pub fn claim_daily_reward(&mut self) -> Result<f64, GameError> {
        if !self.daily_reward_available {
            return Err(GameError::InvalidState("daily reward not ready"));
        }
        let reward = (self.cash * 0.1).max(100.0);
        self.cash += reward;
        self.daily_reward_available = false;
        debug!(reward, "daily reward claimed");
        Ok(reward)
    }

    /// Buy an auto-brewer: geometric pricing, each adds 5/s scaled by the
    /// income multiplier.
    pub fn buy_auto_brewer(&mut self) -> Result<f64, GameError> {
        let cost = (100.0 * 1.5f64.powi(self.auto_brewers as i32)).floor();
        if self.cash < cost {
            return Err(GameError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }
        self.cash -= cost;
        self.auto_brewers += 1;
        self.passive_rate += 5.0 * self.income_multiplier;
        Ok(cost)
    }

    /// Raise the passive-income multiplier by 0.5 and rescale the rate.
    pub fn buy_income_multiplier(&mut self) -> Result<f64, GameError> {
        let cost = (200.0 * 2.0f64.powf(self.income_multiplier - 1.0)).floor();
        if self.cash < cost {
            return Err(GameError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }
        self.cash -= cost;
        let previous = self.income_multiplier;
        self.income_multiplier += 0.5;
        if self.passive_rate > 0.0 {
            self.passive_rate = self.passive_rate / previous * self.income_multiplier;
        }
        Ok(cost)
    }

    pub fn auto_brewers(&self) -> u32 {
        self.auto_brewers
    }

    pub fn passive_rate(&self) -> f64 {
        self.passive_rate
    }

    /// Credit whole dollars of passive income accrued since the last
    /// credit. Runs on the slow tick.
    pub(crate) fn credit_passive_income(&mut self, now_ms: i64) {
        if self.auto_brewers == 0 {
            self.last_passive_credit_ms = Some(now_ms);
            return;
        }
        let Some(last) = self.last_passive_credit_ms else {
            self.last_passive_credit_ms = Some(now_ms);
            return;
        };
        let elapsed_secs = (now_ms - last) as f64 / 1_000.0;
        if elapsed_secs < 1.0 {
            return;
        }
        let income = (self.passive_rate * elapsed_secs).floor();
        if income > 0.0 {
            self.cash += income;
        }
        self.last_passive_credit_ms = Some(now_ms);
    }

    /// Bank a finished bean-sorting run. The reward contract lives in
    /// sim-econ; prestige scales it, capped at $500 per run.
    pub fn complete_bean_sorting(
        &mut self,
        score: u32,
        total_beans: u32,
        base_reward: f64,
        difficulty: u32,
    ) -> f64 {
        let reward = sim_econ::bean_sorting_reward(score, total_beans, base_reward, difficulty);
        let payout = (reward * self.prestige.level as f64).min(500.0).floor();
        self.cash += payout;
        self.total_earnings += payout;
        if score > self.bean_sorting_high_score {
            self.bean_sorting_high_score = score;
        }
        payout
    }

    /// Bank a finished latte-art run. The master-barista prestige upgrade
    /// multiplies the payout, capped at $750 per run.
    pub fn complete_latte_art(&mut self, score: u32, pattern_reward: f64, difficulty: u32) -> f64 {
        let reward = sim_econ::latte_art_reward(score, pattern_reward, difficulty);
        let payout = (reward * self.prestige.level as f64 * self.minigame_multiplier)
            .min(750.0)
            .floor();
        self.cash += payout;
        self.total_earnings += payout;
        if score > self.latte_art_high_score {
            self.latte_art_high_score = score;
        }
        payout
    }

    pub fn bean_sorting_high_score(&self) -> u32 {
        self.bean_sorting_high_score
    }

    pub fn latte_art_high_score(&self) -> u32 {
        self.latte_art_high_score
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::*;
    use crate::GameError;
    use sim_core::Clock;

    #[test]
    fn customers_spawn_up_to_the_cap() {
        // Each slow tick: event roll misses, customer roll hits, pick.
        let rolls = [
            0.9, 0.01, 0.0, // tick 1: spawn profile 0
            0.9, 0.01, 0.3, // tick 2: spawn
            0.9, 0.01, 0.7, // tick 3: spawn
            0.9, 0.01, 0.5, // tick 4: at cap, roll hits but no spawn
        ];
        let (mut session, clock, _log) = scripted_session_at(1_710_504_000_000, rolls);
        for _ in 0..4 {
            clock.advance(1_000);
            session.slow_tick(clock.now_ms());
        }
        assert_eq!(session.customers().len(), 3);
    }

    #[test]
    fn serving_pays_amount_plus_matched_tip() {
        let (mut session, clock, _log) = scripted_session_at(
            1_710_504_000_000,
            [0.9, 0.01, 0.0],
        );
        clock.advance(1_000);
        session.slow_tick(clock.now_ms());
        let customer_id = session.customers()[0].id;

        let cash_before = session.cash();
        let receipt = session.serve_customer(customer_id, 8.0, 3.0, 3).unwrap();
        assert_eq!(receipt.amount, 8.0);
        // Perfect match doubles the tip.
        assert_eq!(receipt.tip, 6.0);
        assert_eq!(session.cash(), cash_before + 14.0);
        assert_eq!(session.customers_served(), 1);
        assert!(session.customers().is_empty());

        assert!(matches!(
            session.serve_customer(customer_id, 8.0, 3.0, 3),
            Err(GameError::UnknownId(_))
        ));
    }

    #[test]
    fn loyalty_upgrade_raises_tips() {
        let (mut session, clock, _log) = scripted_session_at(
            1_710_504_000_000,
            [0.9, 0.01, 0.0],
        );
        grant_prestige_points(&mut session, 2);
        session.buy_prestige_upgrade("customer_loyalty").unwrap();
        clock.advance(1_000);
        session.slow_tick(clock.now_ms());
        let customer_id = session.customers()[0].id;
        let receipt = session.serve_customer(customer_id, 8.0, 4.0, 2).unwrap();
        // 4 * 1.5 (two matches) * 1.75 (loyalty) = 10.5, floored.
        assert_eq!(receipt.tip, 10.0);
    }

    #[test]
    fn customer_departure_frees_a_slot() {
        let (mut session, clock, _log) = scripted_session_at(
            1_710_504_000_000,
            [0.9, 0.01, 0.0],
        );
        clock.advance(1_000);
        session.slow_tick(clock.now_ms());
        let customer_id = session.customers()[0].id;
        assert!(session.customer_left(customer_id));
        assert!(!session.customer_left(customer_id));
        assert!(session.customers().is_empty());
    }

    #[test]
    fn daily_reward_pays_a_tenth_with_a_floor() {
        let (mut session, _clock) = session_at(0);
        // Fresh session: 10% of $4 is under the floor.
        let reward = session.claim_daily_reward().unwrap();
        assert_eq!(reward, 100.0);
        assert!(matches!(
            session.claim_daily_reward(),
            Err(GameError::InvalidState(_))
        ));

        let (mut session, _clock) = session_at(0);
        fund(&mut session, 5_000.0);
        assert_eq!(session.claim_daily_reward().unwrap(), 500.0);
    }

    #[test]
    fn auto_brewers_cost_geometrically_and_accrue() {
        let (mut session, clock) = session_at(0);
        fund(&mut session, 1_000.0);
        assert_eq!(session.buy_auto_brewer().unwrap(), 100.0);
        assert_eq!(session.buy_auto_brewer().unwrap(), 150.0);
        assert_eq!(session.auto_brewers(), 2);
        assert_eq!(session.passive_rate(), 10.0);

        let cash_before = session.cash();
        clock.advance(1_000);
        session.slow_tick(clock.now_ms());
        clock.advance(1_000);
        session.slow_tick(clock.now_ms());
        // The first credit anchors the window; only the second pays.
        assert_eq!(session.cash(), cash_before + 10.0);
    }

    #[test]
    fn income_multiplier_rescales_the_rate() {
        let (mut session, _clock) = session_at(0);
        fund(&mut session, 10_000.0);
        session.buy_auto_brewer().unwrap();
        assert_eq!(session.passive_rate(), 5.0);
        assert_eq!(session.buy_income_multiplier().unwrap(), 200.0);
        assert_eq!(session.passive_rate(), 7.5);
        // Next multiplier costs 200 * 2^0.5.
        let cost = session.buy_income_multiplier().unwrap();
        assert_eq!(cost, (200.0 * 2.0f64.powf(0.5)).floor());
        assert_eq!(session.passive_rate(), 10.0);
    }

    #[test]
    fn bean_sorting_payout_caps_at_500() {
        let (mut session, _clock) = session_at(0);
        let payout = session.complete_bean_sorting(18, 20, 50.0, 2);
        // floor(50 * 2 * 0.9) = 90, level 1.
        assert_eq!(payout, 90.0);
        assert_eq!(session.bean_sorting_high_score(), 18);

        let payout = session.complete_bean_sorting(20, 20, 500.0, 3);
        assert_eq!(payout, 500.0);
        assert_eq!(session.bean_sorting_high_score(), 20);
    }

    #[test]
    fn latte_art_payout_honors_master_barista() {
        let (mut session, _clock) = session_at(0);
        let payout = session.complete_latte_art(80, 150.0, 1);
        assert_eq!(payout, 120.0);

        grant_prestige_points(&mut session, 3);
        session.buy_prestige_upgrade("master_barista").unwrap();
        let payout = session.complete_latte_art(80, 150.0, 1);
        // 120 * 3 = 360, under the cap.
        assert_eq!(payout, 360.0);
        let payout = session.complete_latte_art(100, 300.0, 2);
        // 600 * 3 caps at 750.
        assert_eq!(payout, 750.0);
    }

    #[test]
    fn perfect_sort_unlocks_the_achievement_on_the_next_tick() {
        let (mut session, clock) = session_at(0);
        session.complete_bean_sorting(100, 100, 50.0, 2);
        assert_eq!(session.bean_sorting_high_score(), 100);
        clock.advance(100);
        session.fast_tick(clock.now_ms());
        assert!(session.unlocked_achievements().contains("bean_master"));
    }
}
