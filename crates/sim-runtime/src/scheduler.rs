//! The periodic simulation driver.
//!
//! Two periods run side by side: a fast bookkeeping tick (business cycles,
//! modifier expiry, daily-reward countdown, achievements) and a slow
//! accounting tick (play time, passive income, stochastic events, seasonal
//! calendar). The [`Scheduler`] holds the due-times and always calls into
//! the live session, so no tick ever observes a stale snapshot.

use crate::Session;
use sim_core::Notice;
use tracing::info;

/// Fires due ticks against a session. Within one `pump`, every due fast
/// tick completes (including its batched cash credit) before a slow tick
/// with the same due-time runs.
pub struct Scheduler {
    fast_period_ms: i64,
    slow_period_ms: i64,
    next_fast_ms: i64,
    next_slow_ms: i64,
}

/// Upper bound on ticks replayed in one pump. Gaps longer than this are
/// offline time and belong to the offline reconciler, not tick catch-up.
const MAX_TICKS_PER_PUMP: u32 = 1_200;

impl Scheduler {
    pub fn new(session: &Session, now_ms: i64) -> Self {
        let cfg = session.config();
        Self {
            fast_period_ms: cfg.fast_tick_ms,
            slow_period_ms: cfg.slow_tick_ms,
            next_fast_ms: now_ms + cfg.fast_tick_ms,
            next_slow_ms: now_ms + cfg.slow_tick_ms,
        }
    }

    /// Fire everything due up to `now_ms`. Returns the number of ticks run.
    pub fn pump(&mut self, session: &mut Session, now_ms: i64) -> u32 {
        let mut fired = 0;
        while self.next_fast_ms.min(self.next_slow_ms) <= now_ms {
            if fired >= MAX_TICKS_PER_PUMP {
                info!("tick backlog too large, skipping ahead");
                self.next_fast_ms = now_ms + self.fast_period_ms;
                self.next_slow_ms = now_ms + self.slow_period_ms;
                break;
            }
            if self.next_fast_ms <= self.next_slow_ms {
                session.fast_tick(self.next_fast_ms);
                self.next_fast_ms += self.fast_period_ms;
            } else {
                session.slow_tick(self.next_slow_ms);
                self.next_slow_ms += self.slow_period_ms;
            }
            fired += 1;
        }
        fired
    }
}

impl Session {
    /// The fast bookkeeping tick.
    pub fn fast_tick(&mut self, now_ms: i64) {
        let mut batch = 0.0;
        let level = self.prestige.level;
        let global = self.modifiers.global();
        let catalog = &self.catalog;
        let specials = &self.special_businesses;
        for arch in catalog.businesses.iter().chain(specials.iter()) {
            let Some(state) = self.businesses.get_mut(&arch.id) else {
                continue;
            };
            if state.owned == 0 {
                continue;
            }
            if state.has_manager {
                let Some(last) = state.last_collected_ms else {
                    // First tick after the manager took over: open a cycle
                    // and resume on the next tick.
                    state.last_collected_ms = Some(now_ms);
                    state.progress = 0.1;
                    continue;
                };
                let elapsed_secs = (now_ms - last) as f64 / 1_000.0;
                let cycle_secs = sim_econ::cycle_time_secs(arch, state);
                let completed = (elapsed_secs / cycle_secs).floor();
                if completed >= 1.0 {
                    batch += completed * sim_econ::cycle_revenue(arch, state, level, global);
                    // Advance by whole cycles rather than snapping to `now`,
                    // so partial cycle time is never double-counted or lost.
                    state.last_collected_ms =
                        Some(last + (completed * cycle_secs * 1_000.0) as i64);
                    let remaining_secs = elapsed_secs - completed * cycle_secs;
                    state.progress = (remaining_secs / cycle_secs) * 100.0;
                } else {
                    state.progress = (elapsed_secs / cycle_secs) * 100.0;
                }
            } else if let Some(last) = state.last_collected_ms {
                if state.progress < 100.0 {
                    let elapsed_secs = (now_ms - last) as f64 / 1_000.0;
                    let cycle_secs = sim_econ::cycle_time_secs(arch, state);
                    state.progress = ((elapsed_secs / cycle_secs) * 100.0).min(100.0);
                }
            }
        }
        // One batched credit per tick instead of per-business updates.
        if batch > 0.0 {
            self.cash += batch;
            self.total_earnings += batch;
            if batch >= 100.0 {
                self.notices.notify(Notice::AutoCollected { amount: batch });
            }
        }

        self.daily_reward_countdown_secs -= self.cfg.fast_tick_ms as f64 / 1_000.0;
        if self.daily_reward_countdown_secs <= 0.0 {
            self.daily_reward_countdown_secs = self.cfg.daily_reward_secs;
            self.daily_reward_available = true;
            self.notices.notify(Notice::DailyRewardReady);
        }

        for id in self.modifiers.expire(now_ms) {
            self.notices.notify(Notice::EventEnded { modifier_id: id });
        }

        self.check_achievements();
    }

    /// The slow accounting tick.
    pub fn slow_tick(&mut self, now_ms: i64) {
        self.seconds_played += 1;
        self.credit_passive_income(now_ms);

        let event_roll = self.rng.next_f64();
        if event_roll < self.cfg.random_event_chance && self.pending_event.is_none() {
            let count = self.catalog.random_events.len();
            if count > 0 {
                let idx = self.rng.pick(count);
                let event_id = self.catalog.random_events[idx].id.clone();
                self.pending_event = Some(event_id.clone());
                self.notices.notify(Notice::EventSurfaced { event_id });
            }
        }

        let customer_roll = self.rng.next_f64();
        if customer_roll < self.cfg.customer_spawn_chance
            && self.customers.len() < self.cfg.max_customers
        {
            self.spawn_customer();
        }

        self.check_seasonal(now_ms);
    }

    fn check_achievements(&mut self) {
        use sim_core::{AchievementRequirement, AchievementReward, Modifier};

        let mut unlocked = Vec::new();
        for achievement in &self.catalog.achievements {
            if self.unlocked_achievements.contains(&achievement.id) {
                continue;
            }
            let achieved = match &achievement.requirement {
                AchievementRequirement::Earnings(v) => self.total_earnings >= *v,
                AchievementRequirement::BusinessCount(v) => {
                    self.businesses.values().any(|s| s.owned >= *v)
                }
                AchievementRequirement::MinigameScore(v) => {
                    self.bean_sorting_high_score >= *v || self.latte_art_high_score >= *v
                }
                AchievementRequirement::CustomersServed(v) => self.customers_served >= *v,
                AchievementRequirement::PrestigeLevel(v) => self.prestige.level >= *v,
            };
            if achieved {
                unlocked.push((achievement.id.clone(), achievement.reward.clone()));
            }
        }
        for (id, reward) in unlocked {
            self.unlocked_achievements.insert(id.clone());
            match reward {
                AchievementReward::Cash(amount) => self.cash += amount,
                AchievementReward::Multiplier(factor) => self.modifiers.add(Modifier {
                    id: format!("achievement:{id}"),
                    factor,
                    expires_at_ms: None,
                }),
            }
            info!(achievement = %id, "achievement unlocked");
            self.notices
                .notify(Notice::AchievementUnlocked { achievement_id: id });
        }
    }
}
