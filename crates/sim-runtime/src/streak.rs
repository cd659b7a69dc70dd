//! The daily-login streak state machine.
//!
//! Day arithmetic is calendar-based (midnight-aligned dates, not elapsed
//! milliseconds), so a claim at 23:59 followed by one at 00:01 counts as
//! consecutive days.

use crate::Session;
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use serde::Serialize;
use sim_core::{Notice, StreakEntry};
use tracing::info;

/// How a claim advanced the streak.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ClaimOutcome {
    /// First claim ever.
    Started,
    /// Claimed on a consecutive calendar day (or the same day).
    Continued,
    /// A gap was bridged by consuming one protection day.
    Protected { missed_days: i64 },
    /// The gap exceeded the protection window; the streak restarted.
    Broken { missed_days: i64 },
}

/// Result of a streak claim.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreakClaim {
    pub streak: u32,
    pub reward: f64,
    pub outcome: ClaimOutcome,
    /// Set when the new streak length is a celebrated milestone.
    pub milestone: Option<u32>,
    pub protection_replenished: bool,
}

fn day_of(ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

fn midnight_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

impl Session {
    /// Claim today's streak day: advance, protect, or restart the streak,
    /// backfill missed days into the history, and pay the reward.
    pub fn claim_streak(&mut self) -> StreakClaim {
        let now_ms = self.clock.now_ms();
        let today = day_of(now_ms);
        let today_ms = midnight_ms(today);
        let level = self.prestige.level;

        let Some(last_claim_ms) = self.streak.last_claim_ms else {
            self.streak.current = 1;
            self.streak.last_claim_ms = Some(now_ms);
            self.streak.history.push(StreakEntry {
                date_ms: today_ms,
                claimed: true,
            });
            let reward = sim_econ::streak_reward(1, level);
            self.cash += reward;
            self.total_earnings += reward;
            info!(reward, "streak started");
            return StreakClaim {
                streak: 1,
                reward,
                outcome: ClaimOutcome::Started,
                milestone: None,
                protection_replenished: false,
            };
        };

        let last_day = day_of(last_claim_ms);
        let days_since = (today - last_day).num_days();
        let (streak, outcome) = if days_since <= 1 {
            (self.streak.current + 1, ClaimOutcome::Continued)
        } else if days_since <= self.streak.protection_days as i64 + 1 {
            self.streak.protection_days = self.streak.protection_days.saturating_sub(1);
            let missed_days = days_since - 1;
            self.notices
                .notify(Notice::StreakProtectionUsed { missed_days });
            (self.streak.current + 1, ClaimOutcome::Protected { missed_days })
        } else {
            (1, ClaimOutcome::Broken {
                missed_days: days_since - 1,
            })
        };

        // Skipped days enter the history as missed before today's claim.
        for offset in 1..days_since.max(1) {
            if let Some(missed) = last_day.checked_add_days(Days::new(offset as u64)) {
                self.streak.history.push(StreakEntry {
                    date_ms: midnight_ms(missed),
                    claimed: false,
                });
            }
        }
        self.streak.history.push(StreakEntry {
            date_ms: today_ms,
            claimed: true,
        });
        self.streak.current = streak;
        self.streak.last_claim_ms = Some(now_ms);

        let reward = sim_econ::streak_reward(streak, level);
        self.cash += reward;
        self.total_earnings += reward;

        let milestone = sim_econ::STREAK_MILESTONES
            .contains(&streak)
            .then_some(streak);
        if milestone.is_some() {
            self.notices.notify(Notice::StreakMilestone {
                days: streak,
                reward,
            });
        }

        let protection_replenished = streak % sim_econ::PROTECTION_REPLENISH_DAYS == 0;
        if protection_replenished {
            self.streak.protection_days =
                (self.streak.protection_days + 1).min(sim_econ::MAX_PROTECTION_DAYS);
            self.notices.notify(Notice::StreakProtectionReplenished);
        }

        info!(streak, reward, "streak claimed");
        StreakClaim {
            streak,
            reward,
            outcome,
            milestone,
            protection_replenished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    const DAY_MS: i64 = 24 * 60 * 60 * 1_000;
    /// 2024-03-01 09:00:00 UTC.
    const START_MS: i64 = 1_709_283_600_000;

    #[test]
    fn first_claim_starts_the_streak() {
        let (mut session, _clock) = session_at(START_MS);
        let cash_before = session.cash();
        let claim = session.claim_streak();
        assert_eq!(claim.streak, 1);
        assert_eq!(claim.outcome, ClaimOutcome::Started);
        assert_eq!(claim.reward, 200.0);
        assert_eq!(session.cash(), cash_before + 200.0);
        assert_eq!(session.streak().history.len(), 1);
        assert!(session.streak().history[0].claimed);
    }

    #[test]
    fn seven_consecutive_days_replenish_protection() {
        let (mut session, clock) = session_at(START_MS);
        assert_eq!(session.streak().protection_days, 1);
        let mut last = session.claim_streak();
        for _ in 0..6 {
            clock.advance(DAY_MS);
            last = session.claim_streak();
        }
        assert_eq!(last.streak, 7);
        assert_eq!(last.milestone, Some(7));
        assert!(last.protection_replenished);
        assert_eq!(session.streak().protection_days, 2);
        // Reward stepped up at day seven.
        assert_eq!(last.reward, 1_000.0);
    }

    #[test]
    fn same_day_double_claim_still_advances() {
        // The UI prevents this; the state machine treats it as the
        // zero-day edge of "consecutive".
        let (mut session, clock) = session_at(START_MS);
        session.claim_streak();
        clock.advance(60_000);
        let claim = session.claim_streak();
        assert_eq!(claim.streak, 2);
        assert_eq!(claim.outcome, ClaimOutcome::Continued);
    }

    #[test]
    fn protection_bridges_a_gap_and_is_consumed() {
        let (mut session, clock) = session_at(START_MS);
        session.claim_streak();
        clock.advance(DAY_MS);
        session.claim_streak(); // streak 2, protection 1

        // Miss one day: gap of 2 days <= protection(1) + 1.
        clock.advance(2 * DAY_MS);
        let claim = session.claim_streak();
        assert_eq!(claim.streak, 3);
        assert_eq!(claim.outcome, ClaimOutcome::Protected { missed_days: 1 });
        assert_eq!(session.streak().protection_days, 0);

        // The missed day was backfilled.
        let history = &session.streak().history;
        assert_eq!(history.len(), 4);
        assert!(!history[2].claimed);
        assert!(history[3].claimed);
    }

    #[test]
    fn gap_beyond_protection_breaks_the_streak() {
        let (mut session, clock) = session_at(START_MS);
        session.claim_streak();
        clock.advance(DAY_MS);
        session.claim_streak();

        // Protection covers one missed day; three is a break.
        clock.advance(4 * DAY_MS);
        let claim = session.claim_streak();
        assert_eq!(claim.streak, 1);
        assert_eq!(claim.outcome, ClaimOutcome::Broken { missed_days: 3 });
        // Protection is not consumed by a break.
        assert_eq!(session.streak().protection_days, 1);
        // Three missed days backfilled plus today's claim.
        let history = &session.streak().history;
        assert_eq!(history.len(), 6);
        assert!(history[2..5].iter().all(|e| !e.claimed));
        assert!(history[5].claimed);
    }

    #[test]
    fn milestones_flag_the_celebrated_lengths() {
        let (mut session, clock) = session_at(START_MS);
        let mut milestones = Vec::new();
        let claim = session.claim_streak();
        if let Some(m) = claim.milestone {
            milestones.push(m);
        }
        for _ in 0..29 {
            clock.advance(DAY_MS);
            let claim = session.claim_streak();
            if let Some(m) = claim.milestone {
                milestones.push(m);
            }
        }
        assert_eq!(milestones, vec![3, 7, 14, 30]);
    }

    #[test]
    fn streak_reward_scales_with_prestige_level() {
        let (mut session, _clock) = session_at(START_MS);
        credit_earnings(&mut session, 1.5e9);
        session.perform_prestige().unwrap();
        assert_eq!(session.prestige().level, 3);
        let claim = session.claim_streak();
        assert_eq!(claim.reward, 600.0);
    }

    #[test]
    fn calendar_days_not_elapsed_hours_decide_continuity() {
        // 2024-03-01 23:30 UTC, then 2024-03-02 00:30 UTC: one hour apart
        // but consecutive calendar days.
        let late_evening = START_MS + 14 * 60 * 60 * 1_000 + 30 * 60 * 1_000;
        let (mut session, clock) = session_at(late_evening);
        session.claim_streak();
        clock.advance(60 * 60 * 1_000);
        let claim = session.claim_streak();
        assert_eq!(claim.streak, 2);
        assert_eq!(claim.outcome, ClaimOutcome::Continued);
    }
}
