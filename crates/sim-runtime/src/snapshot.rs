//! Bridging the live session to the persisted key-value records.
//!
//! Loading is tolerant end to end: the persistence layer substitutes
//! defaults for missing or corrupt records, and applying a record never
//! fails. Saving is best-effort; a failed write is logged and play
//! continues.

use crate::Session;
use persistence::{
    load_save, load_streak, store_save, store_streak, KvStore, SaveRecord, StreakHistoryRecord,
    StreakRecord,
};
use sim_core::StreakEntry;
use tracing::{info, warn};

impl Session {
    /// Snapshot the persisted portion of the session.
    pub fn to_save_record(&self) -> SaveRecord {
        SaveRecord {
            last_online_time: self.clock.now_ms(),
            seconds_passed: self.seconds_played,
            total_earnings: self.total_earnings,
            cash: self.cash,
            prestige_level: self.prestige.level,
            prestige_points: self.prestige.points,
        }
    }

    /// Restore the persisted portion of the session.
    pub fn apply_save_record(&mut self, record: &SaveRecord) {
        self.seconds_played = record.seconds_passed;
        self.total_earnings = record.total_earnings;
        self.cash = record.cash;
        self.prestige.level = record.prestige_level.max(1);
        self.prestige.points = record.prestige_points;
        self.last_online_ms = record.last_online_time;
    }

    pub fn to_streak_record(&self) -> StreakRecord {
        StreakRecord {
            current_streak: self.streak.current,
            last_streak_claim: self.streak.last_claim_ms,
            streak_history: self
                .streak
                .history
                .iter()
                .map(|e| StreakHistoryRecord {
                    date: e.date_ms,
                    claimed: e.claimed,
                })
                .collect(),
            streak_protection: self.streak.protection_days,
        }
    }

    pub fn apply_streak_record(&mut self, record: &StreakRecord) {
        self.streak.current = record.current_streak;
        self.streak.last_claim_ms = record.last_streak_claim;
        self.streak.history = record
            .streak_history
            .iter()
            .map(|e| StreakEntry {
                date_ms: e.date,
                claimed: e.claimed,
            })
            .collect();
        self.streak.protection_days = record.streak_protection;
    }

    /// Write both records. Best-effort: failures are logged, never raised.
    pub fn save_to(&self, store: &mut dyn KvStore) {
        if let Err(e) = store_save(store, &self.to_save_record()) {
            warn!(error = %e, "saving game record failed");
        }
        if let Err(e) = store_streak(store, &self.to_streak_record()) {
            warn!(error = %e, "saving streak record failed");
        }
    }

    /// Read both records (defaults on absence or corruption) and apply
    /// them. Returns the loaded last-online timestamp for offline
    /// reconciliation; 0 means there was no previous session.
    pub fn load_from(&mut self, store: &dyn KvStore) -> i64 {
        let save = load_save(store);
        let streak = load_streak(store);
        self.apply_save_record(&save);
        self.apply_streak_record(&streak);
        info!(
            cash = save.cash,
            prestige_level = save.prestige_level,
            "session state loaded"
        );
        save.last_online_time
    }
}
