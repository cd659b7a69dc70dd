//! Offline-progress reconciliation.
//!
//! The computation is side-effect free: it reports what managed businesses
//! would have produced during the absence, capped at a maximum window, and
//! nothing lands in the ledger until the player explicitly collects. The
//! session accepts that collection at most once.

use crate::{GameError, Session};
use serde::Serialize;
use sim_core::{BusinessArchetype, BusinessId, BusinessState};
use tracing::info;

/// One managed business's share of the offline report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BusinessEarnings {
    pub business_id: BusinessId,
    pub name: String,
    pub earned: f64,
    pub cycles: u64,
}

/// The informational result of reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OfflineReport {
    pub total_earned: f64,
    /// Only businesses that earned anything are listed.
    pub per_business: Vec<BusinessEarnings>,
    pub time_away_ms: i64,
}

/// Compute offline earnings for every owned, managed business:
/// floor(time_away / cycle_time) whole cycles at the usual cycle revenue,
/// scaled by the offline multiplier.
pub fn reconcile<'a>(
    now_ms: i64,
    last_seen_ms: i64,
    businesses: impl Iterator<Item = (&'a BusinessArchetype, &'a BusinessState)>,
    prestige_level: u32,
    global_multiplier: f64,
    offline_multiplier: f64,
    max_window_ms: i64,
) -> OfflineReport {
    let time_away_ms = (now_ms - last_seen_ms).clamp(0, max_window_ms);
    let mut total_earned = 0.0;
    let mut per_business = Vec::new();
    for (arch, state) in businesses {
        if state.owned == 0 || !state.has_manager {
            continue;
        }
        let cycle_ms = sim_econ::cycle_time_secs(arch, state) * 1_000.0;
        let cycles = (time_away_ms as f64 / cycle_ms).floor();
        let earned = sim_econ::cycle_revenue(arch, state, prestige_level, global_multiplier)
            * cycles
            * offline_multiplier;
        if earned > 0.0 {
            total_earned += earned;
            per_business.push(BusinessEarnings {
                business_id: arch.id.clone(),
                name: arch.name.clone(),
                earned,
                cycles: cycles as u64,
            });
        }
    }
    OfflineReport {
        total_earned,
        per_business,
        time_away_ms,
    }
}

impl Session {
    /// Reconcile against the given last-seen timestamp. Pure; call
    /// [`Session::collect_offline`] to commit the result.
    pub fn reconcile_offline(&self, last_seen_ms: i64) -> OfflineReport {
        let entries = self
            .catalog
            .businesses
            .iter()
            .chain(self.special_businesses.iter())
            .filter_map(|arch| self.businesses.get(&arch.id).map(|state| (arch, state)));
        reconcile(
            self.clock.now_ms(),
            last_seen_ms,
            entries,
            self.prestige.level,
            self.modifiers.global(),
            self.offline_multiplier,
            self.cfg.offline_cap_ms,
        )
    }

    /// Credit a reconciliation report. Guarded so a report can only be
    /// applied once per session.
    pub fn collect_offline(&mut self, report: &OfflineReport) -> Result<f64, GameError> {
        if self.offline_collected {
            return Err(GameError::InvalidState(
                "offline earnings already collected",
            ));
        }
        self.offline_collected = true;
        self.cash += report.total_earned;
        self.total_earnings += report.total_earned;
        info!(earned = report.total_earned, "offline earnings collected");
        Ok(report.total_earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use sim_core::Clock;

    #[test]
    fn managed_cycles_accrue_while_away() {
        // Two units at $10 per 60s cycle, away 650s: 10 whole cycles, $200.
        let (mut session, clock) = custom_session_at(0, 10.0, 60.0);
        fund(&mut session, 1_000.0);
        let kiosk = BusinessId::new("kiosk");
        session.buy_business(&kiosk, 2).unwrap();
        session.hire_manager("kiosk_manager").unwrap();

        let last_seen = clock.now_ms();
        clock.advance(650_000);
        let report = session.reconcile_offline(last_seen);

        assert_eq!(report.time_away_ms, 650_000);
        assert_eq!(report.per_business.len(), 1);
        assert_eq!(report.per_business[0].cycles, 10);
        assert_eq!(report.per_business[0].earned, 200.0);
        assert_eq!(report.total_earned, 200.0);
    }

    #[test]
    fn unmanaged_businesses_earn_nothing_offline() {
        let (mut session, clock) = custom_session_at(0, 10.0, 60.0);
        fund(&mut session, 1_000.0);
        session.buy_business(&BusinessId::new("kiosk"), 2).unwrap();

        let last_seen = clock.now_ms();
        clock.advance(650_000);
        let report = session.reconcile_offline(last_seen);
        assert_eq!(report.total_earned, 0.0);
        assert!(report.per_business.is_empty());
    }

    #[test]
    fn window_caps_at_24_hours() {
        let (mut session, clock) = custom_session_at(0, 10.0, 60.0);
        fund(&mut session, 1_000.0);
        let kiosk = BusinessId::new("kiosk");
        session.buy_business(&kiosk, 1).unwrap();
        session.hire_manager("kiosk_manager").unwrap();

        let last_seen = clock.now_ms();
        clock.advance(3 * 24 * 60 * 60 * 1_000);
        let report = session.reconcile_offline(last_seen);
        assert_eq!(report.time_away_ms, 24 * 60 * 60 * 1_000);
        assert_eq!(report.per_business[0].cycles, 24 * 60);
    }

    #[test]
    fn reconcile_has_no_side_effects_until_collected() {
        let (mut session, clock) = custom_session_at(0, 10.0, 60.0);
        fund(&mut session, 1_000.0);
        let kiosk = BusinessId::new("kiosk");
        session.buy_business(&kiosk, 2).unwrap();
        session.hire_manager("kiosk_manager").unwrap();

        let last_seen = clock.now_ms();
        clock.advance(650_000);
        let cash_before = session.cash();
        let earnings_before = session.total_earnings();

        let report = session.reconcile_offline(last_seen);
        let again = session.reconcile_offline(last_seen);
        assert_eq!(report, again);
        assert_eq!(session.cash(), cash_before);
        assert_eq!(session.total_earnings(), earnings_before);

        let collected = session.collect_offline(&report).unwrap();
        assert_eq!(collected, 200.0);
        assert_eq!(session.cash(), cash_before + 200.0);
        assert_eq!(session.total_earnings(), earnings_before + 200.0);

        // A second application is refused.
        assert!(session.collect_offline(&report).is_err());
        assert_eq!(session.cash(), cash_before + 200.0);
    }

    #[test]
    fn offline_multiplier_from_prestige_upgrade_doubles_earnings() {
        let (mut session, clock) = session_at(0);
        fund(&mut session, 1e6);
        grant_prestige_points(&mut session, 2);
        session.buy_prestige_upgrade("double_offline").unwrap();

        // Roastery: $540 per 6s cycle.
        let roastery = BusinessId::new("roastery");
        session.buy_business(&roastery, 1).unwrap();
        session.hire_manager("roastery_manager").unwrap();

        let last_seen = clock.now_ms();
        clock.advance(60_000);
        let report = session.reconcile_offline(last_seen);
        assert_eq!(report.per_business[0].cycles, 10);
        assert_eq!(report.total_earned, 2.0 * 10.0 * 540.0);
    }

    #[test]
    fn report_serializes_for_the_ui() {
        let (mut session, clock) = custom_session_at(0, 10.0, 60.0);
        fund(&mut session, 1_000.0);
        session.buy_business(&BusinessId::new("kiosk"), 2).unwrap();
        session.hire_manager("kiosk_manager").unwrap();
        clock.advance(650_000);
        let report = session.reconcile_offline(0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_earned"], 200.0);
        assert_eq!(json["per_business"][0]["cycles"], 10);
        assert_eq!(json["time_away_ms"], 650_000);
    }

    #[test]
    fn clock_regression_reports_nothing() {
        let (session, clock) = custom_session_at(1_000_000, 10.0, 60.0);
        let report = session.reconcile_offline(clock.now_ms() + 500_000);
        assert_eq!(report.time_away_ms, 0);
        assert_eq!(report.total_earned, 0.0);
    }
}
