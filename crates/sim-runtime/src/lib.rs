#![deny(warnings)]

//! The live simulation session for Bean Tycoon.
//!
//! A [`Session`] owns every piece of mutable game state (ledger, modifier
//! stack, prestige, streak, statistics) plus its injected collaborators:
//! a clock, a random source, and a notification sink. Nothing in here reads
//! wall time or entropy directly, and there is no ambient global state; the
//! UI holds one `Session` and calls its operation methods, while a
//! [`Scheduler`] drives the periodic ticks.

use sim_core::{
    BusinessArchetype, BusinessId, BusinessState, Catalog, Clock, Notices, PrestigeState,
    RandomSource, SimConfig, StreakState, Upgrade, ValidationError,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

mod events;
mod ledger;
mod modifiers;
mod offline;
mod prestige;
mod scheduler;
mod service;
mod snapshot;
mod streak;

pub use events::EventOutcome;
pub use ledger::{CollectReceipt, PurchaseReceipt};
pub use modifiers::ModifierStack;
pub use offline::{BusinessEarnings, OfflineReport};
pub use prestige::PrestigeOutcome;
pub use scheduler::Scheduler;
pub use service::{ActiveCustomer, ServeReceipt};
pub use streak::{ClaimOutcome, StreakClaim};

/// Errors returned by session operations. None of them change state.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    /// The action costs more than the player has.
    #[error("insufficient funds: need {required:.2}, have {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },
    /// The action is not valid in the current state; a no-op for the caller.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// The id does not resolve against the catalog or live state.
    #[error("unknown id: {0}")]
    UnknownId(String),
}

/// One running game. All mutation goes through `&mut self` methods, so every
/// operation is atomic from the perspective of any reader.
pub struct Session {
    cfg: SimConfig,
    catalog: Catalog,
    clock: Box<dyn Clock>,
    rng: Box<dyn RandomSource>,
    notices: Box<dyn Notices>,

    cash: f64,
    total_earnings: f64,
    businesses: BTreeMap<BusinessId, BusinessState>,
    owned_upgrades: BTreeSet<String>,
    modifiers: ModifierStack,
    prestige: PrestigeState,
    streak: StreakState,

    // Permanent settings granted by prestige upgrades.
    starting_cash: f64,
    auto_manager_count: usize,
    offline_multiplier: f64,
    tip_multiplier: f64,
    minigame_multiplier: f64,

    // Random and seasonal events.
    pending_event: Option<String>,
    active_seasonal: Option<String>,
    special_businesses: Vec<BusinessArchetype>,
    special_upgrades: Vec<Upgrade>,

    // Walk-in customers.
    customers: Vec<ActiveCustomer>,
    next_customer_id: u64,
    customers_served: u64,

    // Auto-brewer passive income.
    auto_brewers: u32,
    passive_rate: f64,
    income_multiplier: f64,
    last_passive_credit_ms: Option<i64>,

    // Daily reward.
    daily_reward_available: bool,
    daily_reward_countdown_secs: f64,

    // Statistics.
    seconds_played: u64,
    total_clicks: u64,
    bean_sorting_high_score: u32,
    latte_art_high_score: u32,

    unlocked_achievements: BTreeSet<String>,
    offline_collected: bool,
    last_online_ms: i64,
}

impl Session {
    /// Build a session over a validated catalog. Every archetype gets a
    /// zeroed ledger entry up front.
    pub fn new(
        catalog: Catalog,
        cfg: SimConfig,
        clock: Box<dyn Clock>,
        rng: Box<dyn RandomSource>,
        notices: Box<dyn Notices>,
    ) -> Result<Self, ValidationError> {
        sim_core::validate_catalog(&catalog)?;
        let businesses = catalog
            .businesses
            .iter()
            .map(|b| (b.id.clone(), BusinessState::default()))
            .collect();
        let daily_reward_countdown_secs = cfg.daily_reward_secs;
        Ok(Self {
            cfg,
            catalog,
            clock,
            rng,
            notices,
            cash: 4.0,
            total_earnings: 0.0,
            businesses,
            owned_upgrades: BTreeSet::new(),
            modifiers: ModifierStack::new(),
            prestige: PrestigeState::default(),
            streak: StreakState::default(),
            starting_cash: 4.0,
            auto_manager_count: 0,
            offline_multiplier: 1.0,
            tip_multiplier: 1.0,
            minigame_multiplier: 1.0,
            pending_event: None,
            active_seasonal: None,
            special_businesses: Vec::new(),
            special_upgrades: Vec::new(),
            customers: Vec::new(),
            next_customer_id: 1,
            customers_served: 0,
            auto_brewers: 0,
            passive_rate: 0.0,
            income_multiplier: 1.0,
            last_passive_credit_ms: None,
            daily_reward_available: true,
            daily_reward_countdown_secs,
            seconds_played: 0,
            total_clicks: 0,
            bean_sorting_high_score: 0,
            latte_art_high_score: 0,
            unlocked_achievements: BTreeSet::new(),
            offline_collected: false,
            last_online_ms: 0,
        })
    }

    /// Archetype lookup across the base catalog and active seasonal
    /// specials.
    fn archetype(&self, id: &BusinessId) -> Option<&BusinessArchetype> {
        self.catalog
            .business(id)
            .or_else(|| self.special_businesses.iter().find(|b| &b.id == id))
    }

    /// Upgrade lookup across the base catalog and active seasonal specials.
    fn find_upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.catalog
            .upgrade(id)
            .or_else(|| self.special_upgrades.iter().find(|u| u.id == id))
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn total_earnings(&self) -> f64 {
        self.total_earnings
    }

    pub fn global_multiplier(&self) -> f64 {
        self.modifiers.global()
    }

    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    pub fn prestige(&self) -> &PrestigeState {
        &self.prestige
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn business_state(&self, id: &BusinessId) -> Option<&BusinessState> {
        self.businesses.get(id)
    }

    pub fn owned_upgrades(&self) -> &BTreeSet<String> {
        &self.owned_upgrades
    }

    pub fn unlocked_achievements(&self) -> &BTreeSet<String> {
        &self.unlocked_achievements
    }

    pub fn customers(&self) -> &[ActiveCustomer] {
        &self.customers
    }

    pub fn customers_served(&self) -> u64 {
        self.customers_served
    }

    pub fn pending_event_id(&self) -> Option<&str> {
        self.pending_event.as_deref()
    }

    pub fn active_seasonal_id(&self) -> Option<&str> {
        self.active_seasonal.as_deref()
    }

    pub fn daily_reward_available(&self) -> bool {
        self.daily_reward_available
    }

    pub fn seconds_played(&self) -> u64 {
        self.seconds_played
    }

    pub fn total_clicks(&self) -> u64 {
        self.total_clicks
    }

    pub fn last_online_ms(&self) -> i64 {
        self.last_online_ms
    }

    /// Track a raw UI click for statistics.
    pub fn record_click(&mut self) {
        self.total_clicks += 1;
    }

    /// Steady-state income per second: managed business cycles plus
    /// auto-brewer passive income.
    pub fn income_per_second(&self) -> f64 {
        let level = self.prestige.level;
        let global = self.modifiers.global();
        let from_businesses: f64 = self
            .catalog
            .businesses
            .iter()
            .chain(self.special_businesses.iter())
            .filter_map(|arch| {
                let state = self.businesses.get(&arch.id)?;
                Some(sim_econ::income_per_second(arch, state, level, global))
            })
            .sum();
        from_businesses + self.passive_rate
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use sim_core::{ManualClock, Notice, NullNotices, ScriptedRandom};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Notification sink tests can inspect after the fact.
    pub struct RecordedNotices {
        pub log: Rc<RefCell<Vec<Notice>>>,
    }

    impl Notices for RecordedNotices {
        fn notify(&mut self, notice: Notice) {
            self.log.borrow_mut().push(notice);
        }
    }

    /// A session on a manual clock with no scripted randomness: every
    /// chance roll misses, so nothing stochastic fires unless scripted.
    pub fn session_at(start_ms: i64) -> (Session, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(start_ms));
        let session = Session::new(
            Catalog::standard(),
            SimConfig::default(),
            Box::new(clock.clone()),
            Box::new(ScriptedRandom::new([])),
            Box::new(NullNotices),
        )
        .unwrap();
        (session, clock)
    }

    /// Same as [`session_at`] but with scripted random rolls and a
    /// recorded notice log.
    pub fn scripted_session_at(
        start_ms: i64,
        rolls: impl IntoIterator<Item = f64>,
    ) -> (Session, Rc<ManualClock>, Rc<RefCell<Vec<Notice>>>) {
        let clock = Rc::new(ManualClock::new(start_ms));
        let log = Rc::new(RefCell::new(Vec::new()));
        let session = Session::new(
            Catalog::standard(),
            SimConfig::default(),
            Box::new(clock.clone()),
            Box::new(ScriptedRandom::new(rolls)),
            Box::new(RecordedNotices { log: log.clone() }),
        )
        .unwrap();
        (session, clock, log)
    }

    /// Give the session money without touching lifetime earnings.
    pub fn fund(session: &mut Session, cash: f64) {
        session.cash = cash;
    }

    /// Record lifetime earnings directly, e.g. to reach prestige
    /// eligibility.
    pub fn credit_earnings(session: &mut Session, amount: f64) {
        session.cash += amount;
        session.total_earnings += amount;
    }

    /// Overwrite a business's cycle anchor and progress, e.g. to model a
    /// freshly restored save.
    pub fn set_business_anchor(
        session: &mut Session,
        id: &BusinessId,
        last_collected_ms: Option<i64>,
        progress: f64,
    ) {
        let state = session.businesses.entry(id.clone()).or_default();
        state.last_collected_ms = last_collected_ms;
        state.progress = progress;
    }

    /// Shrink the daily-reward period so countdown tests stay short.
    pub fn set_daily_reward_secs(session: &mut Session, secs: f64) {
        session.cfg.daily_reward_secs = secs;
        session.daily_reward_countdown_secs = secs;
    }

    /// Put a specific random event in front of the player.
    pub fn surface_event(session: &mut Session, event_id: &str) {
        session.pending_event = Some(event_id.to_string());
    }

    /// Hand out spendable prestige points directly.
    pub fn grant_prestige_points(session: &mut Session, points: u32) {
        session.prestige.points += points;
    }

    /// A session over a one-business catalog with the given revenue and
    /// cycle length ("kiosk" / "kiosk_manager").
    pub fn custom_session_at(
        start_ms: i64,
        base_revenue: f64,
        base_time_secs: f64,
    ) -> (Session, Rc<ManualClock>) {
        let mut catalog = Catalog::empty();
        catalog.businesses.push(sim_core::BusinessArchetype {
            id: BusinessId::new("kiosk"),
            name: "Kiosk".to_string(),
            base_cost: 4.0,
            base_revenue,
            base_time_secs,
            cost_multiplier: 1.07,
            revenue_multiplier: 1.0,
        });
        catalog.managers.push(sim_core::Manager {
            id: "kiosk_manager".to_string(),
            business_id: BusinessId::new("kiosk"),
            name: "Kay".to_string(),
            cost: 100.0,
            description: String::new(),
        });
        let clock = Rc::new(ManualClock::new(start_ms));
        let session = Session::new(
            catalog,
            SimConfig::default(),
            Box::new(clock.clone()),
            Box::new(ScriptedRandom::new([])),
            Box::new(NullNotices),
        )
        .unwrap();
        (session, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use sim_core::{ManualClock, NullNotices, ScriptedRandom};

    #[test]
    fn new_session_starts_with_pocket_change() {
        let (session, _clock) = session_at(0);
        assert_eq!(session.cash(), 4.0);
        assert_eq!(session.total_earnings(), 0.0);
        assert_eq!(session.prestige().level, 1);
        assert_eq!(session.global_multiplier(), 1.0);
        assert!(session.daily_reward_available());
        for b in &session.catalog().businesses {
            assert_eq!(
                session.business_state(&b.id),
                Some(&BusinessState::default())
            );
        }
    }

    #[test]
    fn invalid_catalog_is_rejected() {
        let mut catalog = Catalog::standard();
        catalog.businesses[0].cost_multiplier = 0.9;
        let result = Session::new(
            catalog,
            SimConfig::default(),
            Box::new(ManualClock::new(0)),
            Box::new(ScriptedRandom::new([])),
            Box::new(NullNotices),
        );
        assert!(result.is_err());
    }

    #[test]
    fn income_per_second_counts_managed_businesses_only() {
        let (mut session, _clock) = session_at(0);
        fund(&mut session, 1e9);
        let cart = BusinessId::new("coffee_cart");
        session.buy_business(&cart, 10).unwrap();
        assert_eq!(session.income_per_second(), 0.0);
        session.hire_manager("coffee_cart_manager").unwrap();
        // 10 carts, $1/cycle, 1s cycles
        assert_eq!(session.income_per_second(), 10.0);
    }
}
