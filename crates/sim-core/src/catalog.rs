//! The static economy model: business archetypes, managers, upgrades,
//! prestige upgrades, achievements, seasonal events, random events, and
//! customer profiles. Loaded once at startup and never mutated.

use crate::{
    Achievement, AchievementRequirement, AchievementReward, BusinessArchetype, BusinessId,
    CustomerPreferences, CustomerProfile, EventKind, EventOption, Manager, OptionOutcome,
    PrestigeEffect, PrestigeUpgrade, RandomEvent, SeasonalEvent, Upgrade, UpgradeKind,
    UpgradeTarget,
};
use serde::{Deserialize, Serialize};

/// The full immutable catalog the simulation runs against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub businesses: Vec<BusinessArchetype>,
    pub managers: Vec<Manager>,
    pub upgrades: Vec<Upgrade>,
    pub prestige_upgrades: Vec<PrestigeUpgrade>,
    pub achievements: Vec<Achievement>,
    pub seasonal_events: Vec<SeasonalEvent>,
    pub random_events: Vec<RandomEvent>,
    pub customers: Vec<CustomerProfile>,
}

fn business(
    id: &str,
    name: &str,
    base_cost: f64,
    base_revenue: f64,
    base_time_secs: f64,
    cost_multiplier: f64,
    revenue_multiplier: f64,
) -> BusinessArchetype {
    BusinessArchetype {
        id: BusinessId::new(id),
        name: name.to_string(),
        base_cost,
        base_revenue,
        base_time_secs,
        cost_multiplier,
        revenue_multiplier,
    }
}

fn manager(id: &str, business_id: &str, name: &str, cost: f64, description: &str) -> Manager {
    Manager {
        id: id.to_string(),
        business_id: BusinessId::new(business_id),
        name: name.to_string(),
        cost,
        description: description.to_string(),
    }
}

fn upgrade(
    id: &str,
    target: UpgradeTarget,
    name: &str,
    cost: f64,
    multiplier: f64,
    kind: UpgradeKind,
    description: &str,
) -> Upgrade {
    Upgrade {
        id: id.to_string(),
        target,
        name: name.to_string(),
        cost,
        multiplier,
        kind,
        description: description.to_string(),
    }
}

impl Catalog {
    /// An empty catalog, useful as a base for targeted test fixtures.
    pub fn empty() -> Self {
        Self {
            businesses: vec![],
            managers: vec![],
            upgrades: vec![],
            prestige_upgrades: vec![],
            achievements: vec![],
            seasonal_events: vec![],
            random_events: vec![],
            customers: vec![],
        }
    }

    /// The standard coffee-empire economy.
    pub fn standard() -> Self {
        Self {
            businesses: Self::standard_businesses(),
            managers: Self::standard_managers(),
            upgrades: Self::standard_upgrades(),
            prestige_upgrades: Self::standard_prestige_upgrades(),
            achievements: Self::standard_achievements(),
            seasonal_events: Self::standard_seasonal_events(),
            random_events: Self::standard_random_events(),
            customers: Self::standard_customers(),
        }
    }

    fn standard_businesses() -> Vec<BusinessArchetype> {
        vec![
            business("coffee_cart", "Coffee Cart", 4.0, 1.0, 1.0, 1.07, 1.03),
            business("coffee_shop", "Coffee Shop", 60.0, 60.0, 3.0, 1.15, 1.05),
            business("roastery", "Roastery", 720.0, 540.0, 6.0, 1.14, 1.07),
            business(
                "coffee_plantation",
                "Coffee Plantation",
                8_640.0,
                4_320.0,
                12.0,
                1.13,
                1.09,
            ),
            business(
                "distribution_center",
                "Distribution Center",
                103_680.0,
                51_840.0,
                24.0,
                1.12,
                1.11,
            ),
            business(
                "coffee_brand",
                "Coffee Brand",
                1_244_160.0,
                622_080.0,
                96.0,
                1.11,
                1.13,
            ),
            business(
                "coffee_chain",
                "Coffee Chain",
                14_929_920.0,
                7_464_960.0,
                384.0,
                1.10,
                1.15,
            ),
            business(
                "bean_empire",
                "Bean Empire",
                179_159_040.0,
                89_579_520.0,
                1_536.0,
                1.09,
                1.17,
            ),
        ]
    }

    fn standard_managers() -> Vec<Manager> {
        vec![
            manager(
                "coffee_cart_manager",
                "coffee_cart",
                "Barista Barry",
                1_000.0,
                "Automatically runs your Coffee Cart",
            ),
            manager(
                "coffee_shop_manager",
                "coffee_shop",
                "Manager Mocha",
                15_000.0,
                "Automatically runs your Coffee Shop",
            ),
            manager(
                "roastery_manager",
                "roastery",
                "Roaster Riley",
                100_000.0,
                "Automatically runs your Roastery",
            ),
            manager(
                "coffee_plantation_manager",
                "coffee_plantation",
                "Planter Penny",
                500_000.0,
                "Automatically runs your Coffee Plantation",
            ),
            manager(
                "distribution_center_manager",
                "distribution_center",
                "Distributor Dave",
                1_200_000.0,
                "Automatically runs your Distribution Center",
            ),
            manager(
                "coffee_brand_manager",
                "coffee_brand",
                "Branding Bella",
                10_000_000.0,
                "Automatically runs your Coffee Brand",
            ),
            manager(
                "coffee_chain_manager",
                "coffee_chain",
                "Chain Charlie",
                50_000_000.0,
                "Automatically runs your Coffee Chain",
            ),
            manager(
                "bean_empire_manager",
                "bean_empire",
                "Emperor Espresso",
                250_000_000.0,
                "Automatically runs your Bean Empire",
            ),
        ]
    }

    fn standard_upgrades() -> Vec<Upgrade> {
        vec![
            upgrade(
                "coffee_cart_speed",
                UpgradeTarget::Business(BusinessId::new("coffee_cart")),
                "Faster Brewing",
                5_000.0,
                2.0,
                UpgradeKind::Speed,
                "Coffee Cart produces 2x faster",
            ),
            upgrade(
                "coffee_shop_profit",
                UpgradeTarget::Business(BusinessId::new("coffee_shop")),
                "Premium Beans",
                25_000.0,
                2.0,
                UpgradeKind::Profit,
                "Coffee Shop profits 2x higher",
            ),
            upgrade(
                "roastery_speed",
                UpgradeTarget::Business(BusinessId::new("roastery")),
                "Industrial Roaster",
                200_000.0,
                2.0,
                UpgradeKind::Speed,
                "Roastery produces 2x faster",
            ),
            upgrade(
                "coffee_plantation_profit",
                UpgradeTarget::Business(BusinessId::new("coffee_plantation")),
                "Organic Certification",
                1_000_000.0,
                3.0,
                UpgradeKind::Profit,
                "Coffee Plantation profits 3x higher",
            ),
            upgrade(
                "all_businesses_profit",
                UpgradeTarget::All,
                "Coffee Influencer",
                5_000_000.0,
                2.0,
                UpgradeKind::Profit,
                "All businesses earn 2x more",
            ),
            upgrade(
                "all_businesses_speed",
                UpgradeTarget::All,
                "Efficiency Training",
                10_000_000.0,
                2.0,
                UpgradeKind::Speed,
                "All businesses produce 2x faster",
            ),
        ]
    }

    fn standard_prestige_upgrades() -> Vec<PrestigeUpgrade> {
        vec![
            PrestigeUpgrade {
                id: "faster_production".to_string(),
                name: "Faster Production".to_string(),
                description: "All businesses produce 25% faster permanently".to_string(),
                cost_points: 1,
                effect: PrestigeEffect::SpeedAll(1.25),
            },
            PrestigeUpgrade {
                id: "increased_profits".to_string(),
                name: "Increased Profits".to_string(),
                description: "All businesses earn 50% more permanently".to_string(),
                cost_points: 2,
                effect: PrestigeEffect::ProfitAll(1.5),
            },
            PrestigeUpgrade {
                id: "starting_cash".to_string(),
                name: "Starting Cash".to_string(),
                description: "Start with $1,000 after prestige instead of $4".to_string(),
                cost_points: 1,
                effect: PrestigeEffect::StartingCash(1_000.0),
            },
            PrestigeUpgrade {
                id: "auto_managers".to_string(),
                name: "Auto Managers".to_string(),
                description: "Start with managers for the first 2 businesses".to_string(),
                cost_points: 3,
                effect: PrestigeEffect::AutoManagers(2),
            },
            PrestigeUpgrade {
                id: "double_offline".to_string(),
                name: "Double Offline Earnings".to_string(),
                description: "Earn twice as much while offline".to_string(),
                cost_points: 2,
                effect: PrestigeEffect::OfflineMultiplier(2.0),
            },
            PrestigeUpgrade {
                id: "customer_loyalty".to_string(),
                name: "Customer Loyalty".to_string(),
                description: "Customers leave 75% bigger tips".to_string(),
                cost_points: 2,
                effect: PrestigeEffect::TipMultiplier(1.75),
            },
            PrestigeUpgrade {
                id: "master_barista".to_string(),
                name: "Master Barista".to_string(),
                description: "Earn 3x more from mini-games".to_string(),
                cost_points: 3,
                effect: PrestigeEffect::MinigameMultiplier(3.0),
            },
        ]
    }

    fn standard_achievements() -> Vec<Achievement> {
        vec![
            Achievement {
                id: "first_million".to_string(),
                name: "First Million".to_string(),
                description: "Earn your first million dollars".to_string(),
                requirement: AchievementRequirement::Earnings(1_000_000.0),
                reward: AchievementReward::Cash(10_000.0),
            },
            Achievement {
                id: "coffee_empire".to_string(),
                name: "Coffee Empire".to_string(),
                description: "Own at least 100 of each business".to_string(),
                requirement: AchievementRequirement::BusinessCount(100),
                reward: AchievementReward::Multiplier(1.5),
            },
            Achievement {
                id: "bean_master".to_string(),
                name: "Bean Master".to_string(),
                description: "Win the bean sorting game with a perfect score".to_string(),
                requirement: AchievementRequirement::MinigameScore(100),
                reward: AchievementReward::Cash(500.0),
            },
            Achievement {
                id: "customer_service".to_string(),
                name: "Customer Service Expert".to_string(),
                description: "Serve 1,000 customers".to_string(),
                requirement: AchievementRequirement::CustomersServed(1_000),
                reward: AchievementReward::Multiplier(1.2),
            },
            Achievement {
                id: "prestige_master".to_string(),
                name: "Prestige Master".to_string(),
                description: "Reach prestige level 10".to_string(),
                requirement: AchievementRequirement::PrestigeLevel(10),
                reward: AchievementReward::Multiplier(2.0),
            },
        ]
    }

    fn standard_seasonal_events() -> Vec<SeasonalEvent> {
        vec![
            SeasonalEvent {
                id: "pumpkin_spice".to_string(),
                name: "Pumpkin Spice Season".to_string(),
                description: "Fall is here, and customers are craving that signature pumpkin \
                              spice flavor in their coffee!"
                    .to_string(),
                start_month: 9,
                end_month: 11,
                single_day: None,
                global_multiplier: 1.5,
                special_business: Some(business(
                    "pumpkin_spice_station",
                    "Pumpkin Spice Station",
                    50_000.0,
                    25_000.0,
                    10.0,
                    1.1,
                    1.2,
                )),
                special_upgrades: vec![upgrade(
                    "pumpkin_master",
                    UpgradeTarget::Business(BusinessId::new("pumpkin_spice_station")),
                    "Pumpkin Spice Master",
                    100_000.0,
                    3.0,
                    UpgradeKind::Profit,
                    "Triple profits from Pumpkin Spice Station",
                )],
            },
            SeasonalEvent {
                id: "holiday_blend".to_string(),
                name: "Holiday Blend Season".to_string(),
                description: "The holidays are here! Special festive coffee blends are in \
                              high demand."
                    .to_string(),
                start_month: 11,
                end_month: 1,
                single_day: None,
                global_multiplier: 2.0,
                special_business: Some(business(
                    "holiday_blend_bar",
                    "Holiday Blend Bar",
                    100_000.0,
                    50_000.0,
                    15.0,
                    1.15,
                    1.25,
                )),
                special_upgrades: vec![upgrade(
                    "festive_cheer",
                    UpgradeTarget::Business(BusinessId::new("holiday_blend_bar")),
                    "Festive Cheer",
                    200_000.0,
                    2.0,
                    UpgradeKind::Speed,
                    "Holiday Blend Bar produces twice as fast",
                )],
            },
            SeasonalEvent {
                id: "summer_iced".to_string(),
                name: "Summer Iced Coffee".to_string(),
                description: "It's hot outside, and everyone wants refreshing iced coffee \
                              drinks!"
                    .to_string(),
                start_month: 6,
                end_month: 8,
                single_day: None,
                global_multiplier: 1.3,
                special_business: Some(business(
                    "iced_coffee_station",
                    "Iced Coffee Station",
                    75_000.0,
                    37_500.0,
                    8.0,
                    1.12,
                    1.18,
                )),
                special_upgrades: vec![upgrade(
                    "cold_brew_master",
                    UpgradeTarget::Business(BusinessId::new("iced_coffee_station")),
                    "Cold Brew Master",
                    150_000.0,
                    2.5,
                    UpgradeKind::Profit,
                    "Increase Iced Coffee Station profits by 250%",
                )],
            },
            SeasonalEvent {
                id: "coffee_day".to_string(),
                name: "International Coffee Day".to_string(),
                description: "October 1st is International Coffee Day! Coffee enthusiasm is \
                              at an all-time high."
                    .to_string(),
                start_month: 10,
                end_month: 10,
                single_day: Some(1),
                global_multiplier: 3.0,
                special_business: None,
                special_upgrades: vec![upgrade(
                    "coffee_day_celebration",
                    UpgradeTarget::All,
                    "Coffee Day Celebration",
                    50_000.0,
                    5.0,
                    UpgradeKind::Profit,
                    "5x profits for all businesses today only!",
                )],
            },
        ]
    }

    fn standard_random_events() -> Vec<RandomEvent> {
        vec![
            RandomEvent {
                id: "celebrity_visit".to_string(),
                title: "Celebrity Visit!".to_string(),
                description: "A famous coffee influencer is visiting your shops! Customers \
                              are flocking in."
                    .to_string(),
                kind: EventKind::Timed {
                    value: 2.0,
                    duration_secs: 120,
                },
            },
            RandomEvent {
                id: "bean_shortage".to_string(),
                title: "Bean Shortage".to_string(),
                description: "There's a temporary shortage of quality coffee beans in the \
                              market."
                    .to_string(),
                kind: EventKind::Timed {
                    value: -0.5,
                    duration_secs: 180,
                },
            },
            RandomEvent {
                id: "coffee_competition".to_string(),
                title: "Coffee Competition".to_string(),
                description: "A local coffee competition is being held. You can enter your \
                              best blend!"
                    .to_string(),
                kind: EventKind::Choice {
                    options: vec![
                        EventOption {
                            text: "Enter Standard Blend".to_string(),
                            effect_text: "Safe option: +$5,000 cash".to_string(),
                            outcome: OptionOutcome::Cash(5_000.0),
                        },
                        EventOption {
                            text: "Enter Experimental Blend".to_string(),
                            effect_text: "Risky: 50% chance of +$20,000, 50% chance of nothing"
                                .to_string(),
                            outcome: OptionOutcome::GambleCash {
                                amount: 20_000.0,
                                win_chance: 0.5,
                            },
                        },
                        EventOption {
                            text: "Skip Competition".to_string(),
                            effect_text: "No risk, no reward".to_string(),
                            outcome: OptionOutcome::Nothing,
                        },
                    ],
                },
            },
            RandomEvent {
                id: "health_trend".to_string(),
                title: "Coffee Health Study".to_string(),
                description: "A new study claims coffee has additional health benefits!"
                    .to_string(),
                kind: EventKind::Timed {
                    value: 1.5,
                    duration_secs: 300,
                },
            },
            RandomEvent {
                id: "equipment_breakdown".to_string(),
                title: "Equipment Breakdown".to_string(),
                description: "Some of your coffee equipment is malfunctioning.".to_string(),
                kind: EventKind::Timed {
                    value: -0.3,
                    duration_secs: 120,
                },
            },
            RandomEvent {
                id: "investor_offer".to_string(),
                title: "Investor Offer".to_string(),
                description: "A venture capitalist wants to invest in your coffee empire!"
                    .to_string(),
                kind: EventKind::Choice {
                    options: vec![
                        EventOption {
                            text: "Accept Investment".to_string(),
                            effect_text: "Gain $50,000 cash now, but 10% lower profits for 5 \
                                          minutes"
                                .to_string(),
                            outcome: OptionOutcome::CashWithPenalty {
                                amount: 50_000.0,
                                penalty_factor: 0.9,
                                duration_secs: 300,
                            },
                        },
                        EventOption {
                            text: "Decline Offer".to_string(),
                            effect_text: "No immediate cash, maintain full profits".to_string(),
                            outcome: OptionOutcome::Nothing,
                        },
                    ],
                },
            },
        ]
    }

    fn standard_customers() -> Vec<CustomerProfile> {
        fn profile(
            id: &str,
            name: &str,
            description: &str,
            prefs: [f64; 4],
            spending_limit: f64,
            visit_frequency: f64,
        ) -> CustomerProfile {
            CustomerProfile {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                preferences: CustomerPreferences {
                    quality: prefs[0],
                    price: prefs[1],
                    speed: prefs[2],
                    loyalty: prefs[3],
                },
                spending_limit,
                visit_frequency,
            }
        }
        vec![
            profile(
                "casual",
                "Casual Customer",
                "Just looking for a quick coffee",
                [0.5, 0.7, 0.3, 0.2],
                10.0,
                0.7,
            ),
            profile(
                "business",
                "Business Professional",
                "In a hurry, needs caffeine",
                [0.6, 0.3, 0.9, 0.5],
                15.0,
                0.8,
            ),
            profile(
                "connoisseur",
                "Coffee Connoisseur",
                "Appreciates quality beans",
                [0.9, 0.4, 0.5, 0.8],
                25.0,
                0.4,
            ),
            profile(
                "student",
                "Student",
                "On a budget, needs caffeine",
                [0.3, 0.9, 0.6, 0.3],
                8.0,
                0.6,
            ),
            profile(
                "influencer",
                "Social Media Influencer",
                "Here for the aesthetic",
                [0.7, 0.5, 0.4, 0.6],
                20.0,
                0.3,
            ),
        ]
    }

    /// Look up a base-catalog archetype.
    pub fn business(&self, id: &BusinessId) -> Option<&BusinessArchetype> {
        self.businesses.iter().find(|b| &b.id == id)
    }

    /// Position of a business in the base catalog; seasonal specials have
    /// no index and never qualify for auto-managers.
    pub fn business_index(&self, id: &BusinessId) -> Option<usize> {
        self.businesses.iter().position(|b| &b.id == id)
    }

    pub fn manager(&self, id: &str) -> Option<&Manager> {
        self.managers.iter().find(|m| m.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn prestige_upgrade(&self, id: &str) -> Option<&PrestigeUpgrade> {
        self.prestige_upgrades.iter().find(|u| u.id == id)
    }

    pub fn random_event(&self, id: &str) -> Option<&RandomEvent> {
        self.random_events.iter().find(|e| e.id == id)
    }

    pub fn seasonal_event(&self, id: &str) -> Option<&SeasonalEvent> {
        self.seasonal_events.iter().find(|e| e.id == id)
    }
}
