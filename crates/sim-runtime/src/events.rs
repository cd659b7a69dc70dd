//! Random events and the seasonal calendar.
//!
//! A surfaced random event waits for the player to accept or decline it;
//! accepting resolves its tagged payload exhaustively (timed modifier, cash
//! grant, gamble, or cash-with-penalty). Seasonal events activate from the
//! calendar month/day and admit their special business and upgrades for the
//! duration.

use crate::{GameError, Session};
use chrono::{DateTime, Datelike};
use serde::Serialize;
use sim_core::{EventKind, Modifier, Notice, OptionOutcome, SeasonalEvent};
use tracing::info;

/// What accepting a random event did.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventOutcome {
    pub event_id: String,
    pub cash_granted: f64,
    /// Id of the modifier that went live, when the event carried one.
    pub modifier_id: Option<String>,
}

impl Session {
    /// Accept the pending random event. Choice events need the picked
    /// option index; timed events take none.
    pub fn accept_event(&mut self, choice: Option<usize>) -> Result<EventOutcome, GameError> {
        let event_id = self
            .pending_event
            .clone()
            .ok_or(GameError::InvalidState("no event pending"))?;
        let event = self
            .catalog
            .random_event(&event_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownId(event_id.clone()))?;

        let mut outcome = EventOutcome {
            event_id: event_id.clone(),
            cash_granted: 0.0,
            modifier_id: None,
        };
        match &event.kind {
            EventKind::Timed {
                value,
                duration_secs,
            } => {
                self.apply_event_modifier(&event_id, 1.0 + *value, *duration_secs);
                outcome.modifier_id = Some(event_id.clone());
            }
            EventKind::Choice { options } => {
                let index = choice.ok_or(GameError::InvalidState("event requires a choice"))?;
                let option = options
                    .get(index)
                    .ok_or(GameError::InvalidState("no such option"))?;
                match &option.outcome {
                    OptionOutcome::Cash(amount) => {
                        self.cash += amount;
                        outcome.cash_granted = *amount;
                    }
                    OptionOutcome::GambleCash { amount, win_chance } => {
                        if self.rng.next_f64() < *win_chance {
                            self.cash += amount;
                            outcome.cash_granted = *amount;
                        }
                    }
                    OptionOutcome::CashWithPenalty {
                        amount,
                        penalty_factor,
                        duration_secs,
                    } => {
                        self.cash += amount;
                        outcome.cash_granted = *amount;
                        self.apply_event_modifier(&event_id, *penalty_factor, *duration_secs);
                        outcome.modifier_id = Some(event_id.clone());
                    }
                    OptionOutcome::Nothing => {}
                }
            }
        }
        self.pending_event = None;
        info!(event = %event_id, cash = outcome.cash_granted, "event accepted");
        Ok(outcome)
    }

    /// Dismiss the pending random event without any effect.
    pub fn decline_event(&mut self) {
        self.pending_event = None;
    }

    fn apply_event_modifier(&mut self, event_id: &str, factor: f64, duration_secs: u64) {
        let expires_at_ms = self.clock.now_ms() + duration_secs as i64 * 1_000;
        self.modifiers.add(Modifier {
            id: event_id.to_string(),
            factor,
            expires_at_ms: Some(expires_at_ms),
        });
        self.notices.notify(Notice::EventStarted {
            event_id: event_id.to_string(),
            duration_secs,
        });
    }

    /// Activate or deactivate seasonal events from the calendar date.
    /// Single-day events outrank month ranges (Coffee Day interrupts
    /// Pumpkin Spice Season); ties resolve by catalog order.
    pub(crate) fn check_seasonal(&mut self, now_ms: i64) {
        let Some(date) = DateTime::from_timestamp_millis(now_ms) else {
            return;
        };
        let (month, day) = (date.month(), date.day());

        let events = &self.catalog.seasonal_events;
        let calendar_active = events
            .iter()
            .find(|e| e.single_day.is_some() && seasonal_active(e, month, day))
            .or_else(|| events.iter().find(|e| seasonal_active(e, month, day)))
            .map(|e| e.id.clone());

        if self.active_seasonal == calendar_active {
            return;
        }
        if let Some(previous) = self.active_seasonal.take() {
            self.deactivate_seasonal(&previous);
        }
        if let Some(next) = calendar_active {
            self.activate_seasonal(&next);
        }
    }

    fn activate_seasonal(&mut self, event_id: &str) {
        let Some(event) = self.catalog.seasonal_event(event_id).cloned() else {
            return;
        };
        if let Some(special) = &event.special_business {
            self.businesses.entry(special.id.clone()).or_default();
            self.special_businesses.push(special.clone());
        }
        for upgrade in &event.special_upgrades {
            if !self.special_upgrades.iter().any(|u| u.id == upgrade.id) {
                self.special_upgrades.push(upgrade.clone());
            }
        }
        self.modifiers.set_seasonal(event.global_multiplier);
        self.active_seasonal = Some(event.id.clone());
        info!(event = %event.id, "seasonal event active");
        self.notices.notify(Notice::SeasonalStarted {
            event_id: event.id.clone(),
        });
    }

    fn deactivate_seasonal(&mut self, event_id: &str) {
        let Some(event) = self.catalog.seasonal_event(event_id).cloned() else {
            return;
        };
        if let Some(special) = &event.special_business {
            self.special_businesses.retain(|b| b.id != special.id);
        }
        self.special_upgrades
            .retain(|u| !event.special_upgrades.iter().any(|s| s.id == u.id));
        self.modifiers.set_seasonal(1.0);
        info!(event = %event.id, "seasonal event ended");
        self.notices.notify(Notice::SeasonalEnded {
            event_id: event.id.clone(),
        });
    }
}

fn seasonal_active(event: &SeasonalEvent, month: u32, day: u32) -> bool {
    if let Some(d) = event.single_day {
        return month == event.start_month && day == d;
    }
    if event.start_month > event.end_month {
        // Spans the year boundary, e.g. November through January.
        month >= event.start_month || month <= event.end_month
    } else {
        (event.start_month..=event.end_month).contains(&month)
    }
}
