//! Per-run record of what happened to every slot

use super::classifier::SlotStatus;
use crate::menu::Money;
use crate::schedule::MealSlot;
use std::fmt::Write as _;

/// Final state of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotOutcome {
    pub slot: MealSlot,
    pub status: SlotStatus,
    /// Names of the items that made it into the cart
    pub items: Vec<String>,
    pub subtotal: Money,
    pub note: Option<String>,
}

impl SlotOutcome {
    pub fn new(slot: MealSlot, status: SlotStatus) -> Self {
        Self {
            slot,
            status,
            items: Vec::new(),
            subtotal: Money::ZERO,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Outcomes in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    outcomes: Vec<SlotOutcome>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: SlotOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[SlotOutcome] {
        &self.outcomes
    }

    pub fn status_of(&self, slot: MealSlot) -> Option<SlotStatus> {
        self.outcomes
            .iter()
            .find(|o| o.slot == slot)
            .map(|o| o.status)
    }

    pub fn count(&self, status: SlotStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SlotOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_ok())
    }

    /// True when every slot ended ordered, already ordered or unavailable
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_ok())
    }

    /// Multi-line human summary
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let _ = write!(out, "{:<22} {}", outcome.slot.to_string(), outcome.status);
            if !outcome.items.is_empty() {
                let _ = write!(
                    out,
                    " ({}, {})",
                    outcome.items.join(", "),
                    outcome.subtotal
                );
            }
            if let Some(note) = &outcome.note {
                let _ = write!(out, " - {note}");
            }
            out.push('\n');
        }
        let _ = write!(
            out,
            "{} ordered, {} already ordered, {} unavailable, {} failed",
            self.count(SlotStatus::Completed),
            self.count(SlotStatus::AlreadyOrdered),
            self.count(SlotStatus::Unavailable),
            self.failed().count()
        );
        out
    }
}
