//! Meal slot status classification from observed page signals

use crate::abstractions::PageState;
use crate::schedule::MealType;
use serde::Serialize;
use std::fmt;

/// Texts that mean a meal has already been ordered
pub const DEFAULT_ORDERED_INDICATORS: &[&str] = &[
    "Preparing Your Order",
    "Order Placed",
    "Order Confirmed",
    "Out for Delivery",
    "Delivered",
];

/// Lifecycle of a meal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Unknown,
    Unavailable,
    AlreadyOrdered,
    NeedsOrder,
    InProgress,
    Completed,
    Failed,
}

impl SlotStatus {
    /// Skipped legitimately, not an error
    pub fn is_skip(self) -> bool {
        matches!(self, SlotStatus::Unavailable | SlotStatus::AlreadyOrdered)
    }

    /// Counts toward an overall successful run
    pub fn is_ok(self) -> bool {
        self.is_skip() || self == SlotStatus::Completed
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SlotStatus::Unknown => "unknown",
            SlotStatus::Unavailable => "unavailable",
            SlotStatus::AlreadyOrdered => "already ordered",
            SlotStatus::NeedsOrder => "needs order",
            SlotStatus::InProgress => "in progress",
            SlotStatus::Completed => "completed",
            SlotStatus::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Maps page signals for one meal to a [`SlotStatus`].
///
/// Holds no per-slot state; callers classify a freshly observed page on
/// every visit because order status changes between visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealStateClassifier {
    ordered_indicators: Vec<String>,
}

impl Default for MealStateClassifier {
    fn default() -> Self {
        Self {
            ordered_indicators: DEFAULT_ORDERED_INDICATORS
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }
}

impl MealStateClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize additional "ordered" texts on top of the defaults
    pub fn with_extra_indicators<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for indicator in extra {
            let indicator = indicator.as_ref().trim().to_lowercase();
            if !indicator.is_empty() && !self.ordered_indicators.contains(&indicator) {
                self.ordered_indicators.push(indicator);
            }
        }
        self
    }

    /// Returns `Unavailable`, `AlreadyOrdered` or `NeedsOrder`
    pub fn classify(&self, page: &PageState, meal: MealType) -> SlotStatus {
        if !page.date_available {
            return SlotStatus::Unavailable;
        }
        let ordered = page.status_indicators(meal).iter().any(|text| {
            let text = text.to_lowercase();
            self.ordered_indicators
                .iter()
                .any(|indicator| text.contains(indicator.as_str()))
        });
        if ordered {
            SlotStatus::AlreadyOrdered
        } else {
            SlotStatus::NeedsOrder
        }
    }
}
