//! Rolling schedule of meal slots and the per-date URLs that show them

pub mod urls;

pub use urls::SiteUrls;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorCode, RelishError, Result};

/// Meals ordered each day, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 2] = [MealType::Lunch, MealType::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of ordering work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MealSlot {
    pub date: NaiveDate,
    pub meal: MealType,
}

impl MealSlot {
    pub fn new(date: NaiveDate, meal: MealType) -> Self {
        Self { date, meal }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%A %m/%d"), self.meal)
    }
}

/// A contiguous run of dates starting at `start_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    start_date: NaiveDate,
    day_count: u32,
}

impl ScheduleWindow {
    pub const DEFAULT_DAYS: u32 = 6;

    pub fn new(start_date: NaiveDate, day_count: u32) -> Result<Self> {
        if day_count == 0 {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "schedule must cover at least one day",
            ));
        }
        if start_date.checked_add_days(Days::new(u64::from(day_count - 1))).is_none() {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("{day_count} days from {start_date} is outside the calendar"),
            ));
        }
        Ok(Self {
            start_date,
            day_count,
        })
    }

    /// Window starting today in local time
    pub fn starting_today(day_count: u32) -> Result<Self> {
        Self::new(Local::now().date_naive(), day_count)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    /// Dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start_date;
        (0..u64::from(self.day_count))
            .filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }

    /// Lazily enumerate every slot: dates ascending, lunch before dinner.
    ///
    /// Each call starts a fresh iteration.
    pub fn slots(&self) -> SlotIter {
        SlotIter {
            window: *self,
            next_index: 0,
        }
    }
}

/// Iterator over the slots of a [`ScheduleWindow`]
#[derive(Debug, Clone)]
pub struct SlotIter {
    window: ScheduleWindow,
    next_index: u64,
}

impl Iterator for SlotIter {
    type Item = MealSlot;

    fn next(&mut self) -> Option<MealSlot> {
        let meals = MealType::ALL.len() as u64;
        if self.next_index >= u64::from(self.window.day_count) * meals {
            return None;
        }
        let day = self.next_index / meals;
        let meal = MealType::ALL[(self.next_index % meals) as usize];
        self.next_index += 1;
        let date = self.window.start_date.checked_add_days(Days::new(day))?;
        Some(MealSlot::new(date, meal))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = u64::from(self.window.day_count) * MealType::ALL.len() as u64;
        let remaining = total.saturating_sub(self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotIter {}
