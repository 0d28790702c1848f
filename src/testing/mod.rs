//! Testing utilities and fixtures
//!
//! Shared by unit tests and the integration tests under `tests/`.

use crate::interaction::{ProgressDisplay, SpinnerHandle};
use crate::menu::{tags, Category, MenuItem, Money};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

/// Display that records every message with a level prefix
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    /// Messages whose text contains `needle`
    pub fn matching(&self, needle: &str) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.contains(needle))
            .collect()
    }

    fn push(&self, level: &str, message: &str) {
        lock(&self.messages).push(format!("{level}: {message}"));
    }
}

fn lock(messages: &Mutex<Vec<String>>) -> std::sync::MutexGuard<'_, Vec<String>> {
    messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProgressDisplay for RecordingDisplay {
    fn info(&self, message: &str) {
        self.push("INFO", message);
    }

    fn warning(&self, message: &str) {
        self.push("WARN", message);
    }

    fn error(&self, message: &str) {
        self.push("ERROR", message);
    }

    fn progress(&self, message: &str) {
        self.push("PROGRESS", message);
    }

    fn success(&self, message: &str) {
        self.push("SUCCESS", message);
    }

    fn start_spinner(&self, message: &str) -> Box<dyn SpinnerHandle> {
        self.push("SPINNER", message);
        Box::new(RecordingSpinner {
            display: self.clone(),
        })
    }
}

struct RecordingSpinner {
    display: RecordingDisplay,
}

impl SpinnerHandle for RecordingSpinner {
    fn update_message(&mut self, message: &str) {
        self.display.push("SPINNER_UPDATE", message);
    }

    fn success(&mut self, message: &str) {
        self.display.push("SPINNER_SUCCESS", message);
    }

    fn fail(&mut self, message: &str) {
        self.display.push("SPINNER_FAIL", message);
    }
}

pub mod fixtures {
    use super::*;

    /// A Monday, so a six-day window runs Monday through Saturday
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default()
    }

    /// One protein main, two sides and an extra.
    ///
    /// With the default 15/18 budget the selection is the bowl, the
    /// vegetables and the salad for $16.00.
    pub fn reference_menu() -> Vec<MenuItem> {
        vec![
            MenuItem::new(
                "A",
                "Grilled Chicken Bowl",
                Category::Main,
                Money::new(9, 0),
            )
            .with_tag(tags::PROTEIN),
            MenuItem::new("B", "Roasted Vegetables", Category::Side, Money::new(4, 0))
                .with_tag(tags::VEGETARIAN)
                .with_tag(tags::VEGAN),
            MenuItem::new("C", "Garden Salad", Category::Side, Money::new(3, 0))
                .with_tag(tags::VEGETARIAN),
            MenuItem::new("D", "Sparkling Water", Category::Extra, Money::new(6, 0))
                .with_tag(tags::VEGAN)
                .with_tag(tags::VEGETARIAN),
        ]
    }

    /// Reference menu plus a pricier protein main to fall back on
    pub fn menu_with_backup_main() -> Vec<MenuItem> {
        let mut menu = reference_menu();
        menu.push(
            MenuItem::new("E", "Salmon Plate", Category::Main, Money::new(10, 0))
                .with_tag(tags::PROTEIN)
                .with_cuisine("mediterranean"),
        );
        menu
    }

    /// Nothing a vegetarian can eat
    pub fn meat_only_menu() -> Vec<MenuItem> {
        vec![
            MenuItem::new("M1", "Beef Brisket", Category::Main, Money::new(12, 0))
                .with_tag(tags::PROTEIN),
            MenuItem::new("M2", "Pork Belly Bites", Category::Side, Money::new(5, 0)),
        ]
    }
}
