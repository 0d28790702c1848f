//! Interaction executor abstraction
//!
//! The ordering logic never renders pages itself. It issues primitive
//! requests (navigate, observe, click, type) through [`InteractionExecutor`]
//! and reads back structured [`PageState`] signals. Any browser automation
//! and perception backend can sit behind this trait.

use crate::error::Result;
use crate::menu::MenuItem;
use crate::schedule::MealType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Controls the core knows how to ask for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    LoginSubmit,
    /// The "Let's Go!" button shown on first login
    WelcomeContinue,
    AddToCart {
        meal: MealType,
        item_id: String,
        item_name: String,
    },
    ProceedToCheckout,
    CompleteOrder,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::LoginSubmit => f.write_str("login submit"),
            Control::WelcomeContinue => f.write_str("welcome continue"),
            Control::AddToCart {
                meal, item_name, ..
            } => write!(f, "add '{item_name}' to {meal} cart"),
            Control::ProceedToCheckout => f.write_str("proceed to checkout"),
            Control::CompleteOrder => f.write_str("complete order"),
        }
    }
}

/// Text inputs the core fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    DeliveryInstructions,
}

/// Result of a click request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    Clicked,
    /// The control was not visible or not clickable
    NotFound,
}

/// Signals for one meal section of a date page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealSection {
    /// Order-status texts shown under the meal header
    pub status_indicators: Vec<String>,
    /// Items the perception layer found for this meal
    pub menu: Vec<MenuItem>,
}

/// Structured snapshot of the current page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageState {
    pub url: Option<String>,
    pub authenticated: bool,
    pub login_error: Option<String>,
    pub welcome_prompt: bool,
    /// False when the date is greyed out or otherwise not orderable
    pub date_available: bool,
    pub meals: BTreeMap<MealType, MealSection>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            url: None,
            authenticated: false,
            login_error: None,
            welcome_prompt: false,
            date_available: true,
            meals: BTreeMap::new(),
        }
    }
}

impl PageState {
    pub fn section(&self, meal: MealType) -> Option<&MealSection> {
        self.meals.get(&meal)
    }

    pub fn menu(&self, meal: MealType) -> Vec<MenuItem> {
        self.section(meal)
            .map(|s| s.menu.clone())
            .unwrap_or_default()
    }

    pub fn status_indicators(&self, meal: MealType) -> &[String] {
        self.section(meal)
            .map(|s| s.status_indicators.as_slice())
            .unwrap_or(&[])
    }
}

/// Primitive browser operations.
///
/// Implementations own a single browsing context; `&mut self` enforces that
/// only one request is in flight at a time.
#[async_trait]
pub trait InteractionExecutor: Send {
    /// Load `url` in the current tab
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Read structured signals from the current page
    async fn observe_page_state(&mut self) -> Result<PageState>;

    /// Click a control. A missing or unclickable control is `Ok(NotFound)`,
    /// not an error.
    async fn click_control(&mut self, control: &Control) -> Result<ClickOutcome>;

    async fn type_text(&mut self, field: Field, value: &str) -> Result<()>;

    /// Release the browsing context
    async fn close(&mut self) -> Result<()>;
}
