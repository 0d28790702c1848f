//! User configuration
//!
//! A single YAML file. Every key is optional; a missing file means no
//! dietary restrictions and the default budget, window and site.
//!
//! ```yaml
//! dietary_preferences:
//!   is_vegetarian: true
//!   avoid_ingredients: [peanut]
//! preferred_cuisines: [thai]
//! delivery_instructions: "Leave at the front desk"
//! budget:
//!   min_subsidy_target: 15.00
//!   max_pretax_total: 18.00
//! schedule:
//!   days: 6
//! action_timeout: 45s
//! ```

pub mod loader;

pub use loader::{user_config_dir, ConfigLoader, ConfigSource, LoadedConfig, CONFIG_ENV};

use crate::error::{ErrorCode, RelishError, Result};
use crate::ordering::{MealStateClassifier, OrderingSettings};
use crate::policy::dietary::null_as_default;
use crate::policy::{BudgetPolicy, DietaryProfile, FillStrategy, ItemSelectionPolicy};
use crate::schedule::urls::{DEFAULT_BASE_URL, DEFAULT_LOGIN_URL};
use crate::schedule::{ScheduleWindow, SiteUrls};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "null_as_default")]
    pub dietary_preferences: DietaryProfile,

    /// Advisory; breaks ties between otherwise equal first mains
    #[serde(deserialize_with = "null_as_default")]
    pub preferred_cuisines: Vec<String>,

    /// Passed through to the checkout form verbatim
    pub delivery_instructions: Option<String>,

    pub budget: BudgetPolicy,
    pub schedule: ScheduleConfig,
    pub site: SiteConfig,
    pub selection: SelectionConfig,

    /// Extra texts that mark a meal as already ordered
    #[serde(deserialize_with = "null_as_default")]
    pub ordered_indicators: Vec<String>,

    /// Upper bound on any single browser action
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub action_timeout: Option<Duration>,

    /// Browser driver command line
    pub driver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            days: ScheduleWindow::DEFAULT_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub login_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Tags ranked first when choosing the first main, most preferred first
    pub priority_tags: Vec<String>,
    pub strategy: FillStrategy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            priority_tags: vec![crate::menu::tags::PROTEIN.to_string()],
            strategy: FillStrategy::default(),
        }
    }
}

impl Config {
    /// Check cross-field constraints serde cannot express.
    ///
    /// The budget is already validated while deserializing.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.days == 0 {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "schedule.days must be at least 1",
            ));
        }
        if self.action_timeout == Some(Duration::ZERO) {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "action_timeout must be greater than zero",
            ));
        }
        if self.driver.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "driver must not be empty when set",
            ));
        }
        self.site_urls()?;
        Ok(())
    }

    pub fn site_urls(&self) -> Result<SiteUrls> {
        SiteUrls::new(&self.site.base_url, &self.site.login_url)
    }

    pub fn selection_policy(&self) -> ItemSelectionPolicy {
        ItemSelectionPolicy::default()
            .with_priority_tags(self.selection.priority_tags.clone())
            .with_preferred_cuisines(self.preferred_cuisines.clone())
            .with_strategy(self.selection.strategy)
    }

    pub fn classifier(&self) -> MealStateClassifier {
        MealStateClassifier::new().with_extra_indicators(&self.ordered_indicators)
    }

    /// Window from the configured day count, with optional overrides
    pub fn window(&self, days: Option<u32>, start: Option<NaiveDate>) -> Result<ScheduleWindow> {
        let days = days.unwrap_or(self.schedule.days);
        match start {
            Some(start) => ScheduleWindow::new(start, days),
            None => ScheduleWindow::starting_today(days),
        }
    }

    /// Everything the orchestrator needs for `window`
    pub fn ordering_settings(&self, window: ScheduleWindow) -> Result<OrderingSettings> {
        Ok(OrderingSettings {
            window,
            urls: self.site_urls()?,
            profile: self.dietary_preferences.clone(),
            budget: self.budget,
            policy: self.selection_policy(),
            classifier: self.classifier(),
            delivery_instructions: self.delivery_instructions().map(String::from),
        })
    }

    /// Delivery instructions with surrounding whitespace removed, if any
    pub fn delivery_instructions(&self) -> Option<&str> {
        self.delivery_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Parse YAML text. Blank input yields the defaults.
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(content).map_err(|e| {
        let message = e.to_string();
        // Budget validation runs inside deserialization and surfaces here
        let budget_tag = format!("[E{:04}]", ErrorCode::CONFIG_INVALID_BUDGET);
        let code = if message.contains(&budget_tag) {
            ErrorCode::CONFIG_INVALID_BUDGET
        } else {
            ErrorCode::CONFIG_INVALID_YAML
        };
        RelishError::config_with_code(code, message)
    })
}
