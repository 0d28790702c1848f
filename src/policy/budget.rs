//! Spending limits for a single meal slot

use crate::error::{ErrorCode, RelishError, Result};
use crate::menu::Money;
use serde::{Deserialize, Serialize};

/// Subsidy target and pretax cap for one meal.
///
/// `max_pretax_total` is a hard ceiling: no cart may ever exceed it.
/// `min_subsidy_target` is the spend below which checkout is avoided
/// whenever the catalog allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BudgetSpec")]
pub struct BudgetPolicy {
    min_subsidy_target: Money,
    max_pretax_total: Money,
}

#[derive(Deserialize)]
struct BudgetSpec {
    #[serde(default = "default_min_subsidy_target")]
    min_subsidy_target: Money,
    #[serde(default = "default_max_pretax_total")]
    max_pretax_total: Money,
}

fn default_min_subsidy_target() -> Money {
    Money::new(15, 0)
}

fn default_max_pretax_total() -> Money {
    Money::new(18, 0)
}

impl TryFrom<BudgetSpec> for BudgetPolicy {
    type Error = RelishError;

    fn try_from(spec: BudgetSpec) -> Result<Self> {
        BudgetPolicy::new(spec.min_subsidy_target, spec.max_pretax_total)
    }
}

impl BudgetPolicy {
    /// Largest accepted pretax cap. Selection does per-cent subset-sum work
    /// over the headroom, so the cap bounds its cost.
    pub const MAX_PRETAX_CAP: Money = Money::new(1_000, 0);

    pub fn new(min_subsidy_target: Money, max_pretax_total: Money) -> Result<Self> {
        if max_pretax_total.cents() <= 0 || max_pretax_total > Self::MAX_PRETAX_CAP {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_BUDGET,
                format!(
                    "max_pretax_total must be positive and at most {}, got {}",
                    Self::MAX_PRETAX_CAP,
                    max_pretax_total
                ),
            ));
        }
        if min_subsidy_target.cents() < 0 || min_subsidy_target > max_pretax_total {
            return Err(RelishError::config_with_code(
                ErrorCode::CONFIG_INVALID_BUDGET,
                format!(
                    "min_subsidy_target {} must be between $0.00 and max_pretax_total {}",
                    min_subsidy_target, max_pretax_total
                ),
            ));
        }
        Ok(Self {
            min_subsidy_target,
            max_pretax_total,
        })
    }

    pub fn min_subsidy_target(&self) -> Money {
        self.min_subsidy_target
    }

    pub fn max_pretax_total(&self) -> Money {
        self.max_pretax_total
    }

    /// Whether adding `price` to `subtotal` stays within the cap.
    /// A sum that overflows never fits.
    pub fn fits(&self, subtotal: Money, price: Money) -> bool {
        subtotal
            .checked_add(price)
            .is_some_and(|total| total <= self.max_pretax_total)
    }

    pub fn target_met(&self, subtotal: Money) -> bool {
        subtotal >= self.min_subsidy_target
    }

    /// Spend still allowed before hitting the cap
    pub fn headroom(&self, subtotal: Money) -> Money {
        self.max_pretax_total.saturating_sub(subtotal)
    }
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            min_subsidy_target: default_min_subsidy_target(),
            max_pretax_total: default_max_pretax_total(),
        }
    }
}
