//! Ordering policy: spending limits, dietary eligibility and item selection
//!
//! Everything in this module is pure and synchronous so it can be tested
//! exhaustively without a browser.

pub mod budget;
pub mod dietary;
pub mod selection;

pub use budget::BudgetPolicy;
pub use dietary::DietaryProfile;
pub use selection::{FillStrategy, ItemSelectionPolicy, SelectionAction};
