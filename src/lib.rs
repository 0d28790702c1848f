//! # relishplus
//!
//! Automatic meal ordering for a subsidized catering site. For each lunch and
//! dinner in a rolling window of days, relishplus checks whether an order is
//! already placed, and if not, fills a cart that respects the user's dietary
//! restrictions and the subsidy budget, then checks out and verifies.
//!
//! ## Usage
//!
//! ```bash
//! relishplus run [--days 6] [--start 2024-03-04] [--driver "node driver.js"]
//! relishplus plan
//! relishplus preview --menu lunch.json
//! relishplus check-config
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Browser executor and credential provider traits, with a
//!   JSON-lines driver and an in-memory mock site
//! - `app` - Logging setup and fatal error reporting for the binary
//! - `config` - YAML configuration discovery, parsing and validation
//! - `error` - Coded error type shared by every layer
//! - `interaction` - Human progress output, separate from tracing logs
//! - `menu` - Money, menu items and the cart
//! - `ordering` - Login, slot classification, checkout and the full run
//! - `policy` - Budget, dietary eligibility and item selection
//! - `schedule` - Meal slots over a window of dates and their URLs
//! - `testing` - Test doubles and fixtures
pub mod abstractions;
pub mod app;
pub mod config;
pub mod error;
pub mod interaction;
pub mod menu;
pub mod ordering;
pub mod policy;
pub mod schedule;

pub mod testing;

pub use error::{RelishError, Result};
