//! Menu data model: money, items and the per-slot cart

pub mod cart;
pub mod item;
pub mod money;

pub use cart::CartState;
pub use item::{tags, Category, MenuItem};
pub use money::{Money, ParseMoneyError};
