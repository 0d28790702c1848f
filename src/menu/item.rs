//! Menu items as reported by the page observer

use super::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Well-known dietary and priority tags
pub mod tags {
    pub const VEGETARIAN: &str = "vegetarian";
    pub const VEGAN: &str = "vegan";
    pub const GLUTEN_FREE: &str = "gluten-free";
    pub const HALAL: &str = "halal";
    pub const KOSHER: &str = "kosher";
    pub const PROTEIN: &str = "protein";
    /// Prefix for ingredient tags, e.g. `contains:peanuts`
    pub const CONTAINS_PREFIX: &str = "contains:";
}

/// Menu section an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Side,
    Extra,
}

impl Category {
    pub fn is_main(self) -> bool {
        self == Category::Main
    }
}

/// An orderable item, immutable for a given page load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub pretax_price: Money,
    #[serde(default)]
    pub dietary_tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        pretax_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            pretax_price,
            dietary_tags: BTreeSet::new(),
            cuisine: None,
        }
    }

    /// Add a tag; tags are stored lowercase
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.dietary_tags.insert(tag.trim().to_lowercase());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.dietary_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the item is known to contain `ingredient`.
    ///
    /// Matches `contains:<ingredient>` tags and the item name, ignoring case.
    pub fn mentions_ingredient(&self, ingredient: &str) -> bool {
        let needle = ingredient.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let tagged = self.dietary_tags.iter().any(|t| {
            t.strip_prefix(tags::CONTAINS_PREFIX)
                .is_some_and(|i| i.trim() == needle)
        });
        tagged || self.name.to_lowercase().contains(&needle)
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pretax_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_case_insensitive() {
        let item = MenuItem::new("a", "Grilled Chicken", Category::Main, Money::new(9, 0))
            .with_tag("Protein");
        assert!(item.has_tag(tags::PROTEIN));
        assert!(!item.has_tag(tags::VEGAN));
    }

    #[test]
    fn test_ingredient_matching() {
        let item = MenuItem::new("s", "Peanut Noodles", Category::Side, Money::new(4, 0))
            .with_tag("contains:sesame");
        assert!(item.mentions_ingredient("sesame"));
        assert!(item.mentions_ingredient("PEANUT"));
        assert!(!item.mentions_ingredient("shellfish"));
        assert!(!item.mentions_ingredient("  "));
    }

    #[test]
    fn test_deserialize_from_driver_json() {
        let json = r#"{"id":"m1","name":"Salmon Bowl","category":"main","pretax_price":12.5,
                       "dietary_tags":["protein","gluten-free"]}"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.pretax_price, Money::from_cents(1250));
        assert!(item.has_tag(tags::GLUTEN_FREE));
        assert_eq!(item.cuisine, None);
    }

    #[test]
    fn test_out_of_range_price_fails_to_parse() {
        let json = r#"{"id":"x","name":"Typo","category":"side","pretax_price":1e17}"#;
        assert!(serde_json::from_str::<MenuItem>(json).is_err());
    }
}
