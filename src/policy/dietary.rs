//! Dietary restrictions and item eligibility

use crate::menu::{tags, MenuItem};
use serde::{Deserialize, Deserializer, Serialize};

/// Dietary flags and ingredients to avoid.
///
/// Field names follow the `dietary_preferences` section of the YAML config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryProfile {
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_halal: bool,
    pub is_kosher: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub avoid_ingredients: Vec<String>,
}

/// Treat an explicit YAML `null` the same as a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DietaryProfile {
    /// A profile with no restrictions at all
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn vegetarian() -> Self {
        Self {
            is_vegetarian: true,
            ..Self::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.required_tags().is_empty() && self.avoid_ingredients.is_empty()
    }

    /// Tags that must all be present on an eligible item.
    ///
    /// Vegetarian is satisfied by a vegan tag as well, so it is checked
    /// separately in [`DietaryProfile::is_eligible`].
    pub fn required_tags(&self) -> Vec<&'static str> {
        let mut required = Vec::new();
        if self.is_vegetarian {
            required.push(tags::VEGETARIAN);
        }
        if self.is_vegan {
            required.push(tags::VEGAN);
        }
        if self.is_gluten_free {
            required.push(tags::GLUTEN_FREE);
        }
        if self.is_halal {
            required.push(tags::HALAL);
        }
        if self.is_kosher {
            required.push(tags::KOSHER);
        }
        required
    }

    /// An item is eligible only when every active flag is positively tagged
    /// and no avoided ingredient is present. A missing tag counts as unknown
    /// and excludes the item.
    pub fn is_eligible(&self, item: &MenuItem) -> bool {
        let flags_ok = self.required_tags().into_iter().all(|tag| {
            item.has_tag(tag) || (tag == tags::VEGETARIAN && item.has_tag(tags::VEGAN))
        });
        flags_ok
            && !self
                .avoid_ingredients
                .iter()
                .any(|ingredient| item.mentions_ingredient(ingredient))
    }

    /// Human-readable summary, one restriction per line
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if self.is_vegetarian {
            lines.push("- Must be vegetarian".to_string());
        }
        if self.is_vegan {
            lines.push("- Must be vegan".to_string());
        }
        if self.is_gluten_free {
            lines.push("- Must be gluten-free".to_string());
        }
        if self.is_halal {
            lines.push("- Must be halal".to_string());
        }
        if self.is_kosher {
            lines.push("- Must be kosher".to_string());
        }
        if !self.avoid_ingredients.is_empty() {
            lines.push(format!(
                "- Must avoid these ingredients: {}",
                self.avoid_ingredients.join(", ")
            ));
        }

        if lines.is_empty() {
            return "No specific dietary restrictions.".to_string();
        }
        format!("Dietary restrictions:\n{}", lines.join("\n"))
    }

    /// One-line form for log and error messages, e.g. `vegan, halal; avoiding peanut`
    pub fn label(&self) -> String {
        let required = self.required_tags();
        let mut label = if required.is_empty() {
            "no restrictions".to_string()
        } else {
            required.join(", ")
        };
        if !self.avoid_ingredients.is_empty() {
            label.push_str(&format!("; avoiding {}", self.avoid_ingredients.join(", ")));
        }
        label
    }
}
