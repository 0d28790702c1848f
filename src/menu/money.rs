//! Pretax money amounts stored as whole cents

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A money amount in cents.
///
/// All budget arithmetic happens on integer cents so comparisons against the
/// pretax cap are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Build an amount from whole dollars and cents, e.g. `Money::new(18, 0)`
    pub const fn new(dollars: i64, cents: i64) -> Self {
        Money(dollars * 100 + cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Convert a dollar float (as found in YAML or driver JSON) to cents
    pub fn from_dollars(dollars: f64) -> Result<Self, ParseMoneyError> {
        let cents = (dollars * 100.0).round();
        // `as` would saturate silently; i64::MAX as f64 rounds up past the range
        if !cents.is_finite() || cents >= i64::MAX as f64 || cents < i64::MIN as f64 {
            return Err(ParseMoneyError(dollars.to_string()));
        }
        Ok(Money(cents as i64))
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid money amount: {0}")]
pub struct ParseMoneyError(String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Accepts `18`, `18.5`, `18.00` and `$18.00`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let err = || ParseMoneyError(s.to_string());

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() || whole.starts_with('-') || frac.len() > 2 {
            return Err(err());
        }
        let whole: i64 = whole.parse().map_err(|_| err())?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse().map_err(|_| err())?,
        };
        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(frac_cents))
            .map(Money)
            .ok_or_else(err)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Money::from_dollars(n).map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("18".parse::<Money>().unwrap(), Money::new(18, 0));
        assert_eq!("$15.00".parse::<Money>().unwrap(), Money::new(15, 0));
        assert_eq!("4.5".parse::<Money>().unwrap(), Money::from_cents(450));
        assert!("4.555".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1600).to_string(), "$16.00");
        assert_eq!(Money::from_cents(905).to_string(), "$9.05");
    }

    #[test]
    fn test_float_rounding_is_exact_for_prices() {
        // 0.1 + 0.2 style drift must not leak into cents
        assert_eq!(Money::from_dollars(17.99).unwrap().cents(), 1799);
        assert_eq!(Money::from_dollars(4.35).unwrap().cents(), 435);
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        assert!(Money::from_dollars(1e17).is_err());
        assert!(Money::from_dollars(f64::INFINITY).is_err());
        assert!("92233720368547758.07".parse::<Money>().is_err());
        assert!(serde_json::from_str::<Money>("1e17").is_err());
        assert_eq!(
            Money::from_dollars(1_000_000.0).unwrap(),
            Money::new(1_000_000, 0)
        );
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Money::new(9, 0).checked_add(Money::new(4, 0)),
            Some(Money::new(13, 0))
        );
        assert_eq!(Money::new(9, 0).checked_add(Money::from_cents(i64::MAX)), None);
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_num: Money = serde_yaml::from_str("18.0").unwrap();
        let from_str: Money = serde_yaml::from_str("\"$18.00\"").unwrap();
        assert_eq!(from_num, from_str);
    }
}
