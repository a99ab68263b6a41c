//! Monetary amounts.
//!
//! Amounts are kept as a whole number of cents so that the monthly totals add
//! up exactly. The JSON API exchanges them as decimal numbers, e.g. `12.34`.

use std::{fmt::Display, ops::Sub};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// The largest number of cents that survives a round trip through an `f64`.
const MAX_CENTS: i64 = 9_007_199_254_740_991;

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero dollars and zero cents.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal amount of dollars, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values too large to represent
    /// exactly.
    pub fn from_f64(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() {
            return None;
        }

        let cents = (dollars * 100.0).round();

        if cents.abs() > MAX_CENTS as f64 {
            None
        } else {
            Some(Self(cents as i64))
        }
    }

    /// The number of cents in this amount.
    pub fn cents(self) -> i64 {
        self.0
    }

    /// The amount in dollars.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Check that the amount is greater than zero.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NonPositiveAmount] if the amount is zero or negative.
    pub fn require_positive(self) -> Result<Self, Error> {
        if self.0 > 0 {
            Ok(self)
        } else {
            Err(Error::NonPositiveAmount)
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;

        Amount::from_f64(dollars)
            .ok_or_else(|| de::Error::custom(format!("{dollars} is not a valid amount")))
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, amount::Amount};

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(Amount::from_f64(12.34), Some(Amount::from_cents(1234)));
        assert_eq!(Amount::from_f64(0.1 + 0.2), Some(Amount::from_cents(30)));
        assert_eq!(Amount::from_f64(9.999), Some(Amount::from_cents(1000)));
        assert_eq!(Amount::from_f64(0.004), Some(Amount::ZERO));
    }

    #[test]
    fn rejects_values_that_are_not_numbers() {
        assert_eq!(Amount::from_f64(f64::NAN), None);
        assert_eq!(Amount::from_f64(f64::INFINITY), None);
        assert_eq!(Amount::from_f64(1e300), None);
    }

    #[test]
    fn require_positive() {
        assert_eq!(
            Amount::from_cents(1).require_positive(),
            Ok(Amount::from_cents(1))
        );
        assert_eq!(Amount::ZERO.require_positive(), Err(Error::NonPositiveAmount));
        assert_eq!(
            Amount::from_cents(-500).require_positive(),
            Err(Error::NonPositiveAmount)
        );
    }

    #[test]
    fn subtraction_can_go_negative() {
        let balance = Amount::from_cents(1000) - Amount::from_cents(2550);

        assert_eq!(balance, Amount::from_cents(-1550));
        assert_eq!(balance.to_string(), "-15.50");
    }

    #[test]
    fn json_uses_decimal_dollars() {
        let amount: Amount = serde_json::from_str("500").unwrap();
        assert_eq!(amount, Amount::from_cents(50_000));

        let amount: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "19.99");
    }

    #[test]
    fn json_rejects_strings() {
        assert!(serde_json::from_str::<Amount>(r#""500""#).is_err());
    }
}
