//! Money type for representing monetary values.
//!
//! Amounts are integers in the smallest unit of the currency (fen for CNY),
//! so totals are exact and recomputing a price always yields the same value.
//! Estimated surcharges and deposits are quoted in whole currency units;
//! [`Money::percent_of_rounded`] does that rounding with integer arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    CNY,
    HKD,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "CNY").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::CNY => "CNY",
            Currency::HKD => "HKD",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "¥").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::CNY => "\u{00a5}",
            Currency::HKD => "HK$",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Number of minor units in one whole unit.
    pub fn minor_per_unit(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a Money value from whole currency units.
    ///
    /// ```
    /// use roomset_commerce::money::{Currency, Money};
    /// let price = Money::from_units(1000, Currency::CNY);
    /// assert_eq!(price.amount_minor, 100_000);
    /// ```
    pub fn from_units(units: i64, currency: Currency) -> Self {
        Self::new(units.saturating_mul(currency.minor_per_unit()), currency)
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use roomset_commerce::money::{Currency, Money};
    /// let price = Money::from_decimal(1299.5, Currency::CNY);
    /// assert_eq!(price.amount_minor, 129_950);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_minor = (amount * currency.minor_per_unit() as f64).round() as i64;
        Self::new(amount_minor, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_unit() as f64
    }

    /// Format as a display string (e.g., "¥1299.50").
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{}{:.places$}", self.currency.symbol(), self.to_decimal())
    }

    /// Try to add another Money value, returning None on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// The larger of two amounts in the same currency.
    pub fn max_of(self, other: Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(if other.amount_minor > self.amount_minor {
            other
        } else {
            self
        })
    }

    /// `round(self × percent / 100)` in whole currency units.
    ///
    /// ```
    /// use roomset_commerce::money::{Currency, Money};
    /// let total = Money::from_units(6501, Currency::CNY);
    /// assert_eq!(total.percent_of_rounded(30), Money::from_units(1950, Currency::CNY));
    /// ```
    pub fn percent_of_rounded(&self, percent: u32) -> Money {
        let unit = self.currency.minor_per_unit() as i128;
        let numerator = self.amount_minor as i128 * percent as i128;
        let units = div_round(numerator, 100 * unit);
        Money::new((units * unit) as i64, self.currency)
    }
}

/// Integer division rounding halves away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
