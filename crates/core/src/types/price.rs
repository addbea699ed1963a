//! Type-safe price representation in the smallest currency unit.
//!
//! Prices are whole numbers of the currency's smallest unit (one so'm for
//! UZS, one cent for USD). Arithmetic saturates instead of wrapping so an
//! order total can never silently overflow into a small number.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// An amount of money in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(0);

    /// Create a new price from an amount in the smallest currency unit.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The amount in the smallest currency unit.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Whether the price is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Add another price, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Format with a currency for display (e.g., "150 000 so'm", "$19.99").
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        let scale = 10_u64.pow(currency.minor_unit_exponent());
        let grouped = group_thousands(self.0 / scale);
        let amount = match currency.minor_unit_exponent() {
            0 => grouped,
            exponent => format!(
                "{grouped}.{:0width$}",
                self.0 % scale,
                width = usize::try_from(exponent).unwrap_or_default()
            ),
        };
        match currency {
            CurrencyCode::UZS => format!("{amount} {}", currency.symbol()),
            CurrencyCode::USD | CurrencyCode::EUR => format!("{}{amount}", currency.symbol()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// ISO 4217 currency codes used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    UZS,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::UZS => "so'm",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Decimal places between the smallest unit and the whole unit.
    #[must_use]
    pub const fn minor_unit_exponent(&self) -> u32 {
        match self {
            Self::UZS => 0,
            Self::USD | Self::EUR => 2,
        }
    }
}

/// Group digits in threes separated by a space: `150000` → `150 000`.
fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
