//! Money type for representing currency amounts
//!
//! Internally stores amounts in minor units (i64) to avoid floating-point
//! precision issues. The number of decimal places is not baked into the type:
//! parsing and formatting take it as an argument so one binary can handle
//! currencies with 0, 2 or 3 fractional digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// YNAB reports every amount in milliunits (1/1000 of the currency unit)
pub const MILLIUNIT_PLACES: u32 = 3;

/// Largest supported number of decimal places
pub const MAX_DECIMAL_PLACES: u32 = 9;

/// Symbols skipped when parsing amounts
const CURRENCY_SYMBOLS: [char; 12] = ['$', '€', '£', '¥', '¢', '₹', '₩', '₽', '₺', '₪', '₫', '₱'];

/// Represents a monetary amount stored as minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from minor units
    ///
    /// # Examples
    /// ```
    /// use ynab_reconciler::models::Money;
    /// let amount = Money::from_minor(1050); // 10.50 with two decimal places
    /// assert_eq!(amount.minor(), 1050);
    /// ```
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Convert a YNAB milliunit amount into minor units.
    ///
    /// Fails when the conversion would drop non-zero digits (e.g. 1234
    /// milliunits with two decimal places).
    pub fn from_milliunits(milliunits: i64, decimal_places: u32) -> Result<Self, MoneyParseError> {
        check_places(decimal_places)?;
        if decimal_places <= MILLIUNIT_PLACES {
            let divisor = 10i64.pow(MILLIUNIT_PLACES - decimal_places);
            if milliunits % divisor != 0 {
                return Err(MoneyParseError::PrecisionLoss(format!(
                    "{} milliunits with {} decimal places",
                    milliunits, decimal_places
                )));
            }
            Ok(Self(milliunits / divisor))
        } else {
            let factor = 10i64.pow(decimal_places - MILLIUNIT_PLACES);
            milliunits
                .checked_mul(factor)
                .map(Self)
                .ok_or_else(|| MoneyParseError::Overflow(milliunits.to_string()))
        }
    }

    /// Parse a decimal amount string into minor units, with `.` as the
    /// decimal separator.
    pub fn parse_decimal(s: &str, decimal_places: u32) -> Result<Self, MoneyParseError> {
        Self::parse_decimal_with(s, decimal_places, '.')
    }

    /// Parse a decimal amount string into minor units.
    ///
    /// `separator` is the decimal separator (`.` or `,`); the other one is
    /// the thousands separator and must group digits in threes. Currency
    /// symbols and whitespace are ignored. A leading `-` or surrounding
    /// parentheses mark the amount as negative. Any other character is
    /// rejected. Fractional digits beyond `decimal_places` are accepted only
    /// when they are zeros.
    pub fn parse_decimal_with(
        s: &str,
        decimal_places: u32,
        separator: char,
    ) -> Result<Self, MoneyParseError> {
        check_places(decimal_places)?;
        let invalid = || MoneyParseError::InvalidFormat(s.trim().to_string());
        let grouping = if separator == ',' { '.' } else { ',' };

        let mut cleaned = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0'..='9' | '-' | '+' | '(' | ')' => cleaned.push(c),
                c if c == separator => cleaned.push('.'),
                c if c == grouping => cleaned.push(','),
                c if c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c) => {}
                _ => return Err(invalid()),
            }
        }

        // Handle parentheses as negative (accounting format)
        let (negative, value) = if cleaned.starts_with('(') && cleaned.ends_with(')') {
            (true, &cleaned[1..cleaned.len() - 1])
        } else if let Some(stripped) = cleaned.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = cleaned.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, cleaned.as_str())
        };

        let (whole, frac) = match value.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (value, ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(frac) {
            return Err(invalid());
        }
        let whole = ungroup(whole).ok_or_else(invalid)?;

        let places = decimal_places as usize;
        let (kept, dropped) = if frac.len() > places {
            frac.split_at(places)
        } else {
            (frac, "")
        };
        if dropped.chars().any(|c| c != '0') {
            return Err(MoneyParseError::PrecisionLoss(s.trim().to_string()));
        }

        let overflow = || MoneyParseError::Overflow(s.trim().to_string());
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut frac_minor: i64 = if kept.is_empty() {
            0
        } else {
            kept.parse().map_err(|_| invalid())?
        };
        // Pad short fractions: "10.5" with two places is 50 minor units
        frac_minor *= 10i64.pow((places - kept.len()) as u32);

        let minor = whole
            .checked_mul(10i64.pow(decimal_places))
            .and_then(|w| w.checked_add(frac_minor))
            .ok_or_else(overflow)?;

        Ok(Self(if negative { -minor } else { minor }))
    }

    /// Render the amount as a plain decimal string (e.g. `-5.00`)
    pub fn to_decimal_string(&self, decimal_places: u32) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        if decimal_places == 0 {
            return format!("{}{}", sign, magnitude);
        }
        let scale = 10u64.pow(decimal_places.min(MAX_DECIMAL_PLACES));
        format!(
            "{}{}.{:0width$}",
            sign,
            magnitude / scale,
            magnitude % scale,
            width = decimal_places as usize
        )
    }
}

/// Strip thousands separators (`,`) from the integer part.
///
/// Returns `None` unless every group after the first has exactly three digits.
fn ungroup(whole: &str) -> Option<String> {
    let mut groups = whole.split(',');
    let first = groups.next().unwrap_or("");
    if !first.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut digits = first.to_string();
    for group in groups {
        if first.is_empty() || group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

fn check_places(decimal_places: u32) -> Result<(), MoneyParseError> {
    if decimal_places > MAX_DECIMAL_PLACES {
        return Err(MoneyParseError::UnsupportedPlaces(decimal_places));
    }
    Ok(())
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string(2))
    }
}

// Arithmetic saturates at the i64 bounds instead of wrapping

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    PrecisionLoss(String),
    Overflow(String),
    UnsupportedPlaces(u32),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::PrecisionLoss(s) => {
                write!(f, "Amount has more precision than supported: {}", s)
            }
            MoneyParseError::Overflow(s) => write!(f, "Amount out of range: {}", s),
            MoneyParseError::UnsupportedPlaces(p) => {
                write!(f, "Unsupported number of decimal places: {}", p)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}
