use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use crate::EngineError;

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for all monetary values crossing the API boundary, so
/// amounts are exact and no floating-point drift can accumulate. Inside
/// the engine the raw `i64` minor-unit value is carried in entity
/// columns; this wrapper adds parsing, formatting and checked
/// arithmetic on top of it.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyMinor;
///
/// let amount = MoneyMinor::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator;
/// rejects more than 2 decimals):
///
/// ```rust
/// use engine::MoneyMinor;
///
/// assert_eq!("10".parse::<MoneyMinor>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<MoneyMinor>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<MoneyMinor>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyMinor(i64);

impl MoneyMinor {
    pub const ZERO: MoneyMinor = MoneyMinor(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyMinor) -> Option<MoneyMinor> {
        self.0.checked_add(rhs.0).map(MoneyMinor)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyMinor) -> Option<MoneyMinor> {
        self.0.checked_sub(rhs.0).map(MoneyMinor)
    }
}

impl fmt::Display for MoneyMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyMinor {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyMinor> for i64 {
    fn from(value: MoneyMinor) -> Self {
        value.0
    }
}

impl Add for MoneyMinor {
    type Output = MoneyMinor;

    fn add(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyMinor {
    fn add_assign(&mut self, rhs: MoneyMinor) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyMinor {
    type Output = MoneyMinor;

    fn sub(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyMinor {
    fn sub_assign(&mut self, rhs: MoneyMinor) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyMinor {
    type Output = MoneyMinor;

    fn neg(self) -> Self::Output {
        MoneyMinor(-self.0)
    }
}

impl FromStr for MoneyMinor {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::Validation("empty amount".to_string());
        let invalid = || EngineError::Validation("invalid amount".to_string());
        let overflow = || EngineError::Validation("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::Validation("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyMinor(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyMinor::new(0).to_string(), "0.00");
        assert_eq!(MoneyMinor::new(1).to_string(), "0.01");
        assert_eq!(MoneyMinor::new(10).to_string(), "0.10");
        assert_eq!(MoneyMinor::new(1050).to_string(), "10.50");
        assert_eq!(MoneyMinor::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyMinor>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<MoneyMinor>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<MoneyMinor>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<MoneyMinor>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<MoneyMinor>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<MoneyMinor>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyMinor>().is_err());
        assert!("0.001".parse::<MoneyMinor>().is_err());
    }

    #[test]
    fn arithmetic_stays_in_minor_units() {
        let mut balance = MoneyMinor::new(1000);
        balance += MoneyMinor::new(250);
        balance -= MoneyMinor::new(50);
        assert_eq!(balance, MoneyMinor::new(1200));
        assert_eq!(-balance, MoneyMinor::new(-1200));
        assert_eq!(
            MoneyMinor::new(i64::MAX).checked_add(MoneyMinor::new(1)),
            None
        );
        assert_eq!(
            MoneyMinor::new(i64::MIN).checked_sub(MoneyMinor::new(1)),
            None
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<MoneyMinor>().is_err());
        assert!("-".parse::<MoneyMinor>().is_err());
        assert!("1.2.3".parse::<MoneyMinor>().is_err());
        assert!("ten".parse::<MoneyMinor>().is_err());
    }
}
