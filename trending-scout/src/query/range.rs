//! Numeric and date range expressions used by qualifiers.

use chrono::NaiveDate;
use std::fmt;

/// A value that can appear inside a range qualifier.
pub trait RangeValue: Sized + Copy + PartialOrd + fmt::Display {
    fn parse_value(text: &str) -> Option<Self>;
}

impl RangeValue for u64 {
    fn parse_value(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl RangeValue for NaiveDate {
    fn parse_value(text: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
    }
}

/// A comparison against a count or date, in provider syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeExpr<T> {
    /// `N`
    Exactly(T),
    /// `>N`
    GreaterThan(T),
    /// `>=N` or `N..*`
    AtLeast(T),
    /// `<N`
    LessThan(T),
    /// `<=N` or `*..N`
    AtMost(T),
    /// `A..B`, inclusive on both ends.
    Between(T, T),
}

impl<T: RangeValue> RangeExpr<T> {
    /// Parses a range expression. Returns `None` for anything malformed,
    /// including inverted `A..B` ranges.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some((low, high)) = text.split_once("..") {
            return match (low.trim(), high.trim()) {
                ("*", "*") => None,
                ("*", high) => T::parse_value(high).map(Self::AtMost),
                (low, "*") => T::parse_value(low).map(Self::AtLeast),
                (low, high) => {
                    let (low, high) = (T::parse_value(low)?, T::parse_value(high)?);
                    (low <= high).then_some(Self::Between(low, high))
                }
            };
        }

        if let Some(rest) = text.strip_prefix(">=") {
            T::parse_value(rest).map(Self::AtLeast)
        } else if let Some(rest) = text.strip_prefix("<=") {
            T::parse_value(rest).map(Self::AtMost)
        } else if let Some(rest) = text.strip_prefix('>') {
            T::parse_value(rest).map(Self::GreaterThan)
        } else if let Some(rest) = text.strip_prefix('<') {
            T::parse_value(rest).map(Self::LessThan)
        } else {
            T::parse_value(text).map(Self::Exactly)
        }
    }

    /// Whether `value` satisfies the expression.
    pub fn contains(&self, value: T) -> bool {
        match *self {
            Self::Exactly(n) => value == n,
            Self::GreaterThan(n) => value > n,
            Self::AtLeast(n) => value >= n,
            Self::LessThan(n) => value < n,
            Self::AtMost(n) => value <= n,
            Self::Between(low, high) => low <= value && value <= high,
        }
    }
}

impl<T: fmt::Display> fmt::Display for RangeExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::GreaterThan(n) => write!(f, ">{n}"),
            Self::AtLeast(n) => write!(f, ">={n}"),
            Self::LessThan(n) => write!(f, "<{n}"),
            Self::AtMost(n) => write!(f, "<={n}"),
            Self::Between(low, high) => write!(f, "{low}..{high}"),
        }
    }
}
