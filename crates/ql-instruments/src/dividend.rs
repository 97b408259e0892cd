//! Discrete cash dividends.

use ql_core::{Real, Time};

/// A fixed cash amount paid by the underlying at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dividend {
    /// Payment time in years.
    pub time: Time,
    /// Cash amount.
    pub amount: Real,
}

impl Dividend {
    /// Dividend of `amount` at `time`.
    pub fn new(time: Time, amount: Real) -> Self {
        Self { time, amount }
    }
}
