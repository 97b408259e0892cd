//! Option payoffs.
//!
//! A payoff is the value received on exercise as a function of the
//! underlying price.

use ql_core::Real;
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Base trait for option payoffs.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// Payoff for the underlying at `price`.
    fn value(&self, price: Real) -> Real;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// A payoff depending on a strike price.
pub trait StrikedPayoff: Payoff {
    /// The strike price.
    fn strike(&self) -> Real;

    /// The option type (call / put).
    fn option_type(&self) -> OptionType;
}

/// Implements [`StrikedPayoff`] for a struct with `option_type` and
/// `strike` fields.
macro_rules! striked_payoff {
    ($t:ty) => {
        impl StrikedPayoff for $t {
            fn strike(&self) -> Real {
                self.strike
            }

            fn option_type(&self) -> OptionType {
                self.option_type
            }
        }
    };
}

/// Whether `price` is strictly in the money for `option_type` and `strike`.
fn in_the_money(option_type: OptionType, strike: Real, price: Real) -> bool {
    option_type.sign() * (price - strike) > 0.0
}

fn striked_description(name: &str, option_type: OptionType, strike: Real) -> String {
    format!("{name} {option_type} @ {strike}")
}

/// `max(φ(S − K), 0)` where `φ = +1` for Call, `−1` for Put.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlainVanillaPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: Real,
}

impl PlainVanillaPayoff {
    /// Vanilla payoff struck at `strike`.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self { option_type, strike }
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, price: Real) -> Real {
        (self.option_type.sign() * (price - self.strike)).max(0.0)
    }

    fn name(&self) -> &str {
        "Vanilla"
    }

    fn description(&self) -> String {
        striked_description(self.name(), self.option_type, self.strike)
    }
}

striked_payoff!(PlainVanillaPayoff);

/// Pays `cash_payoff` if `φ(S − K) > 0`, else nothing.
///
/// A call struck at zero pays the cash amount for any positive price; the
/// barrier engines use it to value a rebate paid at expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashOrNothingPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: Real,
    /// Amount paid when in the money.
    pub cash_payoff: Real,
}

impl CashOrNothingPayoff {
    /// Digital paying `cash_payoff`.
    pub fn new(option_type: OptionType, strike: Real, cash_payoff: Real) -> Self {
        Self { option_type, strike, cash_payoff }
    }
}

impl Payoff for CashOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if in_the_money(self.option_type, self.strike, price) {
            self.cash_payoff
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "CashOrNothing"
    }

    fn description(&self) -> String {
        format!(
            "{} paying {}",
            striked_description(self.name(), self.option_type, self.strike),
            self.cash_payoff
        )
    }
}

striked_payoff!(CashOrNothingPayoff);

/// Pays the underlying `S` if `φ(S − K) > 0`, else nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetOrNothingPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: Real,
}

impl AssetOrNothingPayoff {
    /// Digital delivering the underlying.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self { option_type, strike }
    }
}

impl Payoff for AssetOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if in_the_money(self.option_type, self.strike, price) {
            price
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "AssetOrNothing"
    }

    fn description(&self) -> String {
        striked_description(self.name(), self.option_type, self.strike)
    }
}

striked_payoff!(AssetOrNothingPayoff);

/// `φ(S − K)` without a floor: the value of a forward bought or sold at
/// exercise, as delivered by each right of a swing option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VanillaForwardPayoff {
    /// Long (call) or short (put) the forward.
    pub option_type: OptionType,
    /// Delivery price.
    pub strike: Real,
}

impl VanillaForwardPayoff {
    /// Forward struck at `strike`.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self { option_type, strike }
    }
}

impl Payoff for VanillaForwardPayoff {
    fn value(&self, price: Real) -> Real {
        self.option_type.sign() * (price - self.strike)
    }

    fn name(&self) -> &str {
        "VanillaForward"
    }

    fn description(&self) -> String {
        striked_description(self.name(), self.option_type, self.strike)
    }
}

striked_payoff!(VanillaForwardPayoff);
