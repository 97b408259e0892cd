//! # ql-instruments
//!
//! What the pricing engines price: payoffs, exercise schedules, cash
//! dividends and the argument structs handed to a [`PricingEngine`], plus
//! the [`PricingResults`] an engine returns.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod arguments;
pub mod dividend;
pub mod exercise;
pub mod payoff;
pub mod pricing_engine;

pub use arguments::{
    BarrierOptionArguments, BarrierType, SwingOptionArguments, VanillaOptionArguments,
};
pub use dividend::Dividend;
pub use exercise::{Exercise, ExerciseType};
pub use payoff::{
    AssetOrNothingPayoff, CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff,
    StrikedPayoff, VanillaForwardPayoff,
};
pub use pricing_engine::{PricingEngine, PricingResults};
