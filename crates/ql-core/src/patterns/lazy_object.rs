//! Lazy evaluation of expensive results.
//!
//! A `LazyObject` caches the outcome of [`perform_calculations`] and only
//! recomputes it after [`update`] marked the cache stale. The bookkeeping
//! uses `Cell`s so that `calculate` works through `&self`, which is how the
//! finite-difference solvers expose `value_at` / `delta_at` style queries.
//!
//! [`perform_calculations`]: LazyObject::perform_calculations
//! [`update`]: LazyObject::update

use std::cell::Cell;

/// Trait for objects that lazily compute and cache their results.
pub trait LazyObject {
    /// Perform the actual (expensive) calculation.
    fn perform_calculations(&self) -> crate::errors::Result<()>;

    /// Bookkeeping state embedded in the implementor.
    fn lazy_state(&self) -> &LazyState;

    /// Ensure results are up to date.
    ///
    /// A failed calculation leaves the cache stale so that the next call
    /// retries instead of serving half-computed results.
    fn calculate(&self) -> crate::errors::Result<()> {
        let state = self.lazy_state();
        if !state.calculated.get() && state.freeze_count.get() == 0 {
            state.calculated.set(true);
            if let Err(e) = self.perform_calculations() {
                state.calculated.set(false);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Mark the cached result as stale.
    fn update(&self) {
        self.lazy_state().calculated.set(false);
    }

    /// Defer recalculation until [`unfreeze`][Self::unfreeze] is called.
    fn freeze(&self) {
        let count = &self.lazy_state().freeze_count;
        count.set(count.get() + 1);
    }

    /// Undo one call to [`freeze`][Self::freeze].
    fn unfreeze(&self) {
        let count = &self.lazy_state().freeze_count;
        count.set(count.get().saturating_sub(1));
    }

    /// `true` if the cache is currently valid.
    fn is_calculated(&self) -> bool {
        self.lazy_state().calculated.get()
    }

    /// `true` if recalculation is currently deferred.
    fn is_frozen(&self) -> bool {
        self.lazy_state().freeze_count.get() > 0
    }
}

/// Bookkeeping fields required by [`LazyObject`].
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use ql_core::{LazyObject, LazyState};
///
/// struct Squarer {
///     state: LazyState,
///     input: f64,
///     result: Cell<f64>,
/// }
///
/// impl LazyObject for Squarer {
///     fn perform_calculations(&self) -> ql_core::Result<()> {
///         self.result.set(self.input * self.input);
///         Ok(())
///     }
///     fn lazy_state(&self) -> &LazyState { &self.state }
/// }
///
/// let s = Squarer { state: LazyState::new(), input: 3.0, result: Cell::new(0.0) };
/// s.calculate().unwrap();
/// assert_eq!(s.result.get(), 9.0);
/// ```
#[derive(Debug, Default)]
pub struct LazyState {
    /// `true` when the cached result is valid.
    pub calculated: Cell<bool>,
    /// Number of `freeze` calls without a matching `unfreeze`.
    pub freeze_count: Cell<u32>,
}

impl LazyState {
    /// A state whose cache is initially stale.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};

    struct Counter {
        state: LazyState,
        runs: Cell<u32>,
        fail: Cell<bool>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                state: LazyState::new(),
                runs: Cell::new(0),
                fail: Cell::new(false),
            }
        }
    }

    impl LazyObject for Counter {
        fn perform_calculations(&self) -> Result<()> {
            self.runs.set(self.runs.get() + 1);
            if self.fail.get() {
                return Err(Error::Runtime("boom".into()));
            }
            Ok(())
        }
        fn lazy_state(&self) -> &LazyState {
            &self.state
        }
    }

    #[test]
    fn calculates_once_until_updated() {
        let c = Counter::new();
        c.calculate().unwrap();
        c.calculate().unwrap();
        assert_eq!(c.runs.get(), 1);
        c.update();
        c.calculate().unwrap();
        assert_eq!(c.runs.get(), 2);
    }

    #[test]
    fn frozen_object_defers_calculation() {
        let c = Counter::new();
        c.freeze();
        c.calculate().unwrap();
        assert_eq!(c.runs.get(), 0);
        assert!(c.is_frozen());
        c.unfreeze();
        c.calculate().unwrap();
        assert_eq!(c.runs.get(), 1);
    }

    #[test]
    fn failed_calculation_is_retried() {
        let c = Counter::new();
        c.fail.set(true);
        assert!(c.calculate().is_err());
        assert!(!c.is_calculated());
        c.fail.set(false);
        c.calculate().unwrap();
        assert!(c.is_calculated());
        assert_eq!(c.runs.get(), 2);
    }
}
