//! Unconstrained minimisation.
//!
//! A small framework: a [`CostFunction`] to minimise, a [`Constraint`] on
//! admissible points, [`EndCriteria`] deciding when to stop, and the
//! [`ConjugateGradient`] minimiser used by the hypersphere correlation
//! repair.

use crate::array::Array;
use ql_core::{errors::Result, Real};
use tracing::trace;

/// A scalar objective.
pub trait CostFunction {
    /// Cost at `x`.
    fn value(&self, x: &Array) -> Result<Real>;

    /// Gradient at `x`; central differences unless overridden.
    fn gradient(&self, x: &Array) -> Result<Array> {
        const H: Real = 1e-6;
        let mut grad = Array::zeros(x.len());
        let mut shifted = x.clone();
        for i in 0..x.len() {
            let xi = x[i];
            shifted[i] = xi + H;
            let up = self.value(&shifted)?;
            shifted[i] = xi - H;
            let down = self.value(&shifted)?;
            shifted[i] = xi;
            grad[i] = (up - down) / (2.0 * H);
        }
        Ok(grad)
    }
}

/// Admissible region of the parameter space.
pub trait Constraint {
    /// `true` if `x` is admissible.
    fn test(&self, x: &Array) -> bool;
}

/// Every point is admissible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraint;

impl Constraint for NoConstraint {
    fn test(&self, _x: &Array) -> bool {
        true
    }
}

/// Stopping rules for an optimisation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Consecutive iterations without function improvement tolerated.
    pub max_stationary_state_iterations: usize,
    /// Stop once the cost drops below this.
    pub root_epsilon: Real,
    /// Improvements smaller than this count as stationary.
    pub function_epsilon: Real,
    /// Stop once the gradient norm drops below this.
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Criteria from their five components.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        }
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self::new(1000, 100, 1e-8, 1e-8, 1e-8)
    }
}

/// Why an optimisation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Iteration cap reached.
    MaxIterations,
    /// Cost below `root_epsilon`.
    RootEpsilon,
    /// Too many iterations without improvement.
    StationaryPoint,
    /// Gradient norm below `gradient_norm_epsilon`.
    GradientNormEpsilon,
}

/// Outcome of an optimisation.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best point found.
    pub x: Array,
    /// Cost at `x`.
    pub value: Real,
    /// Iterations performed.
    pub iterations: usize,
    /// Stopping reason.
    pub end_type: EndCriteriaType,
}

/// Nonlinear conjugate gradient (Polak-Ribière with restarts) and Armijo
/// backtracking.
///
/// Falls back to steepest descent whenever the conjugate direction is not a
/// descent direction; iterates never leave the constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConjugateGradient;

impl ConjugateGradient {
    const ARMIJO: Real = 1e-4;
    const MAX_BACKTRACKS: usize = 60;

    /// Minimiser with default settings.
    pub fn new() -> Self {
        Self
    }

    /// Minimise `cost` from `initial`.
    pub fn minimize<C: CostFunction, K: Constraint>(
        &self,
        cost: &C,
        constraint: &K,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        let mut x = initial.clone();
        let mut value = cost.value(&x)?;
        let mut grad = cost.gradient(&x)?;
        let mut direction = -&grad;
        let mut grad_norm_sq = grad.dot(&grad);
        let mut stationary = 0;
        let mut step_hint: Real = 1.0;

        for iteration in 0..end_criteria.max_iterations {
            if value < end_criteria.root_epsilon {
                return Ok(Self::finish(x, value, iteration, EndCriteriaType::RootEpsilon));
            }
            if grad_norm_sq.sqrt() < end_criteria.gradient_norm_epsilon {
                return Ok(Self::finish(
                    x,
                    value,
                    iteration,
                    EndCriteriaType::GradientNormEpsilon,
                ));
            }

            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                direction = -&grad;
                slope = -grad_norm_sq;
            }

            let mut alpha = step_hint.max(1e-12) * 2.0;
            let mut accepted = None;
            for _ in 0..Self::MAX_BACKTRACKS {
                let candidate = &x + &(&direction * alpha);
                if constraint.test(&candidate) {
                    let v = cost.value(&candidate)?;
                    if v <= value + Self::ARMIJO * alpha * slope {
                        accepted = Some((candidate, v));
                        break;
                    }
                }
                alpha *= 0.5;
            }

            let Some((x_new, v_new)) = accepted else {
                trace!(iteration, value, "line search stalled");
                return Ok(Self::finish(
                    x,
                    value,
                    iteration,
                    EndCriteriaType::StationaryPoint,
                ));
            };
            step_hint = alpha;

            if (value - v_new).abs() < end_criteria.function_epsilon {
                stationary += 1;
                if stationary > end_criteria.max_stationary_state_iterations {
                    return Ok(Self::finish(
                        x_new,
                        v_new,
                        iteration + 1,
                        EndCriteriaType::StationaryPoint,
                    ));
                }
            } else {
                stationary = 0;
            }

            x = x_new;
            value = v_new;
            let new_grad = cost.gradient(&x)?;
            let new_norm_sq = new_grad.dot(&new_grad);
            let beta = if grad_norm_sq > 0.0 {
                ((new_norm_sq - new_grad.dot(&grad)) / grad_norm_sq).max(0.0)
            } else {
                0.0
            };
            direction = &(&direction * beta) - &new_grad;
            grad = new_grad;
            grad_norm_sq = new_norm_sq;
        }

        Ok(Self::finish(
            x,
            value,
            end_criteria.max_iterations,
            EndCriteriaType::MaxIterations,
        ))
    }

    fn finish(x: Array, value: Real, iterations: usize, end_type: EndCriteriaType) -> OptimizationResult {
        trace!(iterations, value, ?end_type, "conjugate gradient finished");
        OptimizationResult {
            x,
            value,
            iterations,
            end_type,
        }
    }
}
