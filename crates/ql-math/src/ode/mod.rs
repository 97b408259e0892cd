//! Adaptive Runge-Kutta integration of ODE systems.
//!
//! Embedded Cash-Karp 4(5) pairs with step-size control. The method-of-lines
//! finite-difference scheme uses it to integrate `dV/dt = -L V` backwards
//! over one time step.

use crate::array::Array;
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};

/// Right-hand side `f(t, y)` of `dy/dt = f(t, y)`.
pub trait OdeFunction {
    /// Evaluate the derivative at `(t, y)`.
    fn eval(&self, t: Real, y: &Array) -> Result<Array>;
}

impl<F> OdeFunction for F
where
    F: Fn(Real, &Array) -> Result<Array>,
{
    fn eval(&self, t: Real, y: &Array) -> Result<Array> {
        (self)(t, y)
    }
}

const SAFETY: Real = 0.9;
const PGROW: Real = -0.2;
const PSHRINK: Real = -0.25;
const ERRCON: Real = 1.89e-4;
const TINY: Real = 1.0e-30;
const MAX_STEPS: usize = 10_000;

/// Adaptive Cash-Karp integrator.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRungeKutta {
    eps: Real,
    initial_step: Real,
    min_step: Real,
}

impl AdaptiveRungeKutta {
    /// `eps` is the relative error allowed per step; `initial_step` the
    /// magnitude of the first trial step.
    pub fn new(eps: Real, initial_step: Real) -> Self {
        Self {
            eps,
            initial_step,
            min_step: 0.0,
        }
    }

    /// Fail once the controller asks for a step at or below `min_step`.
    pub fn with_min_step(mut self, min_step: Real) -> Self {
        self.min_step = min_step;
        self
    }

    /// Integrate from `(t1, y1)` to `t2`; `t2 < t1` integrates backwards.
    pub fn integrate<F: OdeFunction>(&self, f: &F, y1: &Array, t1: Real, t2: Real) -> Result<Array> {
        ensure!(self.eps > 0.0, "tolerance must be positive, got {}", self.eps);
        if t1 == t2 {
            return Ok(y1.clone());
        }
        let mut t = t1;
        let mut y = y1.clone();
        let mut h = self.initial_step.abs().copysign(t2 - t1);

        for _ in 0..MAX_STEPS {
            let dydt = f.eval(t, &y)?;
            let scale = Array::from_fn(y.len(), |i| y[i].abs() + (dydt[i] * h).abs() + TINY);
            if (t + h - t2) * (t + h - t1) > 0.0 {
                h = t2 - t;
            }
            let (h_did, h_next, y_next) = self.quality_step(f, &y, &dydt, t, h, &scale)?;
            t += h_did;
            y = y_next;
            if (t - t2) * (t2 - t1) >= 0.0 {
                return Ok(y);
            }
            if h_next.abs() <= self.min_step {
                return Err(Error::Runtime(format!(
                    "step size {h_next} too small at t = {t}"
                )));
            }
            h = h_next;
        }
        Err(Error::Convergence {
            method: "adaptive Runge-Kutta",
            iterations: MAX_STEPS,
            error: (t - t2).abs(),
        })
    }

    /// One controlled step. Returns `(h_did, h_next, y_new)`.
    fn quality_step<F: OdeFunction>(
        &self,
        f: &F,
        y: &Array,
        dydt: &Array,
        t: Real,
        h_try: Real,
        scale: &Array,
    ) -> Result<(Real, Real, Array)> {
        let mut h = h_try;
        loop {
            let (y_new, y_err) = cash_karp(f, y, dydt, t, h)?;
            let err_max = y_err
                .iter()
                .zip(scale.iter())
                .fold(0.0, |m: Real, (e, s)| m.max((e / s).abs()))
                / self.eps;
            if err_max <= 1.0 {
                let h_next = if err_max > ERRCON {
                    SAFETY * h * err_max.powf(PGROW)
                } else {
                    5.0 * h
                };
                return Ok((h, h_next, y_new));
            }
            let shrunk = SAFETY * h * err_max.powf(PSHRINK);
            h = if h >= 0.0 {
                shrunk.max(0.1 * h)
            } else {
                shrunk.min(0.1 * h)
            };
            if t + h == t {
                return Err(Error::Runtime(format!("step size underflow at t = {t}")));
            }
        }
    }
}

/// Cash-Karp step; returns the fifth-order solution and the embedded
/// error estimate.
fn cash_karp<F: OdeFunction>(
    f: &F,
    y: &Array,
    k1: &Array,
    t: Real,
    h: Real,
) -> Result<(Array, Array)> {
    const A2: Real = 0.2;
    const A3: Real = 0.3;
    const A4: Real = 0.6;
    const A6: Real = 0.875;
    const B21: Real = 0.2;
    const B31: Real = 3.0 / 40.0;
    const B32: Real = 9.0 / 40.0;
    const B41: Real = 0.3;
    const B42: Real = -0.9;
    const B43: Real = 1.2;
    const B51: Real = -11.0 / 54.0;
    const B52: Real = 2.5;
    const B53: Real = -70.0 / 27.0;
    const B54: Real = 35.0 / 27.0;
    const B61: Real = 1631.0 / 55296.0;
    const B62: Real = 175.0 / 512.0;
    const B63: Real = 575.0 / 13824.0;
    const B64: Real = 44275.0 / 110592.0;
    const B65: Real = 253.0 / 4096.0;
    const C1: Real = 37.0 / 378.0;
    const C3: Real = 250.0 / 621.0;
    const C4: Real = 125.0 / 594.0;
    const C6: Real = 512.0 / 1771.0;
    const DC1: Real = C1 - 2825.0 / 27648.0;
    const DC3: Real = C3 - 18575.0 / 48384.0;
    const DC4: Real = C4 - 13525.0 / 55296.0;
    const DC5: Real = -277.0 / 14336.0;
    const DC6: Real = C6 - 0.25;

    let stage = |coeffs: &[(Real, &Array)]| {
        let mut out = y.clone();
        for (c, k) in coeffs {
            out.axpy(h * c, k);
        }
        out
    };

    let k2 = f.eval(t + A2 * h, &stage(&[(B21, k1)]))?;
    let k3 = f.eval(t + A3 * h, &stage(&[(B31, k1), (B32, &k2)]))?;
    let k4 = f.eval(t + A4 * h, &stage(&[(B41, k1), (B42, &k2), (B43, &k3)]))?;
    let k5 = f.eval(t + h, &stage(&[(B51, k1), (B52, &k2), (B53, &k3), (B54, &k4)]))?;
    let k6 = f.eval(
        t + A6 * h,
        &stage(&[(B61, k1), (B62, &k2), (B63, &k3), (B64, &k4), (B65, &k5)]),
    )?;

    let y_new = stage(&[(C1, k1), (C3, &k3), (C4, &k4), (C6, &k6)]);
    let mut y_err = Array::zeros(y.len());
    for (c, k) in [(DC1, k1), (DC3, &k3), (DC4, &k4), (DC5, &k5), (DC6, &k6)] {
        y_err.axpy(h * c, k);
    }
    Ok((y_new, y_err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exponential_growth() {
        let rk = AdaptiveRungeKutta::new(1e-10, 0.01);
        let f = |_t: Real, y: &Array| -> Result<Array> { Ok(y.clone()) };
        let y = rk.integrate(&f, &Array::from_element(1, 1.0), 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(y[0], std::f64::consts::E, epsilon = 1e-8);
    }

    #[test]
    fn harmonic_oscillator() {
        let rk = AdaptiveRungeKutta::new(1e-10, 0.01);
        let f = |_t: Real, y: &Array| -> Result<Array> { Ok(Array::from_slice(&[y[1], -y[0]])) };
        let y = rk
            .integrate(&f, &Array::from_slice(&[0.0, 1.0]), 0.0, std::f64::consts::PI)
            .unwrap();
        assert_abs_diff_eq!(y[0], 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(y[1], -1.0, epsilon = 1e-7);
    }

    #[test]
    fn backward_integration() {
        let rk = AdaptiveRungeKutta::new(1e-10, 0.001);
        let f = |_t: Real, y: &Array| -> Result<Array> { Ok(-y) };
        let y = rk.integrate(&f, &Array::from_element(2, 1.0), 1.0, 0.0).unwrap();
        assert_abs_diff_eq!(y[1], 1.0_f64.exp(), epsilon = 1e-7);
    }

    #[test]
    fn error_in_rhs_propagates() {
        let rk = AdaptiveRungeKutta::new(1e-6, 0.1);
        let f = |_t: Real, _y: &Array| -> Result<Array> { Err(Error::Runtime("bad".into())) };
        assert!(rk.integrate(&f, &Array::zeros(1), 0.0, 1.0).is_err());
    }
}
