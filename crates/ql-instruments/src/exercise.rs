//! Option exercise schedules.
//!
//! An `Exercise` defines *when* an option can be exercised, as times in
//! years from today.

use ql_core::{ensure, errors::Result, Time};
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time between two times.
    American,
    /// Can be exercised at specific times.
    Bermudan,
}

/// Exercise specification for an option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exercise {
    exercise_type: ExerciseType,
    /// - European: single time (the expiry).
    /// - American: two times (earliest, latest).
    /// - Bermudan: sorted, distinct exercise times.
    times: Vec<Time>,
}

impl Exercise {
    /// Exercise at `expiry` only.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry >= 0.0, "negative expiry ({expiry})");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// Exercise at any time in `[earliest, latest]`.
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ensure!(earliest >= 0.0, "negative earliest exercise time ({earliest})");
        ensure!(
            earliest <= latest,
            "earliest exercise ({earliest}) later than latest ({latest})"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Exercise at each of `times`; duplicates are merged.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ensure!(!times.is_empty(), "no exercise times given");
        ensure!(
            times.iter().all(|t| t.is_finite() && *t >= 0.0),
            "exercise times must be finite and non-negative"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::American => {
                write!(f, "American({} - {})", self.times[0], self.last_time())
            }
            ExerciseType::Bermudan => write!(f, "Bermudan({} times)", self.times.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn european_exercise() {
        let ex = Exercise::european(1.5).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::European);
        assert_eq!(ex.last_time(), 1.5);
        assert_eq!(ex.times().len(), 1);
        assert!(Exercise::european(-0.1).is_err());
    }

    #[test]
    fn american_exercise() {
        let ex = Exercise::american(0.0, 2.0).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::American);
        assert_eq!(ex.last_time(), 2.0);
        assert_eq!(ex.to_string(), "American(0 - 2)");
        assert!(Exercise::american(2.0, 1.0).is_err());
    }

    #[test]
    fn bermudan_times_are_sorted_and_merged() {
        let ex = Exercise::bermudan(vec![1.0, 0.5, 1.0, 0.25]).unwrap();
        assert_eq!(ex.times(), &[0.25, 0.5, 1.0]);
        assert_eq!(ex.last_time(), 1.0);
        assert!(Exercise::bermudan(vec![]).is_err());
        assert!(Exercise::bermudan(vec![f64::NAN]).is_err());
    }
}
