use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a time grid could not be constructed.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Time grid requires at least {required} points, got {got}.")]
    TooFewPoints { required: usize, got: usize },
    #[error("Time grid entry at index {index} is not finite.")]
    NonFinite { index: usize },
    #[error("Time grid must be strictly increasing at index {index}: {value} does not exceed {previous}.")]
    NotIncreasing {
        index: usize,
        previous: f64,
        value: f64,
    },
}

/// A strictly increasing sequence of sample times.
///
/// Validated on construction; integration never re-checks ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Builds `samples` evenly spaced points spanning `[start, end]`,
    /// endpoints included.
    pub fn linspace(start: f64, end: f64, samples: usize) -> Result<Self, GridError> {
        if samples < 2 {
            return Err(GridError::TooFewPoints {
                required: 2,
                got: samples,
            });
        }
        let step = (end - start) / (samples - 1) as f64;
        let mut times = Vec::with_capacity(samples);
        for i in 0..samples {
            times.push(start + step * i as f64);
        }
        // Land the final sample exactly on `end` despite rounding.
        times[samples - 1] = end;
        Self::from_points(times)
    }

    /// Builds a grid from explicit sample times.
    pub fn from_points(times: Vec<f64>) -> Result<Self, GridError> {
        if times.len() < 2 {
            return Err(GridError::TooFewPoints {
                required: 2,
                got: times.len(),
            });
        }
        for (index, &value) in times.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFinite { index });
            }
            if index > 0 && value <= times[index - 1] {
                return Err(GridError::NotIncreasing {
                    index,
                    previous: times[index - 1],
                    value,
                });
            }
        }
        Ok(Self { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Total time span covered by the grid.
    pub fn span(&self) -> f64 {
        self.times[self.times.len() - 1] - self.times[0]
    }
}

#[cfg(test)]
mod tests {
    use super::{GridError, TimeGrid};

    #[test]
    fn linspace_hits_both_endpoints() {
        let grid = TimeGrid::linspace(0.0, 15.0, 1000).expect("valid grid");
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.times()[0], 0.0);
        assert_eq!(grid.times()[999], 15.0);
        assert!((grid.span() - 15.0).abs() < 1e-15);
    }

    #[test]
    fn linspace_spacing_is_uniform() {
        let grid = TimeGrid::linspace(1.0, 2.0, 5).expect("valid grid");
        let times = grid.times();
        for i in 1..times.len() {
            assert!((times[i] - times[i - 1] - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_too_few_points() {
        let err = TimeGrid::linspace(0.0, 1.0, 1).expect_err("expected error");
        assert_eq!(
            err,
            GridError::TooFewPoints {
                required: 2,
                got: 1
            }
        );
        assert!(TimeGrid::from_points(vec![0.0]).is_err());
    }

    #[test]
    fn rejects_non_increasing_sequences() {
        let err = TimeGrid::from_points(vec![0.0, 1.0, 1.0]).expect_err("expected error");
        assert!(matches!(err, GridError::NotIncreasing { index: 2, .. }));
        assert!(format!("{err}").contains("strictly increasing"));

        let err = TimeGrid::from_points(vec![0.0, 2.0, 1.0]).expect_err("expected error");
        assert!(matches!(err, GridError::NotIncreasing { index: 2, .. }));
    }

    #[test]
    fn rejects_non_finite_entries() {
        let err = TimeGrid::from_points(vec![0.0, f64::NAN, 2.0]).expect_err("expected error");
        assert!(matches!(err, GridError::NonFinite { index: 1 }));

        let err = TimeGrid::linspace(0.0, f64::INFINITY, 3).expect_err("expected error");
        assert!(matches!(err, GridError::NonFinite { .. }));
    }
}
