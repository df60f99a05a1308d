//! Linear support vector classifier.
//!
//! Trains an L2-regularised, squared-hinge-loss SVM by coordinate descent in
//! the dual (Hsieh et al., "A Dual Coordinate Descent Method for Large-scale
//! Linear SVM", ICML 2008). The intercept is learned as the weight of an
//! implicit constant feature equal to 1, so it is regularised like any other
//! weight.

use super::{ClassificationError, Label};
use crate::config::RANDOM_STATE;
use crate::count_table::CountTable;
use log::{debug, warn};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`LinearSvc`] training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvcParams {
    /// Inverse regularisation strength.
    pub c: f64,
    /// Stop once the projected-gradient spread of an epoch is at most this.
    pub tol: f64,
    /// Maximum number of passes over the training rows.
    pub max_iter: usize,
    /// Seed of the per-epoch coordinate permutation.
    pub seed: u64,
}

impl Default for LinearSvcParams {
    fn default() -> Self {
        LinearSvcParams {
            c: 1.0,
            tol: 1e-4,
            max_iter: 1000,
            seed: RANDOM_STATE,
        }
    }
}

/// Outcome of a training run.
///
/// A run that hits `max_iter` still yields a usable model; `converged` is
/// `false` so the caller can report it.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: LinearSvc,
    pub iterations: usize,
    pub converged: bool,
}

/// A fitted linear decision function `w·x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearSvcParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rejects hyperparameters the solver cannot train with.
    pub fn validate(&self) -> Result<(), ClassificationError> {
        if !self.c.is_finite() || self.c <= 0.0 {
            return Err(ClassificationError::InvalidParameter {
                name: "c",
                value: self.c,
                reason: "must be finite and strictly positive",
            });
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(ClassificationError::InvalidParameter {
                name: "tol",
                value: self.tol,
                reason: "must be non-negative",
            });
        }
        if self.max_iter == 0 {
            return Err(ClassificationError::InvalidParameter {
                name: "max_iter",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Trains on the rows of `x` labelled by `y`.
    pub fn fit(&self, x: &CountTable, y: &[Label]) -> Result<FitResult, ClassificationError> {
        self.validate()?;
        let (n_rows, n_features) = x.dimensions();
        if n_rows != y.len() {
            return Err(ClassificationError::LabelCountMismatch {
                rows: n_rows,
                labels: y.len(),
            });
        }
        if n_rows == 0 {
            return Err(ClassificationError::EmptyTrainingSet);
        }
        if !y.contains(&Label::Coding) || !y.contains(&Label::NonCoding) {
            return Err(ClassificationError::SingleClass);
        }

        let rows: Vec<Vec<(usize, f64)>> = (0..n_rows).map(|i| x.row(i)).collect();
        let signs: Vec<f64> = y.iter().map(|label| label.sign()).collect();

        // Squared hinge loss: unbounded alphas, diagonal shift 1/(2C).
        let diag = 0.5 / self.c;
        let qd: Vec<f64> = rows
            .iter()
            .map(|row| diag + 1.0 + row.iter().map(|&(_, v)| v * v).sum::<f64>())
            .collect();

        let mut weights = Array1::<f64>::zeros(n_features);
        let mut bias = 0.0;
        let mut alpha = vec![0.0; n_rows];
        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iter {
            order.shuffle(&mut rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let margin = rows[i].iter().map(|&(j, v)| weights[j] * v).sum::<f64>() + bias;
                let gradient = signs[i] * margin - 1.0 + diag * alpha[i];
                let projected = if alpha[i] == 0.0 {
                    gradient.min(0.0)
                } else {
                    gradient
                };
                pg_max = pg_max.max(projected);
                pg_min = pg_min.min(projected);

                if projected.abs() > 1e-12 {
                    let previous = alpha[i];
                    alpha[i] = (previous - gradient / qd[i]).max(0.0);
                    let step = (alpha[i] - previous) * signs[i];
                    for &(j, v) in &rows[i] {
                        weights[j] += step * v;
                    }
                    bias += step;
                }
            }

            iterations += 1;
            if pg_max - pg_min <= self.tol {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("Linear SVM converged after {} iterations", iterations);
        } else {
            warn!(
                "Linear SVM did not converge within {} iterations; the model is usable but may be suboptimal",
                self.max_iter
            );
        }

        Ok(FitResult {
            model: LinearSvc { weights, bias },
            iterations,
            converged,
        })
    }
}

impl LinearSvc {
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Signed distance-like score per row; positive means coding.
    pub fn decision_function(&self, x: &CountTable) -> Result<Array1<f64>, ClassificationError> {
        if x.n_features() != self.n_features() {
            return Err(ClassificationError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.n_features(),
            });
        }
        Ok((0..x.n_rows())
            .map(|i| {
                x.row(i)
                    .iter()
                    .map(|&(j, v)| self.weights[j] * v)
                    .sum::<f64>()
                    + self.bias
            })
            .collect())
    }

    pub fn predict(&self, x: &CountTable) -> Result<Vec<Label>, ClassificationError> {
        Ok(self
            .decision_function(x)?
            .iter()
            .map(|&score| {
                if score > 0.0 {
                    Label::Coding
                } else {
                    Label::NonCoding
                }
            })
            .collect())
    }
}
