//! Threshold and ranking metrics for scored predictions
//!
//! Computes a confusion matrix at a fixed decision threshold and the
//! area under the ROC curve as a threshold-independent ranking score.
//! Everything here is a pure function over labels and scores returning
//! structured, serializable values for downstream rendering.

use crate::error::{FraudBenchError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Confusion matrix at a fixed threshold; fraud is the positive class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Threshold scores (positive iff score > threshold) against truth
    pub fn from_scores(y_true: &Array1<f64>, scores: &Array1<f64>, threshold: f64) -> Self {
        let mut matrix = Self {
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
        };

        for (t, s) in y_true.iter().zip(scores.iter()) {
            let actual = *t > 0.5;
            let predicted = *s > threshold;
            match (actual, predicted) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }

        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / self.total() as f64
    }

    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }

    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }
}

/// One operating point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
    /// Score at which this point is reached
    pub threshold: f64,
}

/// Evaluation of one scored prediction set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    /// Area under the ROC curve; None when the truth is single-class
    pub auc: Option<f64>,
    /// ROC curve coordinates; empty when AUC is undefined
    pub roc: Vec<RocPoint>,
}

/// Evaluate scores against true labels at the given threshold
pub fn evaluate(y_true: &Array1<f64>, scores: &Array1<f64>, threshold: f64) -> Result<Evaluation> {
    if y_true.len() != scores.len() {
        return Err(FraudBenchError::ShapeError {
            expected: format!("{} scores", y_true.len()),
            actual: format!("{} scores", scores.len()),
        });
    }

    let confusion = ConfusionMatrix::from_scores(y_true, scores, threshold);
    let (roc, auc) = roc_curve(y_true, scores);

    Ok(Evaluation {
        confusion,
        auc,
        roc,
    })
}

/// Descending-score sweep with tie grouping; trapezoidal area.
/// Equivalent to the rank statistic with half credit for ties, so the
/// result is invariant under monotone score transforms.
fn roc_curve(y_true: &Array1<f64>, scores: &Array1<f64>) -> (Vec<RocPoint>, Option<f64>) {
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = y_true.len() - n_pos;

    if n_pos == 0 || n_neg == 0 {
        return (Vec::new(), None);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = vec![RocPoint {
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
        threshold: f64::INFINITY,
    }];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut auc = 0.0;
    let mut prev_fpr = 0.0;
    let mut prev_tpr = 0.0;

    let mut i = 0;
    while i < order.len() {
        let score = scores[order[i]];
        // Consume the whole tie group before emitting a point
        while i < order.len() && scores[order[i]] == score {
            if y_true[order[i]] > 0.5 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }

        let tpr = tp as f64 / n_pos as f64;
        let fpr = fp as f64 / n_neg as f64;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;

        points.push(RocPoint {
            false_positive_rate: fpr,
            true_positive_rate: tpr,
            threshold: score,
        });

        prev_fpr = fpr;
        prev_tpr = tpr;
    }

    (points, Some(auc))
}
