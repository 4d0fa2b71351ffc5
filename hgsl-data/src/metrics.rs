//! Classification metrics for the source-localization task.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::ConfigError;

/// How per-class F1 scores are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Average {
    /// Mean of per-class F1 weighted by class support.
    #[default]
    Weighted,
    /// Unweighted mean of per-class F1.
    Macro,
    /// F1 of the pooled true/false positive counts.
    Micro,
}

impl FromStr for Average {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted" => Ok(Average::Weighted),
            "macro" => Ok(Average::Macro),
            "micro" => Ok(Average::Micro),
            other => Err(ConfigError::NotAvailable { what: "average", tag: other.into() }),
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Average::Weighted => "weighted",
            Average::Macro => "macro",
            Average::Micro => "micro",
        })
    }
}

/// `m[true][pred]` counts; labels outside `0..num_classes` are ignored.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], num_classes: usize) -> Array2<usize> {
    let mut m = Array2::zeros((num_classes, num_classes));
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t < num_classes && p < num_classes {
            m[[t, p]] += 1;
        }
    }
    m
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(tp: usize, fp: usize, fn_: usize) -> f64 {
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// F1 score over `num_classes` classes. Classes with no true or predicted samples score 0.
pub fn f1_score(y_true: &[usize], y_pred: &[usize], num_classes: usize, average: Average) -> f64 {
    let m = confusion_matrix(y_true, y_pred, num_classes);
    let per_class: Vec<(usize, usize, usize, usize)> = (0..num_classes)
        .map(|c| {
            let tp = m[[c, c]];
            let predicted = m.column(c).sum();
            let support = m.row(c).sum();
            (tp, predicted - tp, support - tp, support)
        })
        .collect();

    match average {
        Average::Micro => {
            let (tp, fp, fn_) = per_class
                .iter()
                .fold((0, 0, 0), |acc, &(tp, fp, fn_, _)| (acc.0 + tp, acc.1 + fp, acc.2 + fn_));
            f1(tp, fp, fn_)
        }
        Average::Macro => {
            if num_classes == 0 {
                return 0.0;
            }
            per_class.iter().map(|&(tp, fp, fn_, _)| f1(tp, fp, fn_)).sum::<f64>() / num_classes as f64
        }
        Average::Weighted => {
            let total: usize = per_class.iter().map(|c| c.3).sum();
            if total == 0 {
                return 0.0;
            }
            per_class
                .iter()
                .map(|&(tp, fp, fn_, support)| f1(tp, fp, fn_) * support as f64)
                .sum::<f64>()
                / total as f64
        }
    }
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(hits, y_true.len().min(y_pred.len()))
}

/// Index of the largest entry of each row (first one on ties).
pub fn argmax_rows(logits: &Array2<f64>) -> Vec<usize> {
    logits
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
                .0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // y_true = [0, 0, 1, 1, 2, 2], y_pred = [0, 1, 1, 1, 0, 2]
    // class 0: p = 1/2, r = 1/2 -> 0.5; class 1: p = 2/3, r = 1 -> 0.8; class 2: p = 1, r = 1/2 -> 2/3
    const Y_TRUE: [usize; 6] = [0, 0, 1, 1, 2, 2];
    const Y_PRED: [usize; 6] = [0, 1, 1, 1, 0, 2];

    #[test]
    fn f1_averages() {
        let macro_f1 = (0.5 + 0.8 + 2.0 / 3.0) / 3.0;
        assert_abs_diff_eq!(f1_score(&Y_TRUE, &Y_PRED, 3, Average::Macro), macro_f1, epsilon = 1e-12);
        // equal supports: weighted == macro
        assert_abs_diff_eq!(f1_score(&Y_TRUE, &Y_PRED, 3, Average::Weighted), macro_f1, epsilon = 1e-12);
        // micro F1 equals accuracy for single-label multiclass
        assert_abs_diff_eq!(f1_score(&Y_TRUE, &Y_PRED, 3, Average::Micro), 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(accuracy(&Y_TRUE, &Y_PRED), 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn absent_classes_score_zero() {
        // class 2 never appears: it adds 0 to macro, nothing to weighted
        let y_true = [0, 0, 1];
        let y_pred = [0, 0, 1];
        assert_eq!(f1_score(&y_true, &y_pred, 3, Average::Weighted), 1.0);
        assert_abs_diff_eq!(f1_score(&y_true, &y_pred, 3, Average::Macro), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(f1_score(&[], &[], 3, Average::Weighted), 0.0);
    }

    #[test]
    fn confusion_counts() {
        let m = confusion_matrix(&Y_TRUE, &Y_PRED, 3);
        assert_eq!(m, array![[1usize, 1, 0], [0, 2, 0], [1, 0, 1]]);
        assert_eq!(m.sum(), 6);
    }

    #[test]
    fn argmax_picks_first_maximum() {
        let logits = array![[0.1, 0.7, 0.2], [3.0, 3.0, -1.0], [-2.0, -1.0, -3.0]];
        assert_eq!(argmax_rows(&logits), vec![1, 0, 1]);
    }

    #[test]
    fn parses_average_tags() {
        assert_eq!("macro".parse::<Average>().unwrap(), Average::Macro);
        assert!("samples".parse::<Average>().is_err());
        assert_eq!(Average::default().to_string(), "weighted");
    }
}
