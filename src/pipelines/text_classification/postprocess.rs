use super::model::LabelSchema;
use crate::core::error::{PipelineError, Result};
use serde::Serialize;

/// The postprocessor's output for one record.
///
/// Invariants: `probabilities` has length C, every entry is non-negative,
/// the entries sum to 1 within floating tolerance, and `predicted_label` is
/// the arg-max index (lowest index on ties).
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub predicted_label: usize,
}

impl Prediction {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.predicted_label]
    }
}

/// Numerically stable normalized-exponential transform.
///
/// Subtracting the maximum logit before exponentiation keeps the sum finite
/// for large-magnitude logits without changing the resulting distribution.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the maximum value; ties break to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Convert raw logits into a [`Prediction`] against the given schema.
///
/// A logits vector whose length differs from the schema's class count is a
/// caller contract violation, signaled as [`PipelineError::ShapeMismatch`].
pub fn finalize(logits: &[f32], schema: &LabelSchema) -> Result<Prediction> {
    if logits.len() != schema.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: schema.len(),
            actual: logits.len(),
        });
    }

    let probabilities = softmax(logits);
    let predicted_label = argmax(&probabilities);

    Ok(Prediction {
        probabilities,
        predicted_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ag_news_schema() -> LabelSchema {
        LabelSchema::new(["World", "Sports", "Business", "Sci/Tech"])
    }

    #[test]
    fn probabilities_sum_to_one_and_are_non_negative() {
        let cases: [&[f32]; 4] = [
            &[0.0, 0.0, 0.0, 0.0],
            &[1.5, -2.0, 3.25, 0.125],
            &[-100.0, -100.0, -100.0, -100.0],
            &[1000.0, -1000.0, 500.0, 0.0],
        ];

        for logits in cases {
            let prediction = finalize(logits, &ag_news_schema()).unwrap();
            let sum: f32 = prediction.probabilities.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum {sum} for {logits:?}");
            assert!(prediction.probabilities.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn softmax_preserves_argmax() {
        let logits = [0.3, -1.2, 4.5, 2.1];
        let prediction = finalize(&logits, &ag_news_schema()).unwrap();
        assert_eq!(prediction.predicted_label, argmax(&logits));
        assert_eq!(prediction.predicted_label, 2);
        assert!((prediction.confidence() - prediction.probabilities[2]).abs() < f32::EPSILON);
    }

    #[test]
    fn ties_break_to_the_lowest_index() {
        let logits = [1.0, 7.0, 7.0, 7.0];
        let prediction = finalize(&logits, &ag_news_schema()).unwrap();
        assert_eq!(prediction.predicted_label, 1);

        let all_equal = [0.25, 0.25, 0.25, 0.25];
        assert_eq!(argmax(&all_equal), 0);
    }

    #[test]
    fn large_magnitude_logits_stay_finite() {
        let logits = [10_000.0, 9_999.0, -10_000.0, 0.0];
        let prediction = finalize(&logits, &ag_news_schema()).unwrap();
        assert!(prediction.probabilities.iter().all(|p| p.is_finite()));
        assert_eq!(prediction.predicted_label, 0);
    }

    #[test]
    fn wrong_length_is_a_shape_mismatch() {
        let err = finalize(&[0.1, 0.2], &ag_news_schema()).unwrap_err();
        match err {
            PipelineError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
