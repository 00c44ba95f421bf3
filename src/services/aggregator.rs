//! Folds one iteration's evaluations into a single feedback record.

use std::collections::BTreeSet;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AggregatedFeedback, EvaluationResult};

/// Mean score plus the deduplicated, sorted pros and cons.
pub fn aggregate(evaluations: &[EvaluationResult]) -> DomainResult<AggregatedFeedback> {
    if evaluations.is_empty() {
        return Err(DomainError::EmptyAggregation);
    }

    let total: f64 = evaluations.iter().map(|e| e.quality_score.value()).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean_score = total / evaluations.len() as f64;

    let pros: BTreeSet<String> = evaluations
        .iter()
        .flat_map(|e| e.pros.iter().cloned())
        .collect();
    let cons: BTreeSet<String> = evaluations
        .iter()
        .flat_map(|e| e.cons.iter().cloned())
        .collect();

    Ok(AggregatedFeedback {
        mean_score,
        pros,
        cons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::QualityScore;

    fn eval(score: f64, pros: &[&str], cons: &[&str]) -> EvaluationResult {
        EvaluationResult {
            pros: pros.iter().map(|s| (*s).to_string()).collect(),
            cons: cons.iter().map(|s| (*s).to_string()).collect(),
            quality_score: QualityScore::try_from(score).unwrap(),
        }
    }

    #[test]
    fn test_mean_of_scores() {
        let feedback = aggregate(&[
            eval(8.0, &[], &[]),
            eval(8.5, &[], &[]),
            eval(9.0, &[], &[]),
        ])
        .unwrap();
        assert!((feedback.mean_score - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(aggregate(&[]), Err(DomainError::EmptyAggregation)));
    }

    #[test]
    fn test_dedup_and_sort() {
        let feedback = aggregate(&[
            eval(7.0, &["clear", "concise"], &["too long"]),
            eval(9.0, &["accurate", "clear"], &["missing examples", "too long"]),
        ])
        .unwrap();

        let pros: Vec<_> = feedback.pros.iter().map(String::as_str).collect();
        let cons: Vec<_> = feedback.cons.iter().map(String::as_str).collect();
        assert_eq!(pros, vec!["accurate", "clear", "concise"]);
        assert_eq!(cons, vec!["missing examples", "too long"]);
    }

    #[test]
    fn test_dedup_is_exact_match() {
        let feedback = aggregate(&[eval(5.0, &["Clear", "clear", "clear "], &[])]).unwrap();
        assert_eq!(feedback.pros.len(), 3);
    }

    #[test]
    fn test_summary_format() {
        let feedback = aggregate(&[
            eval(9.0, &["b", "a"], &["c"]),
            eval(8.0, &["a"], &[]),
        ])
        .unwrap();

        assert_eq!(
            feedback.summary(),
            "Average Score: 8.50/10\n\n**Aggregated Pros:**\n- a\n- b\n\n**Aggregated Cons:**\n- c"
        );
    }
}
