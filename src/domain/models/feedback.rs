use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Iteration-wide critique derived from every evaluation of that iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedFeedback {
    /// Arithmetic mean of the individual quality scores
    pub mean_score: f64,
    /// Distinct pros, lexicographically ordered
    pub pros: BTreeSet<String>,
    /// Distinct cons, lexicographically ordered
    pub cons: BTreeSet<String>,
}

impl AggregatedFeedback {
    /// Render the feedback block handed to the refiner.
    pub fn summary(&self) -> String {
        let mut out = format!("Average Score: {:.2}/10\n\n", self.mean_score);
        out.push_str("**Aggregated Pros:**\n");
        push_bullets(&mut out, &self.pros);
        out.push_str("\n\n**Aggregated Cons:**\n");
        push_bullets(&mut out, &self.cons);
        out
    }
}

fn push_bullets(out: &mut String, items: &BTreeSet<String>) {
    let mut first = true;
    for item in items {
        if !first {
            out.push('\n');
        }
        first = false;
        let _ = write!(out, "- {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_layout() {
        let feedback = AggregatedFeedback {
            mean_score: 8.5,
            pros: ["concise".to_string(), "accurate".to_string()].into(),
            cons: ["too long".to_string()].into(),
        };

        let summary = feedback.summary();
        assert!(summary.starts_with("Average Score: 8.50/10\n\n"));
        assert!(summary.contains("**Aggregated Pros:**\n- accurate\n- concise"));
        assert!(summary.ends_with("**Aggregated Cons:**\n- too long"));
    }
}
