//! Structured-output contracts.
//!
//! Each contract is a plain serde type paired with the JSON schema the model
//! backend is asked to honour. Parsing goes through serde and then through
//! [`StructuredOutput::validate`], so a payload that deserializes but breaks
//! the contract is still rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A type the model backend can be asked to emit as JSON.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    /// Schema name sent with the response format.
    const NAME: &'static str;

    /// JSON schema describing the wire shape.
    fn schema() -> Value;

    /// Checks that serde alone cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Generated test inputs: `{ "use_cases": [string, ...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCases {
    pub use_cases: Vec<String>,
}

impl StructuredOutput for UseCases {
    const NAME: &'static str = "UseCases";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "use_cases": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A diverse list of sample inputs (use cases) appropriate for the described prompt."
                }
            },
            "required": ["use_cases"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.use_cases.is_empty() {
            return Err("use_cases must contain at least one entry".to_string());
        }
        Ok(())
    }
}

/// Lowest score an evaluation may assign.
pub const MIN_QUALITY_SCORE: f64 = 1.0;
/// Highest score an evaluation may assign.
pub const MAX_QUALITY_SCORE: f64 = 10.0;

/// A quality score in the closed range `[1.0, 10.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QualityScore(f64);

impl QualityScore {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for QualityScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && (MIN_QUALITY_SCORE..=MAX_QUALITY_SCORE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "quality_score {value} is outside [{MIN_QUALITY_SCORE}, {MAX_QUALITY_SCORE}]"
            ))
        }
    }
}

impl From<QualityScore> for f64 {
    fn from(score: QualityScore) -> Self {
        score.0
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Critique of one response:
/// `{ "pros": [string], "cons": [string], "quality_score": number }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub quality_score: QualityScore,
}

impl StructuredOutput for EvaluationResult {
    const NAME: &'static str = "EvaluationResult";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "pros": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Strengths and things the response did well."
                },
                "cons": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Weaknesses, inaccuracies, or areas for improvement in the response."
                },
                "quality_score": {
                    "type": "number",
                    "minimum": MIN_QUALITY_SCORE,
                    "maximum": MAX_QUALITY_SCORE,
                    "description": "Overall quality from 1.0 to 10.0, where 10 is perfect."
                }
            },
            "required": ["pros", "cons", "quality_score"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries_accepted() {
        let low: EvaluationResult =
            serde_json::from_str(r#"{"pros":[],"cons":[],"quality_score":1.0}"#).unwrap();
        let high: EvaluationResult =
            serde_json::from_str(r#"{"pros":[],"cons":[],"quality_score":10}"#).unwrap();

        assert!((low.quality_score.value() - 1.0).abs() < f64::EPSILON);
        assert!((high.quality_score.value() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        for raw in ["0.99", "10.01", "-3", "42"] {
            let payload = format!(r#"{{"pros":[],"cons":[],"quality_score":{raw}}}"#);
            let parsed = serde_json::from_str::<EvaluationResult>(&payload);
            assert!(parsed.is_err(), "score {raw} should be rejected");
        }
    }

    #[test]
    fn test_score_rejects_non_finite() {
        assert!(QualityScore::try_from(f64::NAN).is_err());
        assert!(QualityScore::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn test_use_cases_requires_entries() {
        let empty = UseCases { use_cases: vec![] };
        assert!(empty.validate().is_err());

        let one = UseCases {
            use_cases: vec!["An article about rainfall".to_string()],
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        assert_eq!(UseCases::schema()["required"], json!(["use_cases"]));
        assert_eq!(
            EvaluationResult::schema()["required"],
            json!(["pros", "cons", "quality_score"])
        );
    }

    #[test]
    fn test_score_serializes_as_number() {
        let result = EvaluationResult {
            pros: vec!["clear".to_string()],
            cons: vec![],
            quality_score: QualityScore::try_from(7.5).unwrap(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["quality_score"], json!(7.5));
    }
}
