// src/evaluator/parser.rs — Parse the judge's JSON reply into a validated Evaluation

use serde::Deserialize;

use crate::core::cleaner::clean_response;
use crate::core::types::Evaluation;
use crate::infra::errors::SuiteGenError;

/// Wire shape requested through the response schema.
#[derive(Debug, Deserialize)]
struct RawEvaluation {
    score: i64,
    feedback: String,
}

/// Gemini schema for `{"score": int, "feedback": str}`.
pub fn evaluation_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "INTEGER" },
            "feedback": { "type": "STRING" }
        },
        "required": ["score", "feedback"],
        "propertyOrdering": ["score", "feedback"]
    })
}

/// Parse a reply, failing on anything that is not exactly the expected object
/// with a score in 0..=100. A ```json fence around the object is tolerated.
pub fn parse_evaluation(response: &str) -> Result<Evaluation, SuiteGenError> {
    let cleaned = clean_response(response.trim());
    let raw: RawEvaluation =
        serde_json::from_str(cleaned.trim()).map_err(|e| SuiteGenError::EvaluationParse {
            reason: e.to_string(),
            raw: response.to_string(),
        })?;

    if !(0..=100).contains(&raw.score) {
        return Err(SuiteGenError::EvaluationParse {
            reason: format!("score {} outside 0..=100", raw.score),
            raw: response.to_string(),
        });
    }

    Ok(Evaluation {
        score: raw.score as u32,
        feedback: raw.feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let e = parse_evaluation(r#"{"score": 85, "feedback": "missing edge case for empty input"}"#)
            .unwrap();
        assert_eq!(e.score, 85);
        assert_eq!(e.feedback, "missing edge case for empty input");
    }

    #[test]
    fn test_parse_fenced_json() {
        let e = parse_evaluation("```json\n{\"score\": 91, \"feedback\": \"ok\"}\n```").unwrap();
        assert_eq!(e.score, 91);
    }

    #[test]
    fn test_parse_fenced_json_with_trailing_newline() {
        let e = parse_evaluation("```json\n{\"score\": 91, \"feedback\": \"ok\"}\n```\n").unwrap();
        assert_eq!(e.score, 91);
        assert_eq!(e.feedback, "ok");
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let e = parse_evaluation(r#"{"score": 0, "feedback": "", "notes": [1, 2]}"#).unwrap();
        assert_eq!(e.score, 0);
        assert!(e.feedback.is_empty());
    }

    #[test]
    fn test_missing_field_is_error() {
        let err = parse_evaluation(r#"{"score": 50}"#).unwrap_err();
        match err {
            SuiteGenError::EvaluationParse { reason, raw } => {
                assert!(reason.contains("feedback"));
                assert_eq!(raw, r#"{"score": 50}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_type_is_error() {
        assert!(parse_evaluation(r#"{"score": "high", "feedback": "x"}"#).is_err());
        assert!(parse_evaluation(r#"{"score": 90.5, "feedback": "x"}"#).is_err());
    }

    #[test]
    fn test_out_of_range_is_error() {
        assert!(parse_evaluation(r#"{"score": 101, "feedback": "x"}"#).is_err());
        assert!(parse_evaluation(r#"{"score": -1, "feedback": "x"}"#).is_err());
        assert!(parse_evaluation(r#"{"score": 100, "feedback": "x"}"#).is_ok());
    }

    #[test]
    fn test_prose_is_error() {
        assert!(parse_evaluation("The suite looks great, 95/100.").is_err());
        assert!(parse_evaluation("").is_err());
    }

    #[test]
    fn test_schema_requires_both_fields() {
        let schema = evaluation_schema();
        assert_eq!(schema["properties"]["score"]["type"], "INTEGER");
        assert_eq!(schema["required"], serde_json::json!(["score", "feedback"]));
    }
}
