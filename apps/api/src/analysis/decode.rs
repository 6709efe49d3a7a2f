//! Strict decoder for scoring-engine responses.
//!
//! A response either becomes a fully populated `AnalysisResult` or fails with
//! `SchemaViolation`. There is no default-filling: serde rejects missing
//! fields and unknown enum values, and the rubric invariants are checked after.

use thiserror::Error;
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::analysis::AnalysisResult;

/// Allowed drift between `overallScore` and the module sum before we log it.
const OVERALL_SUM_TOLERANCE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum SchemaViolation {
    #[error("response does not match the analysis schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("module '{module}' scored {score}, outside 0..={max_score}")]
    ScoreOutOfRange {
        module: &'static str,
        score: f64,
        max_score: f64,
    },

    #[error("module '{module}' reports maxScore {actual}, rubric allocates {expected}")]
    MaxScoreMismatch {
        module: &'static str,
        expected: f64,
        actual: f64,
    },

    #[error("detectedYoE must be non-negative, got {0}")]
    NegativeExperience(f64),

    #[error("overallScore {0} is outside 0..=100")]
    OverallOutOfRange(f64),
}

pub fn decode(raw: &str) -> Result<AnalysisResult, SchemaViolation> {
    let result: AnalysisResult = serde_json::from_str(strip_json_fences(raw))?;
    validate(&result)?;
    Ok(result)
}

fn validate(result: &AnalysisResult) -> Result<(), SchemaViolation> {
    for (name, module) in result.modules.iter() {
        let expected = name.max_score();
        if (module.max_score - expected).abs() > f64::EPSILON {
            return Err(SchemaViolation::MaxScoreMismatch {
                module: name.key(),
                expected,
                actual: module.max_score,
            });
        }
        if module.score < 0.0 || module.score > module.max_score {
            return Err(SchemaViolation::ScoreOutOfRange {
                module: name.key(),
                score: module.score,
                max_score: module.max_score,
            });
        }
    }

    let yoe = result.candidate_profile.detected_yoe;
    if yoe < 0.0 {
        return Err(SchemaViolation::NegativeExperience(yoe));
    }

    if !(0.0..=100.0).contains(&result.overall_score) {
        return Err(SchemaViolation::OverallOutOfRange(result.overall_score));
    }

    let module_sum = result.modules.total_score();
    if (module_sum - result.overall_score).abs() > OVERALL_SUM_TOLERANCE {
        // Not a violation: the engine owns the arithmetic.
        warn!(
            "overallScore {} differs from module sum {}",
            result.overall_score, module_sum
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::sample_result;
    use crate::models::analysis::ModuleStatus;
    use serde_json::{json, Value};

    fn sample_json() -> Value {
        serde_json::to_value(sample_result()).unwrap()
    }

    fn decode_value(value: &Value) -> Result<AnalysisResult, SchemaViolation> {
        decode(&value.to_string())
    }

    #[test]
    fn test_decodes_complete_document() {
        let result = decode_value(&sample_json()).unwrap();
        assert_eq!(result, sample_result());
        assert_eq!(result.modules.projects.status, ModuleStatus::Yellow);
    }

    #[test]
    fn test_decodes_fenced_document() {
        let raw = format!("```json\n{}\n```", sample_json());
        assert!(decode(&raw).is_ok());
    }

    #[test]
    fn test_all_valid_results_respect_rubric_bounds() {
        let result = decode_value(&sample_json()).unwrap();
        for (name, module) in result.modules.iter() {
            assert!(module.score >= 0.0 && module.score <= module.max_score);
            assert_eq!(module.max_score, name.max_score());
        }
    }

    #[test]
    fn test_missing_module_is_rejected() {
        let mut value = sample_json();
        value["modules"]
            .as_object_mut()
            .unwrap()
            .remove("professionalism");
        let err = decode_value(&value).unwrap_err();
        assert!(matches!(err, SchemaViolation::Malformed(_)), "got {err:?}");
        assert!(err.to_string().contains("professionalism"));
    }

    #[test]
    fn test_missing_detected_yoe_is_rejected() {
        let mut value = sample_json();
        value["candidateProfile"]
            .as_object_mut()
            .unwrap()
            .remove("detectedYoE");
        let err = decode_value(&value).unwrap_err();
        assert!(err.to_string().contains("detectedYoE"));
    }

    #[test]
    fn test_missing_leverage_fix_field_is_rejected() {
        let mut value = sample_json();
        value["topLeverageFixes"][0]
            .as_object_mut()
            .unwrap()
            .remove("example");
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut value = sample_json();
        value["modules"]["formatting"]["status"] = json!("Orange");
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_candidate_type_is_rejected() {
        let mut value = sample_json();
        value["candidateProfile"]["type"] = json!("Intern");
        assert!(decode_value(&value).is_err());
    }

    #[test]
    fn test_string_score_is_rejected() {
        let mut value = sample_json();
        value["modules"]["academics"]["score"] = json!("17");
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::Malformed(_))
        ));
    }

    #[test]
    fn test_score_above_max_is_rejected() {
        let mut value = sample_json();
        value["modules"]["formatting"]["score"] = json!(6);
        match decode_value(&value).unwrap_err() {
            SchemaViolation::ScoreOutOfRange { module, score, .. } => {
                assert_eq!(module, "formatting");
                assert_eq!(score, 6.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_negative_score_is_rejected() {
        let mut value = sample_json();
        value["modules"]["academics"]["score"] = json!(-3);
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::ScoreOutOfRange { module: "academics", .. })
        ));
    }

    #[test]
    fn test_wrong_max_score_is_rejected() {
        let mut value = sample_json();
        value["modules"]["projects"]["maxScore"] = json!(30);
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::MaxScoreMismatch { module: "projects", .. })
        ));
    }

    #[test]
    fn test_negative_experience_is_rejected() {
        let mut value = sample_json();
        value["candidateProfile"]["detectedYoE"] = json!(-1);
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::NegativeExperience(_))
        ));
    }

    #[test]
    fn test_overall_score_out_of_range_is_rejected() {
        let mut value = sample_json();
        value["overallScore"] = json!(140);
        assert!(matches!(
            decode_value(&value),
            Err(SchemaViolation::OverallOutOfRange(_))
        ));
    }

    #[test]
    fn test_overall_sum_mismatch_is_tolerated() {
        let mut value = sample_json();
        value["overallScore"] = json!(90);
        assert_eq!(decode_value(&value).unwrap().overall_score, 90.0);
    }

    #[test]
    fn test_non_json_is_rejected() {
        assert!(matches!(
            decode("The candidate scored 72/100."),
            Err(SchemaViolation::Malformed(_))
        ));
    }
}
