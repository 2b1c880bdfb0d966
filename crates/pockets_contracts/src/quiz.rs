#![forbid(unsafe_code)]

use crate::access::TopicId;
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};

pub const QUIZ_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScorePercent(u8);

impl ScorePercent {
    pub fn new(percent: u8) -> Result<Self, ContractViolation> {
        let v = Self(percent);
        v.validate()?;
        Ok(v)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Validate for ScorePercent {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 > 100 {
            return Err(ContractViolation::InvalidRange {
                field: "score_percent",
                min: 0.0,
                max: 100.0,
                got: self.0 as f64,
            });
        }
        Ok(())
    }
}

/// Rounded percentage of correct answers, matching the source's
/// `Math.round((correct / total) * 100)`.
pub fn rounded_percent(correct: u32, total: u32) -> Result<ScorePercent, ContractViolation> {
    if total == 0 {
        return Err(ContractViolation::InvalidValue {
            field: "rounded_percent.total",
            reason: "must be > 0",
        });
    }
    if correct > total {
        return Err(ContractViolation::InvalidValue {
            field: "rounded_percent.correct",
            reason: "must be <= total",
        });
    }
    let percent = ((correct as u64 * 100) + (total as u64 / 2)) / total as u64;
    ScorePercent::new(percent as u8)
}

/// Exercise progress on a topic page: completed-of-total, rounded.
pub fn exercise_progress_percent(completed: u32, total: u32) -> Result<ScorePercent, ContractViolation> {
    rounded_percent(completed.min(total), total)
}

/// Grading bands from the source's final-test feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestGrade {
    Excellent,
    Good,
    Satisfactory,
    Retry,
    Review,
}

impl TestGrade {
    pub fn from_percent(percent: ScorePercent) -> Self {
        match percent.value() {
            90..=100 => TestGrade::Excellent,
            80..=89 => TestGrade::Good,
            70..=79 => TestGrade::Satisfactory,
            60..=69 => TestGrade::Retry,
            _ => TestGrade::Review,
        }
    }
}

/// Per-topic final-test outcome. Informational only: never consulted by
/// the access evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResultRecord {
    pub schema_version: SchemaVersion,
    pub topic_id: TopicId,
    pub percentage: ScorePercent,
    pub recorded_at: MonotonicTimeNs,
}

impl TestResultRecord {
    pub fn v1(
        topic_id: TopicId,
        percentage: ScorePercent,
        recorded_at: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: QUIZ_CONTRACT_VERSION,
            topic_id,
            percentage,
            recorded_at,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for TestResultRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != QUIZ_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "test_result_record.schema_version",
                reason: "must match QUIZ_CONTRACT_VERSION",
            });
        }
        self.topic_id.validate()?;
        self.percentage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_percent_matches_source_rounding() {
        assert_eq!(rounded_percent(1, 3).unwrap().value(), 33);
        assert_eq!(rounded_percent(2, 3).unwrap().value(), 67);
        assert_eq!(rounded_percent(3, 3).unwrap().value(), 100);
        assert_eq!(rounded_percent(0, 3).unwrap().value(), 0);
    }

    #[test]
    fn rounded_percent_rejects_degenerate_inputs() {
        assert!(rounded_percent(1, 0).is_err());
        assert!(rounded_percent(4, 3).is_err());
    }

    #[test]
    fn exercise_progress_is_clamped_to_total() {
        assert_eq!(exercise_progress_percent(5, 4).unwrap().value(), 100);
        assert_eq!(exercise_progress_percent(1, 4).unwrap().value(), 25);
    }

    #[test]
    fn grade_bands_match_source_thresholds() {
        let grade = |p: u8| TestGrade::from_percent(ScorePercent::new(p).unwrap());
        assert_eq!(grade(100), TestGrade::Excellent);
        assert_eq!(grade(90), TestGrade::Excellent);
        assert_eq!(grade(89), TestGrade::Good);
        assert_eq!(grade(80), TestGrade::Good);
        assert_eq!(grade(79), TestGrade::Satisfactory);
        assert_eq!(grade(70), TestGrade::Satisfactory);
        assert_eq!(grade(69), TestGrade::Retry);
        assert_eq!(grade(60), TestGrade::Retry);
        assert_eq!(grade(59), TestGrade::Review);
        assert_eq!(grade(0), TestGrade::Review);
    }

    #[test]
    fn score_percent_bounded() {
        assert!(ScorePercent::new(101).is_err());
        assert!(ScorePercent::new(100).is_ok());
    }
}
