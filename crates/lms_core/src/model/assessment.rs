//! Forms and evaluations.
//!
//! # Invariants
//! - `Evaluation::percentage()` is 0 when `max_score` is not positive.

use super::{impl_entity, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Choice,
    Rating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Choices for `FieldKind::Choice`; ignored otherwise.
    #[serde(default)]
    pub options: Vec<String>,
}

impl FormField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    pub created_by: EntityId,
    #[serde(default)]
    pub assigned_to: Vec<EntityId>,
    pub created_at: i64,
}

impl_entity!(Form, "lms_forms");

impl Form {
    pub fn new(created_by: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            description: String::new(),
            fields: Vec::new(),
            created_by: created_by.into(),
            assigned_to: Vec::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    #[default]
    Pending,
    Submitted,
    Reviewed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: EntityId,
    /// The user being evaluated.
    pub user_id: EntityId,
    pub evaluator_id: EntityId,
    #[serde(default)]
    pub form_id: Option<EntityId>,
    #[serde(default)]
    pub course_id: Option<EntityId>,
    /// Answers keyed by form field id.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub max_score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub submitted_at: Option<i64>,
    pub created_at: i64,
}

impl_entity!(Evaluation, "lms_evaluations");

impl Evaluation {
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        self.score / self.max_score * 100.0
    }

    pub fn passed(&self, threshold_percent: f64) -> bool {
        self.status != EvaluationStatus::Pending && self.percentage() >= threshold_percent
    }
}

/// Input for opening an evaluation; it starts out pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub user_id: EntityId,
    pub evaluator_id: EntityId,
    pub form_id: Option<EntityId>,
    pub course_id: Option<EntityId>,
    pub max_score: f64,
}

impl NewEvaluation {
    pub fn into_evaluation(self) -> Evaluation {
        Evaluation {
            id: EntityId::new(),
            user_id: self.user_id,
            evaluator_id: self.evaluator_id,
            form_id: self.form_id,
            course_id: self.course_id,
            answers: BTreeMap::new(),
            score: 0.0,
            max_score: self.max_score,
            feedback: None,
            status: EvaluationStatus::Pending,
            submitted_at: None,
            created_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EvaluationStatus, NewEvaluation};

    #[test]
    fn percentage_and_pass_threshold() {
        let mut evaluation = NewEvaluation {
            user_id: "u".to_string(),
            evaluator_id: "e".to_string(),
            form_id: None,
            course_id: None,
            max_score: 40.0,
        }
        .into_evaluation();
        evaluation.score = 30.0;

        assert_eq!(evaluation.percentage(), 75.0);
        assert!(!evaluation.passed(70.0), "pending evaluations never pass");

        evaluation.status = EvaluationStatus::Submitted;
        assert!(evaluation.passed(70.0));
        assert!(!evaluation.passed(80.0));
    }

    #[test]
    fn zero_max_score_yields_zero_percentage() {
        let evaluation = NewEvaluation {
            user_id: "u".to_string(),
            evaluator_id: "e".to_string(),
            form_id: None,
            course_id: None,
            max_score: 0.0,
        }
        .into_evaluation();
        assert_eq!(evaluation.percentage(), 0.0);
    }
}
