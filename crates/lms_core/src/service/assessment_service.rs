//! Feedback forms and evaluations.

use crate::model::assessment::{Evaluation, EvaluationStatus, Form, NewEvaluation};
use crate::model::engagement::ActivityKind;
use crate::model::now_epoch_ms;
use crate::repo::RepoResult;
use crate::storage::StorageBackend;
use crate::store::LmsStore;
use std::collections::BTreeMap;

pub struct AssessmentService<'s, B: StorageBackend> {
    store: &'s LmsStore<B>,
}

impl<'s, B: StorageBackend> AssessmentService<'s, B> {
    pub fn new(store: &'s LmsStore<B>) -> Self {
        Self { store }
    }

    pub fn create_form(&self, form: Form) -> RepoResult<Form> {
        self.store.create(form)
    }

    pub fn get_form(&self, id: &str) -> RepoResult<Option<Form>> {
        self.store.collection::<Form>().get(id)
    }

    pub fn list_forms(&self) -> RepoResult<Vec<Form>> {
        self.store.collection::<Form>().load_all()
    }

    pub fn forms_for_user(&self, user_id: &str) -> RepoResult<Vec<Form>> {
        self.store
            .collection::<Form>()
            .filter(|form| form.assigned_to.iter().any(|id| id == user_id))
    }

    pub fn delete_form(&self, id: &str) -> RepoResult<bool> {
        self.store.collection::<Form>().delete(id)
    }

    pub fn create_evaluation(&self, new_evaluation: NewEvaluation) -> RepoResult<Evaluation> {
        self.store.create(new_evaluation.into_evaluation())
    }

    pub fn get_evaluation(&self, id: &str) -> RepoResult<Option<Evaluation>> {
        self.store.collection::<Evaluation>().get(id)
    }

    /// Stores answers and score and moves the evaluation to `submitted`.
    pub fn submit_evaluation(
        &self,
        id: &str,
        answers: BTreeMap<String, String>,
        score: f64,
    ) -> RepoResult<Option<Evaluation>> {
        let now = now_epoch_ms();
        let updated = self.store.collection::<Evaluation>().update(id, |evaluation| {
            evaluation.answers = answers;
            evaluation.score = score;
            evaluation.status = EvaluationStatus::Submitted;
            evaluation.submitted_at = Some(now);
        })?;
        let Some(evaluation) = updated else {
            return Ok(None);
        };
        self.store.engagement().log_activity(
            &evaluation.user_id,
            ActivityKind::EvaluationSubmitted,
            format!("Evaluation {} submitted", evaluation.id),
        )?;
        Ok(Some(evaluation))
    }

    pub fn review_evaluation(&self, id: &str, feedback: &str) -> RepoResult<Option<Evaluation>> {
        self.store.collection::<Evaluation>().update(id, |evaluation| {
            evaluation.feedback = Some(feedback.to_string());
            evaluation.status = EvaluationStatus::Reviewed;
        })
    }

    pub fn evaluations_for_user(&self, user_id: &str) -> RepoResult<Vec<Evaluation>> {
        self.store
            .collection::<Evaluation>()
            .filter(|evaluation| evaluation.user_id == user_id)
    }

    pub fn pending_evaluations_for_evaluator(&self, evaluator_id: &str) -> RepoResult<Vec<Evaluation>> {
        self.store.collection::<Evaluation>().filter(|evaluation| {
            evaluation.evaluator_id == evaluator_id && evaluation.status == EvaluationStatus::Pending
        })
    }

    /// Mean percentage over submitted and reviewed evaluations.
    pub fn average_score(&self, user_id: &str) -> RepoResult<Option<f64>> {
        let scored = self
            .evaluations_for_user(user_id)?
            .into_iter()
            .filter(|evaluation| evaluation.status != EvaluationStatus::Pending)
            .map(|evaluation| evaluation.percentage())
            .collect::<Vec<_>>();
        if scored.is_empty() {
            return Ok(None);
        }
        Ok(Some(scored.iter().sum::<f64>() / scored.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::assessment::{EvaluationStatus, FieldKind, Form, FormField, NewEvaluation};
    use crate::store::LmsStore;
    use std::collections::BTreeMap;

    fn open_evaluation(user_id: &str, max_score: f64) -> NewEvaluation {
        NewEvaluation {
            user_id: user_id.to_string(),
            evaluator_id: "hr".to_string(),
            form_id: None,
            course_id: None,
            max_score,
        }
    }

    #[test]
    fn submit_then_review_walks_status() {
        let store = LmsStore::in_memory();
        let assessments = store.assessments();
        let evaluation = assessments.create_evaluation(open_evaluation("c1", 10.0)).unwrap();
        assert_eq!(
            assessments.pending_evaluations_for_evaluator("hr").unwrap().len(),
            1
        );

        let answers = BTreeMap::from([("q1".to_string(), "yes".to_string())]);
        let submitted = assessments
            .submit_evaluation(&evaluation.id, answers, 8.0)
            .unwrap()
            .unwrap();
        assert_eq!(submitted.status, EvaluationStatus::Submitted);
        assert!(submitted.submitted_at.is_some());
        assert!(assessments.pending_evaluations_for_evaluator("hr").unwrap().is_empty());

        let reviewed = assessments
            .review_evaluation(&evaluation.id, "solid")
            .unwrap()
            .unwrap();
        assert_eq!(reviewed.status, EvaluationStatus::Reviewed);
        assert_eq!(reviewed.feedback.as_deref(), Some("solid"));
        assert!(assessments.submit_evaluation("missing", BTreeMap::new(), 1.0).unwrap().is_none());
    }

    #[test]
    fn average_score_ignores_pending() {
        let store = LmsStore::in_memory();
        let assessments = store.assessments();
        assert!(assessments.average_score("c1").unwrap().is_none());

        let first = assessments.create_evaluation(open_evaluation("c1", 10.0)).unwrap();
        let second = assessments.create_evaluation(open_evaluation("c1", 20.0)).unwrap();
        assessments.create_evaluation(open_evaluation("c1", 10.0)).unwrap();
        assessments.submit_evaluation(&first.id, BTreeMap::new(), 10.0).unwrap();
        assessments.submit_evaluation(&second.id, BTreeMap::new(), 10.0).unwrap();

        assert_eq!(assessments.average_score("c1").unwrap(), Some(75.0));
    }

    #[test]
    fn forms_are_listed_per_assignee() {
        let store = LmsStore::in_memory();
        let mut form = Form::new("hr", "Course feedback");
        form.fields.push(FormField::new("q1", "Rate the course", FieldKind::Rating));
        form.assigned_to = vec!["u1".to_string()];
        let form = store.assessments().create_form(form).unwrap();

        assert_eq!(store.assessments().forms_for_user("u1").unwrap().len(), 1);
        assert!(store.assessments().forms_for_user("u2").unwrap().is_empty());
        assert!(store.assessments().delete_form(&form.id).unwrap());
        assert!(store.assessments().get_form(&form.id).unwrap().is_none());
    }
}
