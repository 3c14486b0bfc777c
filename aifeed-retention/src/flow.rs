use aifeed_survey::{active_survey, validate_answers, AnswerError, AnswerSet, Question};
use tracing::{debug, info};
use crate::models::RetentionOffer;
use crate::rules::OfferMatcher;

/// One creator's cancellation flow: the exit survey and the offers it can unlock
pub struct CancellationFlow {
    questions: Vec<Question>,
    matcher: OfferMatcher,
}

impl CancellationFlow {
    pub fn new(questions: Vec<Question>, offers: Vec<RetentionOffer>) -> Self {
        Self {
            questions,
            matcher: OfferMatcher::new(offers),
        }
    }

    /// Questions to ask, in display order
    pub fn survey(&self) -> Vec<&Question> {
        active_survey(&self.questions)
    }

    /// Validate a submitted survey and pick the offers to present.
    ///
    /// An empty list means "no applicable offers", which is a normal outcome.
    pub fn evaluate(&self, mut answers: AnswerSet) -> Result<Vec<RetentionOffer>, FlowError> {
        validate_answers(&self.questions, &answers).map_err(FlowError::InvalidAnswers)?;

        let pruned = answers.retain_active(&self.questions);
        if pruned > 0 {
            debug!(pruned, "Dropped answers to inactive or unknown questions");
        }

        let offers: Vec<RetentionOffer> = self.matcher.select(&answers).into_iter().cloned().collect();
        info!(answered = answers.len(), offers = offers.len(), "Cancellation survey evaluated");
        Ok(offers)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Survey answers are invalid ({} problem(s))", .0.len())]
    InvalidAnswers(Vec<AnswerError>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionOperator, OfferCondition, OfferTerms};
    use aifeed_survey::{QuestionOption, QuestionType};
    use uuid::Uuid;

    struct Fixture {
        reason: Question,
        retired: Question,
        price_offer: RetentionOffer,
        retired_offer: RetentionOffer,
        fallback: RetentionOffer,
    }

    fn fixture() -> Fixture {
        let creator = Uuid::new_v4();
        let reason = Question::new(creator, "Why are you leaving?", QuestionType::Radio)
            .with_options(vec![
                QuestionOption::new("too_expensive", "Too expensive"),
                QuestionOption::new("missing_feature", "Missing a feature"),
            ])
            .required()
            .at(1);
        let mut retired = Question::new(creator, "Old question", QuestionType::Text).at(0);
        retired.active = false;

        let price_offer = RetentionOffer::conditional(
            creator,
            "Half price for 3 months",
            OfferTerms::discount(50.0, 3),
            OfferCondition::new(reason.id, ConditionOperator::Equals, &["too_expensive"]),
        )
        .with_priority(10);
        let retired_offer = RetentionOffer::conditional(
            creator,
            "Retired",
            OfferTerms::free(2),
            OfferCondition::new(retired.id, ConditionOperator::Contains, &["x"]),
        )
        .with_priority(20);
        let fallback = RetentionOffer::unconditional(creator, "One month on us", OfferTerms::free(1));

        Fixture { reason, retired, price_offer, retired_offer, fallback }
    }

    fn flow(f: &Fixture) -> CancellationFlow {
        CancellationFlow::new(
            vec![f.reason.clone(), f.retired.clone()],
            vec![f.fallback.clone(), f.price_offer.clone(), f.retired_offer.clone()],
        )
    }

    #[test]
    fn test_survey_lists_active_questions() {
        let f = fixture();
        let ids: Vec<Uuid> = flow(&f).survey().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![f.reason.id]);
    }

    #[test]
    fn test_matching_answer_unlocks_offer() {
        let f = fixture();
        let answers = AnswerSet::new()
            .with(f.reason.id, "too_expensive")
            .with(f.retired.id, "xyz");

        let offers = flow(&f).evaluate(answers).unwrap();
        let ids: Vec<Uuid> = offers.iter().map(|o| o.id).collect();
        // the retired question's answer is pruned, so its offer stays hidden
        assert_eq!(ids, vec![f.price_offer.id, f.fallback.id]);
    }

    #[test]
    fn test_required_answer_missing() {
        let f = fixture();
        let err = flow(&f).evaluate(AnswerSet::new()).unwrap_err();
        let FlowError::InvalidAnswers(errors) = err;
        assert_eq!(errors, vec![AnswerError::Required(f.reason.id)]);
    }

    #[test]
    fn test_no_applicable_offers_is_ok() {
        let f = fixture();
        let flow = CancellationFlow::new(vec![f.reason.clone()], vec![f.price_offer.clone()]);
        let offers = flow
            .evaluate(AnswerSet::new().with(f.reason.id, "missing_feature"))
            .unwrap();
        assert!(offers.is_empty());
    }
}
