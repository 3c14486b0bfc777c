use aifeed_survey::{parse_number, Question};
use serde::Serialize;
use uuid::Uuid;
use crate::models::{ConditionOperator, OfferKind, RetentionOffer};

/// Check an offer before it is stored.
///
/// `questions` are the creator's questions (active or not); every problem found is returned.
pub fn validate_offer(offer: &RetentionOffer, questions: &[Question]) -> Result<(), Vec<OfferValidationError>> {
    let mut errors = Vec::new();

    if offer.title.trim().is_empty() {
        errors.push(OfferValidationError::EmptyTitle);
    }

    let terms = &offer.terms;
    if terms.is_empty() {
        errors.push(OfferValidationError::EmptyTerms);
    }
    if let Some(pct) = terms.discount_percent {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            errors.push(OfferValidationError::DiscountOutOfRange(pct));
        }
    }
    if terms.discount_months == Some(0) {
        errors.push(OfferValidationError::ZeroDiscountMonths);
    }

    match (offer.kind, &offer.condition) {
        (OfferKind::Unconditional, Some(_)) => errors.push(OfferValidationError::UnexpectedCondition),
        (OfferKind::Unconditional, None) => {}
        (OfferKind::Conditional, None) => errors.push(OfferValidationError::MissingCondition),
        (OfferKind::Conditional, Some(condition)) => {
            if condition.answer_values.is_empty() {
                errors.push(OfferValidationError::EmptyAnswerValues);
            } else if condition.answer_values.iter().any(|v| v.trim().is_empty()) {
                errors.push(OfferValidationError::BlankAnswerValue);
            }

            if let ConditionOperator::Unknown(raw) = &condition.operator {
                errors.push(OfferValidationError::UnknownOperator(raw.clone()));
            }

            match questions.iter().find(|q| q.id == condition.question_id) {
                None => errors.push(OfferValidationError::UnknownQuestion(condition.question_id)),
                Some(question) => match condition.operator {
                    ConditionOperator::GreaterThan => {
                        if !question.question_type.is_numeric() {
                            errors.push(OfferValidationError::NonNumericQuestion(question.id));
                        }
                        for value in &condition.answer_values {
                            if parse_number(value).is_none() {
                                errors.push(OfferValidationError::NonNumericThreshold(value.clone()));
                            }
                        }
                    }
                    ConditionOperator::Equals if question.question_type.has_options() => {
                        for value in &condition.answer_values {
                            if !question.has_option(value) {
                                errors.push(OfferValidationError::UnknownOption(value.clone()));
                            }
                        }
                    }
                    _ => {}
                },
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Clone)]
pub enum OfferValidationError {
    #[error("Offer title must not be empty")]
    EmptyTitle,

    #[error("Offer needs at least one of discount percent, discount months or free months")]
    EmptyTerms,

    #[error("Discount percent must be between 0 and 100, got {0}")]
    DiscountOutOfRange(f64),

    #[error("Discount months must be at least 1")]
    ZeroDiscountMonths,

    #[error("Conditional offer has no condition")]
    MissingCondition,

    #[error("Unconditional offer must not carry a condition")]
    UnexpectedCondition,

    #[error("Condition needs at least one answer value")]
    EmptyAnswerValues,

    #[error("Answer values must not be blank")]
    BlankAnswerValue,

    #[error("Unknown condition operator: {0}")]
    UnknownOperator(String),

    #[error("Condition references unknown question {0}")]
    UnknownQuestion(Uuid),

    #[error("greater_than needs a number or rating question, {0} is neither")]
    NonNumericQuestion(Uuid),

    #[error("greater_than threshold is not a number: {0}")]
    NonNumericThreshold(String),

    #[error("Answer value is not an option of the question: {0}")]
    UnknownOption(String),
}

/// Why an active conditional offer can no longer match anyone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    MissingCondition,
    EmptyAnswerValues,
    BlankAnswerValues,
    UnknownOperator,
    QuestionDeleted,
    QuestionInactive,
}

impl IssueReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueReason::MissingCondition => "missing_condition",
            IssueReason::EmptyAnswerValues => "empty_answer_values",
            IssueReason::BlankAnswerValues => "blank_answer_values",
            IssueReason::UnknownOperator => "unknown_operator",
            IssueReason::QuestionDeleted => "question_deleted",
            IssueReason::QuestionInactive => "question_inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub offer_id: Uuid,
    pub question_id: Option<Uuid>,
    pub reason: IssueReason,
}

/// Active conditional offers that the matching engine will silently skip
pub fn find_dangling_conditions(offers: &[RetentionOffer], questions: &[Question]) -> Vec<ConfigIssue> {
    offers
        .iter()
        .filter(|o| o.active && o.kind == OfferKind::Conditional)
        .filter_map(|offer| {
            let Some(condition) = &offer.condition else {
                return Some(ConfigIssue {
                    offer_id: offer.id,
                    question_id: None,
                    reason: IssueReason::MissingCondition,
                });
            };

            let reason = if condition.answer_values.is_empty() {
                Some(IssueReason::EmptyAnswerValues)
            } else if condition.answer_values.iter().all(|v| v.trim().is_empty()) {
                Some(IssueReason::BlankAnswerValues)
            } else if matches!(condition.operator, ConditionOperator::Unknown(_)) {
                Some(IssueReason::UnknownOperator)
            } else {
                match questions.iter().find(|q| q.id == condition.question_id) {
                    None => Some(IssueReason::QuestionDeleted),
                    Some(q) if !q.active => Some(IssueReason::QuestionInactive),
                    Some(_) => None,
                }
            };

            reason.map(|reason| ConfigIssue {
                offer_id: offer.id,
                question_id: Some(condition.question_id),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OfferCondition, OfferTerms};
    use aifeed_survey::{QuestionOption, QuestionType};

    fn reason_question(creator: Uuid) -> Question {
        Question::new(creator, "Why are you leaving?", QuestionType::Select).with_options(vec![
            QuestionOption::new("too_expensive", "Too expensive"),
            QuestionOption::new("missing_feature", "Missing a feature"),
        ])
    }

    #[test]
    fn test_valid_offers_pass() {
        let creator = Uuid::new_v4();
        let question = reason_question(creator);
        let rating = Question::new(creator, "Rate us", QuestionType::Rating);
        let questions = vec![question.clone(), rating.clone()];

        let plain = RetentionOffer::unconditional(creator, "Take a break", OfferTerms::free(1));
        assert!(validate_offer(&plain, &questions).is_ok());

        let targeted = RetentionOffer::conditional(
            creator,
            "Half price",
            OfferTerms::discount(50.0, 3),
            OfferCondition::new(question.id, ConditionOperator::Equals, &["too_expensive"]),
        );
        assert!(validate_offer(&targeted, &questions).is_ok());

        let happy = RetentionOffer::conditional(
            creator,
            "Loyalty month",
            OfferTerms::free(1),
            OfferCondition::new(rating.id, ConditionOperator::GreaterThan, &["3"]),
        );
        assert!(validate_offer(&happy, &questions).is_ok());
    }

    #[test]
    fn test_terms_are_checked() {
        let creator = Uuid::new_v4();
        let mut offer = RetentionOffer::unconditional(creator, "  ", OfferTerms::default());
        let errors = validate_offer(&offer, &[]).unwrap_err();
        assert_eq!(errors, vec![OfferValidationError::EmptyTitle, OfferValidationError::EmptyTerms]);

        offer.title = "Deal".into();
        offer.terms = OfferTerms::discount(150.0, 0);
        let errors = validate_offer(&offer, &[]).unwrap_err();
        assert_eq!(
            errors,
            vec![OfferValidationError::DiscountOutOfRange(150.0), OfferValidationError::ZeroDiscountMonths]
        );
    }

    #[test]
    fn test_condition_shape_is_checked() {
        let creator = Uuid::new_v4();
        let question = reason_question(creator);
        let questions = vec![question.clone()];

        let mut missing = RetentionOffer::unconditional(creator, "Deal", OfferTerms::free(1));
        missing.kind = OfferKind::Conditional;
        assert_eq!(validate_offer(&missing, &questions).unwrap_err(), vec![OfferValidationError::MissingCondition]);

        let mut stray = RetentionOffer::unconditional(creator, "Deal", OfferTerms::free(1));
        stray.condition = Some(OfferCondition::new(question.id, ConditionOperator::Equals, &["too_expensive"]));
        assert_eq!(validate_offer(&stray, &questions).unwrap_err(), vec![OfferValidationError::UnexpectedCondition]);

        let dangling = RetentionOffer::conditional(
            creator,
            "Deal",
            OfferTerms::free(1),
            OfferCondition::new(Uuid::new_v4(), ConditionOperator::Unknown("like".into()), &[]),
        );
        let errors = validate_offer(&dangling, &questions).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&OfferValidationError::EmptyAnswerValues));
        assert!(errors.contains(&OfferValidationError::UnknownOperator("like".into())));
    }

    #[test]
    fn test_operator_must_suit_question() {
        let creator = Uuid::new_v4();
        let question = reason_question(creator);
        let questions = vec![question.clone()];

        let numeric_on_choice = RetentionOffer::conditional(
            creator,
            "Deal",
            OfferTerms::free(1),
            OfferCondition::new(question.id, ConditionOperator::GreaterThan, &["three"]),
        );
        let errors = validate_offer(&numeric_on_choice, &questions).unwrap_err();
        assert_eq!(
            errors,
            vec![
                OfferValidationError::NonNumericQuestion(question.id),
                OfferValidationError::NonNumericThreshold("three".into()),
            ]
        );

        let bad_option = RetentionOffer::conditional(
            creator,
            "Deal",
            OfferTerms::free(1),
            OfferCondition::new(question.id, ConditionOperator::Equals, &["too_expensive", "bored"]),
        );
        assert_eq!(
            validate_offer(&bad_option, &questions).unwrap_err(),
            vec![OfferValidationError::UnknownOption("bored".into())]
        );
    }

    #[test]
    fn test_dangling_conditions_are_reported() {
        let creator = Uuid::new_v4();
        let live = reason_question(creator);
        let mut retired = reason_question(creator);
        retired.active = false;
        let deleted_id = Uuid::new_v4();

        let ok = RetentionOffer::conditional(
            creator,
            "Live",
            OfferTerms::free(1),
            OfferCondition::new(live.id, ConditionOperator::Equals, &["too_expensive"]),
        );
        let on_retired = RetentionOffer::conditional(
            creator,
            "Retired",
            OfferTerms::free(1),
            OfferCondition::new(retired.id, ConditionOperator::Equals, &["too_expensive"]),
        );
        let on_deleted = RetentionOffer::conditional(
            creator,
            "Deleted",
            OfferTerms::free(1),
            OfferCondition::new(deleted_id, ConditionOperator::Equals, &["too_expensive"]),
        );
        let inactive_on_deleted = on_deleted.clone().deactivated();
        let plain = RetentionOffer::unconditional(creator, "Plain", OfferTerms::free(1));

        let issues = find_dangling_conditions(
            &[ok, on_retired.clone(), on_deleted.clone(), inactive_on_deleted, plain],
            &[live, retired.clone()],
        );

        assert_eq!(
            issues,
            vec![
                ConfigIssue {
                    offer_id: on_retired.id,
                    question_id: Some(retired.id),
                    reason: IssueReason::QuestionInactive,
                },
                ConfigIssue {
                    offer_id: on_deleted.id,
                    question_id: Some(deleted_id),
                    reason: IssueReason::QuestionDeleted,
                },
            ]
        );
    }

    #[test]
    fn test_blank_answer_values_are_rejected() {
        let creator = Uuid::new_v4();
        let comment = Question::new(creator, "Anything else?", QuestionType::Text);
        let questions = vec![comment.clone()];

        for values in [&[""][..], &["  ", "price"][..]] {
            let offer = RetentionOffer::conditional(
                creator,
                "Deal",
                OfferTerms::free(1),
                OfferCondition::new(comment.id, ConditionOperator::Contains, values),
            );
            assert_eq!(
                validate_offer(&offer, &questions).unwrap_err(),
                vec![OfferValidationError::BlankAnswerValue]
            );
        }
    }

    #[test]
    fn test_unmatchable_conditions_are_reported() {
        let creator = Uuid::new_v4();
        let comment = Question::new(creator, "Anything else?", QuestionType::Text);

        let blank = RetentionOffer::conditional(
            creator,
            "Blank",
            OfferTerms::free(1),
            OfferCondition::new(comment.id, ConditionOperator::Contains, &["", " "]),
        );
        let unknown_op = RetentionOffer::conditional(
            creator,
            "Regex",
            OfferTerms::free(1),
            OfferCondition::new(comment.id, ConditionOperator::Unknown("regex".into()), &["price"]),
        );
        let partly_blank = RetentionOffer::conditional(
            creator,
            "Partly blank",
            OfferTerms::free(1),
            OfferCondition::new(comment.id, ConditionOperator::Contains, &["", "price"]),
        );

        let issues = find_dangling_conditions(&[blank.clone(), unknown_op.clone(), partly_blank], &[comment.clone()]);
        let reasons: Vec<(Uuid, IssueReason)> = issues.iter().map(|i| (i.offer_id, i.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (blank.id, IssueReason::BlankAnswerValues),
                (unknown_op.id, IssueReason::UnknownOperator),
            ]
        );
        assert_eq!(IssueReason::UnknownOperator.as_str(), "unknown_operator");
    }
}
