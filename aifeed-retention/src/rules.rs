use aifeed_survey::{parse_number, AnswerSet};
use tracing::{debug, warn};
use crate::models::{ConditionOperator, OfferCondition, OfferKind, RetentionOffer};

/// Selects which retention offers a departing subscriber should see.
///
/// Inactive offers are dropped on construction and the rest are kept in
/// priority-descending order; equal priorities keep their input order.
pub struct OfferMatcher {
    offers: Vec<RetentionOffer>,
}

impl OfferMatcher {
    pub fn new(offers: Vec<RetentionOffer>) -> Self {
        let mut offers: Vec<RetentionOffer> = offers.into_iter().filter(|o| o.active).collect();
        // stable: ties stay in fetch order
        offers.sort_by_key(|o| std::cmp::Reverse(o.priority));
        Self { offers }
    }

    /// Offers to present for this answer set, highest priority first
    pub fn select(&self, answers: &AnswerSet) -> Vec<&RetentionOffer> {
        let selected: Vec<&RetentionOffer> = self
            .offers
            .iter()
            .filter(|offer| self.matches(offer, answers))
            .collect();

        debug!(
            candidates = self.offers.len(),
            selected = selected.len(),
            "Retention offers evaluated"
        );
        selected
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    fn matches(&self, offer: &RetentionOffer, answers: &AnswerSet) -> bool {
        match offer.kind {
            OfferKind::Unconditional => true,
            OfferKind::Conditional => match &offer.condition {
                Some(condition) => evaluate_condition(condition, answers),
                None => {
                    warn!(offer_id = %offer.id, "Conditional offer has no condition; skipping");
                    false
                }
            },
        }
    }
}

/// One-shot form of [`OfferMatcher`]: filter, match and order `offers` for `answers`.
pub fn select_offers(offers: &[RetentionOffer], answers: &AnswerSet) -> Vec<RetentionOffer> {
    OfferMatcher::new(offers.to_vec())
        .select(answers)
        .into_iter()
        .cloned()
        .collect()
}

/// Whether `answers` satisfies `condition`.
///
/// Never fails: a missing answer, malformed configuration or unparseable number
/// simply does not match.
pub fn evaluate_condition(condition: &OfferCondition, answers: &AnswerSet) -> bool {
    let Some(answer) = answers.get(&condition.question_id) else {
        return false;
    };

    if condition.answer_values.is_empty() {
        warn!(question_id = %condition.question_id, "Condition has no answer values");
        return false;
    }

    let given = answer.normalized();
    let expected = &condition.answer_values;

    match &condition.operator {
        // any-of membership, also for single-valued answers
        ConditionOperator::Equals => given.iter().any(|a| expected.iter().any(|v| v == a)),
        // substring of free text; a whole multiselect element is a substring of itself
        ConditionOperator::Contains => expected
            .iter()
            .filter(|v| !v.is_empty())
            .any(|v| given.iter().any(|a| a.contains(v.as_str()))),
        ConditionOperator::GreaterThan => {
            let [single] = given.as_slice() else {
                return false;
            };
            let Some(value) = parse_number(single) else {
                return false;
            };
            expected
                .iter()
                .filter_map(|v| parse_number(v))
                .any(|threshold| value > threshold)
        }
        ConditionOperator::Unknown(raw) => {
            warn!(operator = %raw, question_id = %condition.question_id, "Unknown condition operator");
            false
        }
    }
}
