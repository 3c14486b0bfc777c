pub mod models;
pub mod rules;
pub mod validation;
pub mod flow;

pub use models::{ConditionOperator, OfferCondition, OfferKind, OfferTerms, RetentionOffer};
pub use rules::{evaluate_condition, select_offers, OfferMatcher};
pub use validation::{find_dangling_conditions, validate_offer, ConfigIssue, IssueReason, OfferValidationError};
pub use flow::{CancellationFlow, FlowError};
