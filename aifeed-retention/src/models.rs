use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Whether an offer is always shown or depends on an exit-survey answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Unconditional,
    Conditional,
}

/// How a condition compares the subscriber's answer with the configured values.
///
/// Unrecognized operator names load as `Unknown` so one bad row never breaks a whole
/// offer list; `Unknown` never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Equals,
    Contains,
    GreaterThan,
    Unknown(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ConditionOperator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "equals" => ConditionOperator::Equals,
            "contains" => ConditionOperator::Contains,
            "greater_than" => ConditionOperator::GreaterThan,
            _ => ConditionOperator::Unknown(raw),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule tying a conditional offer to one survey question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferCondition {
    pub question_id: Uuid,
    pub operator: ConditionOperator,
    pub answer_values: Vec<String>,
}

impl OfferCondition {
    pub fn new(question_id: Uuid, operator: ConditionOperator, answer_values: &[&str]) -> Self {
        Self {
            question_id,
            operator,
            answer_values: answer_values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// What the subscriber gets for staying
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OfferTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_months: Option<u32>,
}

impl OfferTerms {
    pub fn discount(percent: f64, months: u32) -> Self {
        Self {
            discount_percent: Some(percent),
            discount_months: Some(months),
            free_months: None,
        }
    }

    pub fn free(months: u32) -> Self {
        Self {
            free_months: Some(months),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.discount_percent.is_none() && self.discount_months.is_none() && self.free_months.is_none()
    }

    /// Human readable line for the cancellation screen, e.g. "50% off for 3 months + 1 month free"
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        match (self.discount_percent, self.discount_months) {
            (Some(pct), Some(months)) => {
                parts.push(format!("{}% off for {}", format_percent(pct), plural(months, "month")))
            }
            (Some(pct), None) => parts.push(format!("{}% off", format_percent(pct))),
            (None, Some(months)) => parts.push(format!("discounted for {}", plural(months, "month"))),
            (None, None) => {}
        }

        if let Some(free) = self.free_months.filter(|m| *m > 0) {
            parts.push(format!("{} free", plural(free, "month")));
        }

        parts.join(" + ")
    }
}

fn format_percent(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{:.1}", pct)
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// A creator-defined incentive shown during the cancellation flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetentionOffer {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub kind: OfferKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub terms: OfferTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<OfferCondition>,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl RetentionOffer {
    /// Create an active offer shown to every departing subscriber
    pub fn unconditional(creator_id: Uuid, title: impl Into<String>, terms: OfferTerms) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id,
            kind: OfferKind::Unconditional,
            title: title.into(),
            description: String::new(),
            terms,
            condition: None,
            priority: 0,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Create an active offer gated on a survey answer
    pub fn conditional(
        creator_id: Uuid,
        title: impl Into<String>,
        terms: OfferTerms,
        condition: OfferCondition,
    ) -> Self {
        Self {
            kind: OfferKind::Conditional,
            condition: Some(condition),
            ..Self::unconditional(creator_id, title, terms)
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Question this offer depends on, if any
    pub fn referenced_question(&self) -> Option<Uuid> {
        match self.kind {
            OfferKind::Conditional => self.condition.as_ref().map(|c| c.question_id),
            OfferKind::Unconditional => None,
        }
    }
}
