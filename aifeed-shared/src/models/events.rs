use uuid::Uuid;

/// Emitted every time a departing subscriber is shown the result of a cancellation survey.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct OffersPresentedEvent {
    pub creator_id: Uuid,
    pub subscriber_id: Option<String>,
    pub offer_ids: Vec<Uuid>,
    pub answered_questions: usize,
    pub timestamp: i64,
}

/// Emitted when an active conditional offer can no longer match (dangling or malformed condition).
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ConfigIssueFlaggedEvent {
    pub creator_id: Uuid,
    pub offer_id: Uuid,
    pub question_id: Option<Uuid>,
    pub reason: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetentionEvent {
    OffersPresented(OffersPresentedEvent),
    ConfigIssueFlagged(ConfigIssueFlaggedEvent),
}

impl RetentionEvent {
    pub fn creator_id(&self) -> Uuid {
        match self {
            RetentionEvent::OffersPresented(e) => e.creator_id,
            RetentionEvent::ConfigIssueFlagged(e) => e.creator_id,
        }
    }
}
