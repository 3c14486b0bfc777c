use async_trait::async_trait;
use uuid::Uuid;
use aifeed_retention::RetentionOffer;
use aifeed_survey::Question;
use crate::CoreResult;

/// Repository trait for exit-survey questions
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// All questions of a creator, ordered by `order`, then creation time, then id
    async fn list_questions(&self, creator_id: Uuid) -> CoreResult<Vec<Question>>;

    async fn get_question(&self, id: Uuid) -> CoreResult<Option<Question>>;

    /// Insert or replace by id
    async fn save_question(&self, question: &Question) -> CoreResult<()>;

    /// Returns false when nothing was deleted. Offers referencing the question are left as they are.
    async fn delete_question(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for retention offers
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// All offers of a creator, ordered by priority (desc), then creation time, then id
    async fn list_offers(&self, creator_id: Uuid) -> CoreResult<Vec<RetentionOffer>>;

    async fn get_offer(&self, id: Uuid) -> CoreResult<Option<RetentionOffer>>;

    /// Insert or replace by id
    async fn save_offer(&self, offer: &RetentionOffer) -> CoreResult<()>;

    async fn delete_offer(&self, id: Uuid) -> CoreResult<bool>;
}
