use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use aifeed_core::repository::{OfferRepository, QuestionRepository};
use aifeed_core::CoreResult;
use aifeed_retention::RetentionOffer;
use aifeed_survey::Question;

/// In-memory question store (tests and the `memory` storage backend)
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<HashMap<Uuid, Question>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn list_questions(&self, creator_id: Uuid) -> CoreResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut list: Vec<Question> = questions
            .values()
            .filter(|q| q.creator_id == creator_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(list)
    }

    async fn get_question(&self, id: Uuid) -> CoreResult<Option<Question>> {
        Ok(self.questions.read().await.get(&id).cloned())
    }

    async fn save_question(&self, question: &Question) -> CoreResult<()> {
        self.questions.write().await.insert(question.id, question.clone());
        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.questions.write().await.remove(&id).is_some())
    }
}

/// In-memory offer store
#[derive(Default)]
pub struct InMemoryOfferRepository {
    offers: RwLock<HashMap<Uuid, RetentionOffer>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn list_offers(&self, creator_id: Uuid) -> CoreResult<Vec<RetentionOffer>> {
        let offers = self.offers.read().await;
        let mut list: Vec<RetentionOffer> = offers
            .values()
            .filter(|o| o.creator_id == creator_id)
            .cloned()
            .collect();
        // same order as the Postgres query so priority ties are reproducible
        list.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(list)
    }

    async fn get_offer(&self, id: Uuid) -> CoreResult<Option<RetentionOffer>> {
        Ok(self.offers.read().await.get(&id).cloned())
    }

    async fn save_offer(&self, offer: &RetentionOffer) -> CoreResult<()> {
        self.offers.write().await.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn delete_offer(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.offers.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aifeed_retention::OfferTerms;
    use aifeed_survey::QuestionType;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_offer_listing_order() {
        let repo = InMemoryOfferRepository::new();
        let creator = Uuid::new_v4();
        let now = Utc::now();

        let mut older = RetentionOffer::unconditional(creator, "Older", OfferTerms::free(1)).with_priority(5);
        older.created_at = now - Duration::minutes(10);
        let mut newer = RetentionOffer::unconditional(creator, "Newer", OfferTerms::free(1)).with_priority(5);
        newer.created_at = now;
        let top = RetentionOffer::unconditional(creator, "Top", OfferTerms::free(2)).with_priority(50);
        let foreign = RetentionOffer::unconditional(Uuid::new_v4(), "Other creator", OfferTerms::free(1));

        for offer in [&newer, &foreign, &older, &top] {
            repo.save_offer(offer).await.unwrap();
        }

        let ids: Vec<Uuid> = repo.list_offers(creator).await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![top.id, older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_question_crud() {
        let repo = InMemoryQuestionRepository::new();
        let creator = Uuid::new_v4();
        let mut question = Question::new(creator, "Why?", QuestionType::Textarea).at(2);
        let first = Question::new(creator, "First", QuestionType::Number).at(1);

        repo.save_question(&question).await.unwrap();
        repo.save_question(&first).await.unwrap();

        question.text = "Why are you leaving?".into();
        repo.save_question(&question).await.unwrap();

        let list = repo.list_questions(creator).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, first.id);
        assert_eq!(list[1].text, "Why are you leaving?");

        assert!(repo.delete_question(question.id).await.unwrap());
        assert!(!repo.delete_question(question.id).await.unwrap());
        assert!(repo.get_question(question.id).await.unwrap().is_none());
    }
}
