use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use aifeed_retention::{CancellationFlow, FlowError, OfferTerms, RetentionOffer};
use aifeed_shared::models::{OffersPresentedEvent, RetentionEvent};
use aifeed_survey::{AnswerSet, Question};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CancellationRequest {
    pub subscriber_id: Option<String>,
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresentedOffer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub terms: OfferTerms,
    pub summary: String,
    pub priority: i32,
}

impl From<RetentionOffer> for PresentedOffer {
    fn from(offer: RetentionOffer) -> Self {
        Self {
            id: offer.id,
            summary: offer.terms.summary(),
            title: offer.title,
            description: offer.description,
            terms: offer.terms,
            priority: offer.priority,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancellationResponse {
    pub offers: Vec<PresentedOffer>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/creators/{creator_id}/cancellation/survey", get(survey))
        .route("/v1/creators/{creator_id}/cancellation/offers", post(select_offers))
}

/// GET /v1/creators/:creator_id/cancellation/survey
/// Active exit-survey questions in display order
pub async fn survey(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<Question>>, AppError> {
    let questions = state.questions.list_questions(creator_id).await?;
    let survey = aifeed_survey::active_survey(&questions).into_iter().cloned().collect();
    Ok(Json(survey))
}

/// POST /v1/creators/:creator_id/cancellation/offers
/// Evaluate a submitted exit survey and return the offers to present
pub async fn select_offers(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
    Json(req): Json<CancellationRequest>,
) -> Result<Json<CancellationResponse>, AppError> {
    let (questions, offers) = tokio::try_join!(
        state.questions.list_questions(creator_id),
        state.offers.list_offers(creator_id),
    )?;

    let answered = req.answers.len();
    let flow = CancellationFlow::new(questions, offers);
    let mut selected = flow.evaluate(req.answers).map_err(|e| match e {
        FlowError::InvalidAnswers(errors) => AppError::InvalidAnswers(errors),
    })?;

    if let Some(max) = state.retention.max_offers_displayed {
        selected.truncate(max);
    }

    state.publish(RetentionEvent::OffersPresented(OffersPresentedEvent {
        creator_id,
        subscriber_id: req.subscriber_id,
        offer_ids: selected.iter().map(|o| o.id).collect(),
        answered_questions: answered,
        timestamp: chrono::Utc::now().timestamp(),
    }));

    Ok(Json(CancellationResponse {
        offers: selected.into_iter().map(PresentedOffer::from).collect(),
    }))
}
