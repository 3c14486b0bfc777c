use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use chrono::Utc;
use aifeed_retention::{
    find_dangling_conditions, validate_offer, ConfigIssue, OfferCondition, OfferKind, OfferTerms, RetentionOffer,
};
use aifeed_shared::models::{ConfigIssueFlaggedEvent, RetentionEvent};
use aifeed_survey::{validate_question, Question, QuestionOption, QuestionType};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl QuestionRequest {
    fn into_question(self, id: Uuid, creator_id: Uuid, created_at: chrono::DateTime<Utc>) -> Question {
        Question {
            id,
            creator_id,
            text: self.text,
            question_type: self.question_type,
            options: self.options,
            required: self.required,
            order: self.order,
            active: self.active,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OfferRequest {
    pub kind: OfferKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub terms: OfferTerms,
    pub condition: Option<OfferCondition>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl OfferRequest {
    fn into_offer(self, id: Uuid, creator_id: Uuid, created_at: chrono::DateTime<Utc>) -> RetentionOffer {
        RetentionOffer {
            id,
            creator_id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            terms: self.terms,
            condition: self.condition,
            priority: self.priority,
            active: self.active,
            created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/creators/{creator_id}/questions",
            get(list_questions).post(create_question),
        )
        .route(
            "/v1/creators/{creator_id}/questions/{id}",
            get(get_question).put(update_question).delete(delete_question),
        )
        .route(
            "/v1/creators/{creator_id}/offers",
            get(list_offers).post(create_offer),
        )
        .route("/v1/creators/{creator_id}/offers/diagnostics", get(offer_diagnostics))
        .route(
            "/v1/creators/{creator_id}/offers/{id}",
            get(get_offer).put(update_offer).delete(delete_offer),
        )
}

// ============================================================================
// Question Handlers
// ============================================================================

/// GET /v1/creators/:creator_id/questions
pub async fn list_questions(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<Question>>, AppError> {
    Ok(Json(state.questions.list_questions(creator_id).await?))
}

/// GET /v1/creators/:creator_id/questions/:id
pub async fn get_question(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Question>, AppError> {
    Ok(Json(owned_question(&state, creator_id, id).await?))
}

/// POST /v1/creators/:creator_id/questions
pub async fn create_question(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
    Json(req): Json<QuestionRequest>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let question = req.into_question(Uuid::new_v4(), creator_id, Utc::now());
    validate_question(&question).map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.questions.save_question(&question).await?;
    tracing::info!(creator_id = %creator_id, question_id = %question.id, "Question created");

    Ok((StatusCode::CREATED, Json(question)))
}

/// PUT /v1/creators/:creator_id/questions/:id
pub async fn update_question(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<Question>, AppError> {
    let existing = owned_question(&state, creator_id, id).await?;

    let question = req.into_question(existing.id, creator_id, existing.created_at);
    validate_question(&question).map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.questions.save_question(&question).await?;
    Ok(Json(question))
}

/// DELETE /v1/creators/:creator_id/questions/:id
///
/// Offers conditioned on the question are left untouched; they show up in diagnostics.
pub async fn delete_question(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    owned_question(&state, creator_id, id).await?;

    if !state.questions.delete_question(id).await? {
        return Err(AppError::NotFoundError(format!("Question {} not found", id)));
    }
    tracing::info!(creator_id = %creator_id, question_id = %id, "Question deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn owned_question(state: &AppState, creator_id: Uuid, id: Uuid) -> Result<Question, AppError> {
    state
        .questions
        .get_question(id)
        .await?
        .filter(|q| q.creator_id == creator_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Question {} not found", id)))
}

// ============================================================================
// Offer Handlers
// ============================================================================

/// GET /v1/creators/:creator_id/offers
pub async fn list_offers(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<RetentionOffer>>, AppError> {
    Ok(Json(state.offers.list_offers(creator_id).await?))
}

/// GET /v1/creators/:creator_id/offers/:id
pub async fn get_offer(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RetentionOffer>, AppError> {
    Ok(Json(owned_offer(&state, creator_id, id).await?))
}

/// POST /v1/creators/:creator_id/offers
pub async fn create_offer(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
    Json(req): Json<OfferRequest>,
) -> Result<(StatusCode, Json<RetentionOffer>), AppError> {
    let offer = req.into_offer(Uuid::new_v4(), creator_id, Utc::now());
    check_offer(&state, &offer).await?;

    state.offers.save_offer(&offer).await?;
    tracing::info!(creator_id = %creator_id, offer_id = %offer.id, "Retention offer created");

    Ok((StatusCode::CREATED, Json(offer)))
}

/// PUT /v1/creators/:creator_id/offers/:id
pub async fn update_offer(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
    Json(req): Json<OfferRequest>,
) -> Result<Json<RetentionOffer>, AppError> {
    let existing = owned_offer(&state, creator_id, id).await?;

    let offer = req.into_offer(existing.id, creator_id, existing.created_at);
    check_offer(&state, &offer).await?;

    state.offers.save_offer(&offer).await?;
    Ok(Json(offer))
}

/// DELETE /v1/creators/:creator_id/offers/:id
pub async fn delete_offer(
    State(state): State<AppState>,
    Path((creator_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    owned_offer(&state, creator_id, id).await?;

    if !state.offers.delete_offer(id).await? {
        return Err(AppError::NotFoundError(format!("Offer {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/creators/:creator_id/offers/diagnostics
/// Active conditional offers that can no longer match anyone
pub async fn offer_diagnostics(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<ConfigIssue>>, AppError> {
    let (questions, offers) = tokio::try_join!(
        state.questions.list_questions(creator_id),
        state.offers.list_offers(creator_id),
    )?;

    let issues = find_dangling_conditions(&offers, &questions);
    let now = Utc::now().timestamp();
    for issue in &issues {
        tracing::warn!(
            creator_id = %creator_id,
            offer_id = %issue.offer_id,
            reason = issue.reason.as_str(),
            "Retention offer cannot match"
        );
        state.publish(RetentionEvent::ConfigIssueFlagged(ConfigIssueFlaggedEvent {
            creator_id,
            offer_id: issue.offer_id,
            question_id: issue.question_id,
            reason: issue.reason.as_str().to_string(),
            timestamp: now,
        }));
    }

    Ok(Json(issues))
}

async fn owned_offer(state: &AppState, creator_id: Uuid, id: Uuid) -> Result<RetentionOffer, AppError> {
    state
        .offers
        .get_offer(id)
        .await?
        .filter(|o| o.creator_id == creator_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Offer {} not found", id)))
}

async fn check_offer(state: &AppState, offer: &RetentionOffer) -> Result<(), AppError> {
    let questions = state.questions.list_questions(offer.creator_id).await?;
    validate_offer(offer, &questions)
        .map_err(|errors| AppError::InvalidInput(errors.iter().map(ToString::to_string).collect()))
}
