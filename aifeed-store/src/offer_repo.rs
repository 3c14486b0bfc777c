use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use tracing::warn;
use aifeed_core::repository::OfferRepository;
use aifeed_core::CoreResult;
use aifeed_retention::{OfferCondition, OfferKind, OfferTerms, RetentionOffer};
use crate::question_repo::storage_error;

pub struct PostgresOfferRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    creator_id: Uuid,
    kind: String,
    title: String,
    description: String,
    terms: serde_json::Value,
    condition: Option<serde_json::Value>,
    priority: i32,
    active: bool,
    created_at: DateTime<Utc>,
}

impl OfferRow {
    fn into_offer(self) -> Option<RetentionOffer> {
        let kind = match self.kind.as_str() {
            "unconditional" => OfferKind::Unconditional,
            "conditional" => OfferKind::Conditional,
            other => {
                warn!("Skipping offer {}: unknown kind {}", self.id, other);
                return None;
            }
        };

        let terms: OfferTerms = match serde_json::from_value(self.terms) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping offer {}: bad terms: {}", self.id, e);
                return None;
            }
        };

        // A broken condition still loads; the matcher treats it as non-matching
        let condition = match self.condition {
            None | Some(serde_json::Value::Null) => None,
            Some(raw) => match serde_json::from_value::<OfferCondition>(raw) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Offer {} has an unreadable condition: {}", self.id, e);
                    None
                }
            },
        };

        Some(RetentionOffer {
            id: self.id,
            creator_id: self.creator_id,
            kind,
            title: self.title,
            description: self.description,
            terms,
            condition,
            priority: self.priority,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

fn kind_str(kind: OfferKind) -> &'static str {
    match kind {
        OfferKind::Unconditional => "unconditional",
        OfferKind::Conditional => "conditional",
    }
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn list_offers(&self, creator_id: Uuid) -> CoreResult<Vec<RetentionOffer>> {
        let rows: Vec<OfferRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, kind, title, description, terms, condition, priority, active, created_at
            FROM retention_offers
            WHERE creator_id = $1
            ORDER BY priority DESC, created_at ASC, id ASC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().filter_map(OfferRow::into_offer).collect())
    }

    async fn get_offer(&self, id: Uuid) -> CoreResult<Option<RetentionOffer>> {
        let row: Option<OfferRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, kind, title, description, terms, condition, priority, active, created_at
            FROM retention_offers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.and_then(OfferRow::into_offer))
    }

    async fn save_offer(&self, offer: &RetentionOffer) -> CoreResult<()> {
        let terms = serde_json::to_value(&offer.terms).map_err(storage_error)?;
        let condition = offer
            .condition
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(storage_error)?;

        sqlx::query(
            r#"
            INSERT INTO retention_offers (id, creator_id, kind, title, description, terms, condition, priority, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                terms = EXCLUDED.terms,
                condition = EXCLUDED.condition,
                priority = EXCLUDED.priority,
                active = EXCLUDED.active
            "#,
        )
        .bind(offer.id)
        .bind(offer.creator_id)
        .bind(kind_str(offer.kind))
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(terms)
        .bind(condition)
        .bind(offer.priority)
        .bind(offer.active)
        .bind(offer.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_offer(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM retention_offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
