use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use tracing::warn;
use aifeed_core::repository::QuestionRepository;
use aifeed_core::{CoreError, CoreResult};
use aifeed_survey::{Question, QuestionOption};

pub struct PostgresQuestionRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    creator_id: Uuid,
    text: String,
    question_type: String,
    options: Option<serde_json::Value>,
    required: bool,
    display_order: i32,
    active: bool,
    created_at: DateTime<Utc>,
}

impl QuestionRow {
    /// Rows that no longer decode (unknown type, broken options) are reported and skipped
    fn into_question(self) -> Option<Question> {
        let question_type = match self.question_type.parse() {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping question {}: {}", self.id, e);
                return None;
            }
        };

        let options = match self.options {
            None | Some(serde_json::Value::Null) => None,
            Some(raw) => match serde_json::from_value::<Vec<QuestionOption>>(raw) {
                Ok(opts) => Some(opts),
                Err(e) => {
                    warn!("Skipping question {}: bad options: {}", self.id, e);
                    return None;
                }
            },
        };

        Some(Question {
            id: self.id,
            creator_id: self.creator_id,
            text: self.text,
            question_type,
            options,
            required: self.required,
            order: self.display_order,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn storage_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::StorageError(e.to_string())
}

#[async_trait]
impl QuestionRepository for PostgresQuestionRepository {
    async fn list_questions(&self, creator_id: Uuid) -> CoreResult<Vec<Question>> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, text, question_type, options, required, display_order, active, created_at
            FROM survey_questions
            WHERE creator_id = $1
            ORDER BY display_order ASC, created_at ASC, id ASC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().filter_map(QuestionRow::into_question).collect())
    }

    async fn get_question(&self, id: Uuid) -> CoreResult<Option<Question>> {
        let row: Option<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, text, question_type, options, required, display_order, active, created_at
            FROM survey_questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.and_then(QuestionRow::into_question))
    }

    async fn save_question(&self, question: &Question) -> CoreResult<()> {
        let options = question
            .options
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(storage_error)?;

        sqlx::query(
            r#"
            INSERT INTO survey_questions (id, creator_id, text, question_type, options, required, display_order, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                text = EXCLUDED.text,
                question_type = EXCLUDED.question_type,
                options = EXCLUDED.options,
                required = EXCLUDED.required,
                display_order = EXCLUDED.display_order,
                active = EXCLUDED.active
            "#,
        )
        .bind(question.id)
        .bind(question.creator_id)
        .bind(&question.text)
        .bind(question.question_type.as_str())
        .bind(options)
        .bind(question.required)
        .bind(question.order)
        .bind(question.active)
        .bind(question.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM survey_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
