use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};
use serde_json::Value;
use crate::app_config::RetentionConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

#[derive(sqlx::FromRow)]
struct SettingRow {
    setting_key: String,
    setting_value: Value,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay settings stored in `service_settings` on top of the file/env configuration.
    ///
    /// Rows look like `{"value": <number|null>}`; unknown keys and malformed values are ignored.
    pub async fn fetch_retention_settings(&self, defaults: RetentionConfig) -> Result<RetentionConfig, sqlx::Error> {
        let rows: Vec<SettingRow> = sqlx::query_as("SELECT setting_key, setting_value FROM service_settings")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = defaults;
        for row in rows {
            apply_setting(&mut settings, &row.setting_key, &row.setting_value);
        }

        Ok(settings)
    }
}

fn apply_setting(settings: &mut RetentionConfig, key: &str, raw: &Value) {
    let Some(v) = raw.get("value") else {
        warn!("Setting {} has no value field", key);
        return;
    };

    match key {
        "max_offers_displayed" => {
            if v.is_null() {
                settings.max_offers_displayed = None;
            } else if let Some(n) = Value::as_u64(v) {
                settings.max_offers_displayed = Some(n as usize);
            }
        }
        "event_buffer" => {
            if let Some(n) = Value::as_u64(v).filter(|n| *n > 0) {
                settings.event_buffer = n as usize;
            }
        }
        _ => {}
    }
}
