use std::sync::Arc;
use tokio::sync::broadcast;
use aifeed_core::repository::{OfferRepository, QuestionRepository};
use aifeed_shared::models::RetentionEvent;
use aifeed_store::app_config::RetentionConfig;

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub events: broadcast::Sender<RetentionEvent>,
    pub retention: RetentionConfig,
}

impl AppState {
    /// Best-effort publish; having no listener is not an error
    pub fn publish(&self, event: RetentionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No retention event listeners");
        }
    }
}
