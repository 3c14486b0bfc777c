use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use aifeed_shared::models::RetentionEvent;

/// Drain the retention event channel into the log until every sender is gone
pub async fn start_event_logger(mut rx: broadcast::Receiver<RetentionEvent>) {
    info!("Retention event logger started");

    loop {
        match rx.recv().await {
            Ok(RetentionEvent::OffersPresented(e)) => {
                info!(
                    creator_id = %e.creator_id,
                    subscriber_id = e.subscriber_id.as_deref().unwrap_or("-"),
                    offers = e.offer_ids.len(),
                    answered = e.answered_questions,
                    "Retention offers presented"
                );
            }
            Ok(RetentionEvent::ConfigIssueFlagged(e)) => {
                warn!(
                    creator_id = %e.creator_id,
                    offer_id = %e.offer_id,
                    reason = %e.reason,
                    "Retention offer configuration issue"
                );
            }
            Err(RecvError::Lagged(skipped)) => warn!("Event logger lagged, skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }

    info!("Retention event logger stopped");
}
