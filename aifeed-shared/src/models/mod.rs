pub mod events;

pub use events::{ConfigIssueFlaggedEvent, OffersPresentedEvent, RetentionEvent};
