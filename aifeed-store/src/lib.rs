pub mod app_config;
pub mod database;
pub mod question_repo;
pub mod offer_repo;
pub mod memory;

pub use database::DbClient;
pub use question_repo::PostgresQuestionRepository;
pub use offer_repo::PostgresOfferRepository;
pub use memory::{InMemoryOfferRepository, InMemoryQuestionRepository};
