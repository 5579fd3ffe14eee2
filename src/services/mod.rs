// Service exports
pub mod embeddings;
pub mod postgres;

pub use embeddings::{profile_text, EmbeddingClient, EmbeddingError};
pub use postgres::{PostgresClient, StoreError};
