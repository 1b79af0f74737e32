pub mod model;
pub mod queries;
pub mod repository;
pub mod schema;
pub mod users;

// Re-export commonly used types
pub use model::*;
pub use repository::MoodEntryRepository;
pub use users::{hash_token, UserRepository};
