pub mod helpers;
pub mod service;

pub use helpers::{configure_postgresql, get_postgres_pool};
pub use service::IdentityService;
