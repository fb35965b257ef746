pub mod token_store;
pub mod user_repository;
