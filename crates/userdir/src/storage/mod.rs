//! Storage backend implementations.
//!
//! Concrete implementations of `userdir_core::storage::UserRepository`.
//! The DynamoDB backend (feature `dynamodb`, default) is the production
//! store; the in-memory backend backs tests and dependency-free runs.

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbRepository;
pub use inmemory::InMemoryRepository;
