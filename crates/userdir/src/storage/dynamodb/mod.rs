//! DynamoDB storage backend.
//!
//! Single-table layout: users live under `PK = SK = USER#<id>`; the `GSI1`
//! index groups every user under one partition (`GSI1PK = "USER"`) sorted
//! by the email lookup value, which makes email prefix queries a
//! `begins_with` key condition.

mod conversions;
mod error;
mod keys;
mod repository;
mod update;

pub use repository::DynamoDbRepository;
