//! Core domain types and storage abstraction for the userdir service.
//!
//! This crate is free of I/O: it defines the `User` entity, the field set a
//! single update may touch, and the repository trait concrete storage
//! backends implement.

pub mod storage;
pub mod user;
