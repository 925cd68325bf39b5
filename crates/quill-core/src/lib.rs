//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! identities, profiles and posts, the ports adapters must implement, and the
//! services that enforce validation and ownership.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
