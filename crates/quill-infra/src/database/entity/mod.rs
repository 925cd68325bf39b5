//! SeaORM entities.

pub mod post;
pub mod profile;
pub mod user;
