//! API handlers module

pub mod auth;
pub mod content;
pub mod health;
