//! CLI commands.

pub mod health;
pub mod seed;
