//! Combat simulation core for Planet Raid.
//!
//! The binary in `main.rs` is a terminal front-end; everything it drives
//! lives here so the integration tests in `tests/` can import it.

pub mod abilities;
pub mod boss;
pub mod combat;
pub mod compute;
pub mod config;
pub mod enemies;
pub mod entities;
pub mod events;
pub mod health;
pub mod progression;
pub mod projectiles;
pub mod spawn;
