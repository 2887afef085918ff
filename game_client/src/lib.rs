//! `game_client`
//!
//! Client-side systems:
//! - Connection session (one persistent socket, reader task, send)
//! - Main-thread work queue (network context -> frame loop handoff)
//! - World reconciliation (remote player registry, item spawns)
//! - Position reporting (send only on change)

pub mod config;
pub mod queue;
pub mod report;
pub mod session;
pub mod world;

pub use session::Session;
pub use world::Reconciler;
