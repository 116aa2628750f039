//! `swi-domain` — shared types for the SolarWinds admin-panel client:
//! the error taxonomy, client configuration and structured trace events.

pub mod config;
pub mod error;
pub mod trace;
