//! Data access over a borrowed connection.
//!
//! Repositories take `&mut PgConnection` so the engine can run several of
//! them inside one transaction (`&mut *tx`) or over a pooled connection.

pub mod event;
pub mod ranking;
pub mod registration;
pub mod roster;
pub mod score;
pub mod standings;
