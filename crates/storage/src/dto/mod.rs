pub mod common;
pub mod event;
pub mod import;
pub mod ranking;
pub mod registration;
pub mod roster;
pub mod score;
pub mod standings;
