//! Competition engine: entry rules, result lifecycle, ranking and standings.
//!
//! Each write runs in its own transaction. Rule decisions live in plain
//! functions so they can be exercised without a database.

pub mod batch_import;
pub mod entry_ledger;
pub mod events;
pub mod ranking_engine;
pub mod result_ledger;
pub mod roster;
pub mod standings;

#[cfg(test)]
pub(crate) mod fixtures;
