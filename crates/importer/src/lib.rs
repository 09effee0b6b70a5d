pub mod csv_rows;
pub mod error;

pub use csv_rows::{ParsedFile, read_registrations, read_scores};
pub use error::{ImporterError, Result};
