//! Synthetic project datasets: generation and JSON Lines persistence.

pub mod generate;
pub mod io;
mod record;

pub use generate::{GenerateOptions, generate_project, generate_projects};
pub use io::{DatasetError, read_jsonl, write_jsonl};
pub use record::ProjectRecord;
