//! Core type definitions for tidemark

mod entry;
mod error;

pub use entry::CandidateFile;
pub use error::TidemarkError;
