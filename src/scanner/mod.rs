//! Directory scanning logic

mod candidates;
mod walker;

pub use candidates::{list_candidates, select_new};
pub use walker::for_each_subdirectory;
