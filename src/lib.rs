//! # tidemark - Incremental directory mirroring
//!
//! Copies newly arrived files from every subdirectory of a source tree into
//! the matching subdirectory of a destination tree. Each destination
//! subdirectory keeps a watermark (`last_copied.txt`) holding the greatest
//! file name copied so far; a run only copies files that sort after it.
//!
//! Files whose extension is excluded and empty files are never copied. Files
//! directly in the source root are not mirrored, only its subdirectories.
//!
//! ## Known limitation
//!
//! Selection is by name, not by arrival time. A file that shows up after the
//! watermark has moved past its name (for example `0001.csv` arriving after
//! `0002.csv` was copied) is never picked up. Naming schemes with sortable
//! timestamps or zero-padded sequence numbers avoid this.

// Module declarations
pub mod commands;
pub mod config;
pub mod executor;
pub mod scanner;
pub mod types;
pub mod watermark;

// Re-export commonly used types
pub use config::Config;
pub use types::{CandidateFile, TidemarkError};
pub use watermark::{FileWatermarkStore, WatermarkStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
