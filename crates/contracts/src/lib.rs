//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Capture timestamps are calendar date-times truncated to whole seconds
//!   (`chrono::NaiveDateTime`), parsed from embedded image metadata
//! - Per-source clock offsets are `chrono::TimeDelta` values relative to the
//!   reference source's clock
//! - File sequence numbers (extracted from filenames) are the ground truth
//!   for capture order within a source; timestamps order captures across
//!   sources

mod batch;
mod blueprint;
mod capture;
mod error;
mod source_id;

pub use batch::*;
pub use blueprint::*;
pub use capture::*;
pub use error::*;
pub use source_id::SourceId;
