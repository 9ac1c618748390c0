//! Conversation record persistence.
//!
//! JSON records on the local filesystem, addressed by generated
//! timestamped filenames. Persistence is deliberately detached from the
//! orchestration core: a failed save is reported and the run is otherwise
//! unaffected.

pub mod records;

pub use records::{RecordFileInfo, RecordStore, StorageConfig};
