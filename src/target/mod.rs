//! Execution target abstraction for probes and filesystem mutations

mod local;
mod mock;
mod r#trait;

pub use local::LocalTarget;
pub use mock::{MockTarget, UnzipFailure};
pub use r#trait::{DirEntry, EntryType, ExecutionTarget, Interrupted};
