//! Application layer: the fetch, clean and push phases
//!
//! Services here only talk to the outside through `infrastructure::traits`.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::SnapshotIoExt;
