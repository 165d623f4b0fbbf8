//! Library event system
//!
//! Status reporting for the asynchronous halves of library operations: the
//! best-effort remote calls after a local commit, and per-page sync progress.

pub mod bus;
pub mod types;

pub use bus::{DEFAULT_EVENT_CAPACITY, LibraryEventBus};
pub use types::{LibraryEvent, RemoteOperation};
