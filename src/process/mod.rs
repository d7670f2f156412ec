//! Process supervision seam.
//!
//! Orchestration code never touches OS processes directly: it hands a
//! [`LaunchSpec`] to a [`ProcessSupervisor`] and later terminates and reaps
//! the returned [`ProcessId`]. Real runs use [`OsProcessSupervisor`]; tests
//! plug in fakes.

mod os_supervisor;
mod supervisor;
pub use os_supervisor::*;
pub use supervisor::*;
