//! Background Tasks Module
//!
//! Contains background tasks that run periodically during process operation.
//!
//! # Tasks
//! - Expired-entry cleanup: sweeps access-expired cache entries at
//!   configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
