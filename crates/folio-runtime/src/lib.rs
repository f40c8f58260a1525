//! folio Runtime
//!
//! The host services the book engine runs on:
//! - a single-threaded, virtual-time event loop (timeouts and intervals)
//! - a localStorage-style key/value store, in memory or file backed

mod event_loop;
mod storage;

pub use event_loop::{EventLoop, Fired, TimerId, TimerKind};
pub use storage::{Storage, StorageError};
