//! Persistent collection store for task records.
//!
//! # Responsibility
//! - Define the store contract the service layer depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Each contract method is one atomic store call.
//! - Missing records are reported as `None`, not as errors; the service
//!   decides what absence means.

pub mod task_store;
