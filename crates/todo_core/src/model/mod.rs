//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical task record shared by server and client.
//! - Own text validation rules so every layer rejects blank tasks the same way.
//! - Define the JSON envelope both sides of the wire agree on.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` assigned at insert time.
//! - Persisted task text is trimmed and never blank.

pub mod envelope;
pub mod task;
