//! Task use-case service.
//!
//! # Responsibility
//! - Validate input before any store call.
//! - Translate store outcomes into the service error taxonomy.

pub mod task_service;
