//! Service Module
//!
//! Business logic layer for the sidecar.
//! The workload manager drives the repository; the poller and template
//! helpers are shared by both workload kinds.

pub mod poller;
pub mod template;
pub mod workload;

// Re-export for convenience
pub use workload as workload_service;
