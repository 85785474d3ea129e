//! Data Transfer Objects for the RPC surface
//!
//! Request and response bodies exchanged between the sidecar server and its
//! callers (the HTTP client crate and the CLI).

pub mod config_map;
pub mod error;
pub mod workload;
