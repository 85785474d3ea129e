//! Core domain types
//!
//! These types describe batch workloads as the sidecar sees them. They carry
//! no Kubernetes client types so the client and CLI crates stay lightweight.

pub mod config_map;
pub mod workload;
