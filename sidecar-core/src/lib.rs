//! Sidecar Core
//!
//! Core types shared by the sidecar server, its HTTP client and the CLI.
//!
//! This crate contains:
//! - Domain types: workload kinds, handles, status projections and poll outcomes
//! - DTOs: request and response bodies of the RPC surface

pub mod domain;
pub mod dto;
