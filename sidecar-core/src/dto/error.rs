//! Error body returned by every failing RPC

use serde::{Deserialize, Serialize};

/// Machine-readable failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Rejected,
    ConvergenceFailed,
    DeadlineExceeded,
    Decode,
    Unavailable,
    Internal,
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}
