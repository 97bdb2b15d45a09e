// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Serialization primitives for the mwire wire format.
//!
//! Every message is `[8-byte big-endian fingerprint][payload]`; the cursors
//! here perform the bounds-checked big-endian reads and writes that both
//! generated codecs and the reference interpreter are built from.

pub mod cursor;

pub use cursor::{Cursor, CursorMut};

use std::fmt;

/// Serialization error. All failures are local and recoverable by the
/// caller of encode/decode; nothing here aborts the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    FingerprintMismatch { expected: u64, found: u64 },
    InvalidData { reason: String },
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::FingerprintMismatch { expected, found } => {
                write!(
                    f,
                    "fingerprint mismatch: expected {:#018x}, found {:#018x}",
                    expected, found
                )
            }
            SerError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
        }
    }
}

impl std::error::Error for SerError {}

pub type SerResult<T> = core::result::Result<T, SerError>;
