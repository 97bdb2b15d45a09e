// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Runtime support for mwire-generated codecs.
//!
//! Generated code and the generator's reference interpreter share the
//! primitives defined here: bounds-checked big-endian read/write cursors,
//! the serialization error taxonomy, and the dynamic instance model.

pub mod dynamic;
pub mod ser;

pub use dynamic::Value;
pub use ser::{SerError, SerResult};
