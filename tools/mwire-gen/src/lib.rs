// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! mwire-gen: the codec/hash generation core of the mwire IDL compiler.
//!
//! Input is an already-parsed [`schema::Schema`]. For every struct the core
//! produces a [`codegen::CodecPlan`]: the canonical 64-bit structural
//! fingerprint plus abstract size/encode/decode procedures. Emission
//! backends ([`codegen::EmitBackend`]) render plans into target-language
//! syntax; [`codegen::Interp`] executes them directly as the reference
//! semantics every backend must reproduce.

pub mod codegen;
pub mod schema;
