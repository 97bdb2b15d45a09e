// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Encoder generator.
//!
//! Derives the no-preamble encode procedure: members in declaration order,
//! dimension combinations nested outer-to-inner, primitives as fixed-width
//! big-endian writes, compound elements through the referenced type's own
//! no-preamble encoder. The with-preamble layer (fingerprint first, then
//! exactly one instance) is part of the plan contract and rendered by
//! backends; only the no-preamble layer recurses.

use crate::codegen::program::{elem_kind, resolve_dims, FieldStep};
use crate::schema::StructDef;
use anyhow::Result;

pub fn encode_steps(st: &StructDef) -> Result<Vec<FieldStep>> {
    st.members
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            Ok(FieldStep {
                member: idx,
                dims: resolve_dims(st, idx)?,
                elem: elem_kind(&member.ty),
            })
        })
        .collect()
}
