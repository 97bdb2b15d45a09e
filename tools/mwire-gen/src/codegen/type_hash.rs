// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Structural hash engine.
//!
//! Computes the cross-language-stable 64-bit fingerprint of a struct by
//! folding the fingerprints of its struct-typed members into its base hash
//! seed. The ancestry list carries the `(byte length, name)` pairs of
//! structs on the current recursive path; a referenced type already on the
//! path is skipped, which bounds recursion on cyclic type graphs. Ancestry
//! is never a memo cache: the same type reached through two distinct
//! branches is folded in twice.

use crate::schema::{Schema, StructDef, TypeRef};
use anyhow::{Context, Result};

/// Compute a struct's hash below the given ancestry path.
///
/// Fold order follows member declaration order; the final left rotation by
/// one bit is applied once per struct level, after all children. Both the
/// wrapping addition and the rotation are protocol constants shared by all
/// compatible generators.
pub fn compute_hash(schema: &Schema, st: &StructDef, ancestry: &[(usize, &str)]) -> Result<u64> {
    let mut path: Vec<(usize, &str)> = Vec::with_capacity(ancestry.len() + 1);
    path.extend_from_slice(ancestry);
    path.push((st.fqname.len(), st.fqname.as_str()));

    let mut hash = st.base_hash();
    for member in &st.members {
        let TypeRef::Struct(child) = &member.ty else {
            continue;
        };
        if path
            .iter()
            .any(|&(len, name)| len == child.len() && name == child)
        {
            continue;
        }
        let def = schema.get(child).with_context(|| {
            format!(
                "unresolved type reference `{}` in `{}`",
                child, st.fqname
            )
        })?;
        hash = hash.wrapping_add(compute_hash(schema, def, &path)?);
    }
    Ok(hash.rotate_left(1))
}

/// Top-level fingerprint: the hash computed with an empty ancestry. This is
/// the value embedded in the 8-byte wire preamble.
pub fn fingerprint(schema: &Schema, st: &StructDef) -> Result<u64> {
    compute_hash(schema, st, &[])
}
