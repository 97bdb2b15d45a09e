// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Decoder generator.
//!
//! Mirror image of the encoder: decode traversal order must equal encode
//! traversal order, member for member and dimension for dimension. This is
//! a hard invariant of the wire contract, not a convention, which is why
//! the steps are derived independently here and checked for mirror
//! equality in tests rather than aliased to the encoder's output.
//!
//! The with-preamble layer reads the 8-byte fingerprint and rejects the
//! message on mismatch before any member is touched; every primitive read
//! in the body is bounds-checked, and dynamic extents are validated as
//! non-negative and consistent with the remaining buffer.

use crate::codegen::program::{elem_kind, resolve_dims, FieldStep};
use crate::schema::StructDef;
use anyhow::Result;

pub fn decode_steps(st: &StructDef) -> Result<Vec<FieldStep>> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::encode::encode_steps;
    use crate::schema::{Dimension, Member, PrimitiveKind, TypeRef};

    #[test]
    fn test_decode_mirrors_encode() {
        let st = StructDef::new(
            "lidar.scan_t",
            vec![
                Member::scalar("count", TypeRef::Primitive(PrimitiveKind::I32)),
                Member::new(
                    "ranges",
                    TypeRef::Primitive(PrimitiveKind::F32),
                    vec![Dimension::Dynamic("count".into())],
                ),
                Member::new(
                    "points",
                    TypeRef::Struct("geometry.point_t".into()),
                    vec![Dimension::Dynamic("count".into())],
                ),
            ],
        );
        assert_eq!(decode_steps(&st).expect("plans"), encode_steps(&st).expect("plans"));
    }
}
