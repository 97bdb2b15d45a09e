// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Size calculator generator.
//!
//! Derives, per struct, the no-preamble encoded-size procedure. Fixed-width
//! primitives with all-constant dimensions fold to a compile-time constant
//! (width times the product of the extents); everything else is summed per
//! element at run time. The 8-byte preamble is added only by the top-level
//! entry point, never inside the recursive helper.

use crate::codegen::program::{elem_kind, resolve_dims, DimExpr, SizeStep};
use crate::schema::{StructDef, TypeRef};
use anyhow::{Context, Result};

pub fn size_steps(st: &StructDef) -> Result<Vec<SizeStep>> {
    let mut steps = Vec::with_capacity(st.members.len());
    for (idx, member) in st.members.iter().enumerate() {
        let dims = resolve_dims(st, idx)?;
        let width = match member.ty {
            TypeRef::Primitive(p) => p.wire_width(),
            TypeRef::Struct(_) => None,
        };
        match (width, const_extent_product(&dims)) {
            (Some(w), Some(count)) => {
                let bytes = w.checked_mul(count).with_context(|| {
                    format!(
                        "constant size of `{}.{}` overflows u32",
                        st.fqname, member.name
                    )
                })?;
                steps.push(SizeStep::Const(bytes));
            }
            _ => steps.push(SizeStep::PerElement {
                member: idx,
                dims,
                elem: elem_kind(&member.ty),
            }),
        }
    }
    Ok(steps)
}

/// Product of the extents when every dimension is constant; `None` as soon
/// as any extent is dynamic. Scalars yield 1.
fn const_extent_product(dims: &[DimExpr]) -> Option<u32> {
    dims.iter().try_fold(1u32, |acc, dim| match dim {
        DimExpr::Const(n) => acc.checked_mul(*n),
        DimExpr::Member(_) => None,
    })
}
