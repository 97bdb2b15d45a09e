// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Generated-procedure descriptions.
//!
//! A [`CodecPlan`] is the abstract output of the generation core for one
//! struct: the fingerprint, the hash procedure description, and the three
//! codec procedures as operation sequences. Emission backends render plans
//! into concrete syntax; they must not reorder operations, since member
//! traversal order *is* the wire contract.
//!
//! Every procedure is two-layered: a with-preamble entry point (8-byte
//! fingerprint first) and a no-preamble helper reused recursively for
//! compound members. Only the no-preamble layer ever recurses.

use crate::codegen::{decode, encode, size, type_hash};
use crate::schema::{Dimension, PrimitiveKind, Schema, StructDef, TypeRef};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;

/// One resolved array extent, outer-to-inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimExpr {
    Const(u32),
    /// Index of the earlier sibling member supplying the run-time extent.
    Member(usize),
}

/// Element classification after dimensions are peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElemKind {
    Primitive(PrimitiveKind),
    Struct(String),
}

/// One member's traversal in an encode or decode procedure: loop over the
/// dimension combinations outer-to-inner, then handle one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStep {
    pub member: usize,
    pub dims: Vec<DimExpr>,
    pub elem: ElemKind,
}

/// One member's contribution to the size procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeStep {
    /// Closed-form constant: fixed-width primitive with all-constant
    /// dimensions, folded at generation time.
    Const(u32),
    /// Run-time contribution summed per element.
    PerElement {
        member: usize,
        dims: Vec<DimExpr>,
        elem: ElemKind,
    },
}

/// Hash procedure description: the sealed seed plus the struct-typed member
/// references folded in declaration order. Backends that emit per-type
/// `compute_hash` functions (cycle suppression included) render this;
/// backends that can see the whole schema may fold the fingerprint constant
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashProc {
    pub seed: u64,
    pub folds: Vec<String>,
}

/// All generated procedures for one struct.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecPlan {
    pub fqname: String,
    /// Top-level fingerprint, embedded in the wire preamble. Computed once
    /// at planning time; generated code caches it for the process lifetime.
    pub fingerprint: u64,
    pub hash: HashProc,
    pub size: Vec<SizeStep>,
    pub encode: Vec<FieldStep>,
    pub decode: Vec<FieldStep>,
}

/// Emission adapter: renders plans into one target language's syntax.
/// Implementations own naming and file layout but must preserve operation
/// order exactly.
pub trait EmitBackend {
    fn emit_struct(&self, schema: &Schema, plan: &CodecPlan) -> Result<String>;
}

/// Resolve a member's dimensions to extents. Dynamic extents must name an
/// earlier scalar integer member; the front end validates this, but the
/// lookup re-checks so a corrupted schema surfaces as an error instead of a
/// bad plan.
pub(crate) fn resolve_dims(st: &StructDef, member: usize) -> Result<Vec<DimExpr>> {
    let m = &st.members[member];
    let mut dims = Vec::with_capacity(m.dims.len());
    for dim in &m.dims {
        match dim {
            Dimension::Const(n) => dims.push(DimExpr::Const(*n)),
            Dimension::Dynamic(name) => {
                let idx = st.member_index(name).with_context(|| {
                    format!(
                        "dynamic extent `{}` of `{}.{}` names no member",
                        name, st.fqname, m.name
                    )
                })?;
                if idx >= member {
                    bail!(
                        "dynamic extent `{}` of `{}.{}` must be declared earlier",
                        name,
                        st.fqname,
                        m.name
                    );
                }
                let supplier = &st.members[idx];
                let scalar_integer = supplier.dims.is_empty()
                    && matches!(supplier.ty, TypeRef::Primitive(p) if p.is_integer());
                if !scalar_integer {
                    bail!(
                        "dynamic extent `{}` of `{}.{}` is not a scalar integer member",
                        name,
                        st.fqname,
                        m.name
                    );
                }
                dims.push(DimExpr::Member(idx));
            }
        }
    }
    Ok(dims)
}

pub(crate) fn elem_kind(ty: &TypeRef) -> ElemKind {
    match ty {
        TypeRef::Primitive(p) => ElemKind::Primitive(*p),
        TypeRef::Struct(name) => ElemKind::Struct(name.clone()),
    }
}

/// Generate all procedures for one struct.
pub fn plan_struct(schema: &Schema, st: &StructDef) -> Result<CodecPlan> {
    let fingerprint = type_hash::fingerprint(schema, st)?;
    let hash = HashProc {
        seed: st.base_hash(),
        folds: st
            .members
            .iter()
            .filter_map(|m| match &m.ty {
                TypeRef::Struct(name) => Some(name.clone()),
                TypeRef::Primitive(_) => None,
            })
            .collect(),
    };
    let plan = CodecPlan {
        fqname: st.fqname.clone(),
        fingerprint,
        hash,
        size: size::size_steps(st)?,
        encode: encode::encode_steps(st)?,
        decode: decode::decode_steps(st)?,
    };
    tracing::debug!(
        fqname = %plan.fqname,
        fingerprint = format_args!("{:#018x}", plan.fingerprint),
        "planned codec"
    );
    Ok(plan)
}

/// Generate plans for every struct in the schema, keyed by qualified name.
pub fn plan_schema(schema: &Schema) -> Result<BTreeMap<String, CodecPlan>> {
    let mut plans = BTreeMap::new();
    for st in schema.structs() {
        let plan = plan_struct(schema, st)
            .with_context(|| format!("failed to plan codec for `{}`", st.fqname))?;
        plans.insert(st.fqname.clone(), plan);
    }
    Ok(plans)
}
