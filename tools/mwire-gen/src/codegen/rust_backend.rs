// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Reference emission backend: renders codec plans as Rust source.
//!
//! Generated types are plain structs over `Vec`-valued arrays; the codec
//! functions link only against the `mwire` runtime crate. Dots in
//! qualified names become underscores in type identifiers, so every struct
//! of a schema can live in one generated module.

use crate::codegen::program::{CodecPlan, DimExpr, ElemKind, EmitBackend, FieldStep, SizeStep};
use crate::schema::{Member, PrimitiveKind, Schema, StructDef, TypeRef};
use anyhow::{Context, Result};

pub struct RustBackend;

impl EmitBackend for RustBackend {
    fn emit_struct(&self, schema: &Schema, plan: &CodecPlan) -> Result<String> {
        let st = schema
            .get(&plan.fqname)
            .with_context(|| format!("plan for unknown struct `{}`", plan.fqname))?;
        let ident = rust_ident(&plan.fqname);
        let mut out = String::new();

        emit_struct_def(&mut out, &ident, st);
        emit(&mut out, 0, &format!("impl {} {{", ident));
        emit_fingerprint(&mut out);
        emit_compute_hash(&mut out, plan);
        emit_encoded_size(&mut out, st, plan);
        emit_encode(&mut out, st, plan);
        emit_decode(&mut out, st, plan);
        emit(&mut out, 0, "}");
        Ok(out)
    }
}

impl RustBackend {
    /// Render every struct of a schema into one module.
    pub fn emit_module(
        &self,
        schema: &Schema,
        plans: &std::collections::BTreeMap<String, CodecPlan>,
    ) -> Result<String> {
        let mut out = String::new();
        out.push_str("// THIS IS AN AUTOMATICALLY GENERATED FILE.  DO NOT MODIFY\n");
        out.push_str("// BY HAND!!\n//\n// Generated by mwire-gen\n\n");
        out.push_str("#![allow(non_camel_case_types)]\n\n");
        for st in schema.structs() {
            let plan = plans
                .get(&st.fqname)
                .with_context(|| format!("missing plan for `{}`", st.fqname))?;
            out.push_str(&self.emit_struct(schema, plan)?);
            out.push('\n');
        }
        Ok(out)
    }
}

fn emit(out: &mut String, indent: usize, line: &str) {
    if !line.is_empty() {
        for _ in 0..indent {
            out.push_str("    ");
        }
        out.push_str(line);
    }
    out.push('\n');
}

fn rust_ident(fqname: &str) -> String {
    fqname.replace('.', "_")
}

fn prim_rust_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Byte => "u8",
        PrimitiveKind::I8 => "i8",
        PrimitiveKind::I16 => "i16",
        PrimitiveKind::U16 => "u16",
        PrimitiveKind::I32 => "i32",
        PrimitiveKind::U32 => "u32",
        PrimitiveKind::I64 => "i64",
        PrimitiveKind::F32 => "f32",
        PrimitiveKind::F64 => "f64",
        PrimitiveKind::Str => "String",
    }
}

fn write_method(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "write_bool",
        PrimitiveKind::Byte => "write_u8",
        PrimitiveKind::I8 => "write_i8",
        PrimitiveKind::I16 => "write_i16_be",
        PrimitiveKind::U16 => "write_u16_be",
        PrimitiveKind::I32 => "write_i32_be",
        PrimitiveKind::U32 => "write_u32_be",
        PrimitiveKind::I64 => "write_i64_be",
        PrimitiveKind::F32 => "write_f32_be",
        PrimitiveKind::F64 => "write_f64_be",
        PrimitiveKind::Str => "write_str",
    }
}

fn read_method(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "read_bool",
        PrimitiveKind::Byte => "read_u8",
        PrimitiveKind::I8 => "read_i8",
        PrimitiveKind::I16 => "read_i16_be",
        PrimitiveKind::U16 => "read_u16_be",
        PrimitiveKind::I32 => "read_i32_be",
        PrimitiveKind::U32 => "read_u32_be",
        PrimitiveKind::I64 => "read_i64_be",
        PrimitiveKind::F32 => "read_f32_be",
        PrimitiveKind::F64 => "read_f64_be",
        PrimitiveKind::Str => "read_str",
    }
}

fn member_rust_type(member: &Member) -> String {
    let base = match &member.ty {
        TypeRef::Primitive(p) => prim_rust_type(*p).to_string(),
        TypeRef::Struct(name) => rust_ident(name),
    };
    member
        .dims
        .iter()
        .fold(base, |inner, _| format!("Vec<{}>", inner))
}

fn emit_struct_def(out: &mut String, ident: &str, st: &StructDef) {
    emit(out, 0, "#[derive(Debug, Clone, PartialEq)]");
    emit(out, 0, &format!("pub struct {} {{", ident));
    for member in &st.members {
        emit(
            out,
            1,
            &format!("pub {}: {},", member.name, member_rust_type(member)),
        );
    }
    emit(out, 0, "}");
    emit(out, 0, "");
}

fn emit_fingerprint(out: &mut String) {
    emit(out, 1, "/// Top-level structural fingerprint, cached for the");
    emit(out, 1, "/// process lifetime. Embedded in the wire preamble.");
    emit(out, 1, "pub fn fingerprint() -> u64 {");
    emit(
        out,
        2,
        "static FINGERPRINT: ::std::sync::OnceLock<u64> = ::std::sync::OnceLock::new();",
    );
    emit(out, 2, "*FINGERPRINT.get_or_init(|| Self::compute_hash(&[]))");
    emit(out, 1, "}");
    emit(out, 1, "");
}

fn emit_compute_hash(out: &mut String, plan: &CodecPlan) {
    emit(
        out,
        1,
        "pub fn compute_hash(ancestry: &[(usize, &'static str)]) -> u64 {",
    );
    if plan.hash.folds.is_empty() {
        emit(out, 2, "let _ = ancestry;");
        emit(
            out,
            2,
            &format!("let hash: u64 = {:#018x};", plan.hash.seed),
        );
    } else {
        emit(out, 2, "let mut path = ancestry.to_vec();");
        emit(
            out,
            2,
            &format!(
                "path.push(({}usize, {:?}));",
                plan.fqname.len(),
                plan.fqname
            ),
        );
        emit(
            out,
            2,
            &format!("let mut hash: u64 = {:#018x};", plan.hash.seed),
        );
        for fold in &plan.hash.folds {
            emit(
                out,
                2,
                &format!(
                    "if !path.iter().any(|&(len, name)| len == {}usize && name == {:?}) {{",
                    fold.len(),
                    fold
                ),
            );
            emit(
                out,
                3,
                &format!(
                    "hash = hash.wrapping_add({}::compute_hash(&path));",
                    rust_ident(fold)
                ),
            );
            emit(out, 2, "}");
        }
    }
    emit(out, 2, "hash.rotate_left(1)");
    emit(out, 1, "}");
    emit(out, 1, "");
}

/// Extent expression usable inside `&self` methods.
fn size_extent_expr(st: &StructDef, dim: &DimExpr) -> String {
    match dim {
        DimExpr::Const(n) => format!("{}u32", n),
        DimExpr::Member(idx) => format!("(self.{} as u32)", st.members[*idx].name),
    }
}

fn emit_encoded_size(out: &mut String, st: &StructDef, plan: &CodecPlan) {
    emit(out, 1, "pub fn encoded_size(&self) -> u32 {");
    emit(out, 2, "8 + self.encoded_size_nohash()");
    emit(out, 1, "}");
    emit(out, 1, "");
    emit(out, 1, "pub fn encoded_size_nohash(&self) -> u32 {");
    emit(out, 2, "let mut size: u32 = 0;");
    for step in &plan.size {
        match step {
            SizeStep::Const(bytes) => emit(out, 2, &format!("size += {};", bytes)),
            SizeStep::PerElement { member, dims, elem } => {
                let name = &st.members[*member].name;
                match elem {
                    ElemKind::Primitive(p) if p.wire_width().is_some() => {
                        // Fixed-width element under dynamic dimensions:
                        // width times the run-time extents.
                        let mut expr = format!("{}", p.wire_width().unwrap_or(0));
                        for dim in dims {
                            expr.push_str(&format!(" * {}", size_extent_expr(st, dim)));
                        }
                        emit(out, 2, &format!("size += {};", expr));
                    }
                    _ => {
                        let depth = dims.len();
                        let mut source = format!("&self.{}", name);
                        for d in 0..depth {
                            emit(out, 2 + d, &format!("for v{} in {} {{", d, source));
                            source = format!("v{}", d);
                        }
                        let leaf = if depth == 0 {
                            format!("self.{}", name)
                        } else {
                            format!("v{}", depth - 1)
                        };
                        let line = match elem {
                            ElemKind::Primitive(PrimitiveKind::Str) => {
                                format!("size += 4 + {}.len() as u32 + 1;", leaf)
                            }
                            ElemKind::Struct(_) => {
                                format!("size += {}.encoded_size_nohash();", leaf)
                            }
                            ElemKind::Primitive(p) => {
                                format!("size += {};", p.wire_width().unwrap_or(0))
                            }
                        };
                        emit(out, 2 + depth, &line);
                        for d in (0..depth).rev() {
                            emit(out, 2 + d, "}");
                        }
                    }
                }
            }
        }
    }
    emit(out, 2, "size");
    emit(out, 1, "}");
    emit(out, 1, "");
}

fn emit_encode(out: &mut String, st: &StructDef, plan: &CodecPlan) {
    emit(
        out,
        1,
        "pub fn encode(&self, cursor: &mut ::mwire::ser::CursorMut<'_>) -> ::mwire::ser::SerResult<()> {",
    );
    emit(out, 2, "cursor.write_u64_be(Self::fingerprint())?;");
    emit(out, 2, "Self::encode_nohash(::std::slice::from_ref(self), cursor)");
    emit(out, 1, "}");
    emit(out, 1, "");
    emit(
        out,
        1,
        "pub fn encode_nohash(items: &[Self], cursor: &mut ::mwire::ser::CursorMut<'_>) -> ::mwire::ser::SerResult<()> {",
    );
    emit(out, 2, "for item in items {");
    for step in &plan.encode {
        emit_encode_field(out, st, step);
    }
    emit(out, 2, "}");
    emit(out, 2, "Ok(())");
    emit(out, 1, "}");
    emit(out, 1, "");
}

fn emit_encode_field(out: &mut String, st: &StructDef, step: &FieldStep) {
    let name = &st.members[step.member].name;
    let depth = step.dims.len();
    // Container lengths are checked against their extents before anything
    // is written: the extent member goes on the wire as-is, so a container
    // that disagrees with it would produce a payload the decoder cannot
    // mirror.
    let extents: Vec<String> = step
        .dims
        .iter()
        .enumerate()
        .map(|(level, dim)| match dim {
            DimExpr::Const(n) => format!("{}usize", n),
            DimExpr::Member(idx) => {
                let len = format!("__len{}", level);
                emit(
                    out,
                    3,
                    &format!(
                        "let {} = usize::try_from(item.{}).map_err(|_| ::mwire::ser::SerError::InvalidData {{ reason: \"negative array extent\".into() }})?;",
                        len, st.members[*idx].name
                    ),
                );
                len
            }
        })
        .collect();
    let mut source = format!("&item.{}", name);
    for (d, extent) in extents.iter().enumerate() {
        let container = if d == 0 {
            format!("item.{}", name)
        } else {
            format!("v{}", d - 1)
        };
        emit(out, 3 + d, &format!("if {}.len() != {} {{", container, extent));
        emit(
            out,
            4 + d,
            &format!(
                "return Err(::mwire::ser::SerError::InvalidData {{ reason: \"array extent mismatch in `{}`\".into() }});",
                name
            ),
        );
        emit(out, 3 + d, "}");
        emit(out, 3 + d, &format!("for v{} in {} {{", d, source));
        source = format!("v{}", d);
    }
    let indent = 3 + depth;
    match &step.elem {
        ElemKind::Primitive(p) => {
            let value = match (depth, p) {
                (0, PrimitiveKind::Str) => format!("&item.{}", name),
                (0, _) => format!("item.{}", name),
                (_, PrimitiveKind::Str) => format!("v{}", depth - 1),
                (_, _) => format!("*v{}", depth - 1),
            };
            emit(
                out,
                indent,
                &format!("cursor.{}({})?;", write_method(*p), value),
            );
        }
        ElemKind::Struct(fold) => {
            let value = if depth == 0 {
                format!("&item.{}", name)
            } else {
                format!("v{}", depth - 1)
            };
            emit(
                out,
                indent,
                &format!(
                    "{}::encode_nohash(::std::slice::from_ref({}), cursor)?;",
                    rust_ident(fold),
                    value
                ),
            );
        }
    }
    for d in (0..depth).rev() {
        emit(out, 3 + d, "}");
    }
}

fn emit_decode(out: &mut String, st: &StructDef, plan: &CodecPlan) {
    emit(
        out,
        1,
        "pub fn decode(cursor: &mut ::mwire::ser::Cursor<'_>) -> ::mwire::ser::SerResult<Self> {",
    );
    emit(out, 2, "let expected = Self::fingerprint();");
    emit(out, 2, "let found = cursor.read_u64_be()?;");
    emit(out, 2, "if found != expected {");
    emit(
        out,
        3,
        "return Err(::mwire::ser::SerError::FingerprintMismatch { expected, found });",
    );
    emit(out, 2, "}");
    emit(out, 2, "Self::decode_nohash(cursor)");
    emit(out, 1, "}");
    emit(out, 1, "");
    emit(
        out,
        1,
        "pub fn decode_nohash(cursor: &mut ::mwire::ser::Cursor<'_>) -> ::mwire::ser::SerResult<Self> {",
    );
    for step in &plan.decode {
        emit_decode_field(out, st, step);
    }
    let field_list = st
        .members
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    emit(out, 2, &format!("Ok(Self {{ {} }})", field_list));
    emit(out, 1, "}");
}

/// Extent expression usable inside `decode_nohash`, where earlier members
/// are local bindings.
fn decode_extent_expr(out: &mut String, st: &StructDef, dim: &DimExpr, level: usize) -> String {
    match dim {
        DimExpr::Const(n) => format!("{}usize", n),
        DimExpr::Member(idx) => {
            let len = format!("__len{}", level);
            emit(
                out,
                2,
                &format!(
                    "let {} = usize::try_from({}).map_err(|_| ::mwire::ser::SerError::InvalidData {{ reason: \"negative array extent\".into() }})?;",
                    len, st.members[*idx].name
                ),
            );
            // Every element occupies at least one wire byte, so an extent
            // larger than the remaining buffer is malformed input, not a
            // short read.
            emit(out, 2, &format!("if {} > cursor.remaining() {{", len));
            emit(
                out,
                3,
                "return Err(::mwire::ser::SerError::InvalidData { reason: \"array extent exceeds remaining buffer\".into() });",
            );
            emit(out, 2, "}");
            len
        }
    }
}

fn emit_decode_field(out: &mut String, st: &StructDef, step: &FieldStep) {
    let name = &st.members[step.member].name;
    let read_leaf = |elem: &ElemKind| -> String {
        match elem {
            ElemKind::Primitive(p) => format!("cursor.{}()?", read_method(*p)),
            ElemKind::Struct(fold) => format!("{}::decode_nohash(cursor)?", rust_ident(fold)),
        }
    };
    if step.dims.is_empty() {
        emit(out, 2, &format!("let {} = {};", name, read_leaf(&step.elem)));
        return;
    }
    // Dynamic extents reference earlier members, all of which are already
    // decoded locals, so every extent binding can be emitted up front.
    let extents: Vec<String> = step
        .dims
        .iter()
        .enumerate()
        .map(|(level, dim)| decode_extent_expr(out, st, dim, level))
        .collect();
    emit(out, 2, &format!("let mut {} = Vec::new();", name));
    let depth = step.dims.len();
    for (level, extent) in extents.iter().enumerate() {
        emit(out, 2 + level, &format!("for _ in 0..{} {{", extent));
        if level + 1 < depth {
            emit(out, 3 + level, &format!("let mut __inner{} = Vec::new();", level + 1));
        }
    }
    emit(out, 2 + depth, &format!("{};", push_target(name, depth, &read_leaf(&step.elem))));
    for level in (0..depth).rev() {
        if level + 1 < depth {
            let target = if level == 0 {
                name.clone()
            } else {
                format!("__inner{}", level)
            };
            emit(out, 3 + level, &format!("{}.push(__inner{});", target, level + 1));
        }
        emit(out, 2 + level, "}");
    }
}

fn push_target(name: &str, depth: usize, leaf: &str) -> String {
    if depth == 1 {
        format!("{}.push({})", name, leaf)
    } else {
        format!("__inner{}.push({})", depth - 1, leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_ident_flattens_namespaces() {
        assert_eq!(rust_ident("geometry.point_t"), "geometry_point_t");
        assert_eq!(rust_ident("plain_t"), "plain_t");
    }

    #[test]
    fn test_member_rust_type_nests_vectors() {
        let member = Member::new(
            "m",
            TypeRef::Primitive(PrimitiveKind::F64),
            vec![
                crate::schema::Dimension::Const(2),
                crate::schema::Dimension::Const(3),
            ],
        );
        assert_eq!(member_rust_type(&member), "Vec<Vec<f64>>");
    }
}
