// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Schema model: the read-only input to the generation core.
//!
//! A [`Schema`] is produced by the external IDL parser/resolver and is
//! immutable for the duration of generation. Member declaration order is
//! wire order; dynamic array extents reference earlier scalar integer
//! members of the same struct (validated upstream, re-checked cheaply when
//! plans resolve dimensions).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed-width wire kinds plus the variable-width `Str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    Byte,
    I8,
    I16,
    U16,
    I32,
    U32,
    I64,
    F32,
    F64,
    Str,
}

impl PrimitiveKind {
    /// Encoded byte width, or `None` for kinds without a fixed width.
    pub fn wire_width(self) -> Option<u32> {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::Byte | PrimitiveKind::I8 => Some(1),
            PrimitiveKind::I16 | PrimitiveKind::U16 => Some(2),
            PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::F32 => Some(4),
            PrimitiveKind::I64 | PrimitiveKind::F64 => Some(8),
            PrimitiveKind::Str => None,
        }
    }

    /// Canonical IDL spelling, folded into base hash seeds. Changing a
    /// spelling changes every fingerprint that uses the kind.
    pub fn idl_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::I8 => "int8_t",
            PrimitiveKind::I16 => "int16_t",
            PrimitiveKind::U16 => "uint16_t",
            PrimitiveKind::I32 => "int32_t",
            PrimitiveKind::U32 => "uint32_t",
            PrimitiveKind::I64 => "int64_t",
            PrimitiveKind::F32 => "float",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::Str => "string",
        }
    }

    /// Kinds allowed to supply a dynamic array extent.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::U16
                | PrimitiveKind::I32
                | PrimitiveKind::U32
                | PrimitiveKind::I64
        )
    }
}

/// Member type: a primitive or a reference to a named struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Fully-qualified struct name. References form the dependency graph
    /// and may be cyclic.
    Struct(String),
}

/// One array dimension, outer-to-inner in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Const(u32),
    /// Names an earlier scalar integer member of the same struct that
    /// supplies the run-time extent.
    Dynamic(String),
}

impl Dimension {
    /// Textual extent folded into base hash seeds.
    fn seed_text(&self) -> String {
        match self {
            Dimension::Const(n) => n.to_string(),
            Dimension::Dynamic(name) => name.clone(),
        }
    }
}

/// A named, typed, possibly array-valued struct member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub dims: Vec<Dimension>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeRef, dims: Vec<Dimension>) -> Self {
        Self {
            name: name.into(),
            ty,
            dims,
        }
    }

    pub fn scalar(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::new(name, ty, Vec::new())
    }
}

/// Seed constant and fold step for base hash derivation. The derivation is
/// a protocol constant: every compatible generator must produce identical
/// seeds for identical definitions.
const HASH_SEED: u64 = 0x12345678;

fn hash_byte(h: u64, b: u8) -> u64 {
    ((h << 8) ^ (h >> 55)).wrapping_add(u64::from(b))
}

fn hash_str(h: u64, s: &str) -> u64 {
    s.bytes().fold(hash_byte(h, s.len() as u8), hash_byte)
}

/// A named struct: ordered members plus the precomputed base hash seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub fqname: String,
    pub members: Vec<Member>,
    base_hash: u64,
}

impl StructDef {
    /// Build a struct definition, deriving the base hash seed from the
    /// member signatures. Struct-typed member type names are deliberately
    /// not folded in; referenced types enter the fingerprint through
    /// recursive hashing instead.
    pub fn new(fqname: impl Into<String>, members: Vec<Member>) -> Self {
        let fqname = fqname.into();
        let mut h = HASH_SEED;
        for member in &members {
            h = hash_str(h, &member.name);
            if let TypeRef::Primitive(p) = member.ty {
                h = hash_str(h, p.idl_name());
            }
            h = hash_byte(h, member.dims.len() as u8);
            for dim in &member.dims {
                let mode = match dim {
                    Dimension::Const(_) => 0,
                    Dimension::Dynamic(_) => 1,
                };
                h = hash_byte(h, mode);
                h = hash_str(h, &dim.seed_text());
            }
        }
        Self {
            fqname,
            members,
            base_hash: h,
        }
    }

    /// The sealed 64-bit seed the hash engine starts from.
    pub fn base_hash(&self) -> u64 {
        self.base_hash
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }
}

/// Ordered set of struct definitions with by-name lookup.
#[derive(Debug, Clone)]
pub struct Schema {
    structs: Vec<StructDef>,
    index: BTreeMap<String, usize>,
}

impl Schema {
    pub fn new(structs: Vec<StructDef>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (i, st) in structs.iter().enumerate() {
            if index.insert(st.fqname.clone(), i).is_some() {
                bail!("duplicate struct definition `{}`", st.fqname);
            }
        }
        Ok(Self { structs, index })
    }

    pub fn get(&self, fqname: &str) -> Option<&StructDef> {
        self.index.get(fqname).map(|&i| &self.structs[i])
    }

    pub fn structs(&self) -> &[StructDef] {
        &self.structs
    }

    /// Load a parsed schema handed off by the external front end.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(text).context("failed to parse schema JSON")?;
        let structs = raw
            .structs
            .into_iter()
            .map(|s| StructDef::new(s.name, s.members))
            .collect::<Vec<_>>();
        let schema = Self::new(structs)?;
        tracing::info!(structs = schema.structs.len(), "loaded schema");
        Ok(schema)
    }
}

/// Interchange form: base hash seeds are derived, not transported.
#[derive(Debug, Deserialize)]
struct RawSchema {
    structs: Vec<RawStruct>,
}

#[derive(Debug, Deserialize)]
struct RawStruct {
    name: String,
    members: Vec<Member>,
}
