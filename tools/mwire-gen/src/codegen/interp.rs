// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Reference interpreter for codec plans.
//!
//! Executes the size/encode/decode procedures of a [`CodecPlan`] directly
//! against [`Value`] instances. This is the semantics an emission backend
//! must reproduce in its target language; the integration tests drive the
//! wire-contract properties (round-trip, size consistency, preamble
//! rejection) through it.

use crate::codegen::program::{CodecPlan, DimExpr, ElemKind, FieldStep, SizeStep};
use crate::schema::PrimitiveKind;
use mwire::dynamic::Value;
use mwire::ser::{Cursor, CursorMut, SerError, SerResult};
use std::collections::BTreeMap;

pub struct Interp<'a> {
    plans: &'a BTreeMap<String, CodecPlan>,
}

impl<'a> Interp<'a> {
    pub fn new(plans: &'a BTreeMap<String, CodecPlan>) -> Self {
        Self { plans }
    }

    fn plan(&self, fqname: &str) -> SerResult<&'a CodecPlan> {
        self.plans.get(fqname).ok_or_else(|| SerError::InvalidData {
            reason: format!("no codec plan for `{}`", fqname),
        })
    }

    /// Total encoded size, preamble included.
    pub fn encoded_size(&self, fqname: &str, value: &Value) -> SerResult<u32> {
        let body = self.size_nohash(self.plan(fqname)?, value)?;
        body.checked_add(8).ok_or_else(|| SerError::InvalidData {
            reason: "encoded size overflows u32".into(),
        })
    }

    /// Encode one instance (fingerprint preamble first) into `buf`,
    /// returning the number of bytes written.
    pub fn encode(&self, fqname: &str, value: &Value, buf: &mut [u8]) -> SerResult<usize> {
        let plan = self.plan(fqname)?;
        let mut cursor = CursorMut::new(buf);
        cursor.write_u64_be(plan.fingerprint)?;
        self.encode_nohash(plan, std::slice::from_ref(value), &mut cursor)?;
        Ok(cursor.offset())
    }

    /// Encode into a freshly sized buffer.
    pub fn to_bytes(&self, fqname: &str, value: &Value) -> SerResult<Vec<u8>> {
        let size = self.encoded_size(fqname, value)? as usize;
        let mut buf = vec![0u8; size];
        let written = self.encode(fqname, value, &mut buf)?;
        debug_assert_eq!(written, size);
        Ok(buf)
    }

    /// Decode one instance from `buf`, returning it with the number of
    /// bytes consumed. The fingerprint is checked before any member is
    /// read; on mismatch the rest of the buffer is untouched.
    pub fn decode(&self, fqname: &str, buf: &[u8]) -> SerResult<(Value, usize)> {
        let plan = self.plan(fqname)?;
        let mut cursor = Cursor::new(buf);
        let found = cursor.read_u64_be()?;
        if found != plan.fingerprint {
            return Err(SerError::FingerprintMismatch {
                expected: plan.fingerprint,
                found,
            });
        }
        let value = self.decode_nohash(plan, &mut cursor)?;
        Ok((value, cursor.offset()))
    }

    fn size_nohash(&self, plan: &CodecPlan, value: &Value) -> SerResult<u32> {
        let members = as_struct(value, &plan.fqname)?;
        if members.len() != plan.size.len() {
            return Err(member_count_mismatch(&plan.fqname, plan.size.len(), members.len()));
        }
        let mut size: u32 = 0;
        for step in &plan.size {
            let contribution = match step {
                SizeStep::Const(bytes) => *bytes,
                SizeStep::PerElement { member, dims, elem } => {
                    self.size_dims(dims, members, &members[*member], elem)?
                }
            };
            size = size.checked_add(contribution).ok_or_else(|| SerError::InvalidData {
                reason: "encoded size overflows u32".into(),
            })?;
        }
        Ok(size)
    }

    fn size_dims(
        &self,
        dims: &[DimExpr],
        siblings: &[Value],
        value: &Value,
        elem: &ElemKind,
    ) -> SerResult<u32> {
        let Some((dim, rest)) = dims.split_first() else {
            return self.size_elem(elem, value);
        };
        let extent = dim_len(dim, siblings)?;
        let items = as_array(value, extent)?;
        let mut size: u32 = 0;
        for item in items {
            let elem_size = self.size_dims(rest, siblings, item, elem)?;
            size = size.checked_add(elem_size).ok_or_else(|| SerError::InvalidData {
                reason: "encoded size overflows u32".into(),
            })?;
        }
        Ok(size)
    }

    fn size_elem(&self, elem: &ElemKind, value: &Value) -> SerResult<u32> {
        match (elem, value) {
            (ElemKind::Primitive(PrimitiveKind::Str), Value::Str(s)) => {
                u32::try_from(4 + s.len() + 1).map_err(|_| SerError::InvalidData {
                    reason: "string too long for wire format".into(),
                })
            }
            (ElemKind::Primitive(p), v) => match p.wire_width() {
                Some(w) => {
                    check_primitive(*p, v)?;
                    Ok(w)
                }
                None => Err(type_mismatch(p.idl_name(), v)),
            },
            (ElemKind::Struct(name), v) => self.size_nohash(self.plan(name)?, v),
        }
    }

    /// No-preamble encoder for N repeated instances.
    fn encode_nohash(
        &self,
        plan: &CodecPlan,
        items: &[Value],
        cursor: &mut CursorMut<'_>,
    ) -> SerResult<()> {
        for item in items {
            let members = as_struct(item, &plan.fqname)?;
            if members.len() != plan.encode.len() {
                return Err(member_count_mismatch(
                    &plan.fqname,
                    plan.encode.len(),
                    members.len(),
                ));
            }
            for step in &plan.encode {
                self.encode_field(step, members, cursor)?;
            }
        }
        Ok(())
    }

    fn encode_field(
        &self,
        step: &FieldStep,
        siblings: &[Value],
        cursor: &mut CursorMut<'_>,
    ) -> SerResult<()> {
        self.encode_dims(&step.dims, siblings, &siblings[step.member], &step.elem, cursor)
    }

    fn encode_dims(
        &self,
        dims: &[DimExpr],
        siblings: &[Value],
        value: &Value,
        elem: &ElemKind,
        cursor: &mut CursorMut<'_>,
    ) -> SerResult<()> {
        let Some((dim, rest)) = dims.split_first() else {
            return self.encode_elem(elem, value, cursor);
        };
        let extent = dim_len(dim, siblings)?;
        let items = as_array(value, extent)?;
        for item in items {
            self.encode_dims(rest, siblings, item, elem, cursor)?;
        }
        Ok(())
    }

    fn encode_elem(
        &self,
        elem: &ElemKind,
        value: &Value,
        cursor: &mut CursorMut<'_>,
    ) -> SerResult<()> {
        match (elem, value) {
            (ElemKind::Primitive(PrimitiveKind::Bool), Value::Bool(v)) => cursor.write_bool(*v),
            (ElemKind::Primitive(PrimitiveKind::Byte), Value::Byte(v)) => cursor.write_u8(*v),
            (ElemKind::Primitive(PrimitiveKind::I8), Value::I8(v)) => cursor.write_i8(*v),
            (ElemKind::Primitive(PrimitiveKind::I16), Value::I16(v)) => cursor.write_i16_be(*v),
            (ElemKind::Primitive(PrimitiveKind::U16), Value::U16(v)) => cursor.write_u16_be(*v),
            (ElemKind::Primitive(PrimitiveKind::I32), Value::I32(v)) => cursor.write_i32_be(*v),
            (ElemKind::Primitive(PrimitiveKind::U32), Value::U32(v)) => cursor.write_u32_be(*v),
            (ElemKind::Primitive(PrimitiveKind::I64), Value::I64(v)) => cursor.write_i64_be(*v),
            (ElemKind::Primitive(PrimitiveKind::F32), Value::F32(v)) => cursor.write_f32_be(*v),
            (ElemKind::Primitive(PrimitiveKind::F64), Value::F64(v)) => cursor.write_f64_be(*v),
            (ElemKind::Primitive(PrimitiveKind::Str), Value::Str(v)) => cursor.write_str(v),
            (ElemKind::Struct(name), v) => {
                self.encode_nohash(self.plan(name)?, std::slice::from_ref(v), cursor)
            }
            (ElemKind::Primitive(p), v) => Err(type_mismatch(p.idl_name(), v)),
        }
    }

    /// No-preamble decoder for one instance, mirroring the encoder's
    /// traversal exactly. Dynamic extents come from already-decoded
    /// sibling members.
    fn decode_nohash(&self, plan: &CodecPlan, cursor: &mut Cursor<'_>) -> SerResult<Value> {
        let mut members: Vec<Value> = Vec::with_capacity(plan.decode.len());
        for step in &plan.decode {
            let value = self.decode_dims(&step.dims, &members, &step.elem, cursor)?;
            members.push(value);
        }
        Ok(Value::Struct(members))
    }

    fn decode_dims(
        &self,
        dims: &[DimExpr],
        siblings: &[Value],
        elem: &ElemKind,
        cursor: &mut Cursor<'_>,
    ) -> SerResult<Value> {
        let Some((dim, rest)) = dims.split_first() else {
            return self.decode_elem(elem, cursor);
        };
        let extent = dim_len(dim, siblings)?;
        // Every element occupies at least one byte on the wire, so a
        // dynamic extent larger than the remaining buffer is malformed
        // input, not a plausible payload.
        if matches!(dim, DimExpr::Member(_)) && extent > cursor.remaining() as u64 {
            return Err(SerError::InvalidData {
                reason: format!(
                    "dynamic extent {} exceeds {} remaining bytes",
                    extent,
                    cursor.remaining()
                ),
            });
        }
        let mut items = Vec::with_capacity(extent as usize);
        for _ in 0..extent {
            items.push(self.decode_dims(rest, siblings, elem, cursor)?);
        }
        Ok(Value::Array(items))
    }

    fn decode_elem(&self, elem: &ElemKind, cursor: &mut Cursor<'_>) -> SerResult<Value> {
        match elem {
            ElemKind::Primitive(PrimitiveKind::Bool) => cursor.read_bool().map(Value::Bool),
            ElemKind::Primitive(PrimitiveKind::Byte) => cursor.read_u8().map(Value::Byte),
            ElemKind::Primitive(PrimitiveKind::I8) => cursor.read_i8().map(Value::I8),
            ElemKind::Primitive(PrimitiveKind::I16) => cursor.read_i16_be().map(Value::I16),
            ElemKind::Primitive(PrimitiveKind::U16) => cursor.read_u16_be().map(Value::U16),
            ElemKind::Primitive(PrimitiveKind::I32) => cursor.read_i32_be().map(Value::I32),
            ElemKind::Primitive(PrimitiveKind::U32) => cursor.read_u32_be().map(Value::U32),
            ElemKind::Primitive(PrimitiveKind::I64) => cursor.read_i64_be().map(Value::I64),
            ElemKind::Primitive(PrimitiveKind::F32) => cursor.read_f32_be().map(Value::F32),
            ElemKind::Primitive(PrimitiveKind::F64) => cursor.read_f64_be().map(Value::F64),
            ElemKind::Primitive(PrimitiveKind::Str) => cursor.read_str().map(Value::Str),
            ElemKind::Struct(name) => self.decode_nohash(self.plan(name)?, cursor),
        }
    }
}

fn as_struct<'v>(value: &'v Value, fqname: &str) -> SerResult<&'v [Value]> {
    match value {
        Value::Struct(members) => Ok(members),
        other => Err(SerError::InvalidData {
            reason: format!(
                "expected struct value for `{}`, found {}",
                fqname,
                other.kind_name()
            ),
        }),
    }
}

fn as_array(value: &Value, extent: u64) -> SerResult<&[Value]> {
    match value {
        Value::Array(items) if items.len() as u64 == extent => Ok(items),
        Value::Array(items) => Err(SerError::InvalidData {
            reason: format!(
                "array has {} elements but extent is {}",
                items.len(),
                extent
            ),
        }),
        other => Err(SerError::InvalidData {
            reason: format!("expected array value, found {}", other.kind_name()),
        }),
    }
}

fn member_count_mismatch(fqname: &str, expected: usize, found: usize) -> SerError {
    SerError::InvalidData {
        reason: format!(
            "`{}` has {} members, value carries {}",
            fqname, expected, found
        ),
    }
}

fn dim_len(dim: &DimExpr, siblings: &[Value]) -> SerResult<u64> {
    match dim {
        DimExpr::Const(n) => Ok(u64::from(*n)),
        DimExpr::Member(idx) => siblings[*idx].as_len().ok_or_else(|| SerError::InvalidData {
            reason: "dynamic extent is negative or not an integer".into(),
        }),
    }
}

fn check_primitive(kind: PrimitiveKind, value: &Value) -> SerResult<()> {
    let matches = matches!(
        (kind, value),
        (PrimitiveKind::Bool, Value::Bool(_))
            | (PrimitiveKind::Byte, Value::Byte(_))
            | (PrimitiveKind::I8, Value::I8(_))
            | (PrimitiveKind::I16, Value::I16(_))
            | (PrimitiveKind::U16, Value::U16(_))
            | (PrimitiveKind::I32, Value::I32(_))
            | (PrimitiveKind::U32, Value::U32(_))
            | (PrimitiveKind::I64, Value::I64(_))
            | (PrimitiveKind::F32, Value::F32(_))
            | (PrimitiveKind::F64, Value::F64(_))
            | (PrimitiveKind::Str, Value::Str(_))
    );
    if matches {
        Ok(())
    } else {
        Err(type_mismatch(kind.idl_name(), value))
    }
}

fn type_mismatch(expected: &str, found: &Value) -> SerError {
    SerError::InvalidData {
        reason: format!("type mismatch: expected {}, found {}", expected, found.kind_name()),
    }
}
