// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Dynamic instance model.
//!
//! `Value` is a schema-agnostic representation of one message instance,
//! used by the generator's reference interpreter and by tooling that needs
//! to build or inspect instances without generated types. Struct members
//! are stored in declaration order; N-dimensional arrays nest one `Array`
//! level per dimension, outermost first.

/// One dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    I8(i8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Members in declaration order.
    Struct(Vec<Value>),
    /// One array dimension level.
    Array(Vec<Value>),
}

impl Value {
    /// Interpret an integer value as an array extent. Returns `None` for
    /// non-integer kinds and for negative values.
    pub fn as_len(&self) -> Option<u64> {
        match *self {
            Value::Byte(v) => Some(u64::from(v)),
            Value::I8(v) => u64::try_from(v).ok(),
            Value::I16(v) => u64::try_from(v).ok(),
            Value::U16(v) => Some(u64::from(v)),
            Value::I32(v) => u64::try_from(v).ok(),
            Value::U32(v) => Some(u64::from(v)),
            Value::I64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
        }
    }
}
