// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Wire-contract properties exercised through the reference interpreter:
//! round-trip, size consistency, preamble rejection, malformed input.

use mwire::dynamic::Value;
use mwire::ser::SerError;
use mwire_gen::codegen::{plan_schema, CodecPlan, Interp};
use mwire_gen::schema::{Dimension, Member, PrimitiveKind, Schema, StructDef, TypeRef};
use std::collections::BTreeMap;

fn point_schema() -> Schema {
    Schema::new(vec![StructDef::new(
        "geometry.point_t",
        vec![
            Member::scalar("x", TypeRef::Primitive(PrimitiveKind::I32)),
            Member::scalar("y", TypeRef::Primitive(PrimitiveKind::I32)),
        ],
    )])
    .expect("valid schema")
}

fn vector_schema() -> Schema {
    Schema::new(vec![StructDef::new(
        "sensor.vector_t",
        vec![
            Member::scalar("n", TypeRef::Primitive(PrimitiveKind::I32)),
            Member::new(
                "values",
                TypeRef::Primitive(PrimitiveKind::I32),
                vec![Dimension::Dynamic("n".into())],
            ),
        ],
    )])
    .expect("valid schema")
}

fn plans_of(schema: &Schema) -> BTreeMap<String, CodecPlan> {
    plan_schema(schema).expect("schema plans")
}

#[test]
fn test_point_scenario_sizes_and_round_trip() {
    let schema = point_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![Value::I32(1), Value::I32(2)]);
    assert_eq!(
        interp.encoded_size("geometry.point_t", &value).expect("sizes"),
        16
    );

    let mut buf = [0u8; 64];
    let written = interp
        .encode("geometry.point_t", &value, &mut buf)
        .expect("encodes");
    assert_eq!(written, 16);

    // Preamble is the big-endian fingerprint, payload is packed big-endian.
    let fp = plans["geometry.point_t"].fingerprint;
    assert_eq!(buf[0..8], fp.to_be_bytes());
    assert_eq!(buf[8..16], [0, 0, 0, 1, 0, 0, 0, 2]);

    let (decoded, consumed) = interp
        .decode("geometry.point_t", &buf[..written])
        .expect("decodes");
    assert_eq!(consumed, 16);
    assert_eq!(decoded, value);
}

#[test]
fn test_dynamic_array_wire_layout_and_round_trip() {
    let schema = vector_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![
        Value::I32(3),
        Value::Array(vec![Value::I32(10), Value::I32(20), Value::I32(30)]),
    ]);
    let bytes = interp.to_bytes("sensor.vector_t", &value).expect("encodes");
    assert_eq!(bytes.len(), 8 + 4 + 12);
    // Length member first, then exactly three four-byte elements in order.
    assert_eq!(bytes[8..12], [0, 0, 0, 3]);
    assert_eq!(bytes[12..16], [0, 0, 0, 10]);
    assert_eq!(bytes[16..20], [0, 0, 0, 20]);
    assert_eq!(bytes[20..24], [0, 0, 0, 30]);

    let (decoded, consumed) = interp.decode("sensor.vector_t", &bytes).expect("decodes");
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, value);
}

#[test]
fn test_zero_length_dynamic_array_round_trips() {
    let schema = vector_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![Value::I32(0), Value::Array(vec![])]);
    let bytes = interp.to_bytes("sensor.vector_t", &value).expect("encodes");
    assert_eq!(bytes.len(), 12);

    let (decoded, _) = interp.decode("sensor.vector_t", &bytes).expect("decodes");
    assert_eq!(decoded, value);
}

#[test]
fn test_nested_compound_arrays_round_trip() {
    let schema = Schema::new(vec![
        StructDef::new(
            "geometry.point_t",
            vec![
                Member::scalar("x", TypeRef::Primitive(PrimitiveKind::I32)),
                Member::scalar("y", TypeRef::Primitive(PrimitiveKind::I32)),
            ],
        ),
        StructDef::new(
            "geometry.polyline_t",
            vec![
                Member::scalar("name", TypeRef::Primitive(PrimitiveKind::Str)),
                Member::scalar("n", TypeRef::Primitive(PrimitiveKind::I32)),
                Member::new(
                    "points",
                    TypeRef::Struct("geometry.point_t".into()),
                    vec![Dimension::Dynamic("n".into())],
                ),
                Member::new(
                    "corners",
                    TypeRef::Struct("geometry.point_t".into()),
                    vec![Dimension::Const(2)],
                ),
            ],
        ),
    ])
    .expect("valid schema");
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let pt = |x, y| Value::Struct(vec![Value::I32(x), Value::I32(y)]);
    let value = Value::Struct(vec![
        Value::Str("track".into()),
        Value::I32(2),
        Value::Array(vec![pt(1, 2), pt(3, 4)]),
        Value::Array(vec![pt(-1, -1), pt(5, 5)]),
    ]);

    let bytes = interp
        .to_bytes("geometry.polyline_t", &value)
        .expect("encodes");
    let expected_size = 8 + (4 + 5 + 1) + 4 + 2 * 8 + 2 * 8;
    assert_eq!(bytes.len(), expected_size);

    let (decoded, consumed) = interp
        .decode("geometry.polyline_t", &bytes)
        .expect("decodes");
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, value);
}

#[test]
fn test_constant_matrix_round_trips_outer_to_inner() {
    let schema = Schema::new(vec![StructDef::new(
        "mat2x3_t",
        vec![Member::new(
            "m",
            TypeRef::Primitive(PrimitiveKind::I16),
            vec![Dimension::Const(2), Dimension::Const(3)],
        )],
    )])
    .expect("valid schema");
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let row = |a: i16, b: i16, c: i16| {
        Value::Array(vec![Value::I16(a), Value::I16(b), Value::I16(c)])
    };
    let value = Value::Struct(vec![Value::Array(vec![row(1, 2, 3), row(4, 5, 6)])]);
    let bytes = interp.to_bytes("mat2x3_t", &value).expect("encodes");
    assert_eq!(bytes.len(), 8 + 12);
    // Row-major: first declared dimension is outermost.
    assert_eq!(
        bytes[8..20],
        [0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6]
    );

    let (decoded, _) = interp.decode("mat2x3_t", &bytes).expect("decodes");
    assert_eq!(decoded, value);
}

#[test]
fn test_preamble_rejection_leaves_body_unread() {
    let schema = point_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![Value::I32(7), Value::I32(9)]);
    let mut bytes = interp.to_bytes("geometry.point_t", &value).expect("encodes");
    bytes[0] ^= 0xFF;

    let err = interp.decode("geometry.point_t", &bytes).unwrap_err();
    assert!(matches!(err, SerError::FingerprintMismatch { .. }));
}

#[test]
fn test_decode_short_buffer_is_read_failure() {
    let schema = point_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![Value::I32(7), Value::I32(9)]);
    let bytes = interp.to_bytes("geometry.point_t", &value).expect("encodes");

    // Preamble intact but payload truncated.
    let err = interp
        .decode("geometry.point_t", &bytes[..bytes.len() - 2])
        .unwrap_err();
    assert!(matches!(err, SerError::ReadFailed { .. }));

    // Buffer shorter than the preamble itself.
    let err = interp.decode("geometry.point_t", &bytes[..5]).unwrap_err();
    assert!(matches!(err, SerError::ReadFailed { .. }));
}

#[test]
fn test_encode_past_limit_is_write_failure() {
    let schema = point_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![Value::I32(7), Value::I32(9)]);
    let mut buf = [0u8; 10];
    let err = interp
        .encode("geometry.point_t", &value, &mut buf)
        .unwrap_err();
    assert!(matches!(err, SerError::WriteFailed { .. }));
}

#[test]
fn test_negative_dynamic_extent_is_rejected() {
    let schema = vector_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&plans["sensor.vector_t"].fingerprint.to_be_bytes());
    bytes.extend_from_slice(&(-1i32).to_be_bytes());

    let err = interp.decode("sensor.vector_t", &bytes).unwrap_err();
    assert!(matches!(err, SerError::InvalidData { .. }));
}

#[test]
fn test_oversized_dynamic_extent_is_rejected() {
    let schema = vector_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    // Claims ~2^31 elements with four bytes of payload behind it.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&plans["sensor.vector_t"].fingerprint.to_be_bytes());
    bytes.extend_from_slice(&i32::MAX.to_be_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 1]);

    let err = interp.decode("sensor.vector_t", &bytes).unwrap_err();
    assert!(matches!(err, SerError::InvalidData { .. }));
}

#[test]
fn test_encode_rejects_extent_mismatch() {
    let schema = vector_schema();
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    // `n` claims 2 elements, the array holds 3.
    let value = Value::Struct(vec![
        Value::I32(2),
        Value::Array(vec![Value::I32(1), Value::I32(2), Value::I32(3)]),
    ]);
    let mut buf = [0u8; 64];
    let err = interp
        .encode("sensor.vector_t", &value, &mut buf)
        .unwrap_err();
    assert!(matches!(err, SerError::InvalidData { .. }));
}

#[test]
fn test_string_members_round_trip() {
    let schema = Schema::new(vec![StructDef::new(
        "log.entry_t",
        vec![
            Member::scalar("level", TypeRef::Primitive(PrimitiveKind::Byte)),
            Member::scalar("message", TypeRef::Primitive(PrimitiveKind::Str)),
            Member::scalar("source", TypeRef::Primitive(PrimitiveKind::Str)),
        ],
    )])
    .expect("valid schema");
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    let value = Value::Struct(vec![
        Value::Byte(3),
        Value::Str("sensor offline".into()),
        Value::Str("".into()),
    ]);
    let bytes = interp.to_bytes("log.entry_t", &value).expect("encodes");
    assert_eq!(bytes.len() as u32, 8 + 1 + (4 + 14 + 1) + (4 + 0 + 1));

    let (decoded, _) = interp.decode("log.entry_t", &bytes).expect("decodes");
    assert_eq!(decoded, value);
}

/// Randomized size-consistency and round-trip sweep over a mixed schema.
#[test]
fn test_randomized_round_trip_and_size_consistency() {
    let schema = Schema::new(vec![
        StructDef::new(
            "geometry.point_t",
            vec![
                Member::scalar("x", TypeRef::Primitive(PrimitiveKind::I32)),
                Member::scalar("y", TypeRef::Primitive(PrimitiveKind::I32)),
            ],
        ),
        StructDef::new(
            "sensor.sample_t",
            vec![
                Member::scalar("t", TypeRef::Primitive(PrimitiveKind::I64)),
                Member::scalar("id", TypeRef::Primitive(PrimitiveKind::Byte)),
                Member::scalar("ok", TypeRef::Primitive(PrimitiveKind::Bool)),
                Member::scalar("n", TypeRef::Primitive(PrimitiveKind::I32)),
                Member::new(
                    "values",
                    TypeRef::Primitive(PrimitiveKind::F64),
                    vec![Dimension::Dynamic("n".into())],
                ),
                Member::new(
                    "corners",
                    TypeRef::Struct("geometry.point_t".into()),
                    vec![Dimension::Const(2)],
                ),
                Member::scalar("label", TypeRef::Primitive(PrimitiveKind::Str)),
            ],
        ),
    ])
    .expect("valid schema");
    let plans = plans_of(&schema);
    let interp = Interp::new(&plans);

    fastrand::seed(0x5EED);
    for _ in 0..64 {
        let n = fastrand::i32(0..5);
        let values = Value::Array(
            (0..n)
                .map(|_| Value::F64(f64::from(fastrand::i32(-1000..1000)) / 8.0))
                .collect(),
        );
        let corner = || {
            Value::Struct(vec![
                Value::I32(fastrand::i32(..)),
                Value::I32(fastrand::i32(..)),
            ])
        };
        let label_len = fastrand::usize(0..12);
        let label: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(label_len)
            .collect();
        let value = Value::Struct(vec![
            Value::I64(fastrand::i64(..)),
            Value::Byte(fastrand::u8(..)),
            Value::Bool(fastrand::bool()),
            Value::I32(n),
            values,
            Value::Array(vec![corner(), corner()]),
            Value::Str(label),
        ]);

        let size = interp.encoded_size("sensor.sample_t", &value).expect("sizes");
        let bytes = interp.to_bytes("sensor.sample_t", &value).expect("encodes");
        assert_eq!(bytes.len() as u32, size);

        let (decoded, consumed) = interp.decode("sensor.sample_t", &bytes).expect("decodes");
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, value);
    }
}
