// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

pub mod decode;
pub mod encode;
pub mod interp;
pub mod program;
pub mod rust_backend;
pub mod size;
pub mod type_hash;

pub use interp::Interp;
pub use program::{
    plan_schema, plan_struct, CodecPlan, DimExpr, ElemKind, EmitBackend, FieldStep, HashProc,
    SizeStep,
};
pub use rust_backend::RustBackend;
pub use type_hash::{compute_hash, fingerprint};
