// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 mwire.dev

//! Read/write cursors for wire-format buffer manipulation.
//!
//! The wire format is packed big-endian with no alignment padding. Both
//! cursors advance monotonically and never seek backward.

use super::{SerError, SerResult};

/// Generate write methods for primitive types.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `SerError::WriteFailed` on overflow)
/// 2. Converts the value to big-endian bytes via `to_be_bytes()`
/// 3. Copies bytes to the buffer
/// 4. Advances the offset
macro_rules! impl_write_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) -> SerResult<()> {
            if self.offset + $size > self.buffer.len() {
                return Err(SerError::WriteFailed {
                    offset: self.offset,
                    reason: "buffer too small".into(),
                });
            }
            let bytes = value.to_be_bytes();
            self.buffer[self.offset..self.offset + $size].copy_from_slice(&bytes);
            self.offset += $size;
            Ok(())
        }
    };
}

/// Generate read methods for primitive types.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `SerError::ReadFailed` on overflow)
/// 2. Reads N bytes from the buffer
/// 3. Converts bytes to the value via `from_be_bytes()`
/// 4. Advances the offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> SerResult<$type> {
            if self.offset + $size > self.buffer.len() {
                return Err(SerError::ReadFailed {
                    offset: self.offset,
                    reason: "unexpected end of buffer".into(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Mutable cursor for writing (bounds-checked, zero-copy)
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_write_be!(write_u8, u8, 1);
    impl_write_be!(write_i8, i8, 1);
    impl_write_be!(write_u16_be, u16, 2);
    impl_write_be!(write_i16_be, i16, 2);
    impl_write_be!(write_u32_be, u32, 4);
    impl_write_be!(write_i32_be, i32, 4);
    impl_write_be!(write_u64_be, u64, 8);
    impl_write_be!(write_i64_be, i64, 8);

    pub fn write_f32_be(&mut self, value: f32) -> SerResult<()> {
        self.write_u32_be(value.to_bits())
    }

    pub fn write_f64_be(&mut self, value: f64) -> SerResult<()> {
        self.write_u64_be(value.to_bits())
    }

    pub fn write_bool(&mut self, value: bool) -> SerResult<()> {
        self.write_u8(u8::from(value))
    }

    /// Write a string as `[i32 length incl. NUL][bytes][0u8]`.
    pub fn write_str(&mut self, value: &str) -> SerResult<()> {
        let len = value.len() + 1;
        let wire_len = i32::try_from(len).map_err(|_| SerError::InvalidData {
            reason: "string too long for wire format".into(),
        })?;
        self.write_i32_be(wire_len)?;
        self.write_bytes(value.as_bytes())?;
        self.write_u8(0)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> SerResult<()> {
        if self.offset + data.len() > self.buffer.len() {
            return Err(SerError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_i8, i8, 1);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_i16_be, i16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_i32_be, i32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i64_be, i64, 8);

    pub fn read_f32_be(&mut self) -> SerResult<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    pub fn read_f64_be(&mut self) -> SerResult<f64> {
        Ok(f64::from_bits(self.read_u64_be()?))
    }

    pub fn read_bool(&mut self) -> SerResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a string written by [`CursorMut::write_str`]. The length must be
    /// positive, in bounds, NUL-terminated and valid UTF-8.
    pub fn read_str(&mut self) -> SerResult<String> {
        let wire_len = self.read_i32_be()?;
        if wire_len < 1 {
            return Err(SerError::InvalidData {
                reason: format!("string length {} must be positive", wire_len),
            });
        }
        let bytes = self.read_bytes(wire_len as usize)?;
        let (last, body) = bytes.split_last().ok_or_else(|| SerError::InvalidData {
            reason: "empty string payload".into(),
        })?;
        if *last != 0 {
            return Err(SerError::InvalidData {
                reason: "string missing NUL terminator".into(),
            });
        }
        String::from_utf8(body.to_vec()).map_err(|_| SerError::InvalidData {
            reason: "string is not valid UTF-8".into(),
        })
    }

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}
