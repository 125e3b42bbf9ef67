//! Minimal deterministic CBOR primitives (RFC 8949 §4.2.1 core rules).
//!
//! Only the subset used by canonical trees is supported: unsigned integers,
//! text strings, arrays and maps, all with definite lengths and shortest-form
//! heads.

use crate::errors::DecodeError;

/// Major type 0: unsigned integer.
pub const MAJOR_UNSIGNED: u8 = 0;
/// Major type 3: UTF-8 text string.
pub const MAJOR_TEXT: u8 = 3;
/// Major type 4: array.
pub const MAJOR_ARRAY: u8 = 4;
/// Major type 5: map.
pub const MAJOR_MAP: u8 = 5;

const INFO_U8: u8 = 24;
const INFO_U16: u8 = 25;
const INFO_U32: u8 = 26;
const INFO_U64: u8 = 27;

/// Appends an item head using the shortest argument encoding.
pub fn write_head(out: &mut Vec<u8>, major: u8, argument: u64) {
    let mt = major << 5;
    if argument < u64::from(INFO_U8) {
        out.push(mt | argument as u8);
    } else if argument <= u64::from(u8::MAX) {
        out.push(mt | INFO_U8);
        out.push(argument as u8);
    } else if argument <= u64::from(u16::MAX) {
        out.push(mt | INFO_U16);
        out.extend_from_slice(&(argument as u16).to_be_bytes());
    } else if argument <= u64::from(u32::MAX) {
        out.push(mt | INFO_U32);
        out.extend_from_slice(&(argument as u32).to_be_bytes());
    } else {
        out.push(mt | INFO_U64);
        out.extend_from_slice(&argument.to_be_bytes());
    }
}

/// Appends a text string item.
pub fn write_text(out: &mut Vec<u8>, text: &str) {
    write_head(out, MAJOR_TEXT, text.len() as u64);
    out.extend_from_slice(text.as_bytes());
}

/// Decoded item head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    /// Major type (0..=7).
    pub major: u8,
    /// Argument value (length, count, or integer).
    pub argument: u64,
    /// Whether the argument used the shortest possible encoding.
    pub minimal: bool,
    /// Offset of the head's initial byte.
    pub offset: usize,
}

/// Forward-only cursor over encoded bytes.
#[derive(Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Starts reading at offset zero.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Consumes exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::Truncated {
                offset: self.position,
            })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Reads one item head. Indefinite lengths are rejected.
    pub fn read_head(&mut self) -> Result<Head, DecodeError> {
        let offset = self.position;
        let initial = self.take(1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;
        let (argument, minimal) = match info {
            0..=23 => (u64::from(info), true),
            INFO_U8 => {
                let v = u64::from(self.take(1)?[0]);
                (v, v >= u64::from(INFO_U8))
            }
            INFO_U16 => {
                let b = self.take(2)?;
                let v = u64::from(u16::from_be_bytes([b[0], b[1]]));
                (v, v > u64::from(u8::MAX))
            }
            INFO_U32 => {
                let b = self.take(4)?;
                let v = u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]));
                (v, v > u64::from(u16::MAX))
            }
            INFO_U64 => {
                let b = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(b);
                let v = u64::from_be_bytes(raw);
                (v, v > u64::from(u32::MAX))
            }
            _ => return Err(DecodeError::UnsupportedLength { offset, info }),
        };
        Ok(Head {
            major,
            argument,
            minimal,
            offset,
        })
    }
}
