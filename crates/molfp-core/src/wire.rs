//! Sparse fingerprint wire format.
//!
//! ```text
//! u32 version        (SPARSE_FORMAT_VERSION)
//! u32 element size   (4)
//! u32 declared width
//! u32 element count
//! count x { u32 key, i32 value }   keys strictly ascending
//! ```
//!
//! All fields are little-endian. `WireView` borrows a buffer and hands out
//! entries without allocating, which is what the streaming comparators need.

use crate::{FingerprintError, HeaderField, Operand, Result};
use bytes::{Buf, BufMut};
use std::slice::ChunksExact;

/// Version tag written at the start of every sparse buffer.
pub const SPARSE_FORMAT_VERSION: u32 = 0x0001;

/// Size of a key on the wire.
pub const ELEMENT_SIZE: u32 = std::mem::size_of::<u32>() as u32;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Size of one `(key, value)` entry in bytes.
pub const ENTRY_SIZE: usize = 8;

/// Decoded sparse header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub width: u32,
    pub count: u32,
}

/// A validated, borrowed sparse buffer.
#[derive(Debug, Clone, Copy)]
pub struct WireView<'a> {
    header: WireHeader,
    body: &'a [u8],
}

impl<'a> WireView<'a> {
    /// Validate the header and body length of `buf`.
    ///
    /// Version and element-size mismatches are reported as `Format` errors
    /// for `operand`; truncated or overlong buffers as `Decode` errors.
    pub fn parse(buf: &'a [u8], operand: Operand) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(FingerprintError::decode(
                "sparse wire header",
                format!("{}: {} bytes is shorter than the header", operand, buf.len()),
            ));
        }

        let mut cursor = buf;
        let version = cursor.get_u32_le();
        if version != SPARSE_FORMAT_VERSION {
            return Err(FingerprintError::Format {
                operand,
                field: HeaderField::Version,
                expected: SPARSE_FORMAT_VERSION,
                found: version,
            });
        }

        let element_size = cursor.get_u32_le();
        if element_size != ELEMENT_SIZE {
            return Err(FingerprintError::Format {
                operand,
                field: HeaderField::ElementSize,
                expected: ELEMENT_SIZE,
                found: element_size,
            });
        }

        let width = cursor.get_u32_le();
        let count = cursor.get_u32_le();

        let expected = count as usize * ENTRY_SIZE;
        if cursor.len() != expected {
            return Err(FingerprintError::decode(
                "sparse wire body",
                format!(
                    "{}: {} entries need {} bytes, found {}",
                    operand,
                    count,
                    expected,
                    cursor.len()
                ),
            ));
        }

        Ok(Self {
            header: WireHeader { width, count },
            body: cursor,
        })
    }

    #[inline]
    pub fn header(&self) -> WireHeader {
        self.header
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.header.width
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.header.count
    }

    /// Iterate over `(key, value)` entries in stored order.
    #[inline]
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            chunks: self.body.chunks_exact(ENTRY_SIZE),
        }
    }
}

/// Iterator over wire entries. Holds only a slice cursor.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for Entries<'_> {
    type Item = (u32, i32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = self.chunks.next()?;
        let key = chunk.get_u32_le();
        let value = chunk.get_i32_le();
        Some((key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}

/// Write a sparse buffer. `entries` must already be in ascending key order.
pub fn encode<I>(width: u32, count: usize, entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = (u32, i32)>,
{
    let mut out = Vec::with_capacity(HEADER_SIZE + count * ENTRY_SIZE);
    out.put_u32_le(SPARSE_FORMAT_VERSION);
    out.put_u32_le(ELEMENT_SIZE);
    out.put_u32_le(width);
    out.put_u32_le(count as u32);
    for (key, value) in entries {
        out.put_u32_le(key);
        out.put_i32_le(value);
    }
    out
}
