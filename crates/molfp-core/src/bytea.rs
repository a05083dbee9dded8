//! Length-prefixed byte buffers.
//!
//! `ByteA` is the currency between the codecs and the storage layer. The
//! external form is a 4-byte little-endian total length (header included)
//! followed by the payload. Nothing in the payload is interpreted here.

use crate::{FingerprintError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length header in bytes.
pub const VARHDRSZ: usize = 4;

/// An immutable binary payload with a length-prefixed external form.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteA {
    data: Bytes,
}

impl ByteA {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { data: Bytes::new() }
    }

    /// Copy a byte slice into a new buffer.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(bytes),
        }
    }

    /// Parse the length-prefixed external form.
    pub fn from_varlena(buf: &[u8]) -> Result<Self> {
        if buf.len() < VARHDRSZ {
            return Err(FingerprintError::decode(
                "varlena header",
                format!("buffer of {} bytes is shorter than the header", buf.len()),
            ));
        }

        let mut cursor = buf;
        let declared = cursor.get_u32_le() as usize;
        if declared != buf.len() {
            return Err(FingerprintError::decode(
                "varlena header",
                format!("declared length {} but buffer holds {}", declared, buf.len()),
            ));
        }

        Ok(Self::copy_from_slice(cursor))
    }

    /// Produce the length-prefixed external form.
    pub fn to_varlena(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(VARHDRSZ + self.data.len());
        out.put_u32_le((VARHDRSZ + self.data.len()) as u32);
        out.put_slice(&self.data);
        out.freeze()
    }

    /// The payload without the header.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the payload as `Bytes`.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Vec<u8>> for ByteA {
    fn from(v: Vec<u8>) -> Self {
        Self { data: Bytes::from(v) }
    }
}

impl From<Bytes> for ByteA {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for ByteA {
    fn from(s: &[u8]) -> Self {
        Self::copy_from_slice(s)
    }
}

impl AsRef<[u8]> for ByteA {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for ByteA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteA(len={})", self.data.len())
    }
}
