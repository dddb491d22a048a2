// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The [`Chunk`] container: a kind-tagged, length-prefixed byte payload.

use super::ChunkKind;
use crate::error::ChunkError;
use std::io::{Read, Write};

/// Size of a chunk header: a `u32` kind followed by a `u32` payload size.
pub const HEADER_SIZE: usize = 8;

/// The observable lifecycle stage of a [`Chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Nothing has been written yet.
    Empty,
    /// Writes are pending; the chunk cannot be read.
    Accumulating,
    /// The payload is finalized and unread bytes remain.
    Sealed,
    /// The payload is finalized and fully consumed.
    Exhausted,
}

/// A self-describing binary record.
///
/// A chunk owns a payload that is usually a sequence of framed sub-chunks,
/// each being `[kind u32 BE][size u32 BE][payload]`. Writers accumulate
/// sub-chunks with [`Chunk::add`] and [`Chunk::add_sub_chunk`], then call
/// [`Chunk::finalize`]. Readers pull sub-chunks one at a time with
/// [`Chunk::get_sub_chunk`] or raw bytes with [`Chunk::read_bytes`].
///
/// Reads never go past the end of the payload: a failed read returns an error
/// and leaves the cursor where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    kind: ChunkKind,
    data: Vec<u8>,
    cursor: usize,
    pending: Vec<u8>,
    sealed: bool,
}

impl Chunk {
    /// Creates an empty chunk of the given kind.
    pub fn new(kind: ChunkKind) -> Self {
        Self {
            kind,
            data: Vec::new(),
            cursor: 0,
            pending: Vec::new(),
            sealed: false,
        }
    }

    /// Creates a sealed chunk around an existing payload, ready to be read.
    pub fn with_payload(kind: ChunkKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            data,
            cursor: 0,
            pending: Vec::new(),
            sealed: true,
        }
    }

    /// The kind tag of this chunk.
    #[inline]
    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    /// The finalized payload.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Current read offset into the payload.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the lifecycle stage of the chunk.
    pub fn state(&self) -> ChunkState {
        if !self.pending.is_empty() {
            ChunkState::Accumulating
        } else if !self.sealed {
            ChunkState::Empty
        } else if self.remaining() == 0 {
            ChunkState::Exhausted
        } else {
            ChunkState::Sealed
        }
    }

    /// `true` once [`Chunk::finalize`] ran and no write is pending.
    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed && self.pending.is_empty()
    }

    /// Appends a framed `(kind, size, bytes)` sub-chunk to the pending writes.
    ///
    /// A finalized chunk is read-only, whether or not reading has started.
    pub fn add(&mut self, kind: ChunkKind, bytes: &[u8]) -> Result<(), ChunkError> {
        if self.sealed {
            return Err(ChunkError::ReadInProgress(self.kind));
        }
        let size = u32::try_from(bytes.len()).map_err(|_| ChunkError::TooLarge(bytes.len()))?;
        self.pending.reserve(HEADER_SIZE + bytes.len());
        self.pending.extend_from_slice(&kind.as_u32().to_be_bytes());
        self.pending.extend_from_slice(&size.to_be_bytes());
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends the full encoding of a sealed `child` to the pending writes.
    pub fn add_sub_chunk(&mut self, child: &Chunk) -> Result<(), ChunkError> {
        if !child.is_sealed() {
            return Err(ChunkError::NotFinalized(child.kind));
        }
        self.add(child.kind, &child.data)
    }

    /// Moves the pending writes onto the end of the payload.
    pub fn finalize(&mut self) {
        self.data.append(&mut self.pending);
        self.sealed = true;
    }

    /// `true` when at least `n` bytes remain unread.
    #[inline]
    pub fn check_available(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// The unread part of the payload, without consuming it.
    #[inline]
    pub fn remaining_data(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /// Fails with [`ChunkError::NotFinalized`] while writes are pending.
    pub(crate) fn ensure_readable(&self) -> Result<(), ChunkError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ChunkError::NotFinalized(self.kind))
        }
    }

    /// Reads the next framed sub-chunk.
    ///
    /// On failure the cursor does not move.
    pub fn get_sub_chunk(&mut self) -> Result<Chunk, ChunkError> {
        self.ensure_readable()?;
        let available = self.remaining();
        if available < HEADER_SIZE {
            return Err(ChunkError::Truncated {
                needed: HEADER_SIZE,
                available,
            });
        }

        let header = &self.data[self.cursor..self.cursor + HEADER_SIZE];
        let kind = ChunkKind(u32::from_be_bytes([header[0], header[1], header[2], header[3]]));
        let declared = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

        let body = available - HEADER_SIZE;
        if declared > body {
            return Err(ChunkError::Overrun {
                kind,
                declared,
                available: body,
            });
        }

        let start = self.cursor + HEADER_SIZE;
        let payload = self.data[start..start + declared].to_vec();
        self.cursor = start + declared;
        Ok(Chunk::with_payload(kind, payload))
    }

    /// Reads the next sub-chunk and checks its kind.
    ///
    /// The cursor does not move when the kind does not match.
    pub fn expect_sub_chunk(&mut self, expected: ChunkKind) -> Result<Chunk, ChunkError> {
        let before = self.cursor;
        let sub = self.get_sub_chunk()?;
        if sub.kind != expected {
            self.cursor = before;
            return Err(ChunkError::UnexpectedKind {
                expected,
                found: sub.kind,
            });
        }
        Ok(sub)
    }

    /// Consumes exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], ChunkError> {
        self.ensure_readable()?;
        if !self.check_available(n) {
            return Err(ChunkError::Truncated {
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.data[start..self.cursor])
    }

    /// Consumes exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ChunkError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Consumes every unread byte.
    pub fn read_remaining(&mut self) -> Result<&[u8], ChunkError> {
        let n = self.remaining();
        self.read_bytes(n)
    }

    /// Abandons the rest of the payload by moving the cursor to its end.
    pub fn end_parse(&mut self) {
        self.cursor = self.data.len();
    }

    /// Rewinds the cursor to the start of the payload.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor back to a position previously returned by [`Chunk::cursor`].
    pub fn reset_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.data.len());
    }

    /// Number of bytes taken by [`Chunk::write_to`].
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }

    /// Writes this chunk as one top-level `(kind, size, payload)` record.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), ChunkError> {
        if !self.is_sealed() {
            return Err(ChunkError::NotFinalized(self.kind));
        }
        let size =
            u32::try_from(self.data.len()).map_err(|_| ChunkError::TooLarge(self.data.len()))?;
        writer.write_all(&self.kind.as_u32().to_be_bytes())?;
        writer.write_all(&size.to_be_bytes())?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Reads one top-level record written by [`Chunk::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Chunk, ChunkError> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;
        let kind = ChunkKind(u32::from_be_bytes([header[0], header[1], header[2], header[3]]));
        let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let mut data = Vec::new();
        reader.take(size as u64).read_to_end(&mut data)?;
        log::trace!("Read chunk {kind}: {} of {size} bytes", data.len());
        if data.len() != size {
            return Err(ChunkError::Overrun {
                kind,
                declared: size,
                available: data.len(),
            });
        }
        Ok(Chunk::with_payload(kind, data))
    }

    /// Encodes this chunk into a new byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChunkError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Decodes a single record that must span all of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Chunk, ChunkError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ChunkError::Truncated {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }
        let mut reader = bytes;
        let chunk = Self::read_from(&mut reader)?;
        if !reader.is_empty() {
            return Err(ChunkError::inconsistent(format!(
                "{} trailing bytes after chunk {}",
                reader.len(),
                chunk.kind
            )));
        }
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ChunkKind = ChunkKind::from_tag(b"AAAA");
    const B: ChunkKind = ChunkKind::from_tag(b"BBBB");

    fn sealed_with(fields: &[(ChunkKind, &[u8])]) -> Chunk {
        let mut chunk = Chunk::new(A);
        for (kind, bytes) in fields {
            chunk.add(*kind, bytes).unwrap();
        }
        chunk.finalize();
        chunk
    }

    #[test]
    fn test_lifecycle_states() {
        let mut chunk = Chunk::new(A);
        assert_eq!(chunk.state(), ChunkState::Empty);
        chunk.add(B, &[1, 2, 3]).unwrap();
        assert_eq!(chunk.state(), ChunkState::Accumulating);
        chunk.finalize();
        assert_eq!(chunk.state(), ChunkState::Sealed);
        chunk.get_sub_chunk().unwrap();
        assert_eq!(chunk.state(), ChunkState::Exhausted);
    }

    #[test]
    fn test_framing_layout() {
        let chunk = sealed_with(&[(B, &[9, 8])]);
        assert_eq!(chunk.data(), &[b'B', b'B', b'B', b'B', 0, 0, 0, 2, 9, 8]);
    }

    #[test]
    fn test_reading_with_pending_writes_fails() {
        let mut chunk = Chunk::new(A);
        chunk.add(B, &[1]).unwrap();
        chunk.add(B, &[2]).unwrap();
        assert!(matches!(chunk.get_sub_chunk(), Err(ChunkError::NotFinalized(_))));
        assert!(matches!(chunk.read_bytes(0), Err(ChunkError::NotFinalized(_))));
        chunk.finalize();
        assert_eq!(chunk.get_sub_chunk().unwrap().data(), &[1]);
        assert_eq!(chunk.get_sub_chunk().unwrap().data(), &[2]);
    }

    #[test]
    fn test_sealed_chunk_rejects_writes() {
        let mut unread = sealed_with(&[(B, &[1]), (B, &[2])]);
        assert!(matches!(unread.add(B, &[3]), Err(ChunkError::ReadInProgress(_))));
        assert_eq!(unread.data().len(), 2 * (HEADER_SIZE + 1));

        unread.get_sub_chunk().unwrap();
        assert!(matches!(unread.add(B, &[3]), Err(ChunkError::ReadInProgress(_))));

        let mut wrapped = Chunk::with_payload(A, vec![0; 4]);
        assert!(wrapped.add(B, &[]).is_err());
    }

    #[test]
    fn test_unsealed_child_is_rejected() {
        let mut parent = Chunk::new(A);
        let mut child = Chunk::new(B);
        child.add(A, &[1]).unwrap();
        assert!(matches!(
            parent.add_sub_chunk(&child),
            Err(ChunkError::NotFinalized(kind)) if kind == B
        ));
        child.finalize();
        parent.add_sub_chunk(&child).unwrap();
        parent.finalize();
        let mut back = parent.get_sub_chunk().unwrap();
        assert_eq!(back.kind(), B);
        assert_eq!(back.get_sub_chunk().unwrap().data(), &[1]);
    }

    #[test]
    fn test_read_past_end_leaves_cursor() {
        let mut chunk = Chunk::with_payload(A, vec![1, 2, 3, 4]);
        assert!(chunk.check_available(4));
        assert!(!chunk.check_available(5));
        assert!(matches!(
            chunk.read_bytes(5),
            Err(ChunkError::Truncated { needed: 5, available: 4 })
        ));
        assert_eq!(chunk.cursor(), 0);
        assert_eq!(chunk.read_array::<4>().unwrap(), [1, 2, 3, 4]);
        assert_eq!(chunk.remaining(), 0);
    }

    #[test]
    fn test_short_header_and_overrun() {
        let mut short = Chunk::with_payload(A, vec![0; 7]);
        assert!(matches!(short.get_sub_chunk(), Err(ChunkError::Truncated { .. })));
        assert_eq!(short.cursor(), 0);

        let mut lying = Chunk::with_payload(A, vec![b'B', b'B', b'B', b'B', 0, 0, 0, 5, 1, 2]);
        assert!(matches!(
            lying.get_sub_chunk(),
            Err(ChunkError::Overrun { declared: 5, available: 2, .. })
        ));
        assert_eq!(lying.cursor(), 0);
    }

    #[test]
    fn test_expect_sub_chunk_restores_cursor() {
        let mut chunk = sealed_with(&[(B, &[1])]);
        assert!(matches!(
            chunk.expect_sub_chunk(A),
            Err(ChunkError::UnexpectedKind { .. })
        ));
        assert_eq!(chunk.cursor(), 0);
        assert!(chunk.expect_sub_chunk(B).is_ok());
    }

    #[test]
    fn test_end_parse_exhausts() {
        let mut chunk = sealed_with(&[(B, &[1]), (B, &[2])]);
        chunk.end_parse();
        assert_eq!(chunk.state(), ChunkState::Exhausted);
        assert!(!chunk.check_available(1));
    }

    #[test]
    fn test_stream_roundtrip() {
        let chunk = sealed_with(&[(B, b"hello")]);
        let bytes = chunk.to_bytes().unwrap();
        assert_eq!(bytes.len(), chunk.encoded_len());
        let back = Chunk::from_bytes(&bytes).unwrap();
        assert_eq!(back.kind(), A);
        assert_eq!(back.data(), chunk.data());
    }

    #[test]
    fn test_truncated_stream_is_reported() {
        let bytes = sealed_with(&[(B, b"hello")]).to_bytes().unwrap();
        let err = Chunk::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ChunkError::Overrun { .. }));
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            Chunk::from_bytes(&trailing),
            Err(ChunkError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_unfinalized_chunk_cannot_be_written() {
        let mut chunk = Chunk::new(A);
        chunk.add(B, &[1]).unwrap();
        assert!(chunk.to_bytes().is_err());
    }
}
