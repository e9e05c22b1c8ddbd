//! Sequential cursor over RIFF chunks
//!
//! A RIFF chunk is a 4-byte identifier, a little-endian u32 body size, then
//! the body itself, padded to an even length.

use crate::error::DecodeError;

/// Size of a chunk header (id + size)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Identifier and declared body size of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    /// Check the chunk identifier
    pub fn is(&self, id: &[u8; 4]) -> bool {
        &self.id == id
    }

    /// Identifier as text, for logging
    pub fn id_lossy(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// Cursor over an in-memory byte buffer
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current byte offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// True when another chunk header cannot fit
    pub fn at_end(&self) -> bool {
        self.remaining() < CHUNK_HEADER_SIZE
    }

    /// Read the next chunk header
    pub fn read_chunk_header(&mut self) -> Result<ChunkHeader, DecodeError> {
        if self.at_end() {
            return Err(DecodeError::TruncatedHeader { offset: self.pos });
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&self.bytes[self.pos..self.pos + 4]);
        self.pos += 4;
        let size = self.read_u32_le()?;

        Ok(ChunkHeader { id, size })
    }

    /// Advance the cursor, stopping at the end of the buffer
    pub fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.bytes.len());
    }

    /// Skip a chunk body of the declared size, including its pad byte
    pub fn skip_body(&mut self, size: u32) {
        let size = size as usize;
        self.skip(size + (size & 1));
    }

    /// Consume exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedChunk {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }

        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume up to `n` bytes, fewer if the buffer ends first
    pub fn read_up_to(&mut self, n: usize) -> &'a [u8] {
        let end = self.pos.saturating_add(n).min(self.bytes.len());
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        slice
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Scan forward for a chunk with the given id
    ///
    /// Other chunks are skipped by their declared size. On success the cursor
    /// sits at the start of the found chunk's body and its declared size is
    /// returned. `None` means the buffer ran out first.
    pub fn find_chunk(&mut self, id: &[u8; 4]) -> Result<Option<u32>, DecodeError> {
        while !self.at_end() {
            let header = self.read_chunk_header()?;
            if header.is(id) {
                return Ok(Some(header.size));
            }

            log::debug!(
                "Skipping '{}' chunk ({} bytes) at offset {}",
                header.id_lossy(),
                header.size,
                self.pos - CHUNK_HEADER_SIZE
            );
            self.skip_body(header.size);
        }

        Ok(None)
    }
}
