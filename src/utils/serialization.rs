// Low-level helpers for the chain's binary wire format: LEB128 varints,
// fixed-width little-endian integers and a cursor for reading them back.
use crate::error::{Result, SigningError};

/// A u64 never needs more than 10 LEB128 bytes
pub const MAX_VARINT_LEN: usize = 10;

pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint(&mut buf, value);
    buf
}

/// Appends `value` as unsigned LEB128: 7 bits per byte, high bit set on
/// every byte except the last
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Decodes a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (idx, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        // The tenth byte may only contribute the single remaining bit
        if idx == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(SigningError::MalformedVarint(format!(
                "value overflows 64 bits: {}",
                hex::encode(&bytes[..=idx])
            )));
        }
        value |= u64::from(byte & 0x7f) << (7 * idx);
        if byte & 0x80 == 0 {
            return Ok((value, idx + 1));
        }
    }

    let seen = bytes.len().min(MAX_VARINT_LEN);
    Err(SigningError::MalformedVarint(format!(
        "no terminating byte in {}",
        hex::encode(&bytes[..seen])
    )))
}

/// Forward-only cursor over a packed byte buffer
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(SigningError::Serialization(format!(
                "unexpected end of data at offset {}: need {len} bytes, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_varint(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    /// Varint length prefix followed by that many raw bytes
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| SigningError::Serialization(format!("length {len} too large")))?;
        self.read_bytes(len)
    }

    /// Fails if any input is left unread
    pub fn finish(self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(SigningError::Serialization(format!(
                "{} trailing bytes after offset {}",
                self.remaining(),
                self.pos
            )));
        }
        Ok(())
    }
}
