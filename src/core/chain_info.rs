//! Chain metadata supplied by the caller's `get_info` request
//!
//! The signing engine never talks to a node itself. Whoever does hands over
//! the fields below, either as a struct or as the node's JSON response.

use crate::error::{Result, SigningError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const BLOCK_ID_LEN: usize = 32;

/// Subset of the `get_info` response needed to build a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    pub head_block_num: u32,
    pub head_block_id: String,
    /// UTC, formatted by the node as `2024-01-01T00:00:00.000`
    pub head_block_time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_irreversible_block_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_irreversible_block_id: Option<String>,
}

impl ChainInfo {
    pub fn new(
        chain_id: &str,
        head_block_num: u32,
        head_block_id: &str,
        head_block_time: NaiveDateTime,
    ) -> ChainInfo {
        ChainInfo {
            chain_id: chain_id.to_string(),
            head_block_num,
            head_block_id: head_block_id.to_string(),
            head_block_time,
            last_irreversible_block_num: None,
            last_irreversible_block_id: None,
        }
    }

    pub fn with_last_irreversible(mut self, block_num: u32, block_id: &str) -> ChainInfo {
        self.last_irreversible_block_num = Some(block_num);
        self.last_irreversible_block_id = Some(block_id.to_string());
        self
    }

    /// Head block time as unix seconds
    pub fn head_block_timestamp(&self) -> i64 {
        self.head_block_time.and_utc().timestamp()
    }

    pub fn head_reference(&self) -> Result<ReferenceBlock> {
        ReferenceBlock::from_block(self.head_block_num, &self.head_block_id)
    }

    /// TAPOS fields from the last irreversible block, if the node reported one
    pub fn last_irreversible_reference(&self) -> Option<Result<ReferenceBlock>> {
        match (
            self.last_irreversible_block_num,
            self.last_irreversible_block_id.as_deref(),
        ) {
            (Some(num), Some(id)) => Some(ReferenceBlock::from_block(num, id)),
            _ => None,
        }
    }
}

/// TAPOS fields binding a transaction to a recent block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceBlock {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

impl ReferenceBlock {
    /// `ref_block_num` is the low 16 bits of the block number and
    /// `ref_block_prefix` is bytes 8..12 of the block id read little-endian
    pub fn from_block(block_num: u32, block_id: &str) -> Result<ReferenceBlock> {
        if block_id.len() != BLOCK_ID_LEN * 2 {
            return Err(SigningError::InvalidBlockId(block_id.to_string()));
        }
        let mut id = [0u8; BLOCK_ID_LEN];
        hex::decode_to_slice(block_id, &mut id)
            .map_err(|e| SigningError::InvalidBlockId(format!("{block_id}: {e}")))?;

        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&id[8..12]);
        Ok(ReferenceBlock {
            ref_block_num: (block_num & 0xffff) as u16,
            ref_block_prefix: u32::from_le_bytes(prefix),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_ID: &str = "0001e2403f4c1f0a0b0c0d0e1234567890abcdef1234567890abcdef12345678";

    #[test]
    fn test_reference_block() {
        let reference = ReferenceBlock::from_block(0x0001_e240, BLOCK_ID).unwrap();
        assert_eq!(reference.ref_block_num, 0xe240);
        // bytes 8..12 = 0b 0c 0d 0e
        assert_eq!(reference.ref_block_prefix, 0x0e0d_0c0b);
    }

    #[test]
    fn test_reference_block_truncates_number() {
        let reference = ReferenceBlock::from_block(0xabcd_1234, BLOCK_ID).unwrap();
        assert_eq!(reference.ref_block_num, 0x1234);
    }

    #[test]
    fn test_invalid_block_id() {
        assert!(matches!(
            ReferenceBlock::from_block(1, "abcd"),
            Err(SigningError::InvalidBlockId(_))
        ));
        assert!(matches!(
            ReferenceBlock::from_block(1, &"x".repeat(64)),
            Err(SigningError::InvalidBlockId(_))
        ));
    }

    #[test]
    fn test_deserialize_get_info_response() {
        let json = r#"{
            "server_version": "d1bc8d3",
            "chain_id": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
            "head_block_num": 123456,
            "last_irreversible_block_num": 123120,
            "last_irreversible_block_id": "0001e0f0a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c",
            "head_block_id": "0001e2403f4c1f0a0b0c0d0e1234567890abcdef1234567890abcdef12345678",
            "head_block_time": "2024-01-01T00:00:00.500",
            "head_block_producer": "eosproducer1"
        }"#;
        let info: ChainInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.head_block_num, 123456);
        assert_eq!(info.head_block_timestamp(), 1_704_067_200);
        assert_eq!(info.last_irreversible_block_num, Some(123120));
        assert_eq!(info.head_reference().unwrap().ref_block_num, 0xe240);
        assert!(info.last_irreversible_reference().unwrap().is_ok());
    }

    #[test]
    fn test_missing_last_irreversible() {
        let info = ChainInfo::new(
            "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
            1,
            BLOCK_ID,
            NaiveDateTime::default(),
        );
        assert!(info.last_irreversible_reference().is_none());
    }
}
