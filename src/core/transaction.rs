// This file implements the binary transaction format that every EOSIO node
// hashes and verifies. Field order and widths are consensus rules: any
// deviation produces bytes the network rejects.

use crate::core::action::Action;
use crate::error::{Result, SigningError};
use crate::utils::{sha256_digest, write_varint, ByteReader};
use serde::{Deserialize, Serialize};

pub const CHAIN_ID_LEN: usize = 32;

/// Trailing zero digest standing in for the context-free data hash
const CONTEXT_FREE_DIGEST: [u8; 32] = [0u8; 32];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unix seconds after which the transaction is no longer valid
    pub expiration: u32,
    /// Low 16 bits of the reference block number (TAPOS)
    pub ref_block_num: u16,
    /// Bytes 8..12 of the reference block id, little-endian (TAPOS)
    pub ref_block_prefix: u32,
    /// 0 means no limit beyond the account's
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Packs the transaction:
    ///
    /// `expiration(u32) ‖ ref_block_num(u16) ‖ ref_block_prefix(u32) ‖
    /// varint(max_net_usage_words) ‖ max_cpu_usage_ms(u8) ‖ varint(delay_sec) ‖
    /// varint(0) ‖ varint(actions.len()) ‖ actions ‖ varint(0)`
    ///
    /// Integers are little-endian. Actions keep the order they were added in.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&self.expiration.to_le_bytes());
        buf.extend_from_slice(&self.ref_block_num.to_le_bytes());
        buf.extend_from_slice(&self.ref_block_prefix.to_le_bytes());
        write_varint(&mut buf, u64::from(self.max_net_usage_words));
        buf.push(self.max_cpu_usage_ms);
        write_varint(&mut buf, u64::from(self.delay_sec));
        // context_free_actions
        write_varint(&mut buf, 0);
        write_varint(&mut buf, self.actions.len() as u64);
        for action in &self.actions {
            action.write_to(&mut buf);
        }
        // transaction_extensions
        write_varint(&mut buf, 0);
        buf
    }

    /// Reads back a packed transaction. Context-free actions and extensions
    /// must be empty, as they are in everything this crate produces.
    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        let mut reader = ByteReader::new(bytes);
        let expiration = reader.read_u32()?;
        let ref_block_num = reader.read_u16()?;
        let ref_block_prefix = reader.read_u32()?;
        let max_net_usage_words = read_varuint32(&mut reader, "max_net_usage_words")?;
        let max_cpu_usage_ms = reader.read_u8()?;
        let delay_sec = read_varuint32(&mut reader, "delay_sec")?;

        let context_free_actions = reader.read_varint()?;
        if context_free_actions != 0 {
            return Err(SigningError::Serialization(format!(
                "context-free actions are not supported (found {context_free_actions})"
            )));
        }

        let action_count = reader.read_varint()?;
        let mut actions = Vec::new();
        for _ in 0..action_count {
            actions.push(Action::read_from(&mut reader)?);
        }

        let extensions = reader.read_varint()?;
        if extensions != 0 {
            return Err(SigningError::Serialization(format!(
                "transaction extensions are not supported (found {extensions})"
            )));
        }
        reader.finish()?;

        Ok(Transaction {
            expiration,
            ref_block_num,
            ref_block_prefix,
            max_net_usage_words,
            max_cpu_usage_ms,
            delay_sec,
            actions,
        })
    }

    /// Transaction id as the chain reports it: hex SHA-256 of the packed bytes
    pub fn id(&self) -> String {
        hex::encode(sha256_digest(&self.serialize()))
    }

    /// SHA-256 of the signing preimage for `chain_id`
    pub fn signing_digest(&self, chain_id: &str) -> Result<[u8; 32]> {
        let signing_data = create_signing_data(chain_id, &self.serialize())?;
        Ok(sha256_digest(&signing_data))
    }
}

fn read_varuint32(reader: &mut ByteReader, field: &str) -> Result<u32> {
    let value = reader.read_varint()?;
    u32::try_from(value)
        .map_err(|_| SigningError::Serialization(format!("{field} exceeds 32 bits: {value}")))
}

/// Decodes a 64-hex-character chain id into its 32 bytes
pub fn parse_chain_id(chain_id: &str) -> Result<[u8; CHAIN_ID_LEN]> {
    if chain_id.len() != CHAIN_ID_LEN * 2 {
        return Err(SigningError::InvalidChainId(chain_id.to_string()));
    }
    let mut out = [0u8; CHAIN_ID_LEN];
    hex::decode_to_slice(chain_id, &mut out)
        .map_err(|e| SigningError::InvalidChainId(format!("{chain_id}: {e}")))?;
    Ok(out)
}

/// Builds the signing preimage: `chain_id ‖ serialized_tx ‖ 32 zero bytes`
pub fn create_signing_data(chain_id: &str, serialized_tx: &[u8]) -> Result<Vec<u8>> {
    let chain_id = parse_chain_id(chain_id)?;
    let mut data = Vec::with_capacity(CHAIN_ID_LEN + serialized_tx.len() + 32);
    data.extend_from_slice(&chain_id);
    data.extend_from_slice(serialized_tx);
    data.extend_from_slice(&CONTEXT_FREE_DIGEST);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abi::AbiValue;

    const CHAIN_ID: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";

    fn sample_transaction() -> Transaction {
        Transaction {
            expiration: 1_700_000_060,
            ref_block_num: 0x5678,
            ref_block_prefix: 0xdead_beef,
            actions: vec![Action::with_single_auth(
                "eosio.token",
                "transfer",
                "alice",
                "active",
                vec![0x01u8, 0x02, 0x03],
            )
            .unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample_transaction().serialize();

        assert_eq!(&bytes[0..4], &1_700_000_060u32.to_le_bytes());
        assert_eq!(&bytes[4..6], &[0x78, 0x56]);
        assert_eq!(&bytes[6..10], &[0xef, 0xbe, 0xad, 0xde]);
        // net words, cpu ms, delay, context-free count, action count
        assert_eq!(&bytes[10..15], &[0, 0, 0, 0, 1]);
        // header 15 + action (8 + 8 + 1 + 16 + 1 + 3) + extensions 1
        assert_eq!(bytes.len(), 15 + 37 + 1);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn test_varint_header_fields() {
        let tx = Transaction {
            max_net_usage_words: 300,
            max_cpu_usage_ms: 5,
            delay_sec: 128,
            ..sample_transaction()
        };
        let bytes = tx.serialize();
        assert_eq!(&bytes[10..16], &[0xac, 0x02, 0x05, 0x80, 0x01, 0x00]);
    }

    #[test]
    fn test_action_order_is_preserved() {
        let mut tx = sample_transaction();
        let second = Action::with_single_auth(
            "eosio",
            "buyram",
            "alice",
            "active",
            vec![AbiValue::U32(1)],
        )
        .unwrap();
        tx.actions.push(second.clone());

        let decoded = Transaction::deserialize(&tx.serialize()).unwrap();
        assert_eq!(decoded.actions[0], tx.actions[0]);
        assert_eq!(decoded.actions[1], second);
    }

    #[test]
    fn test_deserialize_inverts_serialize() {
        let tx = Transaction {
            max_net_usage_words: 1000,
            delay_sec: 10,
            ..sample_transaction()
        };
        assert_eq!(Transaction::deserialize(&tx.serialize()).unwrap(), tx);
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = sample_transaction().serialize();
        bytes.push(0);
        assert!(matches!(
            Transaction::deserialize(&bytes),
            Err(SigningError::Serialization(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_context_free_actions() {
        let mut bytes = sample_transaction().serialize();
        bytes[13] = 1;
        assert!(Transaction::deserialize(&bytes).is_err());
    }

    #[test]
    fn test_signing_data_layout() {
        let serialized = sample_transaction().serialize();
        let data = create_signing_data(CHAIN_ID, &serialized).unwrap();

        assert_eq!(data.len(), 32 + serialized.len() + 32);
        assert_eq!(hex::encode(&data[..32]), CHAIN_ID);
        assert_eq!(&data[32..32 + serialized.len()], serialized.as_slice());
        assert!(data[32 + serialized.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_signing_digest_depends_on_chain() {
        let tx = sample_transaction();
        let other = "1064487b3cd1a897ce03ae5b6a865651747e2e152090f99c1d19d44e01aea5a4";
        assert_ne!(
            tx.signing_digest(CHAIN_ID).unwrap(),
            tx.signing_digest(other).unwrap()
        );
    }

    #[test]
    fn test_invalid_chain_id() {
        let not_hex = "g".repeat(64);
        let too_long = "a".repeat(66);
        for bad in ["", "abcd", not_hex.as_str(), too_long.as_str()] {
            assert!(
                matches!(
                    create_signing_data(bad, &[]),
                    Err(SigningError::InvalidChainId(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_id_is_hash_of_packed_bytes() {
        let tx = sample_transaction();
        assert_eq!(tx.id(), hex::encode(sha256_digest(&tx.serialize())));
        assert_eq!(tx.id().len(), 64);
    }
}
