//! Utility functions and helpers
//!
//! This module contains the hash primitives, the Base58Check codec and the
//! varint/byte helpers shared by keys, signatures and transactions.

pub mod base58;
pub mod crypto;
pub mod serialization;

pub use base58::{
    base58_decode, base58_encode, base58check_decode, base58check_encode, Checksum, CHECK_SUM_LEN,
};
pub use crypto::{double_sha256_digest, ripemd160_digest, ripemd160_with_suffix, sha256_digest};
pub use serialization::{decode_varint, encode_varint, write_varint, ByteReader, MAX_VARINT_LEN};
