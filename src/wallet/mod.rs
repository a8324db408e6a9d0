//! Key management and signing
//!
//! This module parses and re-encodes secp256k1 keys in both EOSIO text
//! formats, and produces the recoverable signatures nodes accept.

pub mod keys;
pub mod signature;
pub mod signer;

pub use keys::{
    KeyFormat, PrivateKey, PublicKey, LEGACY_PUBLIC_PREFIX, MODERN_PRIVATE_PREFIX,
    MODERN_PUBLIC_PREFIX,
};
pub use signature::{Signature, RECOVERY_BYTE_OFFSET, SIGNATURE_PREFIX};
pub use signer::{
    sign_digest, sign_transaction, verify_digest, PackedTransaction, SignedTransaction,
};
