//! # eosign - Offline EOSIO Transaction Signing
//!
//! This is my signing engine for EOSIO-family chains (EOS, WAX, Telos...).
//! It never talks to a node: whoever fetches `get_info` hands the result in,
//! and whoever broadcasts takes the packed JSON back out.
//!
//! ## What It Does
//! - **Keys**: parses `5...` WIF and `PVT_K1_...` private keys, derives
//!   `EOS...` / `PUB_K1_...` public keys over secp256k1
//! - **Names**: the 64-bit account/action name encoding
//! - **Transactions**: byte-exact binary serialization, TAPOS reference
//!   block and expiration from chain metadata
//! - **Signatures**: RFC 6979 deterministic ECDSA, low-S and canonical,
//!   recoverable `SIG_K1_...` strings
//!
//! ## How The Code Is Organized
//! - `utils/`: base58check, hashes, varints and the byte reader
//! - `core/`: names, actions, transactions, chain info and the builder
//! - `wallet/`: keys, signature values and the signer
//! - `config/`: settings for the CLI
//! - `cli/`: command-line parsing and the JSON sign request
//!
//! ## Typical Flow
//! 1. Build a `ChainInfo` from the node's `get_info`
//! 2. Add actions on a `TransactionBuilder` and `build()`
//! 3. `sign_transaction(chain_id, &tx, &key)` and push `to_json()`
//!
//! The byte layouts are consensus rules. If a test vector in here changes,
//! nodes will reject what this crate produces.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    name_to_u64, u64_to_name, AbiValue, Action, ActionData, Asset, ChainInfo, Name,
    PermissionLevel, Symbol, Transaction, TransactionBuilder,
};
pub use error::{Result, SigningError};
pub use utils::{base58check_decode, base58check_encode, sha256_digest, Checksum};
pub use wallet::{
    sign_digest, sign_transaction, verify_digest, KeyFormat, PackedTransaction, PrivateKey,
    PublicKey, Signature, SignedTransaction,
};
