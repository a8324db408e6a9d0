//! Core transaction model
//!
//! This module contains names, actions, the binary transaction format and
//! the builder that fixes expiration and TAPOS fields from chain metadata.

pub mod abi;
pub mod action;
pub mod builder;
pub mod chain_info;
pub mod name;
pub mod transaction;

pub use abi::{pack_fields, AbiValue, Asset, Symbol};
pub use action::{Action, ActionData, PermissionLevel};
pub use builder::{TransactionBuilder, DEFAULT_EXPIRATION};
pub use chain_info::{ChainInfo, ReferenceBlock, BLOCK_ID_LEN};
pub use name::{name_to_u64, u64_to_name, Name, MAX_NAME_LEN};
pub use transaction::{create_signing_data, parse_chain_id, Transaction, CHAIN_ID_LEN};
