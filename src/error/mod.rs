//! Error handling for the signing engine
//!
//! Every failure in this crate is local and synchronous. Parsing errors carry
//! the offending input so they can be shown to the user as-is, except where
//! that input could be key material.

use std::fmt;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Error taxonomy for key parsing, serialization, building and signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// Private or public key text with an unrecognized prefix or version byte
    InvalidKeyFormat(String),
    /// Base58Check checksum did not match the payload
    ChecksumMismatch(String),
    /// Private scalar is zero or not below the curve order
    InvalidScalar(String),
    /// Name contains a character outside the name alphabet
    InvalidName(String),
    /// Name is longer than 13 characters
    NameTooLong(String),
    /// Varint has no terminating byte within 10 bytes
    MalformedVarint(String),
    /// Chain id is not exactly 64 hex characters
    InvalidChainId(String),
    /// Block id is not exactly 64 hex characters
    InvalidBlockId(String),
    /// `build()` was called with no actions
    NoActionsAdded,
    /// A builder was used after `build()`
    AlreadyBuilt,
    /// No recovery id reproduces the signer's public key
    RecoveryFailed(String),
    /// Decoded payload has the wrong length
    LengthMismatch { expected: usize, actual: usize },
    /// Text is not valid base58
    InvalidBase58(String),
    /// Expiration is not in the future relative to the head block
    InvalidExpiration(String),
    /// Signature text or bytes are not a valid recoverable signature
    InvalidSignature(String),
    /// The signer could not produce a canonical signature
    SigningFailed(String),
    /// Asset or symbol text could not be parsed
    InvalidAsset(String),
    /// Binary or JSON (de)serialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningError::InvalidKeyFormat(msg) => write!(f, "Invalid key format: {msg}"),
            SigningError::ChecksumMismatch(input) => write!(f, "Checksum mismatch: {input}"),
            SigningError::InvalidScalar(msg) => write!(f, "Invalid private scalar: {msg}"),
            SigningError::InvalidName(name) => write!(f, "Invalid name: {name}"),
            SigningError::NameTooLong(name) => {
                write!(f, "Name too long (max 13 characters): {name}")
            }
            SigningError::MalformedVarint(msg) => write!(f, "Malformed varint: {msg}"),
            SigningError::InvalidChainId(id) => write!(f, "Invalid chain id: {id}"),
            SigningError::InvalidBlockId(id) => write!(f, "Invalid block id: {id}"),
            SigningError::NoActionsAdded => write!(f, "Transaction has no actions"),
            SigningError::AlreadyBuilt => write!(f, "Transaction builder was already built"),
            SigningError::RecoveryFailed(msg) => write!(f, "Public key recovery failed: {msg}"),
            SigningError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected} bytes, got {actual}")
            }
            SigningError::InvalidBase58(msg) => write!(f, "Invalid base58 encoding: {msg}"),
            SigningError::InvalidExpiration(msg) => write!(f, "Invalid expiration: {msg}"),
            SigningError::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            SigningError::SigningFailed(msg) => write!(f, "Signing failed: {msg}"),
            SigningError::InvalidAsset(msg) => write!(f, "Invalid asset: {msg}"),
            SigningError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            SigningError::Config(msg) => write!(f, "Configuration error: {msg}"),
            SigningError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for SigningError {}

impl From<std::io::Error> for SigningError {
    fn from(err: std::io::Error) -> Self {
        SigningError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SigningError {
    fn from(err: serde_json::Error) -> Self {
        SigningError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for SigningError {
    fn from(err: hex::FromHexError) -> Self {
        SigningError::Serialization(format!("invalid hex: {err}"))
    }
}

impl From<toml::de::Error> for SigningError {
    fn from(err: toml::de::Error) -> Self {
        SigningError::Config(err.to_string())
    }
}
