//! Transaction signing
//!
//! A node only accepts a signature if its recovery byte reproduces the
//! signer's key and both r and s are "canonical" (see
//! `Signature::is_canonical`). Plain RFC 6979 output fails the second rule
//! roughly half the time, since a low-S signature still has a high-bit r
//! about as often as not. Signing retries with a counter-derived nonce until
//! it passes. The retry sequence is fixed, so the same key and
//! digest always give the same signature.

use crate::core::transaction::{create_signing_data, Transaction};
use crate::error::{Result, SigningError};
use crate::utils::sha256_digest;
use crate::wallet::keys::{PrivateKey, PublicKey};
use crate::wallet::signature::{is_canonical_rs, Signature};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use log::{debug, info};
use serde::Serialize;

const MAX_SIGNING_ATTEMPTS: u32 = 64;

/// Signs a 32-byte digest, returning a canonical low-S recoverable signature
pub fn sign_digest(key: &PrivateKey, digest: &[u8; 32]) -> Result<Signature> {
    for attempt in 0..MAX_SIGNING_ATTEMPTS {
        let signature = key.sign_prehash(digest, attempt)?;
        if !is_canonical_rs(&signature.to_bytes()) {
            debug!("Signature attempt {attempt} is not canonical, retrying");
            continue;
        }
        let recovery_id = find_recovery_id(key.public_key(), digest, &signature)?;
        return Ok(Signature::from_parts(recovery_id, &signature));
    }
    Err(SigningError::SigningFailed(format!(
        "no canonical signature after {MAX_SIGNING_ATTEMPTS} attempts"
    )))
}

/// Tries all four recovery ids and keeps the one that gives back `expected`
fn find_recovery_id(
    expected: &PublicKey,
    digest: &[u8; 32],
    signature: &EcdsaSignature,
) -> Result<RecoveryId> {
    for byte in 0u8..4 {
        let Some(candidate) = RecoveryId::from_byte(byte) else {
            continue;
        };
        if let Ok(recovered) = VerifyingKey::recover_from_prehash(digest, signature, candidate) {
            if PublicKey::from_verifying_key(&recovered) == *expected {
                return Ok(candidate);
            }
        }
    }
    Err(SigningError::RecoveryFailed(format!(
        "no recovery id reproduces {expected}"
    )))
}

/// True if `signature` over `digest` recovers to `public_key`
pub fn verify_digest(public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
    match signature.recover_public_key(digest) {
        Ok(recovered) => recovered == *public_key,
        Err(_) => false,
    }
}

/// Serializes `transaction`, builds the signing preimage for `chain_id` and
/// signs its SHA-256 digest
pub fn sign_transaction(
    chain_id: &str,
    transaction: &Transaction,
    key: &PrivateKey,
) -> Result<SignedTransaction> {
    let packed_trx = transaction.serialize();
    let signing_data = create_signing_data(chain_id, &packed_trx)?;
    let digest = sha256_digest(&signing_data);
    debug!("Signing digest {}", hex::encode(digest));

    let signature = sign_digest(key, &digest)?;
    let signed = SignedTransaction {
        transaction: transaction.clone(),
        signatures: vec![signature],
        packed_trx,
        public_key: *key.public_key(),
    };
    info!(
        "Signed transaction {} ({} actions) with {}",
        signed.id(),
        transaction.actions.len(),
        key.public_key()
    );
    Ok(signed)
}

/// A transaction together with its packed bytes and signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<Signature>,
    pub packed_trx: Vec<u8>,
    /// Key that produced the signature
    pub public_key: PublicKey,
}

impl SignedTransaction {
    pub fn id(&self) -> String {
        hex::encode(sha256_digest(&self.packed_trx))
    }

    /// First signature in `SIG_K1_` form
    pub fn signature_string(&self) -> Option<String> {
        self.signatures.first().map(Signature::to_string)
    }

    /// Keys recovered from every signature, in signature order
    pub fn recover_signers(&self, chain_id: &str) -> Result<Vec<PublicKey>> {
        let digest = sha256_digest(&create_signing_data(chain_id, &self.packed_trx)?);
        self.signatures
            .iter()
            .map(|signature| signature.recover_public_key(&digest))
            .collect()
    }

    /// Payload for the node's `push_transaction` endpoint
    pub fn to_packed(&self) -> PackedTransaction {
        PackedTransaction {
            signatures: self.signatures.clone(),
            compression: 0,
            packed_context_free_data: String::new(),
            packed_trx: hex::encode(&self.packed_trx),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_packed())?)
    }
}

/// Wire form accepted by `/v1/chain/push_transaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedTransaction {
    pub signatures: Vec<Signature>,
    pub compression: u8,
    pub packed_context_free_data: String,
    pub packed_trx: String,
}
