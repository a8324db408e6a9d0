//! Base58Check encoding with the two checksum flavours EOSIO uses
//!
//! Legacy WIF keys carry `sha256(sha256(payload))[..4]`. Everything newer
//! (`PUB_K1_`, `PVT_K1_`, `SIG_K1_`) carries `ripemd160(payload ‖ "K1")[..4]`,
//! and legacy `EOS...` public keys use plain `ripemd160(payload)[..4]`.

use crate::error::{Result, SigningError};
use crate::utils::crypto::{double_sha256_digest, ripemd160_with_suffix};
use zeroize::Zeroizing;

pub const CHECK_SUM_LEN: usize = 4;

/// Checksum algorithm appended to a Base58Check payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum<'a> {
    /// First 4 bytes of double SHA-256
    DoubleSha256,
    /// First 4 bytes of RIPEMD-160 over `payload ‖ suffix`
    Ripemd160(&'a [u8]),
}

impl Checksum<'_> {
    /// Suffix mixed into the modern key and signature checksums
    pub const K1: Checksum<'static> = Checksum::Ripemd160(b"K1");
    /// Unsalted RIPEMD-160, used by legacy `EOS...` public keys
    pub const PLAIN: Checksum<'static> = Checksum::Ripemd160(b"");

    fn compute(&self, payload: &[u8]) -> [u8; CHECK_SUM_LEN] {
        let mut out = [0u8; CHECK_SUM_LEN];
        match self {
            Checksum::DoubleSha256 => {
                out.copy_from_slice(&double_sha256_digest(payload)[..CHECK_SUM_LEN])
            }
            Checksum::Ripemd160(suffix) => {
                out.copy_from_slice(&ripemd160_with_suffix(payload, suffix)[..CHECK_SUM_LEN])
            }
        }
        out
    }
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| SigningError::InvalidBase58(e.to_string()))
}

/// Appends the checksum to `payload` and base58-encodes the result.
///
/// The payload may be a private scalar, so the working copy is wiped on drop.
pub fn base58check_encode(payload: &[u8], checksum: Checksum) -> String {
    let mut buf = Zeroizing::new(Vec::with_capacity(payload.len() + CHECK_SUM_LEN));
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum.compute(payload));
    base58_encode(&buf)
}

/// Decodes `text`, verifies its checksum and returns the payload.
///
/// The checksum is verified before the payload length, so a corrupted
/// string reports `ChecksumMismatch` even if the corruption changed the
/// decoded length. Both the decoded buffer and the returned payload are
/// wiped on drop, since `text` may be a private key.
pub fn base58check_decode(
    text: &str,
    expected_len: usize,
    checksum: Checksum,
) -> Result<Zeroizing<Vec<u8>>> {
    let data = Zeroizing::new(base58_decode(text)?);
    if data.len() < CHECK_SUM_LEN {
        return Err(SigningError::LengthMismatch {
            expected: expected_len + CHECK_SUM_LEN,
            actual: data.len(),
        });
    }

    let (payload, actual) = data.split_at(data.len() - CHECK_SUM_LEN);
    if checksum.compute(payload).as_slice() != actual {
        // The text may be a private key, so it stays out of the error
        return Err(SigningError::ChecksumMismatch(format!(
            "{} characters, {}-byte payload",
            text.len(),
            payload.len()
        )));
    }
    if payload.len() != expected_len {
        return Err(SigningError::LengthMismatch {
            expected: expected_len,
            actual: payload.len(),
        });
    }
    Ok(Zeroizing::new(payload.to_vec()))
}
