use crate::error::{Result, SigningError};
use crate::utils::{base58check_decode, base58check_encode, Checksum};
use crate::wallet::keys::PublicKey;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const SIGNATURE_LEN: usize = 65;
pub const SIGNATURE_PREFIX: &str = "SIG_K1_";

/// Added to the recovery id: 27, plus 4 because the key is compressed
pub const RECOVERY_BYTE_OFFSET: u8 = 27 + 4;

/// Compact recoverable signature: `recovery byte ‖ r ‖ s`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_parts(recovery_id: RecoveryId, signature: &EcdsaSignature) -> Signature {
        let mut out = [0u8; SIGNATURE_LEN];
        out[0] = RECOVERY_BYTE_OFFSET + recovery_id.to_byte();
        out[1..].copy_from_slice(&signature.to_bytes());
        Signature(out)
    }

    /// Accepts recovery bytes 27..=34, i.e. both the compressed and the
    /// uncompressed-key convention
    pub fn from_bytes(bytes: &[u8]) -> Result<Signature> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SigningError::LengthMismatch {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            });
        }
        if !(27..27 + 8).contains(&bytes[0]) {
            return Err(SigningError::InvalidSignature(format!(
                "recovery byte {} out of range",
                bytes[0]
            )));
        }
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(bytes);
        Ok(Signature(out))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn recovery_byte(&self) -> u8 {
        self.0[0]
    }

    pub fn recovery_id(&self) -> Result<RecoveryId> {
        RecoveryId::from_byte((self.0[0] - 27) & 0x03).ok_or_else(|| {
            SigningError::InvalidSignature(format!("bad recovery byte {}", self.0[0]))
        })
    }

    pub fn r(&self) -> &[u8] {
        &self.0[1..33]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[33..]
    }

    pub fn to_ecdsa(&self) -> Result<EcdsaSignature> {
        EcdsaSignature::from_slice(&self.0[1..])
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))
    }

    /// Whether nodes accept this signature. Both r and s must be exactly
    /// 32 bytes in DER: no high bit set, and no leading zero byte that
    /// DER would strip.
    pub fn is_canonical(&self) -> bool {
        is_canonical_rs(&self.0[1..])
    }

    /// Recovers the compressed public key that produced this signature over
    /// `digest`
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> Result<PublicKey> {
        let signature = self.to_ecdsa()?;
        let key = VerifyingKey::recover_from_prehash(digest, &signature, self.recovery_id()?)
            .map_err(|e| SigningError::RecoveryFailed(e.to_string()))?;
        Ok(PublicKey::from_verifying_key(&key))
    }
}

/// `r ‖ s` form of `Signature::is_canonical`
pub(crate) fn is_canonical_rs(rs: &[u8]) -> bool {
    let canonical_half = |half: &[u8]| half[0] & 0x80 == 0 && !(half[0] == 0 && half[1] & 0x80 == 0);
    rs.len() == 64 && canonical_half(&rs[..32]) && canonical_half(&rs[32..])
}

impl FromStr for Signature {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
            SigningError::InvalidSignature(format!("expected {SIGNATURE_PREFIX} prefix: {s}"))
        })?;
        let bytes = base58check_decode(body, SIGNATURE_LEN, Checksum::K1)?;
        Signature::from_bytes(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SIGNATURE_PREFIX}{}",
            base58check_encode(&self.0, Checksum::K1)
        )
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_string()).finish()
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> [u8; SIGNATURE_LEN] {
        let mut bytes = [0x11u8; SIGNATURE_LEN];
        bytes[0] = 32;
        bytes
    }

    #[test]
    fn test_string_roundtrip() {
        let signature = Signature::from_bytes(&sample_bytes()).unwrap();
        let text = signature.to_string();
        assert!(text.starts_with(SIGNATURE_PREFIX));
        assert_eq!(text.parse::<Signature>().unwrap(), signature);
    }

    #[test]
    fn test_recovery_id_from_byte() {
        let signature = Signature::from_bytes(&sample_bytes()).unwrap();
        assert_eq!(signature.recovery_id().unwrap().to_byte(), 1);

        let mut legacy = sample_bytes();
        legacy[0] = 28;
        let signature = Signature::from_bytes(&legacy).unwrap();
        assert_eq!(signature.recovery_id().unwrap().to_byte(), 1);
    }

    #[test]
    fn test_rejects_bad_recovery_byte() {
        let mut bytes = sample_bytes();
        bytes[0] = 0;
        assert!(matches!(
            Signature::from_bytes(&bytes),
            Err(SigningError::InvalidSignature(_))
        ));
        bytes[0] = 35;
        assert!(Signature::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_wrong_prefix_and_length() {
        let text = Signature::from_bytes(&sample_bytes()).unwrap().to_string();
        let wrong = text.replace(SIGNATURE_PREFIX, "SIG_R1_");
        assert!(matches!(
            wrong.parse::<Signature>(),
            Err(SigningError::InvalidSignature(_))
        ));
        assert!(matches!(
            Signature::from_bytes(&[0u8; 64]),
            Err(SigningError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_canonical_rule() {
        let mut rs = [0x11u8; 64];
        assert!(is_canonical_rs(&rs));

        // High bit on r
        rs[0] = 0x80;
        assert!(!is_canonical_rs(&rs));

        // Leading zero on s that DER would strip
        rs[0] = 0x11;
        rs[32] = 0x00;
        rs[33] = 0x7f;
        assert!(!is_canonical_rs(&rs));

        // Leading zero kept because the next byte has its high bit set
        rs[33] = 0x80;
        assert!(is_canonical_rs(&rs));
    }

    #[test]
    fn test_r_and_s_split() {
        let mut bytes = sample_bytes();
        bytes[1] = 0xaa;
        bytes[33] = 0xbb;
        let signature = Signature::from_bytes(&bytes).unwrap();
        assert_eq!(signature.r().len(), 32);
        assert_eq!(signature.s().len(), 32);
        assert_eq!(signature.r()[0], 0xaa);
        assert_eq!(signature.s()[0], 0xbb);
    }
}
