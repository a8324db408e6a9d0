use crate::error::{Result, SigningError};
use crate::utils::{base58check_decode, base58check_encode, sha256_digest, Checksum};
use crate::wallet::signature::Signature;
use crate::wallet::signer;
use k256::ecdsa::signature::hazmat::{PrehashSigner, RandomizedPrehashSigner};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33;

/// Version byte in front of the scalar in a legacy WIF payload
const WIF_VERSION: u8 = 0x80;

pub const LEGACY_PUBLIC_PREFIX: &str = "EOS";
pub const MODERN_PUBLIC_PREFIX: &str = "PUB_K1_";
pub const MODERN_PRIVATE_PREFIX: &str = "PVT_K1_";

/// Textual flavour of a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// `5...` WIF private keys and `EOS...` public keys
    #[default]
    Legacy,
    /// `PVT_K1_...` private keys and `PUB_K1_...` public keys
    Modern,
}

impl FromStr for KeyFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(KeyFormat::Legacy),
            "modern" => Ok(KeyFormat::Modern),
            _ => Err(format!(
                "Invalid key format: {s}. Valid options: legacy, modern"
            )),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::Legacy => write!(f, "legacy"),
            KeyFormat::Modern => write!(f, "modern"),
        }
    }
}

/// Compressed secp256k1 public key (parity byte + x coordinate)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Accepts a 33-byte SEC1 compressed point that lies on the curve
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(SigningError::LengthMismatch {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            });
        }
        VerifyingKey::from_sec1_bytes(bytes).map_err(|e| {
            SigningError::InvalidKeyFormat(format!("not a valid secp256k1 point: {e}"))
        })?;
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(PublicKey(out))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> PublicKey {
        let point = key.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        PublicKey(out)
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.0)
            .map_err(|e| SigningError::InvalidKeyFormat(format!("not a valid secp256k1 point: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// `EOS` + base58(key ‖ ripemd160(key)[..4])
    pub fn to_legacy_string(&self) -> String {
        self.to_legacy_string_with_prefix(LEGACY_PUBLIC_PREFIX)
    }

    /// Same as `to_legacy_string` with a chain-specific prefix
    pub fn to_legacy_string_with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}{}", base58check_encode(&self.0, Checksum::PLAIN))
    }

    /// `PUB_K1_` + base58(key ‖ ripemd160(key ‖ "K1")[..4])
    pub fn to_modern_string(&self) -> String {
        format!(
            "{MODERN_PUBLIC_PREFIX}{}",
            base58check_encode(&self.0, Checksum::K1)
        )
    }

    pub fn to_string_as(&self, format: KeyFormat, legacy_prefix: &str) -> String {
        match format {
            KeyFormat::Legacy => self.to_legacy_string_with_prefix(legacy_prefix),
            KeyFormat::Modern => self.to_modern_string(),
        }
    }

    /// Parses a legacy-format key carrying `prefix` instead of `EOS`
    pub fn from_legacy_str(text: &str, prefix: &str) -> Result<PublicKey> {
        let body = text.strip_prefix(prefix).ok_or_else(|| {
            SigningError::InvalidKeyFormat(format!("expected {prefix} prefix: {text}"))
        })?;
        let bytes = base58check_decode(body, PUBLIC_KEY_LEN, Checksum::PLAIN)?;
        PublicKey::from_bytes(&bytes)
    }
}

impl FromStr for PublicKey {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(body) = s.strip_prefix(MODERN_PUBLIC_PREFIX) {
            let bytes = base58check_decode(body, PUBLIC_KEY_LEN, Checksum::K1)?;
            return PublicKey::from_bytes(&bytes);
        }
        if s.starts_with(LEGACY_PUBLIC_PREFIX) {
            return PublicKey::from_legacy_str(s, LEGACY_PUBLIC_PREFIX);
        }
        Err(SigningError::InvalidKeyFormat(format!(
            "unrecognized public key prefix: {s}"
        )))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_legacy_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&self.to_legacy_string())
            .finish()
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed secp256k1 private key.
///
/// The scalar lives inside `SigningKey`, which wipes it on drop. The text it
/// was parsed from is not kept; re-display goes through `to_wif` or
/// `to_modern_string`.
pub struct PrivateKey {
    signing_key: SigningKey,
    public_key: PublicKey,
    format: KeyFormat,
}

impl PrivateKey {
    /// Parses a legacy WIF (`5...`) or modern (`PVT_K1_...`) private key
    pub fn from_wif(text: &str) -> Result<PrivateKey> {
        if let Some(body) = text.strip_prefix(MODERN_PRIVATE_PREFIX) {
            let scalar = base58check_decode(body, PRIVATE_KEY_LEN, Checksum::K1)?;
            return PrivateKey::from_bytes(&scalar, KeyFormat::Modern);
        }

        if text.starts_with('5') || text.starts_with('6') {
            let payload = base58check_decode(text, PRIVATE_KEY_LEN + 1, Checksum::DoubleSha256)?;
            if payload[0] != WIF_VERSION {
                return Err(SigningError::InvalidKeyFormat(format!(
                    "unexpected WIF version byte 0x{:02x}",
                    payload[0]
                )));
            }
            return PrivateKey::from_bytes(&payload[1..], KeyFormat::Legacy);
        }

        // Never echo the input: it may be a mistyped secret
        Err(SigningError::InvalidKeyFormat(format!(
            "expected a WIF key starting with 5 or a {MODERN_PRIVATE_PREFIX} key ({} characters given)",
            text.len()
        )))
    }

    /// Wraps a raw 32-byte big-endian scalar
    pub fn from_bytes(bytes: &[u8], format: KeyFormat) -> Result<PrivateKey> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(SigningError::LengthMismatch {
                expected: PRIVATE_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| {
            SigningError::InvalidScalar("scalar is zero or not below the curve order".to_string())
        })?;
        Ok(PrivateKey::from_signing_key(signing_key, format))
    }

    /// Fresh random key from the thread-local CSPRNG
    pub fn generate(format: KeyFormat) -> PrivateKey {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        PrivateKey::from_signing_key(signing_key, format)
    }

    fn from_signing_key(signing_key: SigningKey, format: KeyFormat) -> PrivateKey {
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        PrivateKey {
            signing_key,
            public_key,
            format,
        }
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// Public key derived as `scalar × G`, compressed
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn scalar_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LEN]> {
        let mut scalar = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        scalar.copy_from_slice(&self.signing_key.to_bytes());
        scalar
    }

    /// Legacy WIF text, `5...`
    pub fn to_wif(&self) -> Zeroizing<String> {
        let scalar = self.scalar_bytes();
        let mut payload = Zeroizing::new(Vec::with_capacity(PRIVATE_KEY_LEN + 1));
        payload.push(WIF_VERSION);
        payload.extend_from_slice(&scalar[..]);
        Zeroizing::new(base58check_encode(&payload, Checksum::DoubleSha256))
    }

    /// Modern text, `PVT_K1_...`
    pub fn to_modern_string(&self) -> Zeroizing<String> {
        let scalar = self.scalar_bytes();
        let encoded = Zeroizing::new(base58check_encode(&scalar[..], Checksum::K1));
        let mut text = Zeroizing::new(String::with_capacity(
            MODERN_PRIVATE_PREFIX.len() + encoded.len(),
        ));
        text.push_str(MODERN_PRIVATE_PREFIX);
        text.push_str(&encoded);
        text
    }

    /// Raw RFC 6979 signature over a 32-byte digest, normalized to low-S.
    ///
    /// `attempt` 0 is plain RFC 6979. Later attempts pass
    /// `sha256(attempt_le ‖ 0u32_le)` to the nonce derivation as RFC 6979
    /// additional data, so every attempt is deterministic for a given key and
    /// digest and does not depend on any RNG implementation.
    pub fn sign_prehash(&self, digest: &[u8; 32], attempt: u32) -> Result<EcdsaSignature> {
        let signed: std::result::Result<EcdsaSignature, k256::ecdsa::Error> = if attempt == 0 {
            self.signing_key.sign_prehash(digest)
        } else {
            let mut entropy = RetryEntropy::new(attempt);
            self.signing_key.sign_prehash_with_rng(&mut entropy, digest)
        };
        let signature = signed.map_err(|e| SigningError::SigningFailed(e.to_string()))?;
        Ok(signature.normalize_s().unwrap_or(signature))
    }

    /// Canonical recoverable signature over `digest`, see `signer::sign_digest`
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature> {
        signer::sign_digest(self, digest)
    }
}

/// Fixed byte stream handed to the RFC 6979 signer on retries.
///
/// Block `i` is `sha256(attempt_le ‖ i_le)`; the signer reads only the first
/// 32 bytes. The nonce stays secret because RFC 6979 keys its HMAC with the
/// private scalar, so this input only has to differ between attempts.
struct RetryEntropy {
    attempt: u32,
    block: u32,
    buf: [u8; 32],
    pos: usize,
}

impl RetryEntropy {
    fn new(attempt: u32) -> RetryEntropy {
        RetryEntropy {
            attempt,
            block: 0,
            buf: [0u8; 32],
            pos: 32,
        }
    }

    fn refill(&mut self) {
        let mut input = [0u8; 8];
        input[..4].copy_from_slice(&self.attempt.to_le_bytes());
        input[4..].copy_from_slice(&self.block.to_le_bytes());
        self.buf = sha256_digest(&input);
        self.block = self.block.wrapping_add(1);
        self.pos = 0;
    }
}

impl RngCore for RetryEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            if self.pos == self.buf.len() {
                self.refill();
            }
            *byte = self.buf[self.pos];
            self.pos += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for RetryEntropy {}

impl FromStr for PrivateKey {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        PrivateKey::from_wif(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
