use ring::digest::{Context, SHA256};
use ripemd::{Digest as RipemdDigest, Ripemd160};

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}

/// SHA-256 applied twice, the checksum used by legacy WIF keys
pub fn double_sha256_digest(data: &[u8]) -> [u8; 32] {
    sha256_digest(&sha256_digest(data))
}

pub fn ripemd160_digest(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// RIPEMD-160 over `data ‖ suffix`, without copying `data`
pub fn ripemd160_with_suffix(data: &[u8], suffix: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256_digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160_digest(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn test_ripemd160_suffix_matches_concatenation() {
        let joined = ripemd160_digest(b"payloadK1");
        assert_eq!(ripemd160_with_suffix(b"payload", b"K1"), joined);
    }

    #[test]
    fn test_double_sha256() {
        let once = sha256_digest(b"hello");
        assert_eq!(double_sha256_digest(b"hello"), sha256_digest(&once));
    }
}
