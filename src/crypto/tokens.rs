/// Single-use token codec
///
/// A raw token is 32 bytes from the OS RNG, hex-encoded (256 bits of
/// entropy). The stored form is hex(SHA-256(raw)): deterministic so it can
/// key a database lookup, one-way so a leaked ledger row yields nothing
/// redeemable.
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A freshly issued token pair
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Transmitted to the user, never persisted
    pub raw: String,
    /// Persisted to the ledger, never transmitted
    pub stored: String,
}

/// Generate a new raw token and its stored form
pub fn issue() -> IssuedToken {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    let stored = derive(&raw);

    IssuedToken { raw, stored }
}

/// Derive the stored form of a raw token
pub fn derive(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a candidate raw token against a stored form.
/// Mismatch is `false`, never an error.
pub fn verify(candidate: &str, stored: &str) -> bool {
    let computed = derive(candidate);
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip() {
        let token = issue();
        assert!(verify(&token.raw, &token.stored));
        assert_eq!(derive(&token.raw), token.stored);
    }

    #[test]
    fn test_mismatch_is_false() {
        let token = issue();
        assert!(!verify("not-the-token", &token.stored));
        assert!(!verify(&token.raw, &derive("different")));
    }

    #[test]
    fn test_raw_token_shape() {
        let token = issue();
        // 32 bytes hex-encoded
        assert_eq!(token.raw.len(), 64);
        assert!(token.raw.chars().all(|c| c.is_ascii_hexdigit()));
        // Stored form is not the raw token
        assert_ne!(token.raw, token.stored);
    }

    #[test]
    fn test_issuance_entropy() {
        let mut raws = HashSet::new();
        for _ in 0..1000 {
            assert!(raws.insert(issue().raw));
        }
    }
}
