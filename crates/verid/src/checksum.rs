//! The keyed 8-bit integrity tag stamped into every identifier.
//!
//! The tag is an XOR fold of the identifier's payload bytes seeded with a
//! single byte derived from the secret key. It is cheap and deterministic, and
//! it is **not** a MAC: there are only 256 possible tags, distinct secrets can
//! fold to the same byte, and anyone who sees one identifier with its tag can
//! recover the secret block. Treat a passing [`verify`] as "probably minted
//! by a generator sharing this secret", never as authentication of untrusted
//! input.

use crate::VerifiableId;

/// The single byte folded out of a secret key.
///
/// Derived once per generator and reused for every signature.
///
/// # Example
///
/// ```
/// use verid::SecretBlock;
///
/// assert_eq!(SecretBlock::derive("").as_byte(), 0x00);
/// assert_eq!(SecretBlock::derive(" ").as_byte(), 0x20);
/// // Repeated characters cancel out.
/// assert_eq!(SecretBlock::derive("  ").as_byte(), 0x00);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SecretBlock(u8);

impl SecretBlock {
    /// Folds every character of `secret_key` into one byte.
    ///
    /// Each character contributes the XOR of the four bytes of its Unicode
    /// scalar value. An empty key yields `0`.
    pub fn derive(secret_key: &str) -> Self {
        let block = secret_key.chars().fold(0u8, |block, c| {
            let r = u32::from(c);
            block ^ (r as u8) ^ ((r >> 8) as u8) ^ ((r >> 16) as u8) ^ ((r >> 24) as u8)
        });
        Self(block)
    }

    /// Wraps an already-derived block.
    pub const fn from_byte(block: u8) -> Self {
        Self(block)
    }

    /// Returns the raw block byte.
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Computes the checksum for `payload`.
    ///
    /// The low 8 bits of `payload` (the checksum slot) are ignored. The
    /// remaining bytes are XOR-ed, least significant first, into an
    /// accumulator seeded with the block.
    pub const fn sign(self, payload: u64) -> u8 {
        let mut rest = payload & !VerifiableId::CHECKSUM_MASK;
        let mut verify = self.0;
        while rest > 0 {
            verify ^= rest as u8;
            rest >>= 8;
        }
        verify
    }

    /// Returns `true` if the checksum stored in the low byte of `id` matches
    /// the one recomputed from its payload.
    pub const fn verify(self, id: u64) -> bool {
        self.sign(id) as u64 == id & VerifiableId::CHECKSUM_MASK
    }
}

impl From<&str> for SecretBlock {
    fn from(secret_key: &str) -> Self {
        Self::derive(secret_key)
    }
}

/// Checks that `id` carries the checksum a generator keyed with `secret_key`
/// would have stamped.
///
/// Accepts any `u64`: values outside the 48-bit layout are folded the same way
/// and simply fail or pass on their bytes. Never panics.
///
/// # Example
///
/// ```
/// assert!(verid::verify(0x101, ""));
/// assert!(!verid::verify(0x102, ""));
/// assert!(verid::verify(0x121, " "));
/// ```
pub fn verify(id: u64, secret_key: &str) -> bool {
    SecretBlock::derive(secret_key).verify(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_folds_payload_bytes_into_block() {
        let cases = [
            ("", 0x100, 0x1),
            ("", 0xff00, 0xff),
            ("", 0xffff00, 0x0),
            (" ", 0x100, 0x21),
            ("  ", 0x100, 0x1),
        ];

        for (secret, payload, want) in cases {
            assert_eq!(
                SecretBlock::derive(secret).sign(payload),
                want,
                "secret {secret:?}, payload {payload:#x}"
            );
        }
    }

    #[test]
    fn sign_ignores_existing_checksum_byte() {
        let block = SecretBlock::derive("k");
        assert_eq!(block.sign(0x1234_5600), block.sign(0x1234_56ff));
    }

    #[test]
    fn verify_matches_known_vectors() {
        let cases = [
            (0x101, "", true),
            (0xffff, "", true),
            (0xffff00, "", true),
            (0x121, " ", true),
            (0x101, "  ", true),
            (0x102, "", false),
            (0x103, "  ", false),
        ];

        for (id, secret, want) in cases {
            assert_eq!(verify(id, secret), want, "id {id:#x}, secret {secret:?}");
        }
    }

    #[test]
    fn derive_uses_every_byte_of_the_code_point() {
        // U+00E9: single non-zero byte
        assert_eq!(SecretBlock::derive("é").as_byte(), 0xe9);
        // U+20AC: 0x20 ^ 0xac
        assert_eq!(SecretBlock::derive("€").as_byte(), 0x20 ^ 0xac);
        // U+1F600: 0x01 ^ 0xf6 ^ 0x00
        assert_eq!(SecretBlock::derive("😀").as_byte(), 0x01 ^ 0xf6);
    }

    #[test]
    fn different_secret_fails_designed_vector() {
        // 0x121 is stamped for " "; the empty secret expects 0x01 instead.
        assert!(verify(0x121, " "));
        assert!(!verify(0x121, ""));
    }

    #[test]
    fn verify_accepts_full_u64_domain() {
        let block = SecretBlock::derive("secret");
        let id = u64::MAX & !VerifiableId::CHECKSUM_MASK;
        let signed = id | u64::from(block.sign(id));
        assert!(block.verify(signed));
        assert!(!block.verify(signed ^ 1));
    }
}
