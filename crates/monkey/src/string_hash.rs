//! Deterministic string digests used for hash keys.
//!
//! String hash keys use a short cryptographic digest so they are stable
//! across runs and platforms: SHAKE-128 over the UTF-8 bytes, truncated to
//! 32 bits and read little-endian. Collisions are possible at 32 bits;
//! lookups resolve them by comparing the stored key (see `value::Hash`).

use sha3::{
    Shake128,
    digest::{ExtendableOutput, Update, XofReader},
};

/// Digests a string to the 32-bit hash-key value, widened to `u64`.
#[must_use]
pub(crate) fn shake128_32(value: &str) -> u64 {
    let mut hasher = Shake128::default();
    hasher.update(value.as_bytes());
    let mut reader = hasher.finalize_xof();
    let mut bytes = [0_u8; 4];
    reader.read(&mut bytes);
    u64::from(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::shake128_32;

    /// Equal strings digest equally; distinct strings (in practice) do not.
    #[test]
    fn digest_is_deterministic() {
        assert_eq!(shake128_32("Hello World"), shake128_32("Hello World"));
        assert_ne!(shake128_32("Hello World"), shake128_32("My name is johnny"));
    }

    /// The digest is the truncated SHAKE-128 output, so it fits in 32 bits.
    #[test]
    fn digest_fits_in_32_bits() {
        assert!(shake128_32("monkey") <= u64::from(u32::MAX));
    }
}
