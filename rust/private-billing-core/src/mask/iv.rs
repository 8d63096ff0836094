//! Masking initialisation vectors.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use derive_more::AsRef;

use crate::crypto::{hash::Sha256, ByteObject};

#[derive(AsRef, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifies one masked quantity of one masking round.
///
/// The iv is derived, never stored, so that every client reproduces the same iv on its own.
pub struct MaskingIv(Sha256);

impl MaskingIv {
    /// Derives the iv of the quantity `name` in the given `round`.
    pub fn derive(round: u64, name: &str) -> Self {
        Self(Sha256::hash(format!("round={}, {}", round, name).as_bytes()))
    }

    /// Gets the iv bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(
            MaskingIv::derive(4, "p2p_consumer_flags"),
            MaskingIv::derive(4, "p2p_consumer_flags")
        );
        assert_eq!(
            MaskingIv::derive(4, "p2p_consumer_flags").as_slice(),
            Sha256::hash(b"round=4, p2p_consumer_flags").as_slice()
        );
    }

    #[test]
    fn test_derive_separates_rounds_and_names() {
        let iv = MaskingIv::derive(4, "p2p_consumer_flags");
        assert_ne!(iv, MaskingIv::derive(5, "p2p_consumer_flags"));
        assert_ne!(iv, MaskingIv::derive(4, "p2p_producer_flags"));
    }
}
