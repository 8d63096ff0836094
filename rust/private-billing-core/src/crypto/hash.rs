//! `SHA256` digests for masking ivs, mask keys and context identities.
//!
//! See the [crypto module] documentation since this is a private module anyways.
//!
//! [crypto module]: crate::crypto

use derive_more::{AsMut, AsRef, From};
use serde::{Deserialize, Serialize};
use sodiumoxide::crypto::hash::sha256;

use crate::crypto::ByteObject;

#[derive(AsRef, AsMut, From, Serialize, Deserialize, Hash, Eq, PartialEq, Copy, Clone, Debug)]
/// A digest of the `SHA256` hash function.
pub struct Sha256(sha256::Digest);

impl_byte_object!(Sha256, sha256::Digest, sha256::DIGESTBYTES);

impl Sha256 {
    /// Computes the digest of the message `m`.
    pub fn hash(m: &[u8]) -> Self {
        Self(sha256::hash(m))
    }

    /// Computes the digest of the concatenation of all `parts`.
    pub fn hash_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut state = sha256::State::new();
        for part in parts {
            state.update(part);
        }
        Self(state.finalize())
    }

    /// Gets this digest as an array.
    pub fn as_array(&self) -> [u8; Self::LENGTH] {
        (self.0).0
    }
}
