//! Pairwise masking seeds and mask derivation.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::iter;

use derive_more::{AsMut, AsRef};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sodiumoxide::crypto::box_;

use crate::{
    crypto::{
        encrypt::{PublicEncryptKey, SecretEncryptKey, SEALBYTES},
        hash::Sha256,
        prng::generate_integer,
        ByteObject,
    },
    mask::{
        config::MaskConfig,
        iv::MaskingIv,
        object::{MaskVect, MaskingError},
    },
};

#[derive(AsRef, AsMut, Clone, Debug, PartialEq, Eq)]
/// A seed shared by exactly two clients from which both derive the same masks.
///
/// When this goes out of scope, its contents will be zeroed out.
pub struct MaskSeed(box_::Seed);

impl ByteObject for MaskSeed {
    const LENGTH: usize = box_::SEEDBYTES;

    fn from_slice(bytes: &[u8]) -> Option<Self> {
        box_::Seed::from_slice(bytes).map(Self)
    }

    fn zeroed() -> Self {
        Self(box_::Seed([0_u8; Self::LENGTH]))
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl MaskSeed {
    /// Encrypts this seed with the given public key of the peer as an [`EncryptedMaskSeed`].
    pub fn encrypt(&self, pk: &PublicEncryptKey) -> EncryptedMaskSeed {
        EncryptedMaskSeed(pk.encrypt(self.as_slice()))
    }

    /// Derives a mask of given length for the masked object identified by `iv`.
    ///
    /// The `ChaCha20` stream is keyed by `SHA256(seed || iv)`, hence every iv yields an
    /// independent mask from the same seed.
    pub fn derive_mask(&self, iv: &MaskingIv, len: usize, config: MaskConfig) -> MaskVect {
        let key = Sha256::hash_parts(vec![self.as_slice(), iv.as_slice()]);
        let mut prng = ChaCha20Rng::from_seed(key.as_array());
        let order = config.order();
        let rand_ints = iter::repeat_with(|| generate_integer(&mut prng, &order))
            .take(len)
            .collect();
        MaskVect::new(config, rand_ints)
    }
}

#[derive(AsRef, AsMut, Clone, Debug, PartialEq, Eq, Hash)]
/// A mask seed sealed for the receiving peer.
pub struct EncryptedMaskSeed(Vec<u8>);

impl From<Vec<u8>> for EncryptedMaskSeed {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl ByteObject for EncryptedMaskSeed {
    const LENGTH: usize = SEALBYTES + MaskSeed::LENGTH;

    fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == Self::LENGTH {
            Some(Self(bytes.to_vec()))
        } else {
            None
        }
    }

    fn zeroed() -> Self {
        Self(vec![0_u8; Self::LENGTH])
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl EncryptedMaskSeed {
    /// Decrypts this seed as a [`MaskSeed`].
    ///
    /// # Errors
    /// Fails if the decryption fails.
    pub fn decrypt(
        &self,
        pk: &PublicEncryptKey,
        sk: &SecretEncryptKey,
    ) -> Result<MaskSeed, MaskingError> {
        MaskSeed::from_slice(
            sk.decrypt(self.as_slice(), pk)
                .or(Err(MaskingError::InvalidSeed))?
                .as_slice(),
        )
        .ok_or(MaskingError::InvalidSeed)
    }
}
