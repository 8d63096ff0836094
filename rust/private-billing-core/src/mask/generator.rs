//! The shared mask generator.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    crypto::{
        encrypt::{PublicEncryptKey, SecretEncryptKey},
        ByteObject,
    },
    mask::{
        config::MaskConfig,
        iv::MaskingIv,
        object::{MaskVect, MaskingError},
        seed::{EncryptedMaskSeed, MaskSeed},
    },
    ClientId,
};

#[derive(Debug, Clone)]
/// Derives masks which cancel out over a complete group of clients.
///
/// Every pair of clients shares two seeds, one generated by each side. A client adds the masks
/// derived from the seeds it generated ("owned") and subtracts the masks derived from the seeds
/// it received ("foreign"). Summed over the whole group each seed is added once and subtracted
/// once, so the masks of any `(round, name)` iv sum up to zero.
pub struct SharedMaskGenerator {
    config: MaskConfig,
    owned_seeds: HashMap<ClientId, MaskSeed>,
    foreign_seeds: HashMap<ClientId, MaskSeed>,
}

impl SharedMaskGenerator {
    /// Creates a generator without any peers.
    pub fn new(config: MaskConfig) -> Self {
        Self {
            config,
            owned_seeds: HashMap::new(),
            foreign_seeds: HashMap::new(),
        }
    }

    /// Gets the masking configuration.
    pub fn config(&self) -> MaskConfig {
        self.config
    }

    /// Checks whether the peers this generator created seeds for are exactly the peers it
    /// received seeds from.
    pub fn is_stable(&self) -> bool {
        let owned: HashSet<_> = self.owned_seeds.keys().collect();
        let foreign: HashSet<_> = self.foreign_seeds.keys().collect();
        owned == foreign
    }

    /// Creates a fresh seed for `peer`, replacing any earlier one.
    pub fn seed_for_peer(&mut self, peer: ClientId) -> MaskSeed {
        let seed = MaskSeed::generate();
        self.owned_seeds.insert(peer, seed.clone());
        debug!("created masking seed for peer {}", peer);
        seed
    }

    /// Creates a fresh seed for `peer` sealed with the peer's public key.
    pub fn encrypted_seed_for_peer(
        &mut self,
        peer: ClientId,
        peer_key: &PublicEncryptKey,
    ) -> EncryptedMaskSeed {
        self.seed_for_peer(peer).encrypt(peer_key)
    }

    /// Checks whether a seed was created for `peer`.
    pub fn has_seed_for_peer(&self, peer: ClientId) -> bool {
        self.owned_seeds.contains_key(&peer)
    }

    /// Stores the seed `peer` created for this client.
    pub fn consume_foreign_seed(&mut self, seed: MaskSeed, peer: ClientId) {
        self.foreign_seeds.insert(peer, seed);
        debug!("received masking seed from peer {}", peer);
    }

    /// Opens and stores the sealed seed `peer` created for this client.
    ///
    /// # Errors
    /// Fails if the seed can't be opened with the given keys.
    pub fn consume_encrypted_seed(
        &mut self,
        seed: &EncryptedMaskSeed,
        peer: ClientId,
        pk: &PublicEncryptKey,
        sk: &SecretEncryptKey,
    ) -> Result<(), MaskingError> {
        let seed = seed.decrypt(pk, sk)?;
        self.consume_foreign_seed(seed, peer);
        Ok(())
    }

    /// Forgets both seeds shared with `peer`.
    pub fn remove_peer(&mut self, peer: ClientId) {
        self.owned_seeds.remove(&peer);
        self.foreign_seeds.remove(&peer);
    }

    /// Gets the number of peers this generator holds seeds for.
    pub fn nb_peers(&self) -> usize {
        self.owned_seeds
            .keys()
            .chain(self.foreign_seeds.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Generates the masks of length `len` for the masked object identified by `iv`.
    ///
    /// Without any peers the masks are all zero.
    pub fn generate_masks(&self, iv: &MaskingIv, len: usize) -> Result<MaskVect, MaskingError> {
        let mut masks = MaskVect::zeros(self.config, len);
        for seed in self.owned_seeds.values() {
            masks.add(&seed.derive_mask(iv, len, self.config))?;
        }
        for seed in self.foreign_seeds.values() {
            masks.sub(&seed.derive_mask(iv, len, self.config))?;
        }
        Ok(masks)
    }

    /// Masks `values` for the masked object identified by `iv`.
    ///
    /// # Errors
    /// Fails if a value exceeds the masking bound.
    pub fn mask(&self, values: &[f64], iv: &MaskingIv) -> Result<MaskVect, MaskingError> {
        let mut masked = MaskVect::embed(self.config, values)?;
        masked.add(&self.generate_masks(iv, values.len())?)?;
        Ok(masked)
    }
}
