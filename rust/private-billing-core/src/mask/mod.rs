//! Masking, aggregation and unmasking of the shared cycle quantities.
//!
//! # Masking
//! A client hides its contribution `v` to a cycle-wide total by embedding it into a finite group
//! and adding a mask. The masks are derived by a [`SharedMaskGenerator`] from the pairwise seeds
//! the client exchanged with every other client of the cycle and from a [`MaskingIv`] that names
//! the masked quantity and the round. The group is described by a [`MaskConfig`], which must be
//! identical for all clients.
//!
//! ```
//! # use private_billing_core::mask::{MaskConfig, MaskingIv, SharedMaskGenerator};
//! let mut alice = SharedMaskGenerator::new(MaskConfig::default());
//! let mut bob = SharedMaskGenerator::new(MaskConfig::default());
//! let seed = alice.seed_for_peer(1);
//! bob.consume_foreign_seed(seed, 0);
//! let seed = bob.seed_for_peer(0);
//! alice.consume_foreign_seed(seed, 1);
//! assert!(alice.is_stable() && bob.is_stable());
//!
//! let iv = MaskingIv::derive(1, "individual_deviations");
//! let masked_alice = alice.mask(&[1.5, -2.0], &iv).unwrap();
//! let masked_bob = bob.mask(&[0.5, 1.0], &iv).unwrap();
//! ```
//!
//! # Aggregation
//! An [`Aggregation`] sums masked vectors in the group. Once the vectors of the complete group
//! are aggregated the masks cancel and [`Aggregation::unmask()`] yields the plain totals. The sum
//! is exact, hence independent of the aggregation order.
//!
//! ```
//! # use private_billing_core::mask::{Aggregation, MaskConfig, MaskingIv, SharedMaskGenerator};
//! # let mut alice = SharedMaskGenerator::new(MaskConfig::default());
//! # let mut bob = SharedMaskGenerator::new(MaskConfig::default());
//! # let seed = alice.seed_for_peer(1);
//! # bob.consume_foreign_seed(seed, 0);
//! # let seed = bob.seed_for_peer(0);
//! # alice.consume_foreign_seed(seed, 1);
//! # let iv = MaskingIv::derive(1, "individual_deviations");
//! # let masked_alice = alice.mask(&[1.5, -2.0], &iv).unwrap();
//! # let masked_bob = bob.mask(&[0.5, 1.0], &iv).unwrap();
//! let mut aggregation = Aggregation::new(MaskConfig::default(), 2);
//! aggregation.aggregate(&masked_bob).unwrap();
//! aggregation.aggregate(&masked_alice).unwrap();
//! assert_eq!(aggregation.unmask().unwrap(), vec![2.0, -1.0]);
//! ```

pub(crate) mod config;
pub(crate) mod generator;
pub(crate) mod iv;
pub(crate) mod object;
pub(crate) mod seed;

pub use self::{
    config::{BoundType, GroupType, MaskConfig, ParticipantType, MAX_PRECISION},
    generator::SharedMaskGenerator,
    iv::MaskingIv,
    object::{Aggregation, MaskVect, MaskingError},
    seed::{EncryptedMaskSeed, MaskSeed},
};
