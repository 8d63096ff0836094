//! Masking configurations.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::convert::TryFrom;

use anyhow::{anyhow, Context};
use num::{bigint::BigUint, traits::One};
use serde::{Deserialize, Serialize};

use crate::message::{
    traits::{FromBytes, ToBytes},
    DecodeError,
};

/// The highest supported number of decimal places of a masked value.
pub const MAX_PRECISION: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The order of the finite group in which masked values live.
pub enum GroupType {
    /// The smallest group that fits every admissible aggregate.
    Integer = 0,
    /// The next power of two above the smallest group.
    Power2 = 1,
}

impl TryFrom<u8> for GroupType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GroupType::Integer),
            1 => Ok(GroupType::Power2),
            _ => Err(anyhow!("invalid group type {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The absolute bound `10^k` on a single masked value.
pub enum BoundType {
    B0 = 0,
    B1 = 1,
    B2 = 2,
    B3 = 3,
    B4 = 4,
    B5 = 5,
    B6 = 6,
}

impl TryFrom<u8> for BoundType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BoundType::B0),
            1 => Ok(BoundType::B1),
            2 => Ok(BoundType::B2),
            3 => Ok(BoundType::B3),
            4 => Ok(BoundType::B4),
            5 => Ok(BoundType::B5),
            6 => Ok(BoundType::B6),
            _ => Err(anyhow!("invalid bound type {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The maximum number `10^k` of masked vectors that are summed up.
pub enum ParticipantType {
    P1 = 1,
    P2 = 2,
    P3 = 3,
    P4 = 4,
    P5 = 5,
    P6 = 6,
}

impl TryFrom<u8> for ParticipantType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ParticipantType::P1),
            2 => Ok(ParticipantType::P2),
            3 => Ok(ParticipantType::P3),
            4 => Ok(ParticipantType::P4),
            5 => Ok(ParticipantType::P5),
            6 => Ok(ParticipantType::P6),
            _ => Err(anyhow!("invalid participant type {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A masking configuration.
///
/// Every client of a cycle must mask with the same configuration, otherwise the masks don't
/// cancel and the aggregation is rejected.
pub struct MaskConfig {
    /// The group order flavour.
    pub group_type: GroupType,
    /// The number of decimal places kept when a value is embedded into the group.
    pub precision: u8,
    /// The bound on a single value.
    pub bound_type: BoundType,
    /// The bound on the number of aggregated vectors.
    pub participant_type: ParticipantType,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            group_type: GroupType::Power2,
            precision: 6,
            bound_type: BoundType::B6,
            participant_type: ParticipantType::P3,
        }
    }
}

impl MaskConfig {
    /// Gets the absolute bound on a single value.
    pub fn bound(&self) -> f64 {
        10_f64.powi(self.bound_type as i32)
    }

    /// Gets the maximum number of vectors which may be aggregated.
    pub fn max_participants(&self) -> u64 {
        10_u64.pow(self.participant_type as u32)
    }

    /// Gets the factor which shifts a value into the integers.
    pub fn scaling_factor(&self) -> u64 {
        10_u64.pow(self.precision as u32)
    }

    /// Gets the largest absolute integer an aggregate can reach.
    pub(crate) fn max_aggregate(&self) -> u128 {
        10_u128.pow(self.bound_type as u32)
            * self.scaling_factor() as u128
            * self.max_participants() as u128
    }

    /// Gets the order of the finite group.
    ///
    /// The group is large enough to represent every signed aggregate of at most
    /// [`max_participants()`] vectors without wrapping around.
    ///
    /// [`max_participants()`]: MaskConfig::max_participants
    pub fn order(&self) -> BigUint {
        let smallest = 2 * self.max_aggregate() + 1;
        match self.group_type {
            GroupType::Integer => BigUint::from(smallest),
            GroupType::Power2 => BigUint::one() << (128 - (smallest - 1).leading_zeros()) as usize,
        }
    }

    /// Gets the number of bytes needed to represent the largest element of the finite group.
    pub fn bytes_per_number(&self) -> usize {
        let max_element = self.order() - BigUint::one();
        ((max_element.bits() as usize) + 7) / 8
    }

    /// Checks whether the precision is supported.
    pub fn is_valid(&self) -> bool {
        self.precision <= MAX_PRECISION
    }
}

pub(crate) const MASK_CONFIG_BUFFER_LEN: usize = 4;

impl ToBytes for MaskConfig {
    fn buffer_length(&self) -> usize {
        MASK_CONFIG_BUFFER_LEN
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        let buffer = buffer.as_mut();
        buffer[0] = self.group_type as u8;
        buffer[1] = self.precision;
        buffer[2] = self.bound_type as u8;
        buffer[3] = self.participant_type as u8;
    }
}

impl FromBytes for MaskConfig {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        let bytes = buffer.as_ref();
        if bytes.len() < MASK_CONFIG_BUFFER_LEN {
            return Err(anyhow!(
                "invalid buffer length: {} < {}",
                bytes.len(),
                MASK_CONFIG_BUFFER_LEN
            ));
        }
        let config = Self {
            group_type: GroupType::try_from(bytes[0]).context("invalid masking config")?,
            precision: bytes[1],
            bound_type: BoundType::try_from(bytes[2]).context("invalid masking config")?,
            participant_type: ParticipantType::try_from(bytes[3])
                .context("invalid masking config")?,
        };
        if !config.is_valid() {
            return Err(anyhow!("invalid masking config: precision {}", config.precision));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskVect;

    fn config(group_type: GroupType) -> MaskConfig {
        MaskConfig {
            group_type,
            precision: 2,
            bound_type: BoundType::B1,
            participant_type: ParticipantType::P1,
        }
    }

    #[test]
    fn test_order_integer() {
        // 10 * 100 * 10 = 10_000, signed range needs 20_001 elements
        assert_eq!(config(GroupType::Integer).order(), BigUint::from(20_001_u32));
        assert_eq!(config(GroupType::Integer).bytes_per_number(), 2);
    }

    #[test]
    fn test_order_power2() {
        assert_eq!(config(GroupType::Power2).order(), BigUint::from(32_768_u32));
        assert_eq!(config(GroupType::Power2).bytes_per_number(), 2);
    }

    #[test]
    fn test_default_order_fits() {
        let config = MaskConfig::default();
        assert!(config.order() > BigUint::from(2 * config.max_aggregate()));
        assert_eq!(config.scaling_factor(), 1_000_000);
        assert_eq!(config.max_participants(), 1_000);
    }

    #[test]
    fn test_serialize() {
        let mut buf = vec![0xff; 4];
        config(GroupType::Power2).to_bytes(&mut buf);
        assert_eq!(buf, vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_deserialize() {
        let config = MaskConfig::from_byte_slice(&vec![0, 2, 1, 1]).unwrap();
        assert_eq!(config, self::config(GroupType::Integer));
    }

    #[test]
    fn test_deserialize_rejects_unknown_variants() {
        assert!(MaskConfig::from_byte_slice(&vec![2, 2, 1, 1]).is_err());
        assert!(MaskConfig::from_byte_slice(&vec![0, 2, 7, 1]).is_err());
        assert!(MaskConfig::from_byte_slice(&vec![0, 2, 1, 0]).is_err());
        assert!(MaskConfig::from_byte_slice(&vec![0, 10, 1, 1]).is_err());
        assert!(MaskConfig::from_byte_slice(&vec![0, 2, 1]).is_err());
    }

    macro_rules! test_bound {
        ($bound_type: ident, $bound: expr) => {
            paste::item! {
                #[test]
                fn [<test_bound_ $bound_type:lower>]() {
                    let config = MaskConfig {
                        bound_type: BoundType::$bound_type,
                        ..MaskConfig::default()
                    };
                    assert_eq!(config.bound(), $bound);
                    assert!(config.order() > BigUint::from(2 * config.max_aggregate()));
                    let object = MaskVect::embed(config, &[$bound, -$bound]).unwrap();
                    assert_eq!(object.decode(), vec![$bound, -$bound]);
                    assert!(MaskVect::embed(config, &[$bound + 1.0]).is_err());
                }
            }
        };
    }

    test_bound!(B0, 1.0);
    test_bound!(B1, 10.0);
    test_bound!(B2, 100.0);
    test_bound!(B3, 1_000.0);
    test_bound!(B4, 10_000.0);
    test_bound!(B5, 100_000.0);
    test_bound!(B6, 1_000_000.0);
}
