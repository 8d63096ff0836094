//! Masked vectors and their aggregation.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::{
    convert::TryInto,
    io::{Cursor, Write},
};

use anyhow::{anyhow, Context};
use num::{
    bigint::BigUint,
    traits::{ToPrimitive, Zero},
};
use thiserror::Error;

use crate::{
    mask::config::{MaskConfig, MASK_CONFIG_BUFFER_LEN},
    message::{
        traits::{FromBytes, ToBytes},
        DecodeError,
    },
};

#[derive(Debug, Error, PartialEq)]
/// Errors related to masking, aggregation and unmasking.
pub enum MaskingError {
    #[error("there is nothing to unmask")]
    EmptyInput,
    #[error("the masking configurations of the aggregated vectors differ")]
    ConfigMismatch,
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("value {0} exceeds the masking bound")]
    OutOfBounds(f64),
    #[error("the masked vector holds elements outside of the group")]
    InvalidObject,
    #[error("too many vectors aggregated: the configuration allows at most {0}")]
    TooManyContributions(u64),
    #[error("a masking seed could not be recovered")]
    InvalidSeed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A vector of finite group elements together with its masking configuration.
pub struct MaskVect {
    pub data: Vec<BigUint>,
    pub config: MaskConfig,
}

impl MaskVect {
    /// Creates a new vector from its elements.
    pub fn new(config: MaskConfig, data: Vec<BigUint>) -> Self {
        Self { data, config }
    }

    /// Creates the neutral vector of the given length.
    pub fn zeros(config: MaskConfig, len: usize) -> Self {
        Self::new(config, vec![BigUint::zero(); len])
    }

    /// Embeds plain values into the group.
    ///
    /// Values are rounded to the configured number of decimal places. Negative values wrap
    /// around the group order.
    ///
    /// # Errors
    /// Fails if a value is not finite or exceeds the configured bound.
    pub fn embed(config: MaskConfig, values: &[f64]) -> Result<Self, MaskingError> {
        let order = config.order();
        let bound = config.bound();
        let factor = config.scaling_factor() as f64;
        let data = values
            .iter()
            .map(|value| {
                if !value.is_finite() || value.abs() > bound {
                    return Err(MaskingError::OutOfBounds(*value));
                }
                let shifted = (value * factor).round() as i128;
                let magnitude = BigUint::from(shifted.unsigned_abs());
                if shifted < 0 {
                    Ok(&order - magnitude)
                } else {
                    Ok(magnitude)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config, data))
    }

    /// Gets the number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if all elements are valid group elements wrt the masking configuration.
    pub fn is_valid(&self) -> bool {
        let order = self.config.order();
        self.config.is_valid() && self.data.iter().all(|i| i < &order)
    }

    /// Adds `other` elementwise in the group.
    ///
    /// # Errors
    /// Fails if the configurations or lengths differ.
    pub fn add(&mut self, other: &MaskVect) -> Result<(), MaskingError> {
        self.check_compatible(other)?;
        let order = self.config.order();
        for (lhs, rhs) in self.data.iter_mut().zip(other.data.iter()) {
            *lhs = (&*lhs + rhs) % &order;
        }
        Ok(())
    }

    /// Subtracts `other` elementwise in the group.
    ///
    /// # Errors
    /// Fails if the configurations or lengths differ.
    pub fn sub(&mut self, other: &MaskVect) -> Result<(), MaskingError> {
        self.check_compatible(other)?;
        let order = self.config.order();
        for (lhs, rhs) in self.data.iter_mut().zip(other.data.iter()) {
            *lhs = (&*lhs + &order - rhs) % &order;
        }
        Ok(())
    }

    /// Maps the group elements back to signed values.
    ///
    /// Elements in the upper half of the group are read as negative numbers.
    pub fn decode(&self) -> Vec<f64> {
        let order = self.config.order();
        let half = &order >> 1_usize;
        let factor = self.config.scaling_factor() as f64;
        self.data
            .iter()
            .map(|element| {
                // the group order never exceeds 128 bits, see `MaskConfig::max_aggregate`
                let signed = if element > &half {
                    -((&order - element).to_u128().unwrap_or(u128::MAX) as f64)
                } else {
                    element.to_u128().unwrap_or(u128::MAX) as f64
                };
                signed / factor
            })
            .collect()
    }

    fn check_compatible(&self, other: &MaskVect) -> Result<(), MaskingError> {
        if self.config != other.config {
            return Err(MaskingError::ConfigMismatch);
        }
        if self.len() != other.len() {
            return Err(MaskingError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// An aggregator for masked vectors.
///
/// Summing a complete set of masked vectors cancels the masks. The sum is exact and does not
/// depend on the order of aggregation.
pub struct Aggregation {
    nb_aggregated: u64,
    object: MaskVect,
}

impl Aggregation {
    /// Creates a new, empty aggregator for vectors of the given length.
    pub fn new(config: MaskConfig, object_len: usize) -> Self {
        Self {
            nb_aggregated: 0,
            object: MaskVect::zeros(config, object_len),
        }
    }

    /// Gets the number of aggregated vectors.
    pub fn nb_aggregated(&self) -> u64 {
        self.nb_aggregated
    }

    /// Validates if aggregation of the aggregated vector with the given `object` may be safely
    /// performed.
    ///
    /// # Errors
    /// Fails on a configuration or length mismatch, on invalid group elements or if the maximum
    /// number of aggregated vectors is reached.
    pub fn validate_aggregation(&self, object: &MaskVect) -> Result<(), MaskingError> {
        if self.object.config != object.config {
            return Err(MaskingError::ConfigMismatch);
        }
        if self.object.len() != object.len() {
            return Err(MaskingError::LengthMismatch {
                expected: self.object.len(),
                actual: object.len(),
            });
        }
        if !object.is_valid() {
            return Err(MaskingError::InvalidObject);
        }
        let max = self.object.config.max_participants();
        if self.nb_aggregated >= max {
            return Err(MaskingError::TooManyContributions(max));
        }
        Ok(())
    }

    /// Aggregates the given `object`.
    ///
    /// # Errors
    /// Fails if [`validate_aggregation()`] fails.
    ///
    /// [`validate_aggregation()`]: Aggregation::validate_aggregation
    pub fn aggregate(&mut self, object: &MaskVect) -> Result<(), MaskingError> {
        self.validate_aggregation(object)?;
        self.object.add(object)?;
        self.nb_aggregated += 1;
        Ok(())
    }

    /// Reads the aggregate as plain values.
    ///
    /// # Errors
    /// Fails if nothing was aggregated.
    pub fn unmask(&self) -> Result<Vec<f64>, MaskingError> {
        if self.nb_aggregated == 0 {
            return Err(MaskingError::EmptyInput);
        }
        Ok(self.object.decode())
    }
}

impl From<Aggregation> for MaskVect {
    fn from(aggr: Aggregation) -> Self {
        aggr.object
    }
}

const NUMBERS_FIELD_LEN: usize = 4;

impl ToBytes for MaskVect {
    fn buffer_length(&self) -> usize {
        MASK_CONFIG_BUFFER_LEN + NUMBERS_FIELD_LEN + self.len() * self.config.bytes_per_number()
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        let bytes_per_number = self.config.bytes_per_number();
        let buffer = buffer.as_mut();
        let mut config_field = &mut buffer[..MASK_CONFIG_BUFFER_LEN];
        self.config.to_bytes(&mut config_field);

        let mut writer = Cursor::new(&mut buffer[MASK_CONFIG_BUFFER_LEN..]);
        let _ = writer.write(&(self.len() as u32).to_be_bytes()).unwrap();
        for number in self.data.iter() {
            let mut bytes = number.to_bytes_le();
            bytes.resize(bytes_per_number, 0);
            let _ = writer.write(&bytes).unwrap();
        }
    }
}

impl FromBytes for MaskVect {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        let bytes = buffer.as_ref();
        let config = MaskConfig::from_byte_slice(&bytes).context("invalid mask vector buffer")?;
        let numbers_end = MASK_CONFIG_BUFFER_LEN + NUMBERS_FIELD_LEN;
        if bytes.len() < numbers_end {
            return Err(anyhow!(
                "invalid buffer length: {} < {}",
                bytes.len(),
                numbers_end
            ));
        }
        // unwrap safe: the slice is exactly 4 bytes long
        let numbers =
            u32::from_be_bytes(bytes[MASK_CONFIG_BUFFER_LEN..numbers_end].try_into().unwrap())
                as usize;
        let bytes_per_number = config.bytes_per_number();
        let expected = numbers
            .checked_mul(bytes_per_number)
            .and_then(|data_len| data_len.checked_add(numbers_end))
            .ok_or_else(|| anyhow!("invalid mask vector buffer: numbers field overflows"))?;
        if bytes.len() != expected {
            return Err(anyhow!(
                "invalid mask vector buffer: expected {} bytes, got {}",
                expected,
                bytes.len()
            ));
        }
        let data = bytes[numbers_end..]
            .chunks_exact(bytes_per_number)
            .map(BigUint::from_bytes_le)
            .collect();
        let object = Self::new(config, data);
        if !object.is_valid() {
            return Err(anyhow!("invalid mask vector: element outside of the group"));
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::config::{BoundType, GroupType, ParticipantType};

    fn config() -> MaskConfig {
        MaskConfig {
            group_type: GroupType::Integer,
            precision: 2,
            bound_type: BoundType::B1,
            participant_type: ParticipantType::P1,
        }
    }

    #[test]
    fn test_embed_and_decode_signed_values() {
        let object = MaskVect::embed(config(), &[1.25, -3.5, 0.0, 10.0]).unwrap();
        assert_eq!(object.data[0], BigUint::from(125_u32));
        assert_eq!(object.data[1], BigUint::from(20_001_u32 - 350));
        assert_eq!(object.decode(), vec![1.25, -3.5, 0.0, 10.0]);
    }

    #[test]
    fn test_embed_rejects_out_of_bounds() {
        assert_eq!(
            MaskVect::embed(config(), &[10.5]),
            Err(MaskingError::OutOfBounds(10.5))
        );
        assert!(MaskVect::embed(config(), &[f64::NAN]).is_err());
    }

    #[test]
    fn test_add_and_sub_cancel() {
        let mut object = MaskVect::embed(config(), &[1.0, -2.0]).unwrap();
        let mask = MaskVect::new(
            config(),
            vec![BigUint::from(19_999_u32), BigUint::from(7_u32)],
        );
        object.add(&mask).unwrap();
        assert_ne!(object.decode(), vec![1.0, -2.0]);
        object.sub(&mask).unwrap();
        assert_eq!(object.decode(), vec![1.0, -2.0]);
    }

    #[test]
    fn test_aggregation() {
        let mut aggregation = Aggregation::new(config(), 2);
        assert_eq!(aggregation.unmask(), Err(MaskingError::EmptyInput));
        for values in [[1.5, -0.25], [-3.0, 0.75], [0.5, 0.5]].iter() {
            let object = MaskVect::embed(config(), values).unwrap();
            aggregation.aggregate(&object).unwrap();
        }
        assert_eq!(aggregation.nb_aggregated(), 3);
        assert_eq!(aggregation.unmask().unwrap(), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_aggregation_rejects_mismatches() {
        let aggregation = Aggregation::new(config(), 2);
        let short = MaskVect::embed(config(), &[1.0]).unwrap();
        assert_eq!(
            aggregation.validate_aggregation(&short),
            Err(MaskingError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        let other = MaskConfig {
            precision: 3,
            ..config()
        };
        let foreign = MaskVect::embed(other, &[1.0, 1.0]).unwrap();
        assert_eq!(
            aggregation.validate_aggregation(&foreign),
            Err(MaskingError::ConfigMismatch)
        );
        let invalid = MaskVect::new(config(), vec![BigUint::from(20_001_u32); 2]);
        assert_eq!(
            aggregation.validate_aggregation(&invalid),
            Err(MaskingError::InvalidObject)
        );
    }

    #[test]
    fn test_aggregation_limit() {
        let mut aggregation = Aggregation::new(config(), 1);
        let object = MaskVect::embed(config(), &[0.0]).unwrap();
        for _ in 0..10 {
            aggregation.aggregate(&object).unwrap();
        }
        assert_eq!(
            aggregation.aggregate(&object),
            Err(MaskingError::TooManyContributions(10))
        );
    }

    #[test]
    fn test_serialization() {
        let object = MaskVect::embed(config(), &[1.25, -3.5]).unwrap();
        let mut buffer = vec![0xff; object.buffer_length()];
        object.to_bytes(&mut buffer);
        assert_eq!(
            buffer,
            vec![
                0, 2, 1, 1, // config
                0, 0, 0, 2, // numbers
                125, 0, // 125
                0xc3, 0x4c, // 20_001 - 350 = 19_651
            ]
        );
        assert_eq!(MaskVect::from_byte_slice(&buffer).unwrap(), object);
    }

    #[test]
    fn test_deserialization_rejects_truncated_and_invalid() {
        let bytes = vec![0, 2, 1, 1, 0, 0, 0, 2, 125, 0, 0x0f];
        assert!(MaskVect::from_byte_slice(&bytes).is_err());
        let bytes = vec![0, 2, 1, 1, 0, 0, 0, 1, 0xff, 0xff];
        assert!(MaskVect::from_byte_slice(&bytes).is_err());
    }
}
