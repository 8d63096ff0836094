//! Fixed point encoding of real values into plaintext slots.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use crate::hiding::HidingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Maps reals to plaintext slots and back.
///
/// A slot of scale `k` holds `round(v * 10^(precision * k))`. Slots live in the centered range
/// of the plaintext modulus.
pub(crate) struct FixedPoint {
    precision: u8,
    plaintext_modulus: u64,
}

impl FixedPoint {
    pub(crate) fn new(precision: u8, plaintext_modulus: u64) -> Self {
        Self {
            precision,
            plaintext_modulus,
        }
    }

    pub(crate) fn precision(&self) -> u8 {
        self.precision
    }

    /// Gets `10^(precision * scale)`, the factor of a slot of the given scale.
    pub(crate) fn factor(&self, scale: u8) -> Result<i64, HidingError> {
        10_i64
            .checked_pow(self.precision as u32 * scale as u32)
            .filter(|factor| (*factor as u64) < self.plaintext_modulus / 2)
            .ok_or(HidingError::ScaleOverflow(scale))
    }

    pub(crate) fn encode(&self, values: &[f64], scale: u8) -> Result<Vec<i64>, HidingError> {
        let factor = self.factor(scale)? as f64;
        let bound = (self.plaintext_modulus / 2) as f64;
        values
            .iter()
            .map(|value| {
                let slot = (value * factor).round();
                if slot.is_finite() && slot.abs() < bound {
                    Ok(slot as i64)
                } else {
                    Err(HidingError::ValueOutOfRange(*value))
                }
            })
            .collect()
    }

    /// Checks that slots of magnitude `bound` at the given scale fit into the centered plaintext
    /// range, which makes sure that a result decrypts to its exact value.
    pub(crate) fn check_bound(&self, bound: f64, scale: u8) -> Result<f64, HidingError> {
        if bound.is_finite() && bound < (self.plaintext_modulus / 2) as f64 {
            Ok(bound)
        } else {
            let factor = self.factor(scale)? as f64;
            Err(HidingError::ValueOutOfRange(bound / factor))
        }
    }

    pub(crate) fn decode(&self, slots: &[i64], scale: u8) -> Result<Vec<f64>, HidingError> {
        let factor = self.factor(scale)? as f64;
        Ok(slots.iter().map(|slot| *slot as f64 / factor).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hiding::PLAINTEXT_MODULUS;

    #[test]
    fn test_factor() {
        let fixed_point = FixedPoint::new(5, PLAINTEXT_MODULUS);
        assert_eq!(fixed_point.factor(0).unwrap(), 1);
        assert_eq!(fixed_point.factor(2).unwrap(), 10_000_000_000);
        assert!(matches!(
            fixed_point.factor(3),
            Err(HidingError::ScaleOverflow(3))
        ));
    }

    #[test]
    fn test_encode_and_decode() {
        let fixed_point = FixedPoint::new(5, PLAINTEXT_MODULUS);
        let slots = fixed_point.encode(&[0.21, -1.5, 0.0], 1).unwrap();
        assert_eq!(slots, vec![21_000, -150_000, 0]);
        assert_eq!(fixed_point.decode(&slots, 1).unwrap(), vec![0.21, -1.5, 0.0]);
        assert_eq!(fixed_point.encode(&[1.0, 0.0], 0).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        let fixed_point = FixedPoint::new(5, PLAINTEXT_MODULUS);
        assert!(matches!(
            fixed_point.encode(&[1e5], 2),
            Err(HidingError::ValueOutOfRange(_))
        ));
        assert!(fixed_point.encode(&[f64::INFINITY], 1).is_err());
    }

    #[test]
    fn test_check_bound() {
        let fixed_point = FixedPoint::new(5, PLAINTEXT_MODULUS);
        let half = (PLAINTEXT_MODULUS / 2) as f64;
        assert_eq!(fixed_point.check_bound(half - 1.0, 2).unwrap(), half - 1.0);
        match fixed_point.check_bound(6.3e14, 2) {
            Err(HidingError::ValueOutOfRange(value)) => assert!((value - 63_000.0).abs() < 1e-6),
            result => panic!("unexpected {:?}", result),
        }
        assert!(fixed_point.check_bound(f64::INFINITY, 1).is_err());
    }
}
