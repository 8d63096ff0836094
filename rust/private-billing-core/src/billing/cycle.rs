//! Cycle contexts and shared cycle data.
//!
//! See the [billing module] documentation since this is a private module anyways.
//!
//! [billing module]: crate::billing

use serde::{Deserialize, Serialize};

use crate::{billing::ValidationError, CycleId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The public prices of a billing cycle, one per timeslot.
pub struct CycleContext {
    pub cycle_id: CycleId,
    pub cycle_length: usize,
    pub retail_prices: Vec<f64>,
    pub feed_in_tarifs: Vec<f64>,
    pub trading_prices: Vec<f64>,
}

impl CycleContext {
    /// Creates a checked cycle context.
    ///
    /// # Errors
    /// Fails if [`check_validity()`] fails.
    ///
    /// [`check_validity()`]: CycleContext::check_validity
    pub fn new(
        cycle_id: CycleId,
        cycle_length: usize,
        retail_prices: Vec<f64>,
        feed_in_tarifs: Vec<f64>,
        trading_prices: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        let cyc = Self {
            cycle_id,
            cycle_length,
            retail_prices,
            feed_in_tarifs,
            trading_prices,
        };
        cyc.check_validity()?;
        Ok(cyc)
    }

    /// Checks that all price sequences cover the cycle and hold non-negative prices.
    ///
    /// The ordering `feed_in_tarif <= trading_price <= retail_price` is not enforced.
    pub fn check_validity(&self) -> Result<(), ValidationError> {
        for (field, prices) in [
            ("retail_prices", &self.retail_prices),
            ("feed_in_tarifs", &self.feed_in_tarifs),
            ("trading_prices", &self.trading_prices),
        ]
        .iter()
        {
            ValidationError::check_length(*field, prices.len(), self.cycle_length)?;
            if let Some(price) = prices.iter().find(|price| price.is_nan() || **price < 0.0) {
                return Err(ValidationError::new(
                    *field,
                    format!("price {} is not a non-negative number", price),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The unmasked totals of all clients of a cycle.
pub struct SharedCycleData {
    pub total_deviations: Vec<f64>,
    pub total_p2p_consumers: Vec<f64>,
    pub total_p2p_producers: Vec<f64>,
}

impl SharedCycleData {
    /// Flags the timeslots with a net surplus.
    pub fn positive_total_deviation_flags(&self) -> Vec<bool> {
        self.total_deviations.iter().map(|dev| *dev > 0.0).collect()
    }

    /// Flags the timeslots with a net shortage.
    pub fn negative_total_deviation_flags(&self) -> Vec<bool> {
        self.total_deviations.iter().map(|dev| *dev < 0.0).collect()
    }

    /// Checks that the totals cover the cycle of `cyc`.
    pub fn check_validity(&self, cyc: &CycleContext) -> Result<(), ValidationError> {
        ValidationError::check_length(
            "total_deviations",
            self.total_deviations.len(),
            cyc.cycle_length,
        )?;
        ValidationError::check_length(
            "total_p2p_consumers",
            self.total_p2p_consumers.len(),
            cyc.cycle_length,
        )?;
        ValidationError::check_length(
            "total_p2p_producers",
            self.total_p2p_producers.len(),
            cyc.cycle_length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_context_validity() {
        assert!(CycleContext::new(0, 2, vec![0.21; 2], vec![0.05; 2], vec![0.11; 2]).is_ok());

        let error = CycleContext::new(0, 2, vec![0.21; 2], vec![0.05], vec![0.11; 2]).unwrap_err();
        assert_eq!(error.field, "feed_in_tarifs");

        let error =
            CycleContext::new(0, 2, vec![0.21, -0.1], vec![0.05; 2], vec![0.11; 2]).unwrap_err();
        assert_eq!(error.field, "retail_prices");

        let error =
            CycleContext::new(0, 1, vec![0.21], vec![0.05], vec![f64::NAN]).unwrap_err();
        assert_eq!(error.field, "trading_prices");
    }

    #[test]
    fn test_total_deviation_flags() {
        let scd = SharedCycleData {
            total_deviations: vec![1.5, 0.0, -0.25],
            total_p2p_consumers: vec![1.0; 3],
            total_p2p_producers: vec![1.0; 3],
        };
        assert_eq!(scd.positive_total_deviation_flags(), vec![true, false, false]);
        assert_eq!(scd.negative_total_deviation_flags(), vec![false, false, true]);
    }

    #[test]
    fn test_shared_cycle_data_validity() {
        let cyc = CycleContext::new(3, 3, vec![0.21; 3], vec![0.05; 3], vec![0.11; 3]).unwrap();
        let mut scd = SharedCycleData {
            total_deviations: vec![0.0; 3],
            total_p2p_consumers: vec![1.0; 3],
            total_p2p_producers: vec![1.0; 3],
        };
        assert!(scd.check_validity(&cyc).is_ok());
        scd.total_p2p_producers.pop();
        assert_eq!(
            scd.check_validity(&cyc).unwrap_err().field,
            "total_p2p_producers"
        );
    }
}
