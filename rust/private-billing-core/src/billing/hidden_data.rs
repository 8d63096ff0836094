//! Hidden utilization data of a client.
//!
//! See the [billing module] documentation since this is a private module anyways.
//!
//! [billing module]: crate::billing

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    billing::{BillingError, CycleContext, HiddenBill, SharedCycleData, ValidationError},
    hiding::{Ciphertext, HomomorphicOps, PublicHidingContext},
    mask::{Aggregation, MaskVect},
    ClientId,
    CycleId,
};

#[derive(Debug, Clone, PartialEq)]
/// The contribution of one client to one cycle.
///
/// The ciphertexts are encrypted under the context `phc` of the client. The masked vectors only
/// reveal something once they are summed over all clients of the cycle.
pub struct HiddenData {
    pub client: ClientId,
    pub cycle_id: CycleId,
    pub consumptions: Ciphertext,
    pub supplies: Ciphertext,
    pub accepted_consumer_flags: Ciphertext,
    pub accepted_producer_flags: Ciphertext,
    /// Flags the timeslots in which the client itself deviated positively.
    pub positive_deviation_flags: Ciphertext,
    pub masked_individual_deviations: MaskVect,
    pub masked_p2p_consumer_flags: MaskVect,
    pub masked_p2p_producer_flags: MaskVect,
    pub phc: Arc<PublicHidingContext>,
}

fn check_values(field: &'static str, ct: &Ciphertext) -> Result<(), ValidationError> {
    if ct.scale() == 1 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "expected encrypted values"))
    }
}

fn check_flags(field: &'static str, ct: &Ciphertext) -> Result<(), ValidationError> {
    if ct.scale() == 0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "expected encrypted flags"))
    }
}

fn check_masked(
    field: &'static str,
    masked: &MaskVect,
    cycle_length: usize,
) -> Result<(), ValidationError> {
    ValidationError::check_length(field, masked.len(), cycle_length)?;
    if masked.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::new(field, "elements outside of the masking group"))
    }
}

impl HiddenData {
    /// Checks received data against the cycle it claims to belong to.
    ///
    /// # Errors
    /// Fails with an error naming the first offending field.
    pub fn check_validity(&self, cyc: &CycleContext) -> Result<(), ValidationError> {
        if self.cycle_id != cyc.cycle_id {
            return Err(ValidationError::new(
                "cycle_id",
                format!("expected cycle {}, got {}", cyc.cycle_id, self.cycle_id),
            ));
        }
        if self.phc.cycle_length() != cyc.cycle_length {
            return Err(ValidationError::new(
                "phc",
                format!(
                    "expected cycle length {}, got {}",
                    cyc.cycle_length,
                    self.phc.cycle_length()
                ),
            ));
        }
        check_values("consumptions", &self.consumptions)?;
        check_values("supplies", &self.supplies)?;
        check_flags("accepted_consumer_flags", &self.accepted_consumer_flags)?;
        check_flags("accepted_producer_flags", &self.accepted_producer_flags)?;
        check_flags("positive_deviation_flags", &self.positive_deviation_flags)?;
        check_masked(
            "masked_individual_deviations",
            &self.masked_individual_deviations,
            cyc.cycle_length,
        )?;
        check_masked(
            "masked_p2p_consumer_flags",
            &self.masked_p2p_consumer_flags,
            cyc.cycle_length,
        )?;
        check_masked(
            "masked_p2p_producer_flags",
            &self.masked_p2p_producer_flags,
            cyc.cycle_length,
        )
    }

    /// Sums the masked vectors of all clients of a cycle.
    ///
    /// The masks only cancel if `cycle_data` is the complete set of the cycle without
    /// duplicates, which this can't check.
    ///
    /// # Errors
    /// Fails with [`BillingError::EmptyCycleData`] if `cycle_data` is empty and with a masking
    /// error if the masked vectors don't fit together.
    pub fn unmask_data<'a, I>(cycle_data: I) -> Result<SharedCycleData, BillingError>
    where
        I: IntoIterator<Item = &'a HiddenData>,
    {
        let mut cycle_data = cycle_data.into_iter().peekable();
        let first = cycle_data.peek().ok_or(BillingError::EmptyCycleData)?;
        let new_aggregation = |masked: &MaskVect| Aggregation::new(masked.config, masked.len());
        let mut deviations = new_aggregation(&first.masked_individual_deviations);
        let mut consumers = new_aggregation(&first.masked_p2p_consumer_flags);
        let mut producers = new_aggregation(&first.masked_p2p_producer_flags);

        for datum in cycle_data {
            deviations.aggregate(&datum.masked_individual_deviations)?;
            consumers.aggregate(&datum.masked_p2p_consumer_flags)?;
            producers.aggregate(&datum.masked_p2p_producer_flags)?;
        }
        info!("unmasked the data of {} clients", deviations.nb_aggregated());

        Ok(SharedCycleData {
            total_deviations: deviations.unmask()?,
            total_p2p_consumers: consumers.unmask()?,
            total_p2p_producers: producers.unmask()?,
        })
    }

    /// Computes the encrypted bill and reward of the client.
    ///
    /// The case distinctions between accepted and rejected timeslots are blended
    /// arithmetically, so nothing encrypted is ever inspected.
    ///
    /// # Errors
    /// Fails if the evaluation keys can't be activated or a homomorphic operation fails.
    pub fn compute_hidden_bill(
        &self,
        scd: &SharedCycleData,
        cyc: &CycleContext,
    ) -> Result<HiddenBill, BillingError> {
        let phc = &self.phc;
        phc.activate_keys()?;

        // a zero count implies zero deviation flags of every client in that timeslot
        let consumer_counts = scd.total_p2p_consumers.iter().map(|count| count.max(1.0));
        let producer_counts = scd.total_p2p_producers.iter().map(|count| count.max(1.0));

        // rejected: retail price for consumption, feed-in tarif for supply
        let bill_no_p2p = phc.scale(&self.consumptions, &cyc.retail_prices)?;
        let reward_no_p2p = phc.scale(&self.supplies, &cyc.feed_in_tarifs)?;

        // accepted: trading price for both
        let base_bill = phc.scale(&self.consumptions, &cyc.trading_prices)?;
        let base_reward = phc.scale(&self.supplies, &cyc.trading_prices)?;

        // a positively deviating consumer buys its share of a net shortage at retail price
        let bill_supplement = cyc
            .trading_prices
            .iter()
            .zip(&cyc.retail_prices)
            .zip(&scd.total_deviations)
            .zip(consumer_counts)
            .zip(scd.negative_total_deviation_flags())
            .map(|((((trading, retail), total), count), shortage)| {
                if shortage {
                    (trading - retail) * total / count
                } else {
                    0.0
                }
            })
            .collect::<Vec<_>>();
        let bill_supplement = phc.scale(&self.positive_deviation_flags, &bill_supplement)?;

        // a positively deviating producer sells its share of a net surplus at feed-in tarif
        let reward_penalty = cyc
            .feed_in_tarifs
            .iter()
            .zip(&cyc.trading_prices)
            .zip(&scd.total_deviations)
            .zip(producer_counts)
            .zip(scd.positive_total_deviation_flags())
            .map(|((((feed_in, trading), total), count), surplus)| {
                if surplus {
                    (feed_in - trading) * total / count
                } else {
                    0.0
                }
            })
            .collect::<Vec<_>>();
        let reward_penalty = phc.scale(&self.positive_deviation_flags, &reward_penalty)?;

        let bill_p2p = phc.add(&base_bill, &bill_supplement)?;
        let reward_p2p = phc.add(&base_reward, &reward_penalty)?;

        let hidden_bill = phc.blend(&bill_p2p, &bill_no_p2p, &self.accepted_consumer_flags)?;
        let hidden_reward = phc.blend(&reward_p2p, &reward_no_p2p, &self.accepted_producer_flags)?;
        debug!(
            "computed hidden bill of client {} for cycle {}",
            self.client, self.cycle_id
        );

        Ok(HiddenBill {
            cycle_id: self.cycle_id,
            hidden_bill,
            hidden_reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hiding::HidingError,
        mask::MaskConfig,
        testutils::billing::{cycle_context, data, hide_all, hiding_contexts},
    };

    fn compute_bills(
        promises: Vec<Vec<f64>>,
        utilizations: Vec<Vec<f64>>,
    ) -> (SharedCycleData, Vec<(Vec<f64>, Vec<f64>)>) {
        let cycle_length = promises[0].len();
        let cyc = cycle_context(1, cycle_length);
        let hcs = hiding_contexts(promises.len(), cycle_length);
        let data: Vec<_> = promises
            .into_iter()
            .zip(utilizations)
            .enumerate()
            .map(|(client, (promises, utilizations))| {
                data(client as ClientId, 1, promises, utilizations)
            })
            .collect();
        let hidden = hide_all(&hcs, &data);
        let scd = HiddenData::unmask_data(&hidden).unwrap();
        let bills = hidden
            .iter()
            .zip(hcs.iter())
            .map(|(hidden, hc)| {
                let bill = hidden
                    .compute_hidden_bill(&scd, &cyc)
                    .unwrap()
                    .reveal(hc)
                    .unwrap();
                bill.check_validity(&cyc).unwrap();
                (bill.bill, bill.reward)
            })
            .collect();
        (scd, bills)
    }

    #[test]
    fn test_bill_without_p2p_trading() {
        let (_, bills) = compute_bills(vec![vec![0.0; 4]], vec![vec![1.0; 4]]);
        assert_eq!(bills[0].0, vec![0.21; 4]);
        assert_eq!(bills[0].1, vec![0.0; 4]);

        let (_, bills) = compute_bills(vec![vec![0.0; 4]], vec![vec![1.0, -2.0, 0.5, 0.0]]);
        assert_eq!(bills[0].0, vec![0.21, 0.0, 0.105, 0.0]);
        assert_eq!(bills[0].1, vec![0.0, 0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_bill_total_without_p2p_trading() {
        let cyc = cycle_context(1, 4);
        let hcs = hiding_contexts(1, 4);
        let hidden = data(0, 1, vec![0.0; 4], vec![1.0; 4]).hide(&hcs[0]).unwrap();
        let scd = HiddenData::unmask_data(vec![&hidden]).unwrap();
        let bill = hidden
            .compute_hidden_bill(&scd, &cyc)
            .unwrap()
            .reveal(&hcs[0])
            .unwrap();
        assert_eq!(bill.cycle_id, 1);
        assert!((bill.total() + 0.84).abs() < 1e-9);
    }

    #[test]
    fn test_bill_with_zero_deviation() {
        let (scd, bills) = compute_bills(
            vec![vec![1.0; 4], vec![-1.0; 4]],
            vec![vec![1.0; 4], vec![-1.0; 4]],
        );
        assert_eq!(scd.total_deviations, vec![0.0; 4]);
        assert_eq!(scd.total_p2p_consumers, vec![1.0; 4]);
        assert_eq!(scd.total_p2p_producers, vec![1.0; 4]);
        assert_eq!(bills[0], (vec![0.11; 4], vec![0.0; 4]));
        assert_eq!(bills[1], (vec![0.0; 4], vec![0.11; 4]));
    }

    #[test]
    fn test_bill_supplement_on_shortage() {
        // the consumer uses one unit more than promised in the first timeslot
        let (scd, bills) = compute_bills(
            vec![vec![1.0, 1.0], vec![-1.0, -1.0]],
            vec![vec![2.0, 1.0], vec![-1.0, -1.0]],
        );
        assert_eq!(scd.total_deviations, vec![-1.0, 0.0]);
        assert_eq!(bills[0], (vec![0.32, 0.11], vec![0.0, 0.0]));
        assert_eq!(bills[1], (vec![0.0, 0.0], vec![0.11, 0.11]));
    }

    #[test]
    fn test_reward_penalty_on_surplus() {
        // the producer supplies two units more than promised in the first timeslot
        let (scd, bills) = compute_bills(
            vec![vec![1.0, 1.0], vec![-1.0, -1.0]],
            vec![vec![1.0, 1.0], vec![-3.0, -1.0]],
        );
        assert_eq!(scd.total_deviations, vec![2.0, 0.0]);
        assert_eq!(bills[0], (vec![0.11, 0.11], vec![0.0, 0.0]));
        assert_eq!(bills[1], (vec![0.0, 0.0], vec![0.21, 0.11]));
    }

    #[test]
    fn test_no_supplement_on_surplus() {
        // the consumer uses one unit more than promised, but the producer covers it
        let (scd, bills) = compute_bills(vec![vec![1.0], vec![-1.0]], vec![vec![2.0], vec![-3.0]]);
        assert_eq!(scd.total_deviations, vec![1.0]);
        assert_eq!(bills[0], (vec![0.22], vec![0.0]));
        assert_eq!(bills[1], (vec![0.0], vec![0.27]));
    }

    #[test]
    fn test_no_penalty_on_shortage() {
        // the producer supplies one unit more than promised, but the consumer uses it up
        let (scd, bills) = compute_bills(vec![vec![1.0], vec![-1.0]], vec![vec![4.0], vec![-2.0]]);
        assert_eq!(scd.total_deviations, vec![-2.0]);
        assert_eq!(bills[0], (vec![0.64], vec![0.0]));
        assert_eq!(bills[1], (vec![0.0], vec![0.22]));
    }

    #[test]
    fn test_penalty_is_shared_by_producers() {
        let (scd, bills) = compute_bills(
            vec![vec![2.0], vec![-1.0], vec![-1.0]],
            vec![vec![2.0], vec![-3.0], vec![-2.0]],
        );
        assert_eq!(scd.total_deviations, vec![3.0]);
        assert_eq!(scd.total_p2p_producers, vec![2.0]);
        assert_eq!(bills[0], (vec![0.22], vec![0.0]));
        assert_eq!(bills[1], (vec![0.0], vec![0.24]));
        assert_eq!(bills[2], (vec![0.0], vec![0.13]));
    }

    #[test]
    fn test_bill_beyond_plaintext_range() {
        let cyc = cycle_context(1, 2);
        let hcs = hiding_contexts(1, 2);
        let hidden = data(0, 1, vec![0.0, 0.0], vec![300_000.0, 1.0])
            .hide(&hcs[0])
            .unwrap();
        let scd = HiddenData::unmask_data(vec![&hidden]).unwrap();
        assert!(matches!(
            hidden.compute_hidden_bill(&scd, &cyc),
            Err(BillingError::Hiding(HidingError::ValueOutOfRange(_)))
        ));

        // the largest bill that still fits
        let hidden = data(0, 1, vec![0.0, 0.0], vec![250_000.0, 1.0])
            .hide(&hcs[0])
            .unwrap();
        let bill = hidden
            .compute_hidden_bill(&scd, &cyc)
            .unwrap()
            .reveal(&hcs[0])
            .unwrap();
        assert_eq!(bill.bill, vec![52_500.0, 0.21]);
    }

    #[test]
    fn test_unmask_empty_cycle_data() {
        let result = HiddenData::unmask_data(Vec::<HiddenData>::new().iter());
        assert!(matches!(result, Err(BillingError::EmptyCycleData)));
    }

    #[test]
    fn test_unmask_is_order_independent() {
        let hcs = hiding_contexts(3, 3);
        let data = vec![
            data(0, 1, vec![1.0, 0.0, -2.0], vec![1.5, 0.25, -1.0]),
            data(1, 1, vec![-1.0, 2.0, 0.0], vec![-0.5, 2.0, 3.0]),
            data(2, 1, vec![0.5, -0.5, 1.0], vec![0.5, -1.25, 0.75]),
        ];
        let hidden = hide_all(&hcs, &data);

        let scd = HiddenData::unmask_data(&hidden).unwrap();
        let permutations = [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for permutation in permutations.iter() {
            let permuted = permutation.iter().map(|i| &hidden[*i]);
            assert_eq!(HiddenData::unmask_data(permuted).unwrap(), scd);
        }

        // the masks cancel
        let mut expected = vec![0.0; 3];
        for datum in data.iter() {
            for (total, dev) in expected.iter_mut().zip(datum.individual_deviations()) {
                *total += dev;
            }
        }
        for (total, expected) in scd.total_deviations.iter().zip(expected) {
            assert!((total - expected).abs() < 1e-9);
        }
        assert_eq!(scd.total_p2p_consumers, vec![2.0, 1.0, 1.0]);
        assert_eq!(scd.total_p2p_producers, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unmask_of_incomplete_set_is_garbage() {
        let hcs = hiding_contexts(3, 2);
        let data: Vec<_> = (0..3)
            .map(|client| data(client, 1, vec![1.0, 1.0], vec![1.0, 1.0]))
            .collect();
        let hidden = hide_all(&hcs, &data);
        let scd = HiddenData::unmask_data(&hidden[..2]).unwrap();
        assert_ne!(scd.total_p2p_consumers, vec![2.0, 2.0]);
    }

    #[test]
    fn test_check_validity() {
        let cyc = cycle_context(1, 4);
        let hcs = hiding_contexts(1, 4);
        let mut hidden = data(0, 1, vec![1.0; 4], vec![1.0; 4]).hide(&hcs[0]).unwrap();
        assert!(hidden.check_validity(&cyc).is_ok());

        hidden.masked_p2p_producer_flags = MaskVect::zeros(MaskConfig::default(), 3);
        let error = hidden.check_validity(&cyc).unwrap_err();
        assert_eq!(error.field, "masked_p2p_producer_flags");

        hidden.accepted_consumer_flags = hidden.consumptions.clone();
        let error = hidden.check_validity(&cyc).unwrap_err();
        assert_eq!(error.field, "accepted_consumer_flags");

        let error = hidden.check_validity(&cycle_context(2, 4)).unwrap_err();
        assert_eq!(error.field, "cycle_id");
    }
}
