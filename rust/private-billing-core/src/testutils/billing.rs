//! Fixtures of billing cycles.

use crate::{
    billing::{CycleContext, Data, HiddenData},
    hiding::{HidingContext, HidingParams},
    mask::{MaskConfig, SharedMaskGenerator},
    ClientId,
    CycleId,
};

pub const RETAIL_PRICE: f64 = 0.21;
pub const FEED_IN_TARIF: f64 = 0.05;
pub const TRADING_PRICE: f64 = 0.11;

/// Creates a cycle context with constant prices.
pub fn cycle_context(cycle_id: CycleId, cycle_length: usize) -> CycleContext {
    CycleContext::new(
        cycle_id,
        cycle_length,
        vec![RETAIL_PRICE; cycle_length],
        vec![FEED_IN_TARIF; cycle_length],
        vec![TRADING_PRICE; cycle_length],
    )
    .unwrap()
}

/// Creates the mask generators of `nb_clients` clients, where every pair of clients exchanged
/// seeds in both directions. The clients are identified by their index.
pub fn mask_generators(nb_clients: usize) -> Vec<SharedMaskGenerator> {
    let mut generators: Vec<_> = (0..nb_clients)
        .map(|_| SharedMaskGenerator::new(MaskConfig::default()))
        .collect();
    for a in 0..nb_clients {
        for b in 0..nb_clients {
            if a != b {
                let seed = generators[a].seed_for_peer(b as ClientId);
                generators[b].consume_foreign_seed(seed, a as ClientId);
            }
        }
    }
    generators
}

/// Creates the hiding contexts of `nb_clients` clients with the testing parameters.
pub fn hiding_contexts(nb_clients: usize, cycle_length: usize) -> Vec<HidingContext> {
    mask_generators(nb_clients)
        .into_iter()
        .map(|generator| {
            HidingContext::new(cycle_length, &HidingParams::testing(), generator).unwrap()
        })
        .collect()
}

/// Creates the data of `client`.
pub fn data(
    client: ClientId,
    cycle_id: CycleId,
    utilization_promises: Vec<f64>,
    utilizations: Vec<f64>,
) -> Data {
    Data {
        client,
        cycle_id,
        utilization_promises,
        utilizations,
    }
}

/// Hides the data of every client under its own context.
pub fn hide_all(hcs: &[HidingContext], data: &[Data]) -> Vec<HiddenData> {
    hcs.iter()
        .zip(data)
        .map(|(hc, data)| data.hide(hc).unwrap())
        .collect()
}
