use private_billing_core::{
    billing::{CycleContext, Data, HiddenBill, HiddenData},
    crypto::{EncryptKeyPair, SigningKeyPair},
    hiding::{HidingContext, HidingParams},
    mask::{MaskConfig, SharedMaskGenerator},
    ClientId,
};

const CYCLE_LENGTH: usize = 3;

struct Client {
    id: ClientId,
    encrypt_keys: EncryptKeyPair,
    signing_keys: SigningKeyPair,
    generator: SharedMaskGenerator,
}

impl Client {
    fn new(id: ClientId) -> Self {
        Self {
            id,
            encrypt_keys: EncryptKeyPair::generate(),
            signing_keys: SigningKeyPair::generate(),
            generator: SharedMaskGenerator::new(MaskConfig::default()),
        }
    }
}

/// Exchanges sealed seeds between every pair of clients.
fn exchange_seeds(clients: &mut [Client]) {
    for a in 0..clients.len() {
        for b in 0..clients.len() {
            if a == b {
                continue;
            }
            let (peer, peer_keys) = (clients[b].id, clients[b].encrypt_keys.public);
            let sealed = clients[a]
                .generator
                .encrypted_seed_for_peer(peer, &peer_keys);
            let sender = clients[a].id;
            let receiver = &mut clients[b];
            receiver
                .generator
                .consume_encrypted_seed(
                    &sealed,
                    sender,
                    &receiver.encrypt_keys.public,
                    &receiver.encrypt_keys.secret,
                )
                .unwrap();
        }
    }
}

#[test]
fn test_billing_cycle() {
    private_billing_core::init().unwrap();

    let mut clients: Vec<_> = (10..13).map(Client::new).collect();
    exchange_seeds(&mut clients);
    assert!(clients.iter().all(|client| client.generator.is_stable()));

    let cyc = CycleContext::new(
        4,
        CYCLE_LENGTH,
        vec![0.21; CYCLE_LENGTH],
        vec![0.05; CYCLE_LENGTH],
        vec![0.11; CYCLE_LENGTH],
    )
    .unwrap();
    // timeslot 0: both consumers keep their promises
    // timeslot 1: the first consumer uses one unit more than promised, a shortage
    // timeslot 2: nobody trades
    let utilizations = vec![
        (vec![1.0, 1.0, 0.0], vec![1.0, 2.0, 1.0]),
        (vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]),
        (vec![-2.0, -2.0, 0.0], vec![-2.0, -2.0, -1.0]),
    ];

    // clients hide, sign and submit their data
    let hcs: Vec<_> = clients
        .iter()
        .map(|client| {
            HidingContext::new(
                CYCLE_LENGTH,
                &HidingParams::testing(),
                client.generator.clone(),
            )
            .unwrap()
        })
        .collect();
    let submissions: Vec<_> = clients
        .iter()
        .zip(hcs.iter())
        .zip(utilizations)
        .map(|((client, hc), (promises, utilizations))| {
            let data = Data {
                client: client.id,
                cycle_id: cyc.cycle_id,
                utilization_promises: promises,
                utilizations,
            };
            data.check_validity(&cyc).unwrap();
            let bytes = data.hide(hc).unwrap().serialize();
            let signature = client.signing_keys.secret.sign_detached(&bytes);
            (bytes, signature)
        })
        .collect();

    // the aggregator verifies and decodes the submissions
    let cyc = CycleContext::deserialize(&cyc.serialize()).unwrap();
    let received: Vec<_> = submissions
        .iter()
        .zip(clients.iter())
        .map(|((bytes, signature), client)| {
            client.signing_keys.public.verify(signature, bytes).unwrap();
            let hidden = HiddenData::deserialize(bytes).unwrap();
            hidden.check_validity(&cyc).unwrap();
            hidden
        })
        .collect();

    let scd = HiddenData::unmask_data(&received).unwrap();
    scd.check_validity(&cyc).unwrap();
    assert_eq!(scd.total_deviations, vec![0.0, -1.0, 0.0]);
    assert_eq!(scd.total_p2p_consumers, vec![2.0, 2.0, 0.0]);
    assert_eq!(scd.total_p2p_producers, vec![1.0, 1.0, 0.0]);

    let hidden_bills: Vec<_> = received
        .iter()
        .map(|hidden| hidden.compute_hidden_bill(&scd, &cyc).unwrap().serialize())
        .collect();

    // every client reveals its own bill
    let bills: Vec<_> = hidden_bills
        .iter()
        .zip(hcs.iter())
        .map(|(bytes, hc)| {
            let bill = HiddenBill::deserialize(bytes).unwrap().reveal(hc).unwrap();
            bill.check_validity(&cyc).unwrap();
            bill
        })
        .collect();

    // supplement: (0.11 - 0.21) * -1 / 2 = 0.05 on top of 2 * 0.11
    assert_eq!(bills[0].bill, vec![0.11, 0.27, 0.21]);
    assert_eq!(bills[0].reward, vec![0.0; 3]);
    assert_eq!(bills[1].bill, vec![0.11, 0.11, 0.0]);
    assert_eq!(bills[2].bill, vec![0.0; 3]);
    assert_eq!(bills[2].reward, vec![0.22, 0.22, 0.05]);
    assert!((bills[2].total() - 0.49).abs() < 1e-9);
    assert!((bills[0].total() + 0.59).abs() < 1e-9);
}

#[test]
fn test_foreign_context_cannot_reveal() {
    let generator = SharedMaskGenerator::new(MaskConfig::default());
    let owner = HidingContext::new(2, &HidingParams::testing(), generator.clone()).unwrap();
    let other = HidingContext::new(2, &HidingParams::testing(), generator).unwrap();
    let cyc = CycleContext::new(1, 2, vec![0.21; 2], vec![0.05; 2], vec![0.11; 2]).unwrap();
    let hidden = Data {
        client: 1,
        cycle_id: 1,
        utilization_promises: vec![0.0; 2],
        utilizations: vec![1.0, 2.0],
    }
    .hide(&owner)
    .unwrap();
    let scd = HiddenData::unmask_data(vec![&hidden]).unwrap();
    let hidden_bill = hidden.compute_hidden_bill(&scd, &cyc).unwrap();

    assert_eq!(hidden_bill.reveal(&owner).unwrap().bill, vec![0.21, 0.42]);
    if let Ok(bill) = hidden_bill.reveal(&other) {
        assert_ne!(bill.bill, vec![0.21, 0.42]);
    }
}
