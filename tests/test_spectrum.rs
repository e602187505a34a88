mod common;

use std::collections::HashSet;

use common::{TestConfig, controller, request};
use eon_sim::domain::network_model::sdn::block_reason::BlockReason;
use eon_sim::domain::network_model::sdn::sdn_controller::{RequestStatus, SdnController};
use eon_sim::domain::network_model::spectrum::band::SpectrumBand;
use eon_sim::domain::network_model::utils::canonical::{LinkKey, path_links};
use eon_sim::domain::network_model::utils::id::RequestId;

fn core_slots(controller: &SdnController, a: &str, b: &str, core: usize) -> Vec<i64> {
    let topology = controller.topology();
    let key = LinkKey::new(topology.node_index(a).unwrap(), topology.node_index(b).unwrap());
    controller.spectrum().link(key).unwrap().core(SpectrumBand::C, core).unwrap().to_vec()
}

/// Every positive slot value belongs to a registered lightpath that traverses the link and
/// owns exactly that slot in its placement.
fn assert_slot_exclusivity(controller: &SdnController) {
    let lightpaths: Vec<_> = controller.registry().iter().collect();

    for (key, link) in controller.spectrum().links() {
        for core in 0..link.num_cores() {
            let slots = link.core(SpectrumBand::C, core).unwrap();
            for (index, value) in slots.iter().enumerate() {
                if *value == 0 {
                    continue;
                }
                let owner = lightpaths.iter().find(|lp| lp.id.0 as i64 == value.abs()).expect("slot owned by unknown lightpath");
                assert!(path_links(&owner.path).any(|k| k == *key), "lightpath {} marks a link it does not traverse", owner.id);
                assert_eq!(owner.placement.core, core);
                if *value > 0 {
                    assert!(owner.placement.slots.contains(index));
                } else {
                    assert!(owner.placement.guard_range().map(|g| g.contains(index)).unwrap_or(false));
                }
            }
        }
    }
}

#[test]
fn test_third_request_blocked_when_link_is_full() {
    let config = TestConfig::default().build();
    let mut controller = controller(&[("A", "B", 100.0)], &config);

    let first = request(&controller, &config, 1, "A", "B", 50, 50);
    let second = request(&controller, &config, 2, "A", "B", 50, 50);
    let third = request(&controller, &config, 3, "A", "B", 25, 25);

    let outcome = controller.handle_arrival(&first, 1.0).unwrap();
    assert!(outcome.is_committed());
    let lp = controller.lightpath(first.endpoints(), outcome.new_lightpaths[0]).unwrap();
    assert_eq!((lp.placement.slots.start, lp.placement.slots.end), (0, 1));

    let outcome = controller.handle_arrival(&second, 2.0).unwrap();
    assert!(outcome.is_committed());
    let lp = controller.lightpath(second.endpoints(), outcome.new_lightpaths[0]).unwrap();
    assert_eq!((lp.placement.slots.start, lp.placement.slots.end), (2, 3));

    let outcome = controller.handle_arrival(&third, 3.0).unwrap();
    assert_eq!(outcome.status, RequestStatus::Blocked(BlockReason::Congestion));
    assert!(outcome.new_lightpaths.is_empty());

    assert_eq!(core_slots(&controller, "A", "B", 0), vec![1, 1, 2, 2]);
    assert_eq!(controller.active_requests(), 2);
}

#[test]
fn test_guard_band_trails_data_slots() {
    let config = TestConfig { c_band: 8, guard_slots: 1, ..Default::default() }.build();
    let mut controller = controller(&[("A", "B", 100.0)], &config);

    let first = request(&controller, &config, 1, "A", "B", 50, 50);
    let second = request(&controller, &config, 2, "A", "B", 50, 50);
    let third = request(&controller, &config, 3, "A", "B", 50, 50);

    assert!(controller.handle_arrival(&first, 1.0).unwrap().is_committed());
    assert!(controller.handle_arrival(&second, 2.0).unwrap().is_committed());

    assert_eq!(core_slots(&controller, "A", "B", 0), vec![1, 1, -1, 2, 2, -2, 0, 0]);

    // Two free slots remain, but a 2-slot channel needs a third one for its guard band.
    let outcome = controller.handle_arrival(&third, 3.0).unwrap();
    assert_eq!(outcome.status, RequestStatus::Blocked(BlockReason::Congestion));
    assert_slot_exclusivity(&controller);
}

#[test]
fn test_wavelength_continuity_over_multi_hop_path() {
    let config = TestConfig { c_band: 8, cores: 2, ..Default::default() }.build();
    let mut controller = controller(&[("A", "B", 100.0), ("B", "C", 100.0), ("C", "D", 100.0)], &config);

    // Occupy the start of B-C so the A-D channel has to move up on every link.
    let blocker = request(&controller, &config, 1, "B", "C", 50, 50);
    assert!(controller.handle_arrival(&blocker, 1.0).unwrap().is_committed());

    let long = request(&controller, &config, 2, "A", "D", 100, 100);
    let outcome = controller.handle_arrival(&long, 2.0).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(outcome.hops(), 3);

    let lp = controller.lightpath(long.endpoints(), outcome.new_lightpaths[0]).unwrap();
    assert_eq!((lp.placement.core, lp.placement.slots.start, lp.placement.slots.end), (0, 2, 5));

    let id = lp.id.0 as i64;
    for (a, b) in [("A", "B"), ("B", "C"), ("C", "D")] {
        let slots = core_slots(&controller, a, b, 0);
        let owned: Vec<usize> = slots.iter().enumerate().filter(|(_, v)| **v == id).map(|(i, _)| i).collect();
        assert_eq!(owned, vec![2, 3, 4, 5], "link {}-{}", a, b);
    }
    assert_slot_exclusivity(&controller);
}

#[test]
fn test_full_release_frees_spectrum_for_next_request() {
    let config = TestConfig::default().build();
    let mut controller = controller(&[("A", "B", 100.0)], &config);

    let big = request(&controller, &config, 1, "A", "B", 100, 100);
    let outcome = controller.handle_arrival(&big, 1.0).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(core_slots(&controller, "A", "B", 0), vec![1, 1, 1, 1]);

    let blocked = request(&controller, &config, 2, "A", "B", 25, 25);
    assert!(!controller.handle_arrival(&blocked, 2.0).unwrap().is_committed());

    let release = controller.handle_release(RequestId(1)).unwrap();
    assert_eq!(release.returned_bandwidth, 100);
    assert_eq!(release.released_lightpaths, outcome.new_lightpaths);
    assert!(controller.registry().is_empty());
    assert_eq!(core_slots(&controller, "A", "B", 0), vec![0, 0, 0, 0]);

    let retry = request(&controller, &config, 3, "A", "B", 25, 25);
    let outcome = controller.handle_arrival(&retry, 3.0).unwrap();
    assert!(outcome.is_committed());
    let lp = controller.lightpath(retry.endpoints(), outcome.new_lightpaths[0]).unwrap();
    assert_eq!(lp.placement.slots.start, 0);
}

#[test]
fn test_slot_exclusivity_under_mixed_load() {
    let config = TestConfig { c_band: 16, cores: 3, ..Default::default() }.build();
    let mut controller = controller(&[("A", "B", 100.0), ("B", "C", 150.0), ("A", "C", 400.0), ("C", "D", 80.0)], &config);

    let pairs = [("A", "B"), ("A", "C"), ("B", "D"), ("A", "D"), ("B", "C"), ("C", "D")];
    let mut committed = HashSet::new();

    for id in 1..=30u64 {
        let (source, destination) = pairs[id as usize % pairs.len()];
        let (bandwidth, row) = if id % 3 == 0 { (100, 100) } else { (25, 25) };
        let req = request(&controller, &config, id, source, destination, bandwidth, row);
        if controller.handle_arrival(&req, id as f64).unwrap().is_committed() {
            committed.insert(id);
        }

        if id % 4 == 0 {
            let victim = id - 3;
            if committed.remove(&victim) {
                controller.handle_release(RequestId(victim)).unwrap();
            }
        }
        assert_slot_exclusivity(&controller);
    }

    for lightpath in controller.registry().iter() {
        lightpath.check_conservation().unwrap();
    }
}
