use crate::policy::{AdmissionPolicy, Assignment, BalancedPolicy, KnapsackPolicy, PolicyKind};
use crate::road::{RoadId, RoadNetwork, Vehicle, VehicleId};
use crate::sim::SimTime;

fn network(capacities: &[u32], queue: u32) -> RoadNetwork {
    let mut net = RoadNetwork::default();
    for (i, &cap) in capacities.iter().enumerate() {
        net.add_road(format!("r{i}"), cap, SimTime::from_minutes(10), queue);
    }
    net
}

fn fill(net: &mut RoadNetwork, road: RoadId, n: u32) {
    for _ in 0..n {
        let v = net.spawn_vehicle(road, 1, SimTime::ZERO);
        net.admit(v, road, SimTime::ZERO).expect("fill within capacity");
    }
}

fn car() -> Vehicle {
    Vehicle::new(VehicleId(999), RoadId(0), 1, SimTime::ZERO)
}

fn accepted_road(a: Assignment) -> RoadId {
    match a {
        Assignment::Accept { road, .. } => road,
        other => panic!("expected accept, got {other:?}"),
    }
}

#[test]
fn knapsack_picks_highest_value_admission() {
    let mut net = network(&[10, 4], 0);
    fill(&mut net, RoadId(0), 5);
    fill(&mut net, RoadId(1), 1);
    let candidates = net.road_ids();

    // r0: 6/10 = 0.6，r1: 2/4 = 0.5
    let a = KnapsackPolicy.decide(&car(), &candidates, &net, SimTime::ZERO);
    assert_eq!(accepted_road(a), RoadId(1));
}

#[test]
fn knapsack_breaks_ties_by_lowest_road_id() {
    let mut net = network(&[4, 2, 4], 0);
    fill(&mut net, RoadId(0), 1);
    fill(&mut net, RoadId(2), 1);
    // r0: 2/4，r1: 1/2，r2: 2/4，价值相同
    let candidates = net.road_ids();
    let a = KnapsackPolicy.decide(&car(), &candidates, &net, SimTime::ZERO);
    assert_eq!(accepted_road(a), RoadId(0));

    let reversed: Vec<RoadId> = candidates.iter().rev().copied().collect();
    let a = KnapsackPolicy.decide(&car(), &reversed, &net, SimTime::ZERO);
    assert_eq!(accepted_road(a), RoadId(0));
}

#[test]
fn knapsack_estimates_departure_from_current_congestion() {
    let net = network(&[3], 0);
    let a = KnapsackPolicy.decide(&car(), &net.road_ids(), &net, SimTime::from_minutes(1));
    assert_eq!(
        a,
        Assignment::Accept {
            road: RoadId(0),
            estimated_departure: SimTime::from_minutes(11),
        }
    );
}

#[test]
fn knapsack_never_admits_over_capacity() {
    let mut net = network(&[3, 2, 1], 0);
    let candidates = net.road_ids();
    let mut policy = KnapsackPolicy;
    for _ in 0..10 {
        let v = net.spawn_vehicle(RoadId(0), 1, SimTime::ZERO);
        let vehicle = net.vehicle(v).cloned().expect("vehicle");
        match policy.decide(&vehicle, &candidates, &net, SimTime::ZERO) {
            Assignment::Accept { road, .. } => {
                assert!(net.road(road).fits(1));
                net.admit(v, road, SimTime::ZERO).expect("policy chose a road with room");
            }
            Assignment::Reject => {
                net.reject(v);
            }
            other => panic!("no holding bays configured, got {other:?}"),
        }
        assert!(net.occupancy_within_capacity());
    }
    assert_eq!(net.roads().iter().map(|r| r.occupancy).sum::<u32>(), 6);
}

#[test]
fn knapsack_skips_roads_too_small_for_heavy_vehicle() {
    let mut net = network(&[5, 10], 0);
    fill(&mut net, RoadId(1), 8);
    let heavy = Vehicle::new(VehicleId(1), RoadId(0), 3, SimTime::ZERO);
    // r1 更空但只剩 2 个单位
    let a = KnapsackPolicy.decide(&heavy, &net.road_ids(), &net, SimTime::ZERO);
    assert_eq!(accepted_road(a), RoadId(0));
}

#[test]
fn policies_reject_when_every_road_is_full() {
    let mut net = network(&[1, 1], 0);
    fill(&mut net, RoadId(0), 1);
    fill(&mut net, RoadId(1), 1);
    let candidates = net.road_ids();

    for kind in [PolicyKind::Knapsack, PolicyKind::Balanced] {
        let mut policy = kind.build();
        assert_eq!(policy.kind(), kind);
        assert_eq!(
            policy.decide(&car(), &candidates, &net, SimTime::ZERO),
            Assignment::Reject
        );
    }
}

#[test]
fn full_roads_defer_into_the_emptiest_holding_bay() {
    let mut net = network(&[1, 1], 2);
    fill(&mut net, RoadId(0), 1);
    fill(&mut net, RoadId(1), 1);
    let v = net.spawn_vehicle(RoadId(0), 1, SimTime::ZERO);
    assert!(net.defer(v, RoadId(0)));
    let candidates = net.road_ids();

    assert_eq!(
        KnapsackPolicy.decide(&car(), &candidates, &net, SimTime::ZERO),
        Assignment::Defer { road: RoadId(1) }
    );
    assert_eq!(
        BalancedPolicy::default().decide(&car(), &candidates, &net, SimTime::ZERO),
        Assignment::Defer { road: RoadId(1) }
    );
}

#[test]
fn balanced_alternates_between_equally_loaded_roads() {
    let net = network(&[5, 5], 0);
    let candidates = net.road_ids();
    let mut policy = BalancedPolicy::default();

    let picks: Vec<RoadId> = (0..4)
        .map(|_| accepted_road(policy.decide(&car(), &candidates, &net, SimTime::ZERO)))
        .collect();
    assert_eq!(picks, vec![RoadId(0), RoadId(1), RoadId(0), RoadId(1)]);
}

#[test]
fn balanced_prefers_lower_resulting_congestion_over_round_robin() {
    let mut net = network(&[4, 4], 0);
    fill(&mut net, RoadId(0), 2);
    let candidates = net.road_ids();
    let mut policy = BalancedPolicy::default();

    assert_eq!(
        accepted_road(policy.decide(&car(), &candidates, &net, SimTime::ZERO)),
        RoadId(1)
    );
    // 指针移到 r1 之后（回到 r0），但 r1 仍然更空
    assert_eq!(policy.cursor(), 0);
    assert_eq!(
        accepted_road(policy.decide(&car(), &candidates, &net, SimTime::ZERO)),
        RoadId(1)
    );
}

#[test]
fn balanced_spreads_load_evenly_when_admissions_apply() {
    let mut net = network(&[6, 6, 6], 0);
    let candidates = net.road_ids();
    let mut policy = BalancedPolicy::default();
    for _ in 0..9 {
        let v = net.spawn_vehicle(RoadId(0), 1, SimTime::ZERO);
        let vehicle = net.vehicle(v).cloned().expect("vehicle");
        let road = accepted_road(policy.decide(&vehicle, &candidates, &net, SimTime::ZERO));
        net.admit(v, road, SimTime::ZERO).expect("room");
    }
    for road in net.roads() {
        assert_eq!(road.occupancy, 3);
    }
}

#[test]
fn vehicles_too_heavy_for_a_road_are_never_deferred_into_its_bay() {
    // r0 永远容纳不下 3 个单位的车，只有 r1 的等候区可用
    let mut net = network(&[2, 4], 2);
    fill(&mut net, RoadId(0), 1);
    fill(&mut net, RoadId(1), 3);
    let heavy = Vehicle::new(VehicleId(1), RoadId(0), 3, SimTime::ZERO);
    let candidates = net.road_ids();

    assert_eq!(
        KnapsackPolicy.decide(&heavy, &candidates, &net, SimTime::ZERO),
        Assignment::Defer { road: RoadId(1) }
    );
    assert_eq!(
        BalancedPolicy::default().decide(&heavy, &candidates, &net, SimTime::ZERO),
        Assignment::Defer { road: RoadId(1) }
    );

    let only_small = network(&[2], 2);
    for kind in [PolicyKind::Knapsack, PolicyKind::Balanced] {
        assert_eq!(
            kind.build()
                .decide(&heavy, &only_small.road_ids(), &only_small, SimTime::ZERO),
            Assignment::Reject
        );
    }
}
