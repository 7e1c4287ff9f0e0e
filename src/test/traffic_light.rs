use crate::road::{Intersection, IntersectionId, LightState, Phase, PhaseTiming, RoadId};
use crate::sim::SimTime;

fn two_group_light(clearance: SimTime) -> Intersection {
    Intersection::new(
        IntersectionId(0),
        "x",
        vec![vec![RoadId(0), RoadId(1)], vec![RoadId(2)]],
        PhaseTiming::Fixed { green_secs: 60 },
        clearance,
    )
}

#[test]
fn first_group_is_green_at_start() {
    let light = two_group_light(SimTime::from_secs(10));
    assert_eq!(light.phase, Phase::Green { group: 0 });
    assert_eq!(light.phase_start, SimTime::ZERO);
    assert_eq!(light.next_change_at(), SimTime::from_secs(60));
    assert!(light.is_green(RoadId(0)));
    assert!(light.is_green(RoadId(1)));
    assert_eq!(light.light(RoadId(2)), LightState::Red);
}

#[test]
fn phases_cycle_through_clearance_and_groups() {
    let mut light = two_group_light(SimTime::from_secs(10));
    let no_congestion = |_: RoadId| 0.0;

    let newly = light.advance(SimTime::from_secs(60), no_congestion);
    assert!(newly.is_empty());
    assert_eq!(light.phase, Phase::Red);
    assert_eq!(light.phase_duration, SimTime::from_secs(10));
    assert!(!light.is_green(RoadId(0)));
    assert!(!light.is_green(RoadId(2)));

    let newly = light.advance(SimTime::from_secs(70), no_congestion);
    assert_eq!(newly, vec![RoadId(2)]);
    assert_eq!(light.phase, Phase::Green { group: 1 });
    assert_eq!(light.next_change_at(), SimTime::from_secs(130));

    light.advance(SimTime::from_secs(130), no_congestion);
    let newly = light.advance(SimTime::from_secs(140), no_congestion);
    assert_eq!(newly, vec![RoadId(0), RoadId(1)]);
    assert_eq!(light.phase, Phase::Green { group: 0 });
    assert_eq!(light.changes, 4);
}

#[test]
fn zero_clearance_switches_groups_directly() {
    let mut light = two_group_light(SimTime::ZERO);
    let newly = light.advance(SimTime::from_secs(60), |_| 0.0);
    assert_eq!(newly, vec![RoadId(2)]);
    assert_eq!(light.phase, Phase::Green { group: 1 });
    assert!(!light.is_green(RoadId(0)));
}

#[test]
fn exactly_one_group_is_green_at_a_time() {
    let mut light = two_group_light(SimTime::ZERO);
    for step in 1..=6u64 {
        light.advance(SimTime::from_secs(60 * step), |_| 0.0);
        let green_groups = light
            .groups
            .iter()
            .filter(|g| g.iter().all(|&r| light.is_green(r)))
            .count();
        assert_eq!(green_groups, 1);
    }
}

#[test]
fn single_group_without_clearance_stays_green() {
    let mut light = Intersection::new(
        IntersectionId(0),
        "solo",
        vec![vec![RoadId(0)]],
        PhaseTiming::Fixed { green_secs: 30 },
        SimTime::ZERO,
    );
    let newly = light.advance(SimTime::from_secs(30), |_| 0.0);
    assert!(newly.is_empty());
    assert!(light.is_green(RoadId(0)));
}

#[test]
fn adaptive_green_scales_with_group_congestion() {
    let timing = PhaseTiming::Adaptive {
        min_green_secs: 10,
        max_green_secs: 30,
    };
    assert_eq!(timing.green_duration(0.0), SimTime::from_secs(10));
    assert_eq!(timing.green_duration(0.5), SimTime::from_secs(20));
    assert_eq!(timing.green_duration(3.0), SimTime::from_secs(30));

    let mut light = Intersection::new(
        IntersectionId(0),
        "adaptive",
        vec![vec![RoadId(0)], vec![RoadId(1), RoadId(2)]],
        timing,
        SimTime::ZERO,
    );
    // 取即将放行组中最拥堵的道路
    light.advance(SimTime::from_secs(10), |r| match r.0 {
        1 => 0.25,
        2 => 1.0,
        _ => 0.0,
    });
    assert_eq!(light.phase_duration, SimTime::from_secs(30));
}
