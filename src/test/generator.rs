use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arrivals::{PeakSegment, RateProfile, VehicleGenerator};
use crate::road::RoadId;
use crate::sim::SimTime;

fn profile(base: f64, peaks: Vec<PeakSegment>, hours: u64) -> RateProfile {
    RateProfile::new(vec![base], peaks, SimTime::from_hours(hours))
}

fn peak(start_h: u64, end_h: u64, multiplier: f64) -> PeakSegment {
    PeakSegment {
        start: SimTime::from_hours(start_h),
        end: SimTime::from_hours(end_h),
        multiplier,
    }
}

fn arrivals(generator: &mut VehicleGenerator, road: RoadId) -> Vec<SimTime> {
    let mut out = Vec::new();
    let mut t = SimTime::ZERO;
    while let Some(next) = generator.next_arrival(road, t) {
        out.push(next);
        t = next;
    }
    out
}

#[test]
fn rate_is_piecewise_constant_over_peak_windows() {
    let p = profile(5.0, vec![peak(8, 10, 4.0), peak(9, 12, 2.0)], 24);
    let r = RoadId(0);
    assert_eq!(p.rate(r, SimTime::from_hours(7)), 5.0);
    assert_eq!(p.rate(r, SimTime::from_hours(8)), 20.0);
    // 重叠取最大倍率
    assert_eq!(p.rate(r, SimTime::from_hours_f64(9.5)), 20.0);
    assert_eq!(p.rate(r, SimTime::from_hours(10)), 10.0);
    assert_eq!(p.rate(r, SimTime::from_hours(12)), 5.0);
    assert_eq!(p.rate(RoadId(7), SimTime::ZERO), 0.0);

    assert_eq!(p.segment_end(SimTime::ZERO), SimTime::from_hours(8));
    assert_eq!(p.segment_end(SimTime::from_hours(8)), SimTime::from_hours(9));
    assert_eq!(p.segment_end(SimTime::from_hours(13)), SimTime::from_hours(24));
}

#[test]
fn identical_seeds_reproduce_identical_arrivals() {
    let make = || {
        VehicleGenerator::new(
            profile(20.0, vec![peak(2, 4, 3.0)], 12),
            ChaCha8Rng::seed_from_u64(42),
            vec![1],
        )
    };
    let a = arrivals(&mut make(), RoadId(0));
    let b = arrivals(&mut make(), RoadId(0));
    assert!(!a.is_empty());
    assert_eq!(a, b);

    let mut other = VehicleGenerator::new(
        profile(20.0, vec![peak(2, 4, 3.0)], 12),
        ChaCha8Rng::seed_from_u64(43),
        vec![1],
    );
    assert_ne!(a, arrivals(&mut other, RoadId(0)));
}

#[test]
fn arrivals_are_ordered_and_stay_inside_the_horizon() {
    let mut generator = VehicleGenerator::new(
        profile(30.0, Vec::new(), 6),
        ChaCha8Rng::seed_from_u64(7),
        vec![1],
    );
    let times = arrivals(&mut generator, RoadId(0));
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert!(times.iter().all(|&t| t < SimTime::from_hours(6)));
    // 期望 180 辆
    assert!((100..=260).contains(&times.len()), "got {}", times.len());
}

#[test]
fn zero_rate_window_pauses_and_resumes_arrivals() {
    let mut generator = VehicleGenerator::new(
        profile(10.0, vec![peak(2, 4, 0.0)], 6),
        ChaCha8Rng::seed_from_u64(42),
        vec![1],
    );
    let times = arrivals(&mut generator, RoadId(0));
    let (start, end) = (SimTime::from_hours(2), SimTime::from_hours(4));
    assert!(times.iter().all(|&t| t < start || t >= end));
    assert!(times.iter().any(|&t| t < start));
    assert!(times.iter().any(|&t| t >= end));
}

#[test]
fn zero_base_rate_never_arrives() {
    let mut generator = VehicleGenerator::new(
        profile(0.0, Vec::new(), 24),
        ChaCha8Rng::seed_from_u64(1),
        vec![1],
    );
    assert_eq!(generator.next_arrival(RoadId(0), SimTime::ZERO), None);
}

#[test]
fn roads_draw_from_independent_streams() {
    let p = RateProfile::new(vec![10.0, 10.0], Vec::new(), SimTime::from_hours(4));
    let mut generator = VehicleGenerator::new(p, ChaCha8Rng::seed_from_u64(42), vec![1]);
    let a = arrivals(&mut generator, RoadId(0));
    let b = arrivals(&mut generator, RoadId(1));
    assert_ne!(a, b);
}

#[test]
fn weights_are_drawn_from_the_configured_set() {
    let mut single = VehicleGenerator::new(
        profile(1.0, Vec::new(), 1),
        ChaCha8Rng::seed_from_u64(42),
        vec![2],
    );
    assert_eq!(single.draw_weight(RoadId(0)), 2);

    let mut mixed = VehicleGenerator::new(
        profile(1.0, Vec::new(), 1),
        ChaCha8Rng::seed_from_u64(42),
        vec![1, 2, 3],
    );
    let drawn: Vec<u32> = (0..200).map(|_| mixed.draw_weight(RoadId(0))).collect();
    assert!(drawn.iter().all(|w| (1..=3).contains(w)));
    for w in 1..=3 {
        assert!(drawn.contains(&w));
    }
}
