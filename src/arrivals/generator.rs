//! 车辆生成器
//!
//! 每条道路一个独立的 ChaCha 随机流，到达间隔服从指数分布（泊松到达）。
//! 到达率分段常数：候选到达越过分段边界时，利用无记忆性从边界处重新抽样；
//! λ=0 的分段直接跳过。

use rand::seq::IndexedRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::rate_profile::RateProfile;
use crate::road::RoadId;
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct VehicleGenerator {
    profile: RateProfile,
    rngs: Vec<ChaCha8Rng>,
    weights: Vec<u32>,
}

impl VehicleGenerator {
    /// `rng` 作为种子源：每条道路克隆一份并切换到各自的 stream。
    pub fn new(profile: RateProfile, rng: ChaCha8Rng, weights: Vec<u32>) -> Self {
        let rngs = (0..profile.roads())
            .map(|i| {
                let mut r = rng.clone();
                r.set_stream(i as u64);
                r
            })
            .collect();
        Self {
            profile,
            rngs,
            weights,
        }
    }

    /// 从 `now` 起该道路的下一次到达；horizon 之前没有到达则返回 None。
    pub fn next_arrival(&mut self, road: RoadId, now: SimTime) -> Option<SimTime> {
        let horizon = self.profile.horizon();
        let rng = self.rngs.get_mut(road.0)?;
        let mut t = now;
        while t < horizon {
            let rate = self.profile.rate(road, t);
            let end = self.profile.segment_end(t);
            if rate > 0.0 {
                let u: f64 = rng.random();
                let gap_hours = -(1.0 - u).ln() / rate;
                let at = t.saturating_add(SimTime::from_hours_f64(gap_hours));
                if at < end {
                    return Some(at);
                }
            }
            t = end;
        }
        None
    }

    /// 抽取车辆占用单位
    pub fn draw_weight(&mut self, road: RoadId) -> u32 {
        match self.rngs.get_mut(road.0) {
            Some(rng) if self.weights.len() > 1 => self.weights.choose(rng).copied().unwrap_or(1),
            _ => self.weights.first().copied().unwrap_or(1),
        }
    }
}
