//! 分段常数到达率 λ(road, t)

use crate::config::SimConfig;
use crate::road::RoadId;
use crate::sim::SimTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSegment {
    pub start: SimTime,
    pub end: SimTime,
    pub multiplier: f64,
}

/// 各道路的基础到达率（辆/小时）与高峰时段倍率
#[derive(Debug, Clone, PartialEq)]
pub struct RateProfile {
    base_rates: Vec<f64>,
    peaks: Vec<PeakSegment>,
    /// 所有分段边界（升序、去重），最后一个为 horizon
    boundaries: Vec<SimTime>,
    horizon: SimTime,
}

impl RateProfile {
    pub fn new(base_rates: Vec<f64>, peaks: Vec<PeakSegment>, horizon: SimTime) -> Self {
        let mut boundaries: Vec<SimTime> = peaks
            .iter()
            .flat_map(|p| [p.start, p.end])
            .filter(|&t| t < horizon)
            .chain(std::iter::once(horizon))
            .collect();
        boundaries.sort();
        boundaries.dedup();
        Self {
            base_rates,
            peaks,
            boundaries,
            horizon,
        }
    }

    pub fn from_config(cfg: &SimConfig) -> Self {
        let horizon = SimTime::from_hours_f64(cfg.time_window_hours);
        let peaks = cfg
            .peak_windows
            .iter()
            .map(|w| PeakSegment {
                start: SimTime::from_hours_f64(w.start_hour),
                end: SimTime::from_hours_f64(w.end_hour),
                multiplier: w.rate_multiplier,
            })
            .collect();
        let base = cfg.roads.iter().map(|r| r.base_rate_per_hour).collect();
        Self::new(base, peaks, horizon)
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub fn roads(&self) -> usize {
        self.base_rates.len()
    }

    /// t 时刻的到达率（辆/小时）；重叠的高峰时段取最大倍率
    pub fn rate(&self, road: RoadId, t: SimTime) -> f64 {
        let base = self.base_rates.get(road.0).copied().unwrap_or(0.0);
        let multiplier = self
            .peaks
            .iter()
            .filter(|p| p.start <= t && t < p.end)
            .map(|p| p.multiplier)
            .reduce(f64::max);
        match multiplier {
            Some(m) => base * m,
            None => base,
        }
    }

    /// t 所在分段的结束时刻（严格大于 t，除非 t 已到 horizon）
    pub fn segment_end(&self, t: SimTime) -> SimTime {
        self.boundaries
            .iter()
            .copied()
            .find(|&b| b > t)
            .unwrap_or(self.horizon)
    }
}
