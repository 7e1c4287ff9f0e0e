//! 仿真配置
//!
//! JSON 配置（参数界面的输出）及其校验。校验失败时仿真不会启动。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PolicyKind;
use crate::road::PhaseTiming;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("time window must be positive, got {0} hours")]
    NonPositiveTimeWindow(f64),
    #[error("at least one road is required")]
    NoRoads,
    #[error("duplicate road name `{0}`")]
    DuplicateRoad(String),
    #[error("road `{0}` must have a positive capacity")]
    ZeroCapacity(String),
    #[error("road `{road}` has invalid arrival rate {rate}")]
    InvalidRate { road: String, rate: f64 },
    #[error("road `{road}` has invalid travel time {minutes} minutes")]
    InvalidTravelTime { road: String, minutes: f64 },
    #[error("peak window [{start}, {end}] is outside [0, {window}]")]
    PeakWindowOutOfRange { start: f64, end: f64, window: f64 },
    #[error("peak window multiplier must be finite and non-negative, got {0}")]
    InvalidPeakMultiplier(f64),
    #[error("intersection `{intersection}` references unknown road `{road}`")]
    UnknownRoad { intersection: String, road: String },
    #[error("road `{0}` is controlled by more than one intersection group")]
    RoadInMultipleIntersections(String),
    #[error("intersection `{0}` has an empty phase group")]
    EmptyPhaseGroup(String),
    #[error("intersection `{0}` has a zero or inverted green time")]
    InvalidPhaseTiming(String),
    #[error("vehicle weights must be non-empty and positive")]
    InvalidVehicleWeights,
    #[error("vehicle weight {weight} exceeds the largest road capacity {max_capacity}")]
    VehicleTooHeavy { weight: u32, max_capacity: u32 },
}

/// 高峰时段：[start_hour, end_hour) 内到达率乘以 `rate_multiplier`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start_hour: f64,
    pub end_hour: f64,
    pub rate_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSpec {
    pub name: String,
    pub capacity: u32,
    /// 非高峰到达率（辆/小时）
    pub base_rate_per_hour: f64,
    /// 自由流行驶时间（分钟）
    #[serde(default = "default_travel_minutes")]
    pub travel_minutes: f64,
    /// 等候区容量（辆）；0 表示满载即拒绝
    #[serde(default)]
    pub queue_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionSpec {
    pub name: String,
    /// 按顺序轮流放行的道路组（道路名）
    pub groups: Vec<Vec<String>>,
    #[serde(default)]
    pub timing: PhaseTiming,
    /// 组间全红清场时长（秒）
    #[serde(default)]
    pub red_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub time_window_hours: f64,
    #[serde(default)]
    pub peak_windows: Vec<PeakWindow>,
    pub roads: Vec<RoadSpec>,
    #[serde(default)]
    pub intersections: Vec<IntersectionSpec>,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// 车辆占用容量单位的候选值，均匀抽取
    #[serde(default = "default_vehicle_weights")]
    pub vehicle_weights: Vec<u32>,
}

fn default_travel_minutes() -> f64 {
    60.0
}

fn default_seed() -> u64 {
    42
}

fn default_vehicle_weights() -> Vec<u32> {
    vec![1]
}

impl Default for SimConfig {
    /// 两条干道、早高峰、一个路口的默认场景
    fn default() -> Self {
        Self {
            time_window_hours: 24.0,
            peak_windows: vec![PeakWindow {
                start_hour: 6.0,
                end_hour: 8.0,
                rate_multiplier: 2.0,
            }],
            roads: vec![
                RoadSpec {
                    name: "Mandela".into(),
                    capacity: 1000,
                    base_rate_per_hour: 5.0,
                    travel_minutes: default_travel_minutes(),
                    queue_capacity: 0,
                },
                RoadSpec {
                    name: "Portmore".into(),
                    capacity: 800,
                    base_rate_per_hour: 5.0,
                    travel_minutes: default_travel_minutes(),
                    queue_capacity: 0,
                },
            ],
            intersections: vec![IntersectionSpec {
                name: "Midpoint".into(),
                groups: vec![vec!["Mandela".into()], vec!["Portmore".into()]],
                timing: PhaseTiming::Fixed { green_secs: 60 },
                red_secs: 10,
            }],
            policy: PolicyKind::default(),
            seed: default_seed(),
            vehicle_weights: default_vehicle_weights(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.time_window_hours;
        if !(window.is_finite() && window > 0.0) {
            return Err(ConfigError::NonPositiveTimeWindow(window));
        }
        if self.roads.is_empty() {
            return Err(ConfigError::NoRoads);
        }

        let mut names = HashSet::new();
        for road in &self.roads {
            if !names.insert(road.name.as_str()) {
                return Err(ConfigError::DuplicateRoad(road.name.clone()));
            }
            if road.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(road.name.clone()));
            }
            if !(road.base_rate_per_hour.is_finite() && road.base_rate_per_hour >= 0.0) {
                return Err(ConfigError::InvalidRate {
                    road: road.name.clone(),
                    rate: road.base_rate_per_hour,
                });
            }
            if !(road.travel_minutes.is_finite() && road.travel_minutes >= 0.0) {
                return Err(ConfigError::InvalidTravelTime {
                    road: road.name.clone(),
                    minutes: road.travel_minutes,
                });
            }
        }

        for w in &self.peak_windows {
            let in_range = w.start_hour >= 0.0 && w.end_hour <= window && w.start_hour <= w.end_hour;
            if !in_range {
                return Err(ConfigError::PeakWindowOutOfRange {
                    start: w.start_hour,
                    end: w.end_hour,
                    window,
                });
            }
            if !(w.rate_multiplier.is_finite() && w.rate_multiplier >= 0.0) {
                return Err(ConfigError::InvalidPeakMultiplier(w.rate_multiplier));
            }
        }

        let mut controlled = HashSet::new();
        for ix in &self.intersections {
            if ix.groups.is_empty() || ix.groups.iter().any(|g| g.is_empty()) {
                return Err(ConfigError::EmptyPhaseGroup(ix.name.clone()));
            }
            for road in ix.groups.iter().flatten() {
                if !names.contains(road.as_str()) {
                    return Err(ConfigError::UnknownRoad {
                        intersection: ix.name.clone(),
                        road: road.clone(),
                    });
                }
                if !controlled.insert(road.as_str()) {
                    return Err(ConfigError::RoadInMultipleIntersections(road.clone()));
                }
            }
            let timing_ok = match ix.timing {
                PhaseTiming::Fixed { green_secs } => green_secs > 0,
                PhaseTiming::Adaptive {
                    min_green_secs,
                    max_green_secs,
                } => min_green_secs > 0 && min_green_secs <= max_green_secs,
            };
            if !timing_ok {
                return Err(ConfigError::InvalidPhaseTiming(ix.name.clone()));
            }
        }

        if self.vehicle_weights.is_empty() || self.vehicle_weights.contains(&0) {
            return Err(ConfigError::InvalidVehicleWeights);
        }
        let max_capacity = self.roads.iter().map(|r| r.capacity).max().unwrap_or(0);
        if let Some(&weight) = self.vehicle_weights.iter().find(|&&w| w > max_capacity) {
            return Err(ConfigError::VehicleTooHeavy {
                weight,
                max_capacity,
            });
        }
        Ok(())
    }
}
