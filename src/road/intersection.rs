//! 路口信号灯状态机
//!
//! 每个路口按配置顺序轮换绿灯道路组，组与组之间可插入全红清场相位。

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::{IntersectionId, RoadId};
use crate::sim::SimTime;

/// 绿灯时长策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PhaseTiming {
    /// 固定绿灯时长
    Fixed { green_secs: u64 },
    /// 按即将放行组的最高拥堵率在 [min, max] 之间线性插值
    Adaptive {
        min_green_secs: u64,
        max_green_secs: u64,
    },
}

impl Default for PhaseTiming {
    fn default() -> Self {
        PhaseTiming::Fixed { green_secs: 60 }
    }
}

impl PhaseTiming {
    pub fn green_duration(&self, congestion: f64) -> SimTime {
        match *self {
            PhaseTiming::Fixed { green_secs } => SimTime::from_secs(green_secs),
            PhaseTiming::Adaptive {
                min_green_secs,
                max_green_secs,
            } => {
                let span = max_green_secs.saturating_sub(min_green_secs) as f64;
                let c = congestion.clamp(0.0, 1.0);
                SimTime::from_secs_f64(min_green_secs as f64 + span * c)
            }
        }
    }
}

/// 当前相位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    /// 第 `group` 组道路绿灯，其余红灯
    Green { group: usize },
    /// 全红清场
    Red,
}

/// 道路看到的灯色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    Green,
    Red,
}

/// 路口（信号灯）
#[derive(Debug, Clone)]
pub struct Intersection {
    pub id: IntersectionId,
    pub name: String,
    pub groups: Vec<Vec<RoadId>>,
    pub timing: PhaseTiming,
    /// 全红清场时长；为零时直接切换到下一组绿灯
    pub clearance: SimTime,
    pub phase: Phase,
    pub phase_start: SimTime,
    pub phase_duration: SimTime,
    /// 已发生的相位切换次数
    pub changes: u64,
    /// 最近一次绿灯的组下标
    last_group: usize,
}

impl Intersection {
    /// 创建路口：t=0 时第一组绿灯。
    pub fn new(
        id: IntersectionId,
        name: impl Into<String>,
        groups: Vec<Vec<RoadId>>,
        timing: PhaseTiming,
        clearance: SimTime,
    ) -> Self {
        let phase_duration = timing.green_duration(0.0);
        Self {
            id,
            name: name.into(),
            groups,
            timing,
            clearance,
            phase: Phase::Green { group: 0 },
            phase_start: SimTime::ZERO,
            phase_duration,
            changes: 0,
            last_group: 0,
        }
    }

    pub fn roads(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.groups.iter().flatten().copied()
    }

    pub fn is_green(&self, road: RoadId) -> bool {
        match self.phase {
            Phase::Green { group } => self.groups.get(group).is_some_and(|g| g.contains(&road)),
            Phase::Red => false,
        }
    }

    pub fn light(&self, road: RoadId) -> LightState {
        if self.is_green(road) {
            LightState::Green
        } else {
            LightState::Red
        }
    }

    /// 下一个相位结束的时刻
    pub fn next_change_at(&self) -> SimTime {
        self.phase_start.saturating_add(self.phase_duration)
    }

    /// 切换到下一相位，返回新变绿的道路。
    ///
    /// `congestion` 给出某条道路当前的拥堵率，自适应配时据此计算绿灯时长。
    pub fn advance(&mut self, now: SimTime, congestion: impl Fn(RoadId) -> f64) -> Vec<RoadId> {
        let next = match self.phase {
            Phase::Green { group } if self.clearance > SimTime::ZERO => {
                self.last_group = group;
                Phase::Red
            }
            Phase::Green { group } => Phase::Green {
                group: (group + 1) % self.groups.len().max(1),
            },
            Phase::Red => Phase::Green {
                group: (self.last_group + 1) % self.groups.len().max(1),
            },
        };

        let (duration, newly_green) = match next {
            Phase::Green { group } => {
                let roads = self.groups.get(group).cloned().unwrap_or_default();
                let worst = roads.iter().map(|&r| congestion(r)).fold(0.0, f64::max);
                let newly: Vec<RoadId> = roads
                    .iter()
                    .copied()
                    .filter(|&r| !self.is_green(r))
                    .collect();
                self.last_group = group;
                (self.timing.green_duration(worst), newly)
            }
            Phase::Red => (self.clearance, Vec::new()),
        };

        debug!(
            intersection = self.name.as_str(),
            from = ?self.phase,
            to = ?next,
            duration = ?duration,
            "🚦 相位切换"
        );

        self.phase = next;
        self.phase_start = now;
        self.phase_duration = duration;
        self.changes += 1;
        newly_green
    }
}
