//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。

use serde::{Deserialize, Serialize};

/// 仿真时间（毫秒）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000))
    }
    pub fn from_minutes(m: u64) -> SimTime {
        SimTime(m.saturating_mul(60_000))
    }
    pub fn from_hours(h: u64) -> SimTime {
        SimTime(h.saturating_mul(3_600_000))
    }

    /// 小数小时 -> 毫秒（四舍五入；负数与 NaN 归零，溢出饱和）
    pub fn from_hours_f64(h: f64) -> SimTime {
        Self::from_millis_f64(h * 3_600_000.0)
    }

    /// 小数秒 -> 毫秒（同 `from_hours_f64` 的取整规则）
    pub fn from_secs_f64(s: f64) -> SimTime {
        Self::from_millis_f64(s * 1_000.0)
    }

    fn from_millis_f64(ms: f64) -> SimTime {
        if !(ms > 0.0) {
            return SimTime::ZERO;
        }
        if ms >= u64::MAX as f64 {
            return SimTime::MAX;
        }
        SimTime(ms.round() as u64)
    }

    pub fn as_hours_f64(self) -> f64 {
        self.0 as f64 / 3_600_000.0
    }

    pub fn as_minutes_f64(self) -> f64 {
        self.0 as f64 / 60_000.0
    }

    pub fn saturating_add(self, d: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(d.0))
    }

    pub fn saturating_sub(self, d: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(d.0))
    }
}
