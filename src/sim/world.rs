//! 世界 trait
//!
//! 定义仿真世界接口。

use super::event::DispatchRecord;
use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现（例如路网/信号灯/统计等）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// 每个事件执行完毕后调用
    fn on_dispatch(&mut self, _sim: &Simulator, _record: &DispatchRecord) {}
}
