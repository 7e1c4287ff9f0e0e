//! 可视化帧记录
//!
//! 引擎每处理一个事件，就为受影响的道路产出一帧 {时间, 道路, 占用, 灯色}。
//! 帧是只读副本，渲染层出错不会影响仿真状态。

mod types;

pub use types::{Frame, FrameLog};
