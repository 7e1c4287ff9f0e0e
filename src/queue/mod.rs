//! 排队策略
//!
//! 目前只有尾丢弃的等候区，后续可以在此扩展按优先级放行等策略。

mod holding;

pub use holding::HoldingQueue;
