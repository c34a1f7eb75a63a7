//! 领域端口
//!
//! 编排核心与外部协作方之间的契约：执行策略、协议网关和意图源。

pub mod gateway;
pub mod intent_source;
pub mod strategy;

pub use gateway::*;
pub use intent_source::*;
pub use strategy::*;
