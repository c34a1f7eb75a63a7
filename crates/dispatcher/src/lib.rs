//! 编排策略的注册、选择与调度
//!
//! 注册表和工厂负责按名称得到策略实例，调度管道把策略结果写入交易生命周期存储。

pub mod factory;
pub mod pipeline;
pub mod registry;
pub mod strategies;

#[cfg(test)]
mod strategies_test;
#[cfg(test)]
mod test_utils;

pub use factory::StrategyFactory;
pub use pipeline::DispatchPipeline;
pub use registry::{StrategyConstructor, StrategyRegistry, DEFAULT_ALIAS};
pub use strategies::{
    builtin_registry, direct_constructor, workflow_constructor, DirectStrategy, GatewayAction,
    WorkflowStrategy, DIRECT_STRATEGY, WORKFLOW_STRATEGY,
};
