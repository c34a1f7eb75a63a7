pub mod cleanup_service;
pub mod gateway;
pub mod intent_mapper;
pub mod tracker;

pub use cleanup_service::{EvictionConfig, EvictionService, EvictionStats};
pub use gateway::SimulatedGateway;
pub use intent_mapper::KeywordIntentMapper;
pub use tracker::InMemoryTransactionTracker;
