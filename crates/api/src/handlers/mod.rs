pub mod health;
pub mod mcp;
pub mod strategies;
pub mod transactions;
