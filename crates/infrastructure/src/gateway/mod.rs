pub mod simulator;

pub use simulator::SimulatedGateway;
