pub mod agent;
pub mod batch;
pub mod config;
pub mod contest;
pub mod environment;
pub mod genome;
pub mod simulation;

pub use agent::{Agent, AgentKind, AgentStatus};
pub use config::SimConfig;
pub use environment::Environment;
pub use genome::{Base, FitnessWeights, Genome};
pub use simulation::{Phase, RoundRecord, RunSummary, Simulation, SimulationError};
