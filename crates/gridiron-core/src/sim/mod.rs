// Tournament outcome simulation.

pub mod payout;
pub mod simulator;

pub use payout::PayoutStructure;
pub use simulator::{roi_percent, OutcomeSimulator, OutcomeStats, SimulationError};
