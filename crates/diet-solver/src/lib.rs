mod config;
mod solver;

pub use config::{CancelFlag, SolverBackend, SolverConfig};
pub use good_lp::ResolutionError;
pub use solver::{SolveError, Solver};
