pub mod error;
pub mod input;
pub mod problem;
pub mod report;
pub mod solver;
mod utils;

pub use error::{OptimizerError, ValidationError};
pub use input::ProblemInput;
pub use report::SolutionReport;
pub use solver::{
    solution::routing_solution::Solution,
    solver::{SolveOutcome, Solver, solve},
    solver_params::SolverParams,
};

#[cfg(test)]
pub(crate) mod test_utils;
