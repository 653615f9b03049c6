use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{Level, info, instrument, warn};

use crate::{
    error::OptimizerError,
    input::ProblemInput,
    problem::fleet_routing_problem::FleetRoutingProblem,
    report::SolutionReport,
    solver::{
        construction::construct_solution::construct_solution,
        ls::local_search::{LocalSearch, SearchBudget},
        solution::routing_solution::{SearchStatus, Solution},
        solver_params::SolverParams,
    },
};

/// One solving run over a frozen problem.
pub struct Solver {
    problem: Arc<FleetRoutingProblem>,
    params: SolverParams,
    is_stopped: AtomicBool,
}

impl Solver {
    pub fn new(problem: FleetRoutingProblem, params: SolverParams) -> Self {
        Solver {
            problem: Arc::new(problem),
            params,
            is_stopped: AtomicBool::new(false),
        }
    }

    pub fn problem(&self) -> &FleetRoutingProblem {
        &self.problem
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Asks a running local search to return at its next iteration.
    pub fn stop(&self) {
        self.is_stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped.load(Ordering::Relaxed)
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn solve(&self) -> Solution {
        let start = Timestamp::now();
        info!(
            customers = self.problem.num_customers(),
            vehicles = self.problem.fleet().len(),
            "Solving"
        );

        let mut solution = construct_solution(&self.problem);

        let (iterations, status) = if self.params.run_local_search {
            let budget = SearchBudget::from_terminations(&self.params.terminations, start)
                .with_stop_flag(&self.is_stopped);
            let mut local_search =
                LocalSearch::new(self.params.search_strategy, self.params.neighbourhood_size);

            let mut run = || local_search.run(&mut solution, &budget);
            match self.create_thread_pool() {
                Ok(pool) => pool.install(run),
                Err(err) => {
                    warn!(error = %err, "Could not build the search thread pool, searching on the current thread");
                    run()
                }
            }
        } else {
            (0, SearchStatus::Skipped)
        };

        if status == SearchStatus::BudgetExhausted {
            warn!(iterations, "Search budget exhausted before convergence");
        }

        let solution = Solution::from_working(&solution, status, iterations);

        info!(
            cost = solution.total_cost,
            iterations,
            status = ?status,
            unassigned = solution.unassigned.len(),
            elapsed = ?Timestamp::now().duration_since(start),
            "Solved"
        );

        solution
    }

    fn create_thread_pool(&self) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.search_threads.number_of_threads())
            .build()
    }
}

#[derive(Clone, Debug, Serialize, JsonSchema)]
pub struct SolveOutcome {
    pub solution: Solution,
    pub report: SolutionReport,
}

/// Validates the input, solves it and aggregates the report.
///
/// Only invalid or incomplete input is an error. Customers that could not be
/// served are listed in the solution, see [`Solution::check_complete`].
pub fn solve(input: &ProblemInput, params: SolverParams) -> Result<SolveOutcome, OptimizerError> {
    let problem = input.build_problem()?;
    let solver = Solver::new(problem, params);

    let solution = solver.solve();
    let report = SolutionReport::new(solver.problem(), &solution);

    Ok(SolveOutcome { solution, report })
}

#[cfg(test)]
mod tests {
    use crate::{
        solver::solver_params::{SolverParams, Termination, Threads},
        test_utils::{self, TestVehicle},
    };

    use super::*;

    fn scattered_problem() -> FleetRoutingProblem {
        test_utils::create_test_problem(
            &[
                (0.0, 0.0),
                (3.0, 4.0),
                (-2.0, 7.0),
                (6.0, -1.0),
                (-5.0, -5.0),
                (8.0, 8.0),
                (1.0, -6.0),
                (-7.0, 2.0),
            ],
            &[3, 2, 4, 1, 3, 2, 3],
            &[
                TestVehicle::with_capacity(12),
                TestVehicle::with_capacity(10).hourly_wage(20.0),
            ],
        )
    }

    #[test]
    fn test_local_search_does_not_worsen_construction() {
        let constructed = Solver::new(
            scattered_problem(),
            SolverParams {
                run_local_search: false,
                ..SolverParams::default()
            },
        )
        .solve();
        assert_eq!(constructed.status, SearchStatus::Skipped);
        assert_eq!(constructed.iterations, 0);

        let improved = Solver::new(scattered_problem(), SolverParams::default()).solve();
        assert_eq!(improved.status, SearchStatus::Converged);
        assert!(improved.total_cost <= constructed.total_cost);
        assert!(improved.is_complete());
    }

    #[test]
    fn test_result_does_not_depend_on_threads() {
        let solve_with = |search_threads| {
            Solver::new(
                scattered_problem(),
                SolverParams {
                    search_threads,
                    ..SolverParams::default()
                },
            )
            .solve()
        };

        assert_eq!(solve_with(Threads::Single), solve_with(Threads::Multi(4)));
    }

    #[test]
    fn test_stopped_solver_returns_construction() {
        let solver = Solver::new(scattered_problem(), SolverParams::default());
        solver.stop();

        let solution = solver.solve();

        assert_eq!(solution.status, SearchStatus::BudgetExhausted);
        assert!(solution.is_possibly_suboptimal());
        assert_eq!(solution.iterations, 0);
        assert!(solution.is_complete());
    }

    #[test]
    fn test_zero_iterations_budget() {
        let solution = Solver::new(
            scattered_problem(),
            SolverParams {
                terminations: vec![Termination::Iterations(0)],
                ..SolverParams::default()
            },
        )
        .solve();

        assert!(solution.is_possibly_suboptimal());
    }
}
