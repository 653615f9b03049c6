use std::sync::Arc;

use tracing::{Level, debug, instrument, warn};

use crate::{
    problem::fleet_routing_problem::FleetRoutingProblem,
    solver::{
        construction::cheapest_insertion::CheapestInsertion,
        solution::working_solution::WorkingSolution,
    },
};

/// Builds the initial solution. Customers that fit nowhere stay unassigned.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn construct_solution(problem: &Arc<FleetRoutingProblem>) -> WorkingSolution {
    debug!(
        customers = problem.num_customers(),
        vehicles = problem.fleet().len(),
        "Start construction heuristic"
    );
    let mut solution = WorkingSolution::new(Arc::clone(problem));

    let inserted = CheapestInsertion::insert_customers(&mut solution);

    debug!(
        inserted,
        cost = solution.total_cost(),
        routes = solution.non_empty_routes_count(),
        "Construction done"
    );
    if solution.has_unassigned() {
        warn!(
            unassigned = ?solution.unassigned(),
            "Construction left customers unassigned"
        );
    }

    solution
}
