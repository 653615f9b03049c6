use smallvec::SmallVec;

use crate::{
    problem::{cost::Cost, fleet_routing_problem::FleetRoutingProblem},
    solver::{
        ls::{
            inter_relocate::InterRelocateOperator, inter_swap::InterSwapOperator,
            neighbourhood::Neighbourhood, relocate::RelocateOperator, swap::SwapOperator,
            two_opt::TwoOptOperator,
        },
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

pub type UpdatedRoutes = SmallVec<[RouteIdx; 2]>;

pub trait LocalSearchOperator: Sized {
    /// Calls `consumer` with every candidate move on the pair of routes.
    fn generate_moves<C>(
        solution: &WorkingSolution,
        neighbourhood: &Neighbourhood,
        pair: (RouteIdx, RouteIdx),
        consumer: C,
    ) where
        C: FnMut(Self);

    /// Change of the solution cost, in minor units, if the move were applied.
    fn cost_delta(&self, solution: &WorkingSolution) -> Cost;

    /// Whether every dimension of the affected routes stays within bounds.
    fn is_valid(&self, solution: &WorkingSolution) -> bool;

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution);

    fn updated_routes(&self) -> UpdatedRoutes;
}

#[derive(Debug)]
pub enum LocalSearchMove {
    /// Moves a customer to another position of its route.
    Relocate(RelocateOperator),

    /// Moves a customer to a position of another route.
    InterRelocate(InterRelocateOperator),

    /// Exchanges two customers of the same route.
    Swap(SwapOperator),

    /// Exchanges two customers of different routes.
    InterSwap(InterSwapOperator),

    /// Reverses a segment of a route.
    TwoOpt(TwoOptOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::Relocate { .. } => "Relocate",
            LocalSearchMove::InterRelocate { .. } => "Inter-Relocate",
            LocalSearchMove::Swap { .. } => "Swap",
            LocalSearchMove::InterSwap { .. } => "Inter-Swap",
            LocalSearchMove::TwoOpt { .. } => "Two-Opt",
        }
    }

    pub fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        match self {
            LocalSearchMove::Relocate(op) => op.cost_delta(solution),
            LocalSearchMove::InterRelocate(op) => op.cost_delta(solution),
            LocalSearchMove::Swap(op) => op.cost_delta(solution),
            LocalSearchMove::InterSwap(op) => op.cost_delta(solution),
            LocalSearchMove::TwoOpt(op) => op.cost_delta(solution),
        }
    }

    pub fn is_valid(&self, solution: &WorkingSolution) -> bool {
        match self {
            LocalSearchMove::Relocate(op) => op.is_valid(solution),
            LocalSearchMove::InterRelocate(op) => op.is_valid(solution),
            LocalSearchMove::Swap(op) => op.is_valid(solution),
            LocalSearchMove::InterSwap(op) => op.is_valid(solution),
            LocalSearchMove::TwoOpt(op) => op.is_valid(solution),
        }
    }

    pub fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        match self {
            LocalSearchMove::Relocate(op) => op.apply(problem, solution),
            LocalSearchMove::InterRelocate(op) => op.apply(problem, solution),
            LocalSearchMove::Swap(op) => op.apply(problem, solution),
            LocalSearchMove::InterSwap(op) => op.apply(problem, solution),
            LocalSearchMove::TwoOpt(op) => op.apply(problem, solution),
        }
    }

    pub fn updated_routes(&self) -> UpdatedRoutes {
        match self {
            LocalSearchMove::Relocate(op) => op.updated_routes(),
            LocalSearchMove::InterRelocate(op) => op.updated_routes(),
            LocalSearchMove::Swap(op) => op.updated_routes(),
            LocalSearchMove::InterSwap(op) => op.updated_routes(),
            LocalSearchMove::TwoOpt(op) => op.updated_routes(),
        }
    }
}
