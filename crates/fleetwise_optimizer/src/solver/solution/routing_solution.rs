use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    error::OptimizerError,
    problem::{cost::Cost, node::Demand},
    solver::solution::working_solution::WorkingSolution,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum SearchStatus {
    /// No improving move was left.
    Converged,
    /// A termination or a stop request ended the search before convergence.
    BudgetExhausted,
    /// Local search was disabled, the construction result is returned as is.
    Skipped,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum UnassignedReason {
    /// The shortest depot round trip through the customer exceeds every vehicle's time limit.
    ExceedsTimeLimit,
    /// No vehicle had enough capacity or time left.
    FleetExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct UnassignedCustomer {
    pub customer: usize,
    pub reason: UnassignedReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SolutionRoute {
    pub vehicle_id: usize,
    /// Node ids starting and ending at the depot (`0`).
    pub stops: Vec<usize>,
    /// Load delivered so far at every stop.
    pub loads: Vec<Demand>,
    /// Whole seconds since departure at every stop.
    pub elapsed_seconds: Vec<i64>,
    /// Minor currency units.
    pub cost: Cost,
}

impl SolutionRoute {
    pub fn is_empty(&self) -> bool {
        self.stops.len() <= 2
    }

    pub fn customers(&self) -> &[usize] {
        self.stops
            .get(1..self.stops.len().saturating_sub(1))
            .unwrap_or(&[])
    }
}

/// Final, read-only result of a solving run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Solution {
    /// One route per vehicle, in vehicle order, empty when the vehicle stays at the depot.
    pub routes: Vec<SolutionRoute>,
    pub unassigned: Vec<UnassignedCustomer>,
    pub total_cost: Cost,
    pub status: SearchStatus,
    /// Improving moves applied by the local search.
    pub iterations: usize,
}

impl Solution {
    pub fn from_working(solution: &WorkingSolution, status: SearchStatus, iterations: usize) -> Self {
        let problem = solution.problem();

        let routes = solution
            .routes()
            .iter()
            .map(|route| SolutionRoute {
                vehicle_id: route.vehicle_id().get(),
                stops: route.stops().map(|node| node.get()).collect(),
                loads: route.load().cumuls().to_vec(),
                elapsed_seconds: route.time().cumuls().to_vec(),
                cost: route.cost(),
            })
            .collect();

        let unassigned = solution
            .unassigned()
            .iter()
            .map(|&node| UnassignedCustomer {
                customer: node.get(),
                reason: if problem.is_reachable_within_time_limit(node) {
                    UnassignedReason::FleetExhausted
                } else {
                    UnassignedReason::ExceedsTimeLimit
                },
            })
            .collect();

        Solution {
            routes,
            unassigned,
            total_cost: solution.total_cost(),
            status,
            iterations,
        }
    }

    /// The search budget ran out before no improving move was left.
    pub fn is_possibly_suboptimal(&self) -> bool {
        self.status == SearchStatus::BudgetExhausted
    }

    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    fn unassigned_with(&self, reason: UnassignedReason) -> Vec<usize> {
        self.unassigned
            .iter()
            .filter(|unassigned| unassigned.reason == reason)
            .map(|unassigned| unassigned.customer)
            .collect()
    }

    /// Errors describing the unassigned customers, time limit violations first.
    pub fn assignment_errors(&self) -> Vec<OptimizerError> {
        let mut errors = Vec::new();

        let out_of_reach = self.unassigned_with(UnassignedReason::ExceedsTimeLimit);
        if !out_of_reach.is_empty() {
            errors.push(OptimizerError::InfeasibleTimeLimit {
                customers: out_of_reach,
            });
        }

        let not_placed = self.unassigned_with(UnassignedReason::FleetExhausted);
        if !not_placed.is_empty() {
            errors.push(OptimizerError::CapacityExhaustion {
                customers: not_placed,
            });
        }

        errors
    }

    pub fn check_complete(&self) -> Result<(), OptimizerError> {
        match self.assignment_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
