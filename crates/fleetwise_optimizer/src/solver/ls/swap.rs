use smallvec::smallvec;

use crate::{
    problem::{cost::Cost, fleet_routing_problem::FleetRoutingProblem},
    solver::{
        ls::{
            r#move::{LocalSearchOperator, UpdatedRoutes},
            neighbourhood::Neighbourhood,
        },
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Exchanges the customers at `first` and `second` (`first < second`) of one route.
///
/// ```text
///   .. a -> u -> b .. c -> v -> d ..   =>   .. a -> v -> b .. c -> u -> d ..
/// ```
#[derive(Debug)]
pub struct SwapOperator {
    params: SwapParams,
}

#[derive(Debug)]
pub struct SwapParams {
    pub route_id: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl SwapOperator {
    pub fn new(params: SwapParams) -> Self {
        debug_assert!(params.first < params.second, "Swap requires first < second");

        Self { params }
    }

    fn is_adjacent(&self) -> bool {
        self.params.first + 1 == self.params.second
    }
}

impl LocalSearchOperator for SwapOperator {
    fn generate_moves<C>(
        solution: &WorkingSolution,
        neighbourhood: &Neighbourhood,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let route = solution.route(r1);

        for first in 0..route.len() {
            for second in (first + 1)..route.len() {
                if !neighbourhood.contains(route.node(first), route.node(second)) {
                    continue;
                }

                consumer(SwapOperator::new(SwapParams {
                    route_id: r1,
                    first,
                    second,
                }))
            }
        }
    }

    fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);
        let vehicle_id = route.vehicle_id();

        let a = route.previous_node(self.params.first);
        let first = route.node(self.params.first);
        let second = route.node(self.params.second);
        let d = route.next_node(self.params.second);

        if self.is_adjacent() {
            // A -> first -> second -> D becomes A -> second -> first -> D
            let current_cost = problem.arc_cost(vehicle_id, a, first)
                + problem.arc_cost(vehicle_id, first, second)
                + problem.arc_cost(vehicle_id, second, d);
            let new_cost = problem.arc_cost(vehicle_id, a, second)
                + problem.arc_cost(vehicle_id, second, first)
                + problem.arc_cost(vehicle_id, first, d);

            return new_cost - current_cost;
        }

        let b = route.next_node(self.params.first);
        let c = route.previous_node(self.params.second);

        let current_cost = problem.arc_cost(vehicle_id, a, first)
            + problem.arc_cost(vehicle_id, first, b)
            + problem.arc_cost(vehicle_id, c, second)
            + problem.arc_cost(vehicle_id, second, d);
        let new_cost = problem.arc_cost(vehicle_id, a, second)
            + problem.arc_cost(vehicle_id, second, b)
            + problem.arc_cost(vehicle_id, c, first)
            + problem.arc_cost(vehicle_id, first, d);

        new_cost - current_cost
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let route = solution.route(self.params.route_id);
        let first = route.node(self.params.first);
        let second = route.node(self.params.second);

        let iterator = std::iter::once(second)
            .chain(route.nodes_iter(self.params.first + 1, self.params.second))
            .chain(std::iter::once(first));

        route.is_valid_change(
            solution.problem(),
            iterator,
            self.params.first,
            self.params.second + 1,
        )
    }

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.params.route_id);
        let first = route.node(self.params.first);
        let second = route.node(self.params.second);

        route.replace_nodes(problem, &[second], self.params.first, self.params.first + 1);
        route.replace_nodes(problem, &[first], self.params.second, self.params.second + 1);
    }

    fn updated_routes(&self) -> UpdatedRoutes {
        smallvec![self.params.route_id]
    }
}
