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

/// Reverses the customers at positions `from..=to` of one route, removing a
/// crossing between the arcs entering and leaving that segment.
///
/// ```text
///   depot .. p -> c1 -> c2 -> c3 -> n .. depot
///                 ^from       ^to
///
///   depot .. p -> c3 -> c2 -> c1 -> n .. depot
/// ```
///
/// With symmetric travel only `p -> c1` and `c3 -> n` are swapped for
/// `p -> c3` and `c1 -> n`. Otherwise every arc inside the segment changes
/// direction and is priced again.
#[derive(Debug)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug)]
pub struct TwoOptParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        debug_assert!(params.from < params.to, "TwoOpt: cannot have from >= to");

        TwoOptOperator { params }
    }

    /// Only the two boundary arcs change when travel is the same both ways.
    fn symmetric_delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);
        let vehicle_id = route.vehicle_id();

        let prev = route.previous_node(self.params.from);
        let from = route.node(self.params.from);

        let to = route.node(self.params.to);
        let next = route.next_node(self.params.to);

        let current_cost =
            problem.arc_cost(vehicle_id, prev, from) + problem.arc_cost(vehicle_id, to, next);

        let new_cost =
            problem.arc_cost(vehicle_id, prev, to) + problem.arc_cost(vehicle_id, from, next);

        new_cost - current_cost
    }

    fn asymmetric_delta(&self, solution: &WorkingSolution) -> Cost {
        let route = solution.route(self.params.route_id);

        route.replacement_cost_delta(
            solution.problem(),
            route.nodes_iter(self.params.from, self.params.to + 1).rev(),
            self.params.from,
            self.params.to + 1,
        )
    }
}

impl LocalSearchOperator for TwoOptOperator {
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

        if route.len() < 2 {
            return;
        }

        for from in 0..route.len() - 1 {
            let prev = route.previous_node(from);

            for to in (from + 1)..route.len() {
                if !neighbourhood.contains(prev, route.node(to)) {
                    continue;
                }

                consumer(TwoOptOperator::new(TwoOptParams {
                    route_id: r1,
                    from,
                    to,
                }))
            }
        }
    }

    fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        if solution.problem().is_symmetric() {
            self.symmetric_delta(solution)
        } else {
            self.asymmetric_delta(solution)
        }
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let route = solution.route(self.params.route_id);

        route.is_valid_change(
            solution.problem(),
            route.nodes_iter(self.params.from, self.params.to + 1).rev(),
            self.params.from,
            self.params.to + 1,
        )
    }

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.params.route_id);
        let reversed = route
            .nodes_iter(self.params.from, self.params.to + 1)
            .rev()
            .collect::<Vec<_>>();

        route.replace_nodes(problem, &reversed, self.params.from, self.params.to + 1);
    }

    fn updated_routes(&self) -> UpdatedRoutes {
        smallvec![self.params.route_id]
    }
}
