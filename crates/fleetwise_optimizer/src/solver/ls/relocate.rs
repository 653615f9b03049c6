use smallvec::smallvec;

use crate::{
    problem::{cost::Cost, fleet_routing_problem::FleetRoutingProblem, node::NodeIdx},
    solver::{
        ls::{
            r#move::{LocalSearchOperator, UpdatedRoutes},
            neighbourhood::Neighbourhood,
        },
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Moves the customer at `from` elsewhere in the same route. `to` is the
/// position it is inserted at in the route as it was before the move, so the
/// customer ends up just before the one currently at `to`.
///
/// ```text
///   depot .. a -> c -> b .. x -> y .. depot      relocate c (from) before y (to)
///   depot .. a -> b .. x -> c -> y .. depot
/// ```
///
/// Three arcs go (`a -> c`, `c -> b`, `x -> y`) and three come
/// (`a -> b`, `x -> c`, `c -> y`).
#[derive(Debug)]
pub struct RelocateOperator {
    params: RelocateParams,
}

#[derive(Debug)]
pub struct RelocateParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateParams) -> Self {
        debug_assert!(
            params.from != params.to && params.from + 1 != params.to,
            "Relocate to the same position"
        );

        Self { params }
    }

    /// Customers of `[start, end)` once the move is applied, with the bounds of the change.
    fn moved_segment(&self, solution: &WorkingSolution) -> (Vec<NodeIdx>, usize, usize) {
        let route = solution.route(self.params.route_id);
        let node = route.node(self.params.from);

        if self.params.from < self.params.to {
            // A - B - C - D - E, moving B before E gives C - D - B
            let segment = route
                .nodes_iter(self.params.from + 1, self.params.to)
                .chain(std::iter::once(node))
                .collect();
            (segment, self.params.from, self.params.to)
        } else {
            // Moving D before B gives D - B - C
            let segment = std::iter::once(node)
                .chain(route.nodes_iter(self.params.to, self.params.from))
                .collect();
            (segment, self.params.to, self.params.from + 1)
        }
    }
}

impl LocalSearchOperator for RelocateOperator {
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

        for from in 0..route.len() {
            let node = route.node(from);

            for to in 0..=route.len() {
                if to == from || to == from + 1 {
                    continue; // no change in this case
                }

                if !neighbourhood.contains(node, route.previous_node(to))
                    && !neighbourhood.contains(node, route.node_or_depot(to))
                {
                    continue;
                }

                consumer(RelocateOperator::new(RelocateParams {
                    route_id: r1,
                    from,
                    to,
                }))
            }
        }
    }

    fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);
        let vehicle_id = route.vehicle_id();

        let a = route.previous_node(self.params.from);
        let from = route.node(self.params.from);
        let c = route.next_node(self.params.from);

        let x = route.previous_node(self.params.to);
        let y = route.node_or_depot(self.params.to);

        let current_cost = problem.arc_cost(vehicle_id, a, from)
            + problem.arc_cost(vehicle_id, from, c)
            + problem.arc_cost(vehicle_id, x, y);

        let new_cost = problem.arc_cost(vehicle_id, a, c)
            + problem.arc_cost(vehicle_id, x, from)
            + problem.arc_cost(vehicle_id, from, y);

        new_cost - current_cost
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let route = solution.route(self.params.route_id);
        let node = route.node(self.params.from);

        if self.params.from < self.params.to {
            let iterator = route
                .nodes_iter(self.params.from + 1, self.params.to)
                .chain(std::iter::once(node));
            route.is_valid_change(
                solution.problem(),
                iterator,
                self.params.from,
                self.params.to,
            )
        } else {
            let iterator =
                std::iter::once(node).chain(route.nodes_iter(self.params.to, self.params.from));
            route.is_valid_change(
                solution.problem(),
                iterator,
                self.params.to,
                self.params.from + 1,
            )
        }
    }

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        let (segment, start, end) = self.moved_segment(solution);
        solution
            .route_mut(self.params.route_id)
            .replace_nodes(problem, &segment, start, end);
    }

    fn updated_routes(&self) -> UpdatedRoutes {
        smallvec![self.params.route_id]
    }
}
