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

/// Moves the customer at `from` of one route to position `to` of another.
///
/// ```text
///   r1: .. a -> c -> b ..          r1: .. a -> b ..
///   r2: .. x -> y ..          =>   r2: .. x -> c -> y ..
/// ```
///
/// Each side is priced with its own vehicle, so a move can pay off only
/// because the receiving vehicle is cheaper to run.
#[derive(Debug)]
pub struct InterRelocateOperator {
    params: InterRelocateParams,
}

#[derive(Debug)]
pub struct InterRelocateParams {
    pub from_route_id: RouteIdx,
    pub to_route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateParams) -> Self {
        debug_assert_ne!(
            params.from_route_id, params.to_route_id,
            "InterRelocateOperator cannot be used for intra-route relocation"
        );

        Self { params }
    }
}

impl LocalSearchOperator for InterRelocateOperator {
    fn generate_moves<C>(
        solution: &WorkingSolution,
        neighbourhood: &Neighbourhood,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let from_route = solution.route(r1);
        let to_route = solution.route(r2);

        for from in 0..from_route.len() {
            let node = from_route.node(from);

            for to in 0..=to_route.len() {
                if !neighbourhood.contains(node, to_route.previous_node(to))
                    && !neighbourhood.contains(node, to_route.node_or_depot(to))
                {
                    continue;
                }

                consumer(InterRelocateOperator::new(InterRelocateParams {
                    from_route_id: r1,
                    to_route_id: r2,
                    from,
                    to,
                }))
            }
        }
    }

    fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let from_route = solution.route(self.params.from_route_id);
        let to_route = solution.route(self.params.to_route_id);
        let node = from_route.node(self.params.from);

        from_route.removal_cost_delta(problem, self.params.from)
            + to_route.insertion_cost_delta(problem, node, self.params.to)
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let problem = solution.problem();
        let from_route = solution.route(self.params.from_route_id);
        let to_route = solution.route(self.params.to_route_id);
        let node = from_route.node(self.params.from);

        to_route.can_insert(problem, node, self.params.to)
            && from_route.is_valid_change(
                problem,
                std::iter::empty(),
                self.params.from,
                self.params.from + 1,
            )
    }

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        if let Some(node) = solution
            .route_mut(self.params.from_route_id)
            .remove(problem, self.params.from)
        {
            solution
                .route_mut(self.params.to_route_id)
                .insert(problem, self.params.to, node);
        }
    }

    fn updated_routes(&self) -> UpdatedRoutes {
        smallvec![self.params.from_route_id, self.params.to_route_id]
    }
}
