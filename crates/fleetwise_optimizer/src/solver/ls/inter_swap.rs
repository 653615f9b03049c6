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

/// Exchanges the customer at `first` of one route with the customer at
/// `second` of another.
///
/// ```text
///   r1: .. a -> u -> b ..          r1: .. a -> v -> b ..
///   r2: .. x -> v -> y ..     =>   r2: .. x -> u -> y ..
/// ```
#[derive(Debug)]
pub struct InterSwapOperator {
    params: InterSwapParams,
}

#[derive(Debug)]
pub struct InterSwapParams {
    pub first_route_id: RouteIdx,
    pub second_route_id: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl InterSwapOperator {
    pub fn new(params: InterSwapParams) -> Self {
        debug_assert_ne!(
            params.first_route_id, params.second_route_id,
            "InterSwapOperator cannot be used for intra-route swaps"
        );

        Self { params }
    }
}

impl LocalSearchOperator for InterSwapOperator {
    fn generate_moves<C>(
        solution: &WorkingSolution,
        neighbourhood: &Neighbourhood,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        // (r1, r2) and (r2, r1) describe the same swaps
        if r1 >= r2 {
            return;
        }

        let first_route = solution.route(r1);
        let second_route = solution.route(r2);

        for first in 0..first_route.len() {
            for second in 0..second_route.len() {
                if !neighbourhood.contains(first_route.node(first), second_route.node(second)) {
                    continue;
                }

                consumer(InterSwapOperator::new(InterSwapParams {
                    first_route_id: r1,
                    second_route_id: r2,
                    first,
                    second,
                }))
            }
        }
    }

    fn cost_delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let first_route = solution.route(self.params.first_route_id);
        let second_route = solution.route(self.params.second_route_id);

        let first = first_route.node(self.params.first);
        let second = second_route.node(self.params.second);

        first_route.replacement_cost_delta(
            problem,
            std::iter::once(second),
            self.params.first,
            self.params.first + 1,
        ) + second_route.replacement_cost_delta(
            problem,
            std::iter::once(first),
            self.params.second,
            self.params.second + 1,
        )
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let problem = solution.problem();
        let first_route = solution.route(self.params.first_route_id);
        let second_route = solution.route(self.params.second_route_id);

        let first = first_route.node(self.params.first);
        let second = second_route.node(self.params.second);

        first_route.is_valid_change(
            problem,
            std::iter::once(second),
            self.params.first,
            self.params.first + 1,
        ) && second_route.is_valid_change(
            problem,
            std::iter::once(first),
            self.params.second,
            self.params.second + 1,
        )
    }

    fn apply(&self, problem: &FleetRoutingProblem, solution: &mut WorkingSolution) {
        let first = solution.route(self.params.first_route_id).node(self.params.first);
        let second = solution
            .route(self.params.second_route_id)
            .node(self.params.second);

        solution.route_mut(self.params.first_route_id).replace_nodes(
            problem,
            &[second],
            self.params.first,
            self.params.first + 1,
        );
        solution.route_mut(self.params.second_route_id).replace_nodes(
            problem,
            &[first],
            self.params.second,
            self.params.second + 1,
        );
    }

    fn updated_routes(&self) -> UpdatedRoutes {
        smallvec![self.params.first_route_id, self.params.second_route_id]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        problem::node::NodeIdx,
        solver::{
            ls::{
                inter_swap::{InterSwapOperator, InterSwapParams},
                r#move::LocalSearchOperator,
            },
            solution::route_id::RouteIdx,
        },
        test_utils::{self, TestRoute, TestVehicle},
    };

    #[test]
    fn test_inter_swap_untangles_routes() {
        // customers 1 and 2 east of the depot, 3 and 4 west of it
        let problem = Arc::new(test_utils::create_test_problem(
            &[(0.0, 0.0), (5.0, 0.0), (6.0, 0.0), (-5.0, 0.0), (-6.0, 0.0)],
            &[1; 4],
            &[TestVehicle::with_capacity(10), TestVehicle::with_capacity(10)],
        ));
        let mut solution = test_utils::create_test_working_solution(
            Arc::clone(&problem),
            vec![
                TestRoute {
                    vehicle_id: 0,
                    customers: vec![1, 4],
                },
                TestRoute {
                    vehicle_id: 1,
                    customers: vec![3, 2],
                },
            ],
        );

        let operator = InterSwapOperator::new(InterSwapParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 1,
            second: 1,
        });

        let cost_before = solution.total_cost();
        let delta = operator.cost_delta(&solution);
        assert!(delta < 0);
        assert!(operator.is_valid(&solution));
        operator.apply(&problem, &mut solution);

        assert_eq!(
            solution.route(RouteIdx::new(0)).nodes(),
            &[NodeIdx::new(1), NodeIdx::new(2)]
        );
        assert_eq!(
            solution.route(RouteIdx::new(1)).nodes(),
            &[NodeIdx::new(3), NodeIdx::new(4)]
        );
        assert_eq!(cost_before + delta, solution.total_cost());
    }

    #[test]
    fn test_inter_swap_respects_capacity() {
        let problem = Arc::new(test_utils::create_test_problem(
            &test_utils::create_line(4),
            &[1, 6, 3],
            &[TestVehicle::with_capacity(10), TestVehicle::with_capacity(4)],
        ));
        let solution = test_utils::create_test_working_solution(
            Arc::clone(&problem),
            vec![
                TestRoute {
                    vehicle_id: 0,
                    customers: vec![1, 2],
                },
                TestRoute {
                    vehicle_id: 1,
                    customers: vec![3],
                },
            ],
        );

        // 6 units do not fit in the second vehicle
        let operator = InterSwapOperator::new(InterSwapParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 1,
            second: 0,
        });
        assert!(!operator.is_valid(&solution));

        let operator = InterSwapOperator::new(InterSwapParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 0,
            second: 0,
        });
        assert!(operator.is_valid(&solution));
    }

    #[test]
    fn test_inter_swap_respects_time_limit() {
        let problem = Arc::new(test_utils::create_test_problem(
            &test_utils::create_line(4),
            &[1, 1, 1],
            &[
                TestVehicle::with_capacity(10).time_limit_secs(240),
                TestVehicle::with_capacity(10),
            ],
        ));
        let solution = test_utils::create_test_working_solution(
            Arc::clone(&problem),
            vec![
                TestRoute {
                    vehicle_id: 0,
                    customers: vec![1],
                },
                TestRoute {
                    vehicle_id: 1,
                    customers: vec![2, 3],
                },
            ],
        );

        // 3 is reached after 180s, the closing leg ends at 360s
        let operator = InterSwapOperator::new(InterSwapParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 0,
            second: 1,
        });
        assert!(!operator.is_valid(&solution));

        // 0 -> 2 -> 0 takes exactly the 240s limit
        let operator = InterSwapOperator::new(InterSwapParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 0,
            second: 0,
        });
        assert!(operator.is_valid(&solution));
    }
}
