use crate::{
    problem::node::NodeIdx,
    solver::solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// Insert `node` before the customer currently at `position` of the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub route_id: RouteIdx,
    pub node: NodeIdx,
    pub position: usize,
}

/// Every position of one route, in increasing order.
pub fn for_each_route_insertion(
    solution: &WorkingSolution,
    route_id: RouteIdx,
    node: NodeIdx,
    mut f: impl FnMut(Insertion),
) {
    let route = solution.route(route_id);
    for position in 0..=route.len() {
        f(Insertion {
            route_id,
            node,
            position,
        });
    }
}
