use std::{collections::BTreeSet, sync::Arc};

use crate::{
    problem::{
        cost::Cost,
        fleet_routing_problem::FleetRoutingProblem,
        node::NodeIdx,
        vehicle::VehicleIdx,
    },
    solver::{
        insertion::Insertion,
        solution::{route::WorkingSolutionRoute, route_id::RouteIdx},
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Mutable solution owned by a single solving run: one route per vehicle plus
/// the customers not served yet. Every customer is in exactly one of them.
#[derive(Clone)]
pub struct WorkingSolution {
    problem: Arc<FleetRoutingProblem>,
    routes: Vec<WorkingSolutionRoute>,
    // Ordered so that iteration follows customer ids
    unassigned: BTreeSet<NodeIdx>,
}

impl WorkingSolution {
    pub fn new(problem: Arc<FleetRoutingProblem>) -> Self {
        let routes = problem
            .vehicles()
            .iter()
            .enumerate_idx::<VehicleIdx>()
            .map(|(vehicle_id, _)| WorkingSolutionRoute::empty(&problem, vehicle_id))
            .collect::<Vec<_>>();
        let unassigned = problem.customers_iter().collect();

        WorkingSolution {
            problem,
            routes,
            unassigned,
        }
    }

    pub fn problem(&self) -> &FleetRoutingProblem {
        &self.problem
    }

    pub fn problem_arc(&self) -> &Arc<FleetRoutingProblem> {
        &self.problem
    }

    pub fn routes(&self) -> &[WorkingSolutionRoute] {
        &self.routes
    }

    pub fn route(&self, route_id: RouteIdx) -> &WorkingSolutionRoute {
        &self.routes[route_id]
    }

    pub fn route_mut(&mut self, route_id: RouteIdx) -> &mut WorkingSolutionRoute {
        &mut self.routes[route_id]
    }

    pub fn non_empty_routes_iter(&self) -> impl Iterator<Item = &WorkingSolutionRoute> {
        self.routes.iter().filter(|route| !route.is_empty())
    }

    pub fn non_empty_routes_count(&self) -> usize {
        self.non_empty_routes_iter().count()
    }

    pub fn unassigned(&self) -> &BTreeSet<NodeIdx> {
        &self.unassigned
    }

    pub fn has_unassigned(&self) -> bool {
        !self.unassigned.is_empty()
    }

    pub fn is_unassigned(&self, node: NodeIdx) -> bool {
        self.unassigned.contains(&node)
    }

    pub fn route_of(&self, node: NodeIdx) -> Option<RouteIdx> {
        self.routes
            .iter()
            .enumerate_idx::<RouteIdx>()
            .find(|(_, route)| route.contains(node))
            .map(|(route_id, _)| route_id)
    }

    pub fn total_cost(&self) -> Cost {
        self.routes.iter().map(WorkingSolutionRoute::cost).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.routes.iter().all(WorkingSolutionRoute::is_feasible)
    }

    pub fn insert(&mut self, insertion: &Insertion) {
        let route = &mut self.routes[insertion.route_id];
        route.insert(&self.problem, insertion.position, insertion.node);
        self.unassigned.remove(&insertion.node);
    }

    /// Takes the customer at `position` out of the route and marks it unassigned.
    pub fn remove_route_node(&mut self, route_id: RouteIdx, position: usize) -> Option<NodeIdx> {
        let node = self.routes[route_id].remove(&self.problem, position)?;
        self.unassigned.insert(node);
        Some(node)
    }

    /// Same customers in the same order on every vehicle.
    pub fn is_identical(&self, other: &WorkingSolution) -> bool {
        self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(&other.routes)
                .all(|(route, other_route)| {
                    route.vehicle_id() == other_route.vehicle_id()
                        && route.nodes() == other_route.nodes()
                })
            && self.unassigned == other.unassigned
    }
}
