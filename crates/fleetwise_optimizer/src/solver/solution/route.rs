use std::sync::atomic::{AtomicUsize, Ordering};

use fxhash::FxHashMap;

use crate::{
    problem::{
        cost::Cost,
        fleet_routing_problem::FleetRoutingProblem,
        node::{DEPOT, Demand, NodeIdx},
        vehicle::{Vehicle, VehicleIdx},
    },
    solver::dimension::{CapacityDimension, DimensionCache, TimeDimension},
};

static ROUTE_VERSION: AtomicUsize = AtomicUsize::new(1);

fn next_version() -> usize {
    ROUTE_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Route of one vehicle during the search. Positions index the customers
/// only; the depot before position `0` and after the last position is implicit.
#[derive(Clone)]
pub struct WorkingSolutionRoute {
    pub(super) vehicle_id: VehicleIdx,

    // Map of customer to its position in `nodes`
    pub(super) positions: FxHashMap<NodeIdx, usize>,

    /// Customers in visiting order
    pub(super) nodes: Vec<NodeIdx>,

    load: DimensionCache,
    time: DimensionCache,

    /// Kept up to date incrementally by every mutation
    cost: Cost,

    /// Changes on every mutation, used as a cache key by the search
    version: usize,
}

impl WorkingSolutionRoute {
    pub fn empty(problem: &FleetRoutingProblem, vehicle_id: VehicleIdx) -> Self {
        let mut route = WorkingSolutionRoute {
            vehicle_id,
            positions: FxHashMap::default(),
            nodes: Vec::new(),
            load: DimensionCache::default(),
            time: DimensionCache::default(),
            cost: 0,
            version: 0,
        };

        route.update_data(problem);

        route
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn vehicle_id(&self) -> VehicleIdx {
        self.vehicle_id
    }

    pub fn vehicle<'a>(&self, problem: &'a FleetRoutingProblem) -> &'a Vehicle {
        problem.vehicle(self.vehicle_id)
    }

    pub fn version(&self) -> usize {
        self.version
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn nodes(&self) -> &[NodeIdx] {
        &self.nodes
    }

    pub fn node(&self, position: usize) -> NodeIdx {
        self.nodes[position]
    }

    /// Customers in `[start, end)`.
    pub fn nodes_iter(
        &self,
        start: usize,
        end: usize,
    ) -> impl DoubleEndedIterator<Item = NodeIdx> + Clone + '_ {
        self.nodes[start..end].iter().copied()
    }

    pub fn contains(&self, node: NodeIdx) -> bool {
        self.positions.contains_key(&node)
    }

    pub fn position_of(&self, node: NodeIdx) -> Option<usize> {
        self.positions.get(&node).copied()
    }

    /// Node visited before `position`, the depot for the first customer.
    #[inline]
    pub fn previous_node(&self, position: usize) -> NodeIdx {
        if position == 0 {
            DEPOT
        } else {
            self.nodes[position - 1]
        }
    }

    /// Node visited after `position`, the depot for the last customer.
    #[inline]
    pub fn next_node(&self, position: usize) -> NodeIdx {
        self.node_or_depot(position + 1)
    }

    #[inline]
    pub fn node_or_depot(&self, position: usize) -> NodeIdx {
        self.nodes.get(position).copied().unwrap_or(DEPOT)
    }

    /// Full stop sequence, starting and ending at the depot.
    pub fn stops(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        std::iter::once(DEPOT)
            .chain(self.nodes.iter().copied())
            .chain(std::iter::once(DEPOT))
    }

    pub fn load(&self) -> &DimensionCache {
        &self.load
    }

    pub fn time(&self) -> &DimensionCache {
        &self.time
    }

    pub fn total_load(&self) -> Demand {
        self.load.end_value()
    }

    /// Elapsed seconds on return to the depot.
    pub fn duration_secs(&self) -> i64 {
        self.time.end_value()
    }

    pub fn is_feasible(&self) -> bool {
        self.load.is_feasible() && self.time.is_feasible()
    }

    /// Whether `node` can be inserted before `position` without breaking any dimension.
    #[inline]
    pub fn can_insert(&self, problem: &FleetRoutingProblem, node: NodeIdx, position: usize) -> bool {
        self.load
            .feasible_insertion(&CapacityDimension, problem, &self.nodes, position, node)
            && self
                .time
                .feasible_insertion(&TimeDimension, problem, &self.nodes, position, node)
    }

    #[inline]
    pub fn insertion_cost_delta(
        &self,
        problem: &FleetRoutingProblem,
        node: NodeIdx,
        position: usize,
    ) -> Cost {
        let previous = self.previous_node(position);
        let next = self.node_or_depot(position);

        problem.arc_cost(self.vehicle_id, previous, node)
            + problem.arc_cost(self.vehicle_id, node, next)
            - problem.arc_cost(self.vehicle_id, previous, next)
    }

    #[inline]
    pub fn removal_cost_delta(&self, problem: &FleetRoutingProblem, position: usize) -> Cost {
        let previous = self.previous_node(position);
        let node = self.nodes[position];
        let next = self.next_node(position);

        problem.arc_cost(self.vehicle_id, previous, next)
            - problem.arc_cost(self.vehicle_id, previous, node)
            - problem.arc_cost(self.vehicle_id, node, next)
    }

    /// Cost delta of replacing the customers in `[start, end)` with `replacement`.
    pub fn replacement_cost_delta(
        &self,
        problem: &FleetRoutingProblem,
        replacement: impl Iterator<Item = NodeIdx>,
        start: usize,
        end: usize,
    ) -> Cost {
        let previous = self.previous_node(start);
        let next = self.node_or_depot(end);

        let mut current = self.path_cost(problem, previous, self.nodes[start..end].iter().copied());
        current += problem.arc_cost(
            self.vehicle_id,
            self.nodes[start..end].last().copied().unwrap_or(previous),
            next,
        );

        let mut last = previous;
        let mut updated = 0;
        for node in replacement {
            updated += problem.arc_cost(self.vehicle_id, last, node);
            last = node;
        }
        updated += problem.arc_cost(self.vehicle_id, last, next);

        updated - current
    }

    fn path_cost(
        &self,
        problem: &FleetRoutingProblem,
        from: NodeIdx,
        nodes: impl Iterator<Item = NodeIdx>,
    ) -> Cost {
        let mut last = from;
        let mut cost = 0;
        for node in nodes {
            cost += problem.arc_cost(self.vehicle_id, last, node);
            last = node;
        }
        cost
    }

    /// Checks both dimensions for the route where `[start, end)` is replaced with `replacement`.
    pub fn is_valid_change(
        &self,
        problem: &FleetRoutingProblem,
        replacement: impl Iterator<Item = NodeIdx> + Clone,
        start: usize,
        end: usize,
    ) -> bool {
        self.load.is_valid_change(
            &CapacityDimension,
            problem,
            &self.nodes,
            replacement.clone(),
            start,
            end,
        ) && self
            .time
            .is_valid_change(&TimeDimension, problem, &self.nodes, replacement, start, end)
    }

    pub fn insert(&mut self, problem: &FleetRoutingProblem, position: usize, node: NodeIdx) {
        if self.positions.contains_key(&node) {
            return;
        }

        self.cost += self.insertion_cost_delta(problem, node, position);
        self.nodes.insert(position, node);

        self.update_data(problem);
    }

    pub fn remove(&mut self, problem: &FleetRoutingProblem, position: usize) -> Option<NodeIdx> {
        if position >= self.nodes.len() {
            return None;
        }

        self.cost += self.removal_cost_delta(problem, position);
        let node = self.nodes.remove(position);

        self.update_data(problem);

        Some(node)
    }

    pub fn replace_nodes(
        &mut self,
        problem: &FleetRoutingProblem,
        nodes: &[NodeIdx],
        start: usize,
        end: usize,
    ) {
        self.cost += self.replacement_cost_delta(problem, nodes.iter().copied(), start, end);
        self.nodes.splice(start..end, nodes.iter().copied());

        self.update_data(problem);
    }

    /// Cost recomputed from scratch, without the incremental bookkeeping.
    pub fn compute_cost(&self, problem: &FleetRoutingProblem) -> Cost {
        problem.route_cost(self.vehicle_id, &self.nodes)
    }

    fn update_data(&mut self, problem: &FleetRoutingProblem) {
        self.positions.clear();
        self.positions.extend(
            self.nodes
                .iter()
                .enumerate()
                .map(|(position, &node)| (node, position)),
        );

        self.load = DimensionCache::compute(&CapacityDimension, problem, self.vehicle_id, &self.nodes);
        self.time = DimensionCache::compute(&TimeDimension, problem, self.vehicle_id, &self.nodes);
        self.version = next_version();
    }
}
