use std::cmp::Ordering;

use crate::{
    error::{OptimizerError, ValidationError},
    problem::{
        cost::{Cost, VehicleCostFn},
        fleet::Fleet,
        node::{DEPOT, Demand, Node, NodeIdx},
        travel_matrices::{Distance, Duration, TravelMatrices},
        vehicle::{Vehicle, VehicleIdx},
    },
};

type PrecomputedNearestCustomers = Vec<Vec<NodeIdx>>;

/// Immutable snapshot of a heterogeneous fleet routing problem: one depot at
/// node 0, customers at nodes `1..=n`, the fleet and the travel matrices.
pub struct FleetRoutingProblem {
    nodes: Vec<Node>,
    fleet: Fleet,
    travel_matrices: TravelMatrices,
    cost_fns: Vec<VehicleCostFn>,

    /// Customers of every node, by increasing distance, ties by id.
    precomputed_nearest_customers: PrecomputedNearestCustomers,
    /// Rank of `to` in the nearest customers of `from`, flat `from * num_nodes + to`.
    precomputed_neighbour_ranks: Vec<usize>,
    /// Shortest whole-second trip out of the depot to every node and back,
    /// possibly through other nodes.
    precomputed_min_round_trip_secs: Vec<i64>,
}

impl FleetRoutingProblem {
    fn new(nodes: Vec<Node>, fleet: Fleet, travel_matrices: TravelMatrices) -> Self {
        let cost_fns = fleet.vehicles().iter().map(VehicleCostFn::new).collect();
        let num_nodes = nodes.len();

        let precomputed_nearest_customers =
            FleetRoutingProblem::precompute_nearest_customers(&travel_matrices, num_nodes);

        let mut precomputed_neighbour_ranks = vec![usize::MAX; num_nodes * num_nodes];
        for (from, nearest) in precomputed_nearest_customers.iter().enumerate() {
            for (rank, to) in nearest.iter().enumerate() {
                precomputed_neighbour_ranks[from * num_nodes + to.get()] = rank;
            }
        }

        let outbound = shortest_transit_secs(num_nodes, |from, to| {
            travel_matrices.transit_secs(from, to)
        });
        let inbound = shortest_transit_secs(num_nodes, |from, to| {
            travel_matrices.transit_secs(to, from)
        });
        let precomputed_min_round_trip_secs = outbound
            .iter()
            .zip(&inbound)
            .map(|(out, back)| out.saturating_add(*back))
            .collect();

        FleetRoutingProblem {
            nodes,
            fleet,
            travel_matrices,
            cost_fns,
            precomputed_nearest_customers,
            precomputed_neighbour_ranks,
            precomputed_min_round_trip_secs,
        }
    }

    fn precompute_nearest_customers(
        travel_matrices: &TravelMatrices,
        num_nodes: usize,
    ) -> PrecomputedNearestCustomers {
        (0..num_nodes)
            .map(NodeIdx::new)
            .map(|from| {
                let mut customers = (1..num_nodes)
                    .map(NodeIdx::new)
                    .filter(|&to| to != from)
                    .collect::<Vec<_>>();

                customers.sort_by(|&a, &b| {
                    travel_matrices
                        .travel_distance(from, a)
                        .partial_cmp(&travel_matrices.travel_distance(from, b))
                        .unwrap_or(Ordering::Equal)
                        .then(a.cmp(&b))
                });
                customers
            })
            .collect()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeIdx) -> &Node {
        &self.nodes[node_id]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn customers_iter(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (1..self.nodes.len()).map(NodeIdx::new)
    }

    #[inline]
    pub fn demand(&self, node_id: NodeIdx) -> Demand {
        self.nodes[node_id].demand()
    }

    pub fn total_demand(&self) -> Demand {
        self.nodes.iter().map(Node::demand).sum()
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        self.fleet.vehicle(vehicle_id)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.fleet.vehicles()
    }

    pub fn travel_matrices(&self) -> &TravelMatrices {
        &self.travel_matrices
    }

    #[inline]
    pub fn travel_distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.travel_matrices.travel_distance(from, to)
    }

    #[inline]
    pub fn travel_duration(&self, from: NodeIdx, to: NodeIdx) -> Duration {
        self.travel_matrices.travel_duration(from, to)
    }

    #[inline]
    pub fn transit_secs(&self, from: NodeIdx, to: NodeIdx) -> i64 {
        self.travel_matrices.transit_secs(from, to)
    }

    pub fn is_symmetric(&self) -> bool {
        self.travel_matrices.is_symmetric()
    }

    pub fn cost_fn(&self, vehicle_id: VehicleIdx) -> &VehicleCostFn {
        &self.cost_fns[vehicle_id.get()]
    }

    /// Cost of driving `from -> to` with the given vehicle, in minor units.
    #[inline]
    pub fn arc_cost(&self, vehicle_id: VehicleIdx, from: NodeIdx, to: NodeIdx) -> Cost {
        if from == to {
            return 0;
        }

        self.cost_fns[vehicle_id.get()].arc_cost(
            self.travel_matrices.travel_distance(from, to),
            self.travel_matrices.travel_duration(from, to),
        )
    }

    /// Sum of the arc costs along `sequence`. The route is closed on the depot:
    /// a leg from the depot is added when the sequence does not start there and
    /// a leg back to it when the sequence does not end there.
    pub fn route_cost(&self, vehicle_id: VehicleIdx, sequence: &[NodeIdx]) -> Cost {
        let (Some(&first), Some(&last)) = (sequence.first(), sequence.last()) else {
            return 0;
        };

        let mut cost = 0;
        if first != DEPOT {
            cost += self.arc_cost(vehicle_id, DEPOT, first);
        }
        for window in sequence.windows(2) {
            cost += self.arc_cost(vehicle_id, window[0], window[1]);
        }
        if last != DEPOT {
            cost += self.arc_cost(vehicle_id, last, DEPOT);
        }
        cost
    }

    pub fn nearest_customers(&self, node_id: NodeIdx) -> &[NodeIdx] {
        &self.precomputed_nearest_customers[node_id.get()]
    }

    /// Whether `candidate` is among the `k` nearest customers of `of`.
    #[inline]
    pub fn is_neighbour(&self, of: NodeIdx, candidate: NodeIdx, k: usize) -> bool {
        self.precomputed_neighbour_ranks[of.get() * self.nodes.len() + candidate.get()] < k
    }

    /// Lower bound on the duration of any route visiting `node`.
    pub fn min_round_trip_secs(&self, node_id: NodeIdx) -> i64 {
        self.precomputed_min_round_trip_secs[node_id.get()]
    }

    /// Some route through the customer fits in at least one vehicle's time limit.
    pub fn is_reachable_within_time_limit(&self, customer: NodeIdx) -> bool {
        let round_trip = self.min_round_trip_secs(customer);
        self.vehicles()
            .iter()
            .any(|vehicle| round_trip <= vehicle.time_limit_secs())
    }
}

/// Dense Dijkstra from the depot over whole-second transits, `transit(from, to)`
/// being the cost of relaxing `to` from `from`.
fn shortest_transit_secs(num_nodes: usize, transit: impl Fn(NodeIdx, NodeIdx) -> i64) -> Vec<i64> {
    let mut dist = vec![i64::MAX; num_nodes];
    let mut settled = vec![false; num_nodes];
    if num_nodes == 0 {
        return dist;
    }
    dist[DEPOT.get()] = 0;

    for _ in 0..num_nodes {
        let Some(current) = (0..num_nodes)
            .filter(|&node| !settled[node] && dist[node] != i64::MAX)
            .min_by_key(|&node| dist[node])
        else {
            break;
        };
        settled[current] = true;

        for next in 0..num_nodes {
            if settled[next] {
                continue;
            }
            let candidate = dist[current] + transit(NodeIdx::new(current), NodeIdx::new(next));
            if candidate < dist[next] {
                dist[next] = candidate;
            }
        }
    }

    dist
}

#[derive(Default)]
pub struct FleetRoutingProblemBuilder {
    demands: Option<Vec<Demand>>,
    vehicles: Option<Vec<Vehicle>>,
    travel_matrices: Option<TravelMatrices>,
}

impl FleetRoutingProblemBuilder {
    /// Demands of customers `1..=n`, in order. The depot is implicit.
    pub fn set_customer_demands(&mut self, demands: Vec<Demand>) -> &mut FleetRoutingProblemBuilder {
        self.demands = Some(demands);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) -> &mut FleetRoutingProblemBuilder {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn set_travel_matrices(
        &mut self,
        travel_matrices: TravelMatrices,
    ) -> &mut FleetRoutingProblemBuilder {
        self.travel_matrices = Some(travel_matrices);
        self
    }

    pub fn build(self) -> Result<FleetRoutingProblem, OptimizerError> {
        let travel_matrices = self
            .travel_matrices
            .ok_or_else(|| OptimizerError::upstream("travel matrices are missing"))?;
        let demands = self.demands.unwrap_or_default();
        let vehicles = self.vehicles.unwrap_or_default();

        if vehicles.is_empty() {
            return Err(ValidationError::EmptyFleet.into());
        }

        let expected = demands.len() + 1;
        if travel_matrices.num_nodes() != expected {
            return Err(ValidationError::MatrixDimensionMismatch {
                expected,
                actual: travel_matrices.num_nodes(),
            }
            .into());
        }

        let fleet = Fleet::new(vehicles);
        let max_capacity = fleet.max_capacity();

        let mut nodes = Vec::with_capacity(expected);
        nodes.push(Node::depot());
        for (index, demand) in demands.into_iter().enumerate() {
            let customer = index + 1;
            if demand < 0 {
                return Err(ValidationError::NegativeDemand { customer, demand }.into());
            }
            if demand > max_capacity {
                return Err(ValidationError::DemandExceedsFleetCapacity {
                    customer,
                    demand,
                    max_capacity,
                }
                .into());
            }
            nodes.push(Node::customer(NodeIdx::new(customer), demand));
        }

        Ok(FleetRoutingProblem::new(nodes, fleet, travel_matrices))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{self, TestVehicle};

    use super::*;

    #[test]
    fn test_route_cost_closes_on_depot() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)],
            &[1, 1],
            &[TestVehicle::with_capacity(10)],
        );
        let vehicle_id = VehicleIdx::new(0);
        let path = [DEPOT, NodeIdx::new(1), NodeIdx::new(2)];

        let open = problem.route_cost(vehicle_id, &path);
        let closed = problem.route_cost(vehicle_id, &[DEPOT, NodeIdx::new(1), NodeIdx::new(2), DEPOT]);
        let without_depot = problem.route_cost(vehicle_id, &[NodeIdx::new(1), NodeIdx::new(2)]);

        assert_eq!(open, closed);
        assert_eq!(open, without_depot);
        assert_eq!(
            open,
            problem.arc_cost(vehicle_id, DEPOT, NodeIdx::new(1))
                + problem.arc_cost(vehicle_id, NodeIdx::new(1), NodeIdx::new(2))
                + problem.arc_cost(vehicle_id, NodeIdx::new(2), DEPOT)
        );
        assert_eq!(problem.route_cost(vehicle_id, &[]), 0);
        assert_eq!(problem.route_cost(vehicle_id, &[DEPOT, DEPOT]), 0);
    }

    #[test]
    fn test_nearest_customers() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (5.0, 0.0), (1.0, 0.0), (2.0, 0.0)],
            &[1, 1, 1],
            &[TestVehicle::with_capacity(10)],
        );

        assert_eq!(
            problem.nearest_customers(DEPOT),
            &[NodeIdx::new(2), NodeIdx::new(3), NodeIdx::new(1)]
        );
        assert_eq!(
            problem.nearest_customers(NodeIdx::new(2)),
            &[NodeIdx::new(3), NodeIdx::new(1)]
        );
        assert!(problem.is_neighbour(NodeIdx::new(2), NodeIdx::new(3), 1));
        assert!(!problem.is_neighbour(NodeIdx::new(2), NodeIdx::new(1), 1));
    }

    #[test]
    fn test_build_rejects_dimension_mismatch() {
        let mut builder = FleetRoutingProblemBuilder::default();
        builder
            .set_customer_demands(vec![1, 1])
            .set_vehicles(test_utils::create_basic_vehicles(&[10]))
            .set_travel_matrices(test_utils::create_euclidean_matrices(&[(0.0, 0.0), (1.0, 0.0)]));

        assert_eq!(
            builder.build().err(),
            Some(OptimizerError::Validation(
                ValidationError::MatrixDimensionMismatch {
                    expected: 3,
                    actual: 2
                }
            ))
        );
    }

    #[test]
    fn test_build_rejects_bad_demands() {
        let matrices = || test_utils::create_euclidean_matrices(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

        let mut builder = FleetRoutingProblemBuilder::default();
        builder
            .set_customer_demands(vec![1, -2])
            .set_vehicles(test_utils::create_basic_vehicles(&[10]))
            .set_travel_matrices(matrices());
        assert_eq!(
            builder.build().err(),
            Some(OptimizerError::Validation(ValidationError::NegativeDemand {
                customer: 2,
                demand: -2
            }))
        );

        let mut builder = FleetRoutingProblemBuilder::default();
        builder
            .set_customer_demands(vec![11, 1])
            .set_vehicles(test_utils::create_basic_vehicles(&[10, 5]))
            .set_travel_matrices(matrices());
        assert_eq!(
            builder.build().err(),
            Some(OptimizerError::Validation(
                ValidationError::DemandExceedsFleetCapacity {
                    customer: 1,
                    demand: 11,
                    max_capacity: 10
                }
            ))
        );
    }

    #[test]
    fn test_build_requires_fleet_and_matrices() {
        let mut builder = FleetRoutingProblemBuilder::default();
        builder.set_customer_demands(vec![1]);
        assert!(matches!(
            builder.build(),
            Err(OptimizerError::UpstreamDataUnavailable { .. })
        ));

        let mut builder = FleetRoutingProblemBuilder::default();
        builder
            .set_customer_demands(vec![1])
            .set_travel_matrices(test_utils::create_euclidean_matrices(&[(0.0, 0.0), (1.0, 0.0)]));
        assert_eq!(
            builder.build().err(),
            Some(OptimizerError::Validation(ValidationError::EmptyFleet))
        );
    }

    #[test]
    fn test_reachable_within_time_limit() {
        let problem = test_utils::create_test_problem(
            &[(0.0, 0.0), (1.0, 0.0), (100.0, 0.0)],
            &[1, 1],
            &[TestVehicle::with_capacity(10).time_limit_secs(1000)],
        );

        // one km per minute in the test fixtures
        assert!(problem.is_reachable_within_time_limit(NodeIdx::new(1)));
        assert!(!problem.is_reachable_within_time_limit(NodeIdx::new(2)));
    }

    #[test]
    fn test_min_round_trip_goes_through_other_customers() {
        let problem = test_utils::create_test_problem_with_durations(
            &[
                &[0.0, 10.0, 1000.0],
                &[10.0, 0.0, 10.0],
                &[1000.0, 10.0, 0.0],
            ],
            &[1, 1],
            &[TestVehicle::with_capacity(10).time_limit_secs(1500)],
        );

        assert_eq!(problem.min_round_trip_secs(DEPOT), 0);
        assert_eq!(problem.min_round_trip_secs(NodeIdx::new(1)), 20);
        assert_eq!(problem.min_round_trip_secs(NodeIdx::new(2)), 40);
        assert!(problem.is_reachable_within_time_limit(NodeIdx::new(2)));
    }
}
