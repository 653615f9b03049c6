#![allow(dead_code)]

use fleetwise_optimizer::{
    ProblemInput, Solution,
    input::{CustomerInput, VehicleInput},
    problem::{
        fleet_routing_problem::FleetRoutingProblem,
        node::{Demand, NodeIdx},
        vehicle::VehicleIdx,
    },
};
use jiff::SignedDuration;

pub const SECS_PER_KM: f64 = 60.0;

pub struct TestFleetVehicle {
    pub capacity: Demand,
    pub hourly_wage: f64,
    pub time_limit_secs: i64,
}

impl TestFleetVehicle {
    pub fn new(capacity: Demand) -> Self {
        TestFleetVehicle {
            capacity,
            hourly_wage: 30.0,
            time_limit_secs: 8 * 3600,
        }
    }

    pub fn hourly_wage(mut self, hourly_wage: f64) -> Self {
        self.hourly_wage = hourly_wage;
        self
    }

    pub fn time_limit_secs(mut self, time_limit_secs: i64) -> Self {
        self.time_limit_secs = time_limit_secs;
        self
    }
}

/// Deterministic scatter of `n` customers around a depot at the origin.
pub fn spiral_points(n: usize) -> Vec<(f64, f64)> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    std::iter::once((0.0, 0.0))
        .chain((1..=n).map(|i| {
            let radius = 2.0 * (i as f64).sqrt();
            let angle = i as f64 * golden_angle;
            (radius * angle.cos(), radius * angle.sin())
        }))
        .collect()
}

/// Demands cycling through `1..=max`.
pub fn cycling_demands(n: usize, max: Demand) -> Vec<Demand> {
    (0..n as Demand).map(|i| i % max + 1).collect()
}

pub fn create_input(
    points: &[(f64, f64)],
    demands: &[Demand],
    vehicles: &[TestFleetVehicle],
) -> ProblemInput {
    let distances = points
        .iter()
        .map(|&(x1, y1)| {
            points
                .iter()
                .map(|&(x2, y2)| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let durations = distances
        .iter()
        .map(|row| row.iter().map(|km| km * SECS_PER_KM).collect())
        .collect();

    ProblemInput {
        customers: demands
            .iter()
            .enumerate()
            .map(|(index, &demand)| CustomerInput {
                id: index + 1,
                demand,
            })
            .collect(),
        fleet: vehicles
            .iter()
            .map(|vehicle| VehicleInput {
                capacity: Some(vehicle.capacity),
                fuel_consumption_rate: Some(0.1),
                fuel_cost_per_unit: Some(2.0),
                hourly_wage: Some(vehicle.hourly_wage),
                time_limit: Some(SignedDuration::from_secs(vehicle.time_limit_secs)),
            })
            .collect(),
        distance_matrix: Some(distances),
        duration_matrix: Some(durations),
    }
}

pub fn create_problem(
    points: &[(f64, f64)],
    demands: &[Demand],
    vehicles: &[TestFleetVehicle],
) -> FleetRoutingProblem {
    create_input(points, demands, vehicles)
        .build_problem()
        .unwrap()
}

/// Every customer is either on exactly one route or unassigned.
pub fn assert_partition(problem: &FleetRoutingProblem, solution: &Solution) {
    let mut seen = vec![0; problem.num_nodes()];
    for route in &solution.routes {
        assert_eq!(route.stops.first(), Some(&0));
        assert_eq!(route.stops.last(), Some(&0));
        for &customer in route.customers() {
            seen[customer] += 1;
        }
    }
    for unassigned in &solution.unassigned {
        seen[unassigned.customer] += 1;
    }

    for customer in 1..problem.num_nodes() {
        assert_eq!(seen[customer], 1, "customer {customer} seen {} times", seen[customer]);
    }
}

/// Loads and elapsed times recomputed from the problem stay within the vehicle bounds.
pub fn assert_dimensions_respected(problem: &FleetRoutingProblem, solution: &Solution) {
    for route in &solution.routes {
        let vehicle = problem.vehicle(VehicleIdx::new(route.vehicle_id));

        let mut load = 0;
        let mut elapsed = 0;
        for (step, window) in route.stops.windows(2).enumerate() {
            let (from, to) = (NodeIdx::new(window[0]), NodeIdx::new(window[1]));
            load += problem.demand(to);
            elapsed += problem.transit_secs(from, to);

            assert_eq!(route.loads[step + 1], load);
            assert_eq!(route.elapsed_seconds[step + 1], elapsed);
            assert!((0..=vehicle.capacity()).contains(&load));
            assert!((0..=vehicle.time_limit_secs()).contains(&elapsed));
        }
    }
}

/// Route costs match a from-scratch evaluation.
pub fn assert_no_cost_drift(problem: &FleetRoutingProblem, solution: &Solution) {
    let mut total = 0;
    for route in &solution.routes {
        let stops = route
            .stops
            .iter()
            .map(|&node| NodeIdx::new(node))
            .collect::<Vec<_>>();
        let cost = problem.route_cost(VehicleIdx::new(route.vehicle_id), &stops);
        assert_eq!(route.cost, cost);
        total += cost;
    }
    assert_eq!(solution.total_cost, total);
}
