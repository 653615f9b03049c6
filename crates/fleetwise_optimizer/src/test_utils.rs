use std::sync::Arc;

use jiff::SignedDuration;

use crate::{
    problem::{
        fleet_routing_problem::{FleetRoutingProblem, FleetRoutingProblemBuilder},
        node::{Demand, NodeIdx},
        travel_matrices::TravelMatrices,
        vehicle::{Vehicle, VehicleBuilder},
    },
    solver::{
        insertion::Insertion,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Seconds needed to drive one kilometer in generated matrices.
pub const SECS_PER_KM: f64 = 60.0;

#[derive(Clone, Debug)]
pub struct TestVehicle {
    capacity: Demand,
    fuel_consumption_rate: f64,
    fuel_cost_per_unit: f64,
    hourly_wage: f64,
    time_limit_secs: i64,
}

impl TestVehicle {
    pub fn with_capacity(capacity: Demand) -> Self {
        TestVehicle {
            capacity,
            fuel_consumption_rate: 0.1,
            fuel_cost_per_unit: 2.0,
            hourly_wage: 30.0,
            time_limit_secs: 10 * 3600,
        }
    }

    pub fn time_limit_secs(mut self, time_limit_secs: i64) -> Self {
        self.time_limit_secs = time_limit_secs;
        self
    }

    pub fn hourly_wage(mut self, hourly_wage: f64) -> Self {
        self.hourly_wage = hourly_wage;
        self
    }

    pub fn build(&self) -> Vehicle {
        VehicleBuilder::default()
            .set_capacity(self.capacity)
            .set_fuel_consumption_rate(self.fuel_consumption_rate)
            .set_fuel_cost_per_unit(self.fuel_cost_per_unit)
            .set_hourly_wage(self.hourly_wage)
            .set_time_limit(SignedDuration::from_secs(self.time_limit_secs))
            .build()
            .unwrap()
    }
}

/// Points `(0, 0), (1, 0), ..., (n - 1, 0)`, the first one being the depot.
pub fn create_line(n: usize) -> Vec<(f64, f64)> {
    (0..n).map(|x| (x as f64, 0.0)).collect()
}

pub fn create_basic_vehicles(capacities: &[Demand]) -> Vec<Vehicle> {
    capacities
        .iter()
        .map(|&capacity| TestVehicle::with_capacity(capacity).build())
        .collect()
}

fn create_matrices(points: &[(f64, f64)], scale: impl Fn(usize, usize) -> f64) -> TravelMatrices {
    let distances = points
        .iter()
        .enumerate()
        .map(|(i, &(x1, y1))| {
            points
                .iter()
                .enumerate()
                .map(|(j, &(x2, y2))| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt() * scale(i, j))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let durations = distances
        .iter()
        .map(|row| row.iter().map(|km| km * SECS_PER_KM).collect())
        .collect();

    TravelMatrices::new(distances, durations).unwrap()
}

/// Euclidean kilometers between the points, driven at `SECS_PER_KM`.
pub fn create_euclidean_matrices(points: &[(f64, f64)]) -> TravelMatrices {
    create_matrices(points, |_, _| 1.0)
}

fn build_problem(
    travel_matrices: TravelMatrices,
    demands: &[Demand],
    vehicles: &[TestVehicle],
) -> FleetRoutingProblem {
    let mut builder = FleetRoutingProblemBuilder::default();
    builder
        .set_customer_demands(demands.to_vec())
        .set_vehicles(vehicles.iter().map(TestVehicle::build).collect())
        .set_travel_matrices(travel_matrices);

    builder.build().unwrap()
}

/// `points[0]` is the depot, `points[i]` customer `i` with `demands[i - 1]`.
pub fn create_test_problem(
    points: &[(f64, f64)],
    demands: &[Demand],
    vehicles: &[TestVehicle],
) -> FleetRoutingProblem {
    build_problem(create_euclidean_matrices(points), demands, vehicles)
}

/// Like [`create_test_problem`], but travelling towards a lower node id is 50% longer.
pub fn create_asymmetric_test_problem(
    points: &[(f64, f64)],
    demands: &[Demand],
    vehicles: &[TestVehicle],
) -> FleetRoutingProblem {
    let matrices = create_matrices(points, |from, to| if from < to { 1.0 } else { 1.5 });
    build_problem(matrices, demands, vehicles)
}

/// Explicit whole-second durations, one kilometer for every leg.
pub fn create_test_problem_with_durations(
    durations: &[&[f64]],
    demands: &[Demand],
    vehicles: &[TestVehicle],
) -> FleetRoutingProblem {
    let durations = durations.iter().map(|row| row.to_vec()).collect::<Vec<_>>();
    let distances = durations
        .iter()
        .enumerate()
        .map(|(i, row)| (0..row.len()).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
        .collect();

    build_problem(
        TravelMatrices::new(distances, durations).unwrap(),
        demands,
        vehicles,
    )
}

pub struct TestRoute {
    pub vehicle_id: usize,
    pub customers: Vec<usize>,
}

pub fn create_test_working_solution(
    problem: Arc<FleetRoutingProblem>,
    routes: Vec<TestRoute>,
) -> WorkingSolution {
    let mut solution = WorkingSolution::new(problem);

    for route in routes {
        for (position, &customer) in route.customers.iter().enumerate() {
            solution.insert(&Insertion {
                route_id: RouteIdx::new(route.vehicle_id),
                node: NodeIdx::new(customer),
                position,
            });
        }
    }

    solution
}
