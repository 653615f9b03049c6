use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    problem::{
        cost::{Cost, to_major_units},
        fleet_routing_problem::FleetRoutingProblem,
        node::{Demand, NodeIdx},
        vehicle::VehicleIdx,
    },
    solver::solution::routing_solution::{Solution, SolutionRoute, UnassignedCustomer},
};

/// Metrics of one vehicle's route. Distance and time use the exact matrix
/// values, `cost` is the minor unit cost the search optimised.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct RouteReport {
    pub vehicle_id: usize,
    pub stops: Vec<usize>,
    pub cost: Cost,
    pub cost_major: f64,
    pub distance_km: f64,
    pub travel_time_secs: f64,
    pub fuel_consumed: f64,
    pub fuel_cost: f64,
    pub labor_cost: f64,
    pub load: Demand,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct FleetTotals {
    pub vehicles_used: usize,
    pub cost: Cost,
    pub cost_major: f64,
    pub distance_km: f64,
    pub travel_time_secs: f64,
    pub fuel_consumed: f64,
    pub fuel_cost: f64,
    pub labor_cost: f64,
    pub load: Demand,
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct SolutionReport {
    pub routes: Vec<RouteReport>,
    pub totals: FleetTotals,
    pub unassigned: Vec<UnassignedCustomer>,
    pub possibly_suboptimal: bool,
}

impl RouteReport {
    fn new(problem: &FleetRoutingProblem, route: &SolutionRoute) -> Self {
        let vehicle = problem.vehicle(VehicleIdx::new(route.vehicle_id));

        let (distance_km, travel_time_secs) = route.stops.windows(2).fold(
            (0.0, 0.0),
            |(distance, duration), window| {
                let (from, to) = (NodeIdx::new(window[0]), NodeIdx::new(window[1]));
                (
                    distance + problem.travel_distance(from, to),
                    duration + problem.travel_duration(from, to),
                )
            },
        );

        RouteReport {
            vehicle_id: route.vehicle_id,
            stops: route.stops.clone(),
            cost: route.cost,
            cost_major: to_major_units(route.cost),
            distance_km,
            travel_time_secs,
            fuel_consumed: vehicle.fuel_consumed(distance_km),
            fuel_cost: vehicle.fuel_cost(distance_km),
            labor_cost: vehicle.labor_cost(travel_time_secs),
            load: route.loads.last().copied().unwrap_or(0),
        }
    }
}

impl SolutionReport {
    pub fn new(problem: &FleetRoutingProblem, solution: &Solution) -> Self {
        let routes = solution
            .routes
            .iter()
            .map(|route| RouteReport::new(problem, route))
            .collect::<Vec<_>>();

        let mut totals = routes
            .iter()
            .fold(FleetTotals::default(), |mut totals, route| {
                if route.stops.len() > 2 {
                    totals.vehicles_used += 1;
                }
                totals.cost += route.cost;
                totals.distance_km += route.distance_km;
                totals.travel_time_secs += route.travel_time_secs;
                totals.fuel_consumed += route.fuel_consumed;
                totals.fuel_cost += route.fuel_cost;
                totals.labor_cost += route.labor_cost;
                totals.load += route.load;
                totals
            });
        totals.cost_major = to_major_units(totals.cost);

        SolutionReport {
            routes,
            totals,
            unassigned: solution.unassigned.clone(),
            possibly_suboptimal: solution.is_possibly_suboptimal(),
        }
    }
}
