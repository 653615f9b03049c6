use jiff::SignedDuration;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::{OptimizerError, ValidationError},
    problem::{
        fleet_routing_problem::{FleetRoutingProblem, FleetRoutingProblemBuilder},
        node::Demand,
        travel_matrices::TravelMatrices,
        vehicle::{Vehicle, VehicleBuilder},
    },
};

/// Problem document handed over by the data preparation layer.
///
/// The depot is implicit: row and column `0` of both matrices, customers
/// follow in id order.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Problem")]
pub struct ProblemInput {
    pub customers: Vec<CustomerInput>,
    pub fleet: Vec<VehicleInput>,

    /// Kilometers, `[from][to]`.
    pub distance_matrix: Option<Vec<Vec<f64>>>,

    /// Seconds, `[from][to]`.
    pub duration_matrix: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Customer")]
pub struct CustomerInput {
    pub id: usize,
    pub demand: Demand,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct VehicleInput {
    pub capacity: Option<Demand>,
    pub fuel_consumption_rate: Option<f64>,
    pub fuel_cost_per_unit: Option<f64>,
    pub hourly_wage: Option<f64>,
    pub time_limit: Option<SignedDuration>,
}

impl VehicleInput {
    fn build_vehicle(&self) -> Result<Vehicle, ValidationError> {
        let mut builder = VehicleBuilder::default();

        if let Some(capacity) = self.capacity {
            builder.set_capacity(capacity);
        }

        if let Some(rate) = self.fuel_consumption_rate {
            builder.set_fuel_consumption_rate(rate);
        }

        if let Some(cost) = self.fuel_cost_per_unit {
            builder.set_fuel_cost_per_unit(cost);
        }

        if let Some(hourly_wage) = self.hourly_wage {
            builder.set_hourly_wage(hourly_wage);
        }

        if let Some(time_limit) = self.time_limit {
            builder.set_time_limit(time_limit);
        }

        builder.build()
    }
}

impl ProblemInput {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[instrument(skip_all, level = "debug")]
    pub fn build_problem(&self) -> Result<FleetRoutingProblem, OptimizerError> {
        let (Some(distances), Some(durations)) = (&self.distance_matrix, &self.duration_matrix)
        else {
            let missing = if self.distance_matrix.is_none() {
                "distance"
            } else {
                "duration"
            };
            return Err(OptimizerError::upstream(format!("{missing} matrix is missing")));
        };
        let travel_matrices = TravelMatrices::new(distances.clone(), durations.clone())?;

        let mut demands = Vec::with_capacity(self.customers.len());
        for (position, customer) in self.customers.iter().enumerate() {
            if customer.id != position + 1 {
                return Err(ValidationError::NonSequentialCustomerId {
                    position,
                    found: customer.id,
                }
                .into());
            }
            demands.push(customer.demand);
        }

        let vehicles = self
            .fleet
            .iter()
            .map(VehicleInput::build_vehicle)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = FleetRoutingProblemBuilder::default();
        builder
            .set_customer_demands(demands)
            .set_vehicles(vehicles)
            .set_travel_matrices(travel_matrices);

        builder.build()
    }
}

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(ProblemInput))
}
