use jiff::SignedDuration;
use serde::Serialize;

use crate::{define_index_newtype, error::ValidationError, problem::node::Demand};

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Vehicle {
    capacity: Demand,
    /// Fuel volume per kilometer
    fuel_consumption_rate: f64,
    /// Price of one unit of fuel volume
    fuel_cost_per_unit: f64,
    hourly_wage: f64,
    time_limit: SignedDuration,
}

impl Vehicle {
    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    pub fn fuel_consumption_rate(&self) -> f64 {
        self.fuel_consumption_rate
    }

    pub fn fuel_cost_per_unit(&self) -> f64 {
        self.fuel_cost_per_unit
    }

    pub fn hourly_wage(&self) -> f64 {
        self.hourly_wage
    }

    pub fn time_limit(&self) -> SignedDuration {
        self.time_limit
    }

    /// Time budget in whole seconds, the unit of the time dimension.
    pub fn time_limit_secs(&self) -> i64 {
        self.time_limit.as_secs()
    }

    pub fn fuel_consumed(&self, distance_km: f64) -> f64 {
        distance_km * self.fuel_consumption_rate
    }

    pub fn fuel_cost(&self, distance_km: f64) -> f64 {
        distance_km * self.fuel_consumption_rate * self.fuel_cost_per_unit
    }

    pub fn labor_cost(&self, duration_secs: f64) -> f64 {
        (duration_secs / 3600.0) * self.hourly_wage
    }
}

#[derive(Default)]
pub struct VehicleBuilder {
    capacity: Option<Demand>,
    fuel_consumption_rate: Option<f64>,
    fuel_cost_per_unit: Option<f64>,
    hourly_wage: Option<f64>,
    time_limit: Option<SignedDuration>,
}

impl VehicleBuilder {
    pub fn set_capacity(&mut self, capacity: Demand) -> &mut VehicleBuilder {
        self.capacity = Some(capacity);
        self
    }

    pub fn set_fuel_consumption_rate(&mut self, rate: f64) -> &mut VehicleBuilder {
        self.fuel_consumption_rate = Some(rate);
        self
    }

    pub fn set_fuel_cost_per_unit(&mut self, cost: f64) -> &mut VehicleBuilder {
        self.fuel_cost_per_unit = Some(cost);
        self
    }

    pub fn set_hourly_wage(&mut self, hourly_wage: f64) -> &mut VehicleBuilder {
        self.hourly_wage = Some(hourly_wage);
        self
    }

    pub fn set_time_limit(&mut self, time_limit: SignedDuration) -> &mut VehicleBuilder {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn build(&self) -> Result<Vehicle, ValidationError> {
        let capacity = self
            .capacity
            .ok_or(ValidationError::MissingVehicleParameter("capacity"))?;
        if capacity < 0 {
            return Err(ValidationError::InvalidVehicleParameter {
                parameter: "capacity",
                value: capacity as f64,
            });
        }

        let time_limit = self
            .time_limit
            .ok_or(ValidationError::MissingVehicleParameter("time_limit"))?;
        if time_limit.is_negative() {
            return Err(ValidationError::InvalidVehicleParameter {
                parameter: "time_limit",
                value: time_limit.as_secs_f64(),
            });
        }

        Ok(Vehicle {
            capacity,
            fuel_consumption_rate: non_negative(
                "fuel_consumption_rate",
                self.fuel_consumption_rate.unwrap_or(0.0),
            )?,
            fuel_cost_per_unit: non_negative(
                "fuel_cost_per_unit",
                self.fuel_cost_per_unit.unwrap_or(0.0),
            )?,
            hourly_wage: non_negative("hourly_wage", self.hourly_wage.unwrap_or(0.0))?,
            time_limit,
        })
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidVehicleParameter { parameter, value })
    }
}
