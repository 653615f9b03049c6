use crate::problem::{
    travel_matrices::{Distance, Duration},
    vehicle::Vehicle,
};

/// Operating cost in minor currency units (1/1000 of the currency).
pub type Cost = i64;

pub const MINOR_UNITS_PER_MAJOR: f64 = 1000.0;

/// Pure arc cost function of one vehicle. The problem keeps one per vehicle,
/// indexed by vehicle id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleCostFn {
    fuel_consumption_rate: f64,
    fuel_cost_per_unit: f64,
    hourly_wage: f64,
}

impl VehicleCostFn {
    pub fn new(vehicle: &Vehicle) -> Self {
        VehicleCostFn {
            fuel_consumption_rate: vehicle.fuel_consumption_rate(),
            fuel_cost_per_unit: vehicle.fuel_cost_per_unit(),
            hourly_wage: vehicle.hourly_wage(),
        }
    }

    /// Exact cost of an arc, in major units.
    #[inline]
    pub fn arc_cost_major(&self, distance: Distance, duration: Duration) -> f64 {
        distance * self.fuel_consumption_rate * self.fuel_cost_per_unit
            + (duration / 3600.0) * self.hourly_wage
    }

    #[inline]
    pub fn arc_cost(&self, distance: Distance, duration: Duration) -> Cost {
        (self.arc_cost_major(distance, duration) * MINOR_UNITS_PER_MAJOR).round() as Cost
    }
}

pub fn to_major_units(cost: Cost) -> f64 {
    cost as f64 / MINOR_UNITS_PER_MAJOR
}
