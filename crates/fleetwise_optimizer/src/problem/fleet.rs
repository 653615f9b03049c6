use crate::problem::{
    node::Demand,
    vehicle::{Vehicle, VehicleIdx},
};

/// A finite, heterogeneous fleet. Every vehicle runs at most one route.
pub struct Fleet(Vec<Vehicle>);

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Fleet(vehicles)
    }

    #[inline]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.0
    }

    #[inline]
    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        &self.0[vehicle_id]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_capacity(&self) -> Demand {
        self.0.iter().map(Vehicle::capacity).max().unwrap_or(0)
    }
}
