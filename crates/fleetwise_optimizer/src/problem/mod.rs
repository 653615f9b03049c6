pub mod cost;
pub mod fleet;
pub mod fleet_routing_problem;
pub mod node;
pub mod travel_matrices;
pub mod vehicle;
