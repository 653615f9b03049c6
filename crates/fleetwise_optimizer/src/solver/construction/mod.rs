pub mod cheapest_insertion;
pub mod construct_solution;
