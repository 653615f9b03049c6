pub mod construction;
pub mod dimension;
pub mod insertion;
pub mod insertion_cache;
pub mod ls;
pub mod solution;
pub mod solver;
pub mod solver_params;
