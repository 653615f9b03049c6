use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SolverParams {
    /// The local search stops as soon as one of them is met.
    pub terminations: Vec<Termination>,
    pub search_strategy: SearchStrategy,

    /// Candidate moves only create arcs towards the k nearest customers. `None` tries every arc.
    pub neighbourhood_size: Option<usize>,

    pub search_threads: Threads,

    /// Returns the construction result as is when disabled.
    pub run_local_search: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Termination {
    /// Number of improving moves applied.
    Iterations(usize),
    Duration(SignedDuration),
    Deadline(Timestamp),
}

/// Both strategies are deterministic for a given problem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SearchStrategy {
    /// Applies the cheapest improving move over every route pair.
    #[default]
    BestImprovement,
    /// Applies the first improving move, route pairs and operators taken in a fixed order.
    FirstImprovement,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Threads {
    Single,
    #[default]
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            terminations: vec![Termination::Iterations(10_000)],
            search_strategy: SearchStrategy::BestImprovement,
            neighbourhood_size: Some(30),
            search_threads: Threads::Auto,
            run_local_search: true,
        }
    }
}
