use crate::{
    error::{OptimizerError, ValidationError},
    problem::node::NodeIdx,
};

pub type Distance = f64;
pub type Duration = f64;

/// Distances (km) and durations (s) between nodes, stored flat.
/// The value for a pair lives at `from * num_nodes + to`.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    distances: Vec<Distance>,
    durations: Vec<Duration>,
    num_nodes: usize,
    is_symmetric: bool,
}

fn is_flat_matrix_symmetric(matrix: &[f64], num_nodes: usize) -> bool {
    for i in 0..num_nodes {
        for j in (i + 1)..num_nodes {
            if matrix[i * num_nodes + j] != matrix[j * num_nodes + i] {
                return false;
            }
        }
    }
    true
}

fn flatten(
    kind: &'static str,
    rows: Vec<Vec<f64>>,
    num_nodes: usize,
) -> Result<Vec<f64>, OptimizerError> {
    let mut flat = Vec::with_capacity(num_nodes * num_nodes);
    for (from, row) in rows.into_iter().enumerate() {
        if row.len() != num_nodes {
            return Err(OptimizerError::upstream(format!(
                "{kind} matrix row {from} has {} entries, expected {num_nodes}",
                row.len()
            )));
        }

        for (to, value) in row.into_iter().enumerate() {
            if !value.is_finite() {
                return Err(OptimizerError::upstream(format!(
                    "{kind} matrix entry ({from}, {to}) is not a finite number"
                )));
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeTravel { kind, from, to }.into());
            }
            flat.push(value);
        }
    }
    Ok(flat)
}

impl TravelMatrices {
    pub fn new(
        distances: Vec<Vec<Distance>>,
        durations: Vec<Vec<Duration>>,
    ) -> Result<Self, OptimizerError> {
        let num_nodes = distances.len();
        if durations.len() != num_nodes {
            return Err(OptimizerError::upstream(format!(
                "distance matrix covers {num_nodes} nodes but duration matrix covers {}",
                durations.len()
            )));
        }

        let distances = flatten("distance", distances, num_nodes)?;
        let durations = flatten("duration", durations, num_nodes)?;
        let is_symmetric = is_flat_matrix_symmetric(&distances, num_nodes)
            && is_flat_matrix_symmetric(&durations, num_nodes);

        Ok(TravelMatrices {
            distances,
            durations,
            num_nodes,
            is_symmetric,
        })
    }

    #[inline(always)]
    fn index(&self, from: NodeIdx, to: NodeIdx) -> usize {
        from.get() * self.num_nodes + to.get()
    }

    #[inline(always)]
    pub fn travel_distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        if from == to {
            return 0.0;
        }
        self.distances[self.index(from, to)]
    }

    #[inline(always)]
    pub fn travel_duration(&self, from: NodeIdx, to: NodeIdx) -> Duration {
        if from == to {
            return 0.0;
        }
        self.durations[self.index(from, to)]
    }

    /// Duration in whole seconds, truncated toward zero.
    #[inline(always)]
    pub fn transit_secs(&self, from: NodeIdx, to: NodeIdx) -> i64 {
        self.travel_duration(from, to) as i64
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Both matrices are symmetric, reversing a path keeps its distance and duration.
    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }
}
