use crate::problem::{fleet_routing_problem::FleetRoutingProblem, node::NodeIdx};

/// Restricts move generation to arcs between nearby customers.
#[derive(Clone, Copy)]
pub struct Neighbourhood<'a> {
    problem: &'a FleetRoutingProblem,
    size: Option<usize>,
}

impl<'a> Neighbourhood<'a> {
    pub fn new(problem: &'a FleetRoutingProblem, size: Option<usize>) -> Self {
        Neighbourhood { problem, size }
    }

    /// Whether an arc between `a` and `b` is worth creating. Arcs touching the
    /// depot always are, so routes can always be opened and closed.
    #[inline]
    pub fn contains(&self, a: NodeIdx, b: NodeIdx) -> bool {
        match self.size {
            None => true,
            Some(k) => {
                a.is_depot()
                    || b.is_depot()
                    || self.problem.is_neighbour(a, b, k)
                    || self.problem.is_neighbour(b, a, k)
            }
        }
    }
}
