use serde::Serialize;

use crate::define_index_newtype;

define_index_newtype!(
    /// Position of a node in the travel matrices. `0` is always the depot.
    NodeIdx,
    Node
);

pub type Demand = i64;

pub const DEPOT: NodeIdx = NodeIdx::new(0);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeIdx,
    demand: Demand,
}

impl Node {
    pub fn depot() -> Self {
        Node {
            id: DEPOT,
            demand: 0,
        }
    }

    pub fn customer(id: NodeIdx, demand: Demand) -> Self {
        Node { id, demand }
    }

    pub fn id(&self) -> NodeIdx {
        self.id
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }
}

impl NodeIdx {
    pub fn is_depot(&self) -> bool {
        *self == DEPOT
    }
}
