use thiserror::Error;

/// Input that can never describe a routable problem. Always fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("the fleet has no vehicles")]
    EmptyFleet,

    #[error("travel matrices cover {actual} nodes, expected {expected} (depot + customers)")]
    MatrixDimensionMismatch { expected: usize, actual: usize },

    #[error("negative travel {kind} from node {from} to node {to}")]
    NegativeTravel {
        kind: &'static str,
        from: usize,
        to: usize,
    },

    #[error("customer {customer} has a negative demand ({demand})")]
    NegativeDemand { customer: usize, demand: i64 },

    #[error(
        "customer {customer} demands {demand} units, more than the largest vehicle capacity ({max_capacity})"
    )]
    DemandExceedsFleetCapacity {
        customer: usize,
        demand: i64,
        max_capacity: i64,
    },

    #[error("customer ids must run from 1 in order, found {found} at position {position}")]
    NonSequentialCustomerId { position: usize, found: usize },

    #[error("vehicle parameter `{parameter}` is invalid: {value}")]
    InvalidVehicleParameter { parameter: &'static str, value: f64 },

    #[error("vehicle is missing the `{0}` parameter")]
    MissingVehicleParameter(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("invalid problem: {0}")]
    Validation(#[from] ValidationError),

    #[error("fleet capacity exhausted, customers left unassigned: {customers:?}")]
    CapacityExhaustion { customers: Vec<usize> },

    #[error("customers cannot be served within any vehicle time limit: {customers:?}")]
    InfeasibleTimeLimit { customers: Vec<usize> },

    #[error("travel data unavailable: {reason}")]
    UpstreamDataUnavailable { reason: String },
}

impl OptimizerError {
    pub(crate) fn upstream(reason: impl Into<String>) -> Self {
        OptimizerError::UpstreamDataUnavailable {
            reason: reason.into(),
        }
    }

    /// Customers implicated by the error, empty for errors about the input as a whole.
    pub fn customers(&self) -> &[usize] {
        match self {
            OptimizerError::CapacityExhaustion { customers }
            | OptimizerError::InfeasibleTimeLimit { customers } => customers,
            OptimizerError::Validation(ValidationError::NegativeDemand { customer, .. })
            | OptimizerError::Validation(ValidationError::DemandExceedsFleetCapacity {
                customer,
                ..
            }) => std::slice::from_ref(customer),
            _ => &[],
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OptimizerError::Validation(_) | OptimizerError::UpstreamDataUnavailable { .. }
        )
    }
}
