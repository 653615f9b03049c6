//! Cumulative constraints along a route.
//!
//! A route visiting customers `c1..cn` has `n + 2` steps: step `0` is the
//! departure from the depot, step `i` is the visit of `ci` and step `n + 1` is
//! the return to the depot. The cumulative value of a step is the value of the
//! previous step plus the transit of the arc between them, and every step,
//! the return included, must stay within `[0, bound]`.

use thiserror::Error;

use crate::problem::{
    fleet_routing_problem::FleetRoutingProblem,
    node::{DEPOT, NodeIdx},
    vehicle::{Vehicle, VehicleIdx},
};

pub type CumulValue = i64;

pub trait Dimension: Send + Sync {
    fn name(&self) -> &'static str;

    fn transit(&self, problem: &FleetRoutingProblem, from: NodeIdx, to: NodeIdx) -> CumulValue;

    fn bound(&self, vehicle: &Vehicle) -> CumulValue;

    fn start_value(&self) -> CumulValue {
        0
    }
}

/// Load delivered so far. The transit of an arc is the demand of its destination.
pub struct CapacityDimension;

impl Dimension for CapacityDimension {
    fn name(&self) -> &'static str {
        "capacity"
    }

    #[inline]
    fn transit(&self, problem: &FleetRoutingProblem, _from: NodeIdx, to: NodeIdx) -> CumulValue {
        problem.demand(to)
    }

    fn bound(&self, vehicle: &Vehicle) -> CumulValue {
        vehicle.capacity()
    }
}

/// Elapsed time since departure, in whole seconds.
pub struct TimeDimension;

impl Dimension for TimeDimension {
    fn name(&self) -> &'static str {
        "time"
    }

    #[inline]
    fn transit(&self, problem: &FleetRoutingProblem, from: NodeIdx, to: NodeIdx) -> CumulValue {
        problem.transit_secs(from, to)
    }

    fn bound(&self, vehicle: &Vehicle) -> CumulValue {
        vehicle.time_limit_secs()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{dimension} cumul {value} at step {step} is outside [0, {bound}]")]
pub struct Infeasible {
    pub dimension: &'static str,
    pub step: usize,
    pub value: CumulValue,
    pub bound: CumulValue,
}

#[inline]
fn node_at(nodes: &[NodeIdx], step: usize) -> NodeIdx {
    if step == 0 || step > nodes.len() {
        DEPOT
    } else {
        nodes[step - 1]
    }
}

fn cumuls<D: Dimension>(dimension: &D, problem: &FleetRoutingProblem, nodes: &[NodeIdx]) -> Vec<CumulValue> {
    let mut cumuls = Vec::with_capacity(nodes.len() + 2);
    let mut cumul = dimension.start_value();
    let mut previous = DEPOT;
    cumuls.push(cumul);

    for &node in nodes.iter().chain(std::iter::once(&DEPOT)) {
        cumul += dimension.transit(problem, previous, node);
        cumuls.push(cumul);
        previous = node;
    }

    cumuls
}

/// Cumulative values of every step of the route, or the first step out of bounds.
pub fn full_evaluate<D: Dimension>(
    dimension: &D,
    problem: &FleetRoutingProblem,
    vehicle_id: VehicleIdx,
    nodes: &[NodeIdx],
) -> Result<Vec<CumulValue>, Infeasible> {
    let bound = dimension.bound(problem.vehicle(vehicle_id));
    let cumuls = cumuls(dimension, problem, nodes);

    match cumuls
        .iter()
        .position(|&value| value < 0 || value > bound)
    {
        Some(step) => Err(Infeasible {
            dimension: dimension.name(),
            step,
            value: cumuls[step],
            bound,
        }),
        None => Ok(cumuls),
    }
}

/// Cumulative values of a route plus suffix extrema, so that a change to the
/// route can be checked without scanning the steps after it.
#[derive(Debug, Clone, Default)]
pub struct DimensionCache {
    cumuls: Vec<CumulValue>,
    bwd_max: Vec<CumulValue>,
    bwd_min: Vec<CumulValue>,
    bound: CumulValue,
}

impl DimensionCache {
    pub fn compute<D: Dimension>(
        dimension: &D,
        problem: &FleetRoutingProblem,
        vehicle_id: VehicleIdx,
        nodes: &[NodeIdx],
    ) -> Self {
        let cumuls = cumuls(dimension, problem, nodes);
        let steps = cumuls.len();

        let mut bwd_max = vec![0; steps];
        let mut bwd_min = vec![0; steps];
        bwd_max[steps - 1] = cumuls[steps - 1];
        bwd_min[steps - 1] = cumuls[steps - 1];
        for step in (0..steps - 1).rev() {
            bwd_max[step] = bwd_max[step + 1].max(cumuls[step]);
            bwd_min[step] = bwd_min[step + 1].min(cumuls[step]);
        }

        DimensionCache {
            cumuls,
            bwd_max,
            bwd_min,
            bound: dimension.bound(problem.vehicle(vehicle_id)),
        }
    }

    #[inline]
    pub fn cumul(&self, step: usize) -> CumulValue {
        self.cumuls[step]
    }

    pub fn cumuls(&self) -> &[CumulValue] {
        &self.cumuls
    }

    /// Value on return to the depot.
    pub fn end_value(&self) -> CumulValue {
        self.cumuls.last().copied().unwrap_or(0)
    }

    pub fn bound(&self) -> CumulValue {
        self.bound
    }

    pub fn is_feasible(&self) -> bool {
        self.bwd_min.first().is_none_or(|&min| min >= 0)
            && self.bwd_max.first().is_none_or(|&max| max <= self.bound)
    }

    #[inline]
    fn within_bound(&self, value: CumulValue) -> bool {
        value >= 0 && value <= self.bound
    }

    /// Whether the steps from `step` to the end stay within bounds once shifted by `shift`.
    #[inline]
    fn is_suffix_feasible(&self, step: usize, shift: CumulValue) -> bool {
        self.bwd_max[step] + shift <= self.bound && self.bwd_min[step] + shift >= 0
    }

    /// Checks inserting `node` before `nodes[position]` (at the end when
    /// `position == nodes.len()`), in constant time.
    pub fn feasible_insertion<D: Dimension>(
        &self,
        dimension: &D,
        problem: &FleetRoutingProblem,
        nodes: &[NodeIdx],
        position: usize,
        node: NodeIdx,
    ) -> bool {
        let previous = node_at(nodes, position);
        let next = node_at(nodes, position + 1);

        let to_node = dimension.transit(problem, previous, node);
        if !self.within_bound(self.cumuls[position] + to_node) {
            return false;
        }

        let shift = to_node + dimension.transit(problem, node, next)
            - dimension.transit(problem, previous, next);

        self.is_suffix_feasible(position + 1, shift)
    }

    /// Checks replacing `nodes[start..end]` with `replacement`. The replacement
    /// is walked once, the rest of the route is checked in constant time.
    pub fn is_valid_change<D, I>(
        &self,
        dimension: &D,
        problem: &FleetRoutingProblem,
        nodes: &[NodeIdx],
        replacement: I,
        start: usize,
        end: usize,
    ) -> bool
    where
        D: Dimension,
        I: IntoIterator<Item = NodeIdx>,
    {
        let mut previous = node_at(nodes, start);
        let mut cumul = self.cumuls[start];

        for node in replacement {
            cumul += dimension.transit(problem, previous, node);
            if !self.within_bound(cumul) {
                return false;
            }
            previous = node;
        }

        let next_step = end + 1;
        cumul += dimension.transit(problem, previous, node_at(nodes, next_step));
        let shift = cumul - self.cumuls[next_step];

        self.is_suffix_feasible(next_step, shift)
    }
}
