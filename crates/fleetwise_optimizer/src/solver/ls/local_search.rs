use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use jiff::Timestamp;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{Level, debug, instrument};

use crate::{
    problem::cost::Cost,
    solver::{
        ls::{
            inter_relocate::InterRelocateOperator,
            inter_swap::InterSwapOperator,
            r#move::{LocalSearchMove, LocalSearchOperator},
            neighbourhood::Neighbourhood,
            relocate::RelocateOperator,
            swap::SwapOperator,
            two_opt::TwoOptOperator,
        },
        solution::{
            route_id::RouteIdx, routing_solution::SearchStatus, working_solution::WorkingSolution,
        },
        solver_params::{SearchStrategy, Termination},
    },
    utils::enumerate_idx::EnumerateIdx,
};

type RoutePair = (RouteIdx, RouteIdx);

/// Limits of one local search run, checked before every iteration.
pub struct SearchBudget<'a> {
    max_iterations: Option<usize>,
    deadline: Option<Timestamp>,
    is_stopped: Option<&'a AtomicBool>,
}

impl<'a> SearchBudget<'a> {
    pub fn unlimited() -> Self {
        SearchBudget {
            max_iterations: None,
            deadline: None,
            is_stopped: None,
        }
    }

    /// The earliest of the terminations wins. Durations start counting at `start`.
    pub fn from_terminations(terminations: &[Termination], start: Timestamp) -> Self {
        let mut budget = SearchBudget::unlimited();

        for termination in terminations {
            match *termination {
                Termination::Iterations(max_iterations) => {
                    budget.max_iterations = Some(
                        budget
                            .max_iterations
                            .map_or(max_iterations, |current| current.min(max_iterations)),
                    );
                }
                Termination::Duration(max_duration) => {
                    // An overflowing deadline is never reached
                    if let Ok(deadline) = start.checked_add(max_duration) {
                        budget.set_deadline(deadline);
                    }
                }
                Termination::Deadline(deadline) => budget.set_deadline(deadline),
            }
        }

        budget
    }

    fn set_deadline(&mut self, deadline: Timestamp) {
        self.deadline = Some(
            self.deadline
                .map_or(deadline, |current| current.min(deadline)),
        );
    }

    pub fn with_stop_flag(mut self, is_stopped: &'a AtomicBool) -> Self {
        self.is_stopped = Some(is_stopped);
        self
    }

    pub fn is_exhausted(&self, iteration: usize) -> bool {
        if self
            .is_stopped
            .is_some_and(|is_stopped| is_stopped.load(Ordering::Relaxed))
        {
            return true;
        }

        if self
            .max_iterations
            .is_some_and(|max_iterations| iteration >= max_iterations)
        {
            return true;
        }

        self.deadline
            .is_some_and(|deadline| Timestamp::now() >= deadline)
    }
}

/// Improves a feasible solution with relocate, swap and 2-opt moves.
///
/// Each iteration scores the route pairs whose routes changed since the last
/// iteration in parallel, then applies the single selected move. Results of
/// pairs whose routes are unchanged are kept, keyed by route versions.
pub struct LocalSearch {
    strategy: SearchStrategy,
    neighbourhood_size: Option<usize>,
    pairs: Vec<RoutePair>,
    state: LocalSearchState,
}

impl LocalSearch {
    pub fn new(strategy: SearchStrategy, neighbourhood_size: Option<usize>) -> Self {
        LocalSearch {
            strategy,
            neighbourhood_size,
            pairs: Vec::new(),
            state: LocalSearchState::new(),
        }
    }

    /// Runs until no improving move is left or the budget is exhausted.
    /// Returns the number of moves applied.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn run(&mut self, solution: &mut WorkingSolution, budget: &SearchBudget) -> (usize, SearchStatus) {
        self.build_pairs(solution);

        let mut iterations = 0;
        loop {
            if budget.is_exhausted(iterations) {
                return (iterations, SearchStatus::BudgetExhausted);
            }

            if !self.run_iteration(solution) {
                return (iterations, SearchStatus::Converged);
            }

            iterations += 1;
        }
    }

    fn run_iteration(&mut self, solution: &mut WorkingSolution) -> bool {
        let problem = Arc::clone(solution.problem_arc());
        let neighbourhood = Neighbourhood::new(&problem, self.neighbourhood_size);
        let strategy = self.strategy;
        let snapshot: &WorkingSolution = solution;

        let results = self
            .pairs
            .par_iter()
            .map(|&(r1, r2)| {
                (
                    r1,
                    r2,
                    find_pair_move(snapshot, &neighbourhood, strategy, (r1, r2)),
                )
            })
            .collect::<Vec<_>>();

        for (r1, r2, best) in results {
            self.state.update_best(solution, r1, r2, best);
        }

        let Some((r1, r2)) = self.select_pair(solution) else {
            return false;
        };
        let Some((delta, op)) = self.state.take_best_move(solution, r1, r2) else {
            return false;
        };

        debug!(
            "Apply {} ({}, {}) (d={}) {:?}",
            op.operator_name(),
            r1,
            r2,
            delta,
            op
        );

        debug_assert!(op.is_valid(solution), "Stored operator is not valid");
        let cost_before = solution.total_cost();

        op.apply(&problem, solution);

        debug_assert_eq!(
            cost_before + delta,
            solution.total_cost(),
            "Cost deviation detected for operator {}",
            op.operator_name()
        );
        debug_assert!(
            op.updated_routes().iter().all(|&route_id| {
                let route = solution.route(route_id);
                route.is_feasible() && route.cost() == route.compute_cost(&problem)
            }),
            "Operator {} broke a route",
            op.operator_name()
        );

        self.state.clear_stale(solution);
        self.rebuild_pairs(solution, &op.updated_routes());

        true
    }

    /// Pair holding the move to apply. Ties go to the first pair in route order.
    fn select_pair(&self, solution: &WorkingSolution) -> Option<RoutePair> {
        let mut best_delta: Cost = 0;
        let mut best_pair = None;

        for (i, _) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
            for (j, _) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
                let delta = self.state.delta(solution, i, j);
                if delta < best_delta {
                    best_delta = delta;
                    best_pair = Some((i, j));

                    if self.strategy == SearchStrategy::FirstImprovement {
                        return best_pair;
                    }
                }
            }
        }

        best_pair
    }

    fn build_pairs(&mut self, solution: &WorkingSolution) {
        self.pairs.clear();
        let max = solution.routes().len().pow(2);

        for (i, r1) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
            for (j, r2) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
                if !self.state.contains_key((r1.version(), r2.version())) {
                    self.pairs.push((i, j))
                }
            }
        }

        debug!(
            "Local Search: Built {} route pairs (max {}). Cache ratio: {}",
            self.pairs.len(),
            max,
            (max - self.pairs.len()) as f64 / max.max(1) as f64
        );
    }

    fn rebuild_pairs(&mut self, solution: &WorkingSolution, updated_routes: &[RouteIdx]) {
        let mut pairs = FxHashSet::<RoutePair>::default();
        for (i, _) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
            for &updated_route in updated_routes {
                pairs.insert((i, updated_route));
                pairs.insert((updated_route, i));
            }
        }

        self.pairs.clear();
        self.pairs.extend(pairs);
        self.pairs.sort_unstable();
    }
}

/// Best (or first, depending on the strategy) improving valid move on a route pair.
fn find_pair_move(
    solution: &WorkingSolution,
    neighbourhood: &Neighbourhood,
    strategy: SearchStrategy,
    pair: RoutePair,
) -> Option<(Cost, LocalSearchMove)> {
    let mut best: Option<(Cost, LocalSearchMove)> = None;

    consider_moves::<RelocateOperator>(solution, neighbourhood, strategy, pair, &mut best, LocalSearchMove::Relocate);
    consider_moves::<SwapOperator>(solution, neighbourhood, strategy, pair, &mut best, LocalSearchMove::Swap);
    consider_moves::<TwoOptOperator>(solution, neighbourhood, strategy, pair, &mut best, LocalSearchMove::TwoOpt);
    consider_moves::<InterRelocateOperator>(
        solution,
        neighbourhood,
        strategy,
        pair,
        &mut best,
        LocalSearchMove::InterRelocate,
    );
    consider_moves::<InterSwapOperator>(
        solution,
        neighbourhood,
        strategy,
        pair,
        &mut best,
        LocalSearchMove::InterSwap,
    );

    best
}

fn consider_moves<O: LocalSearchOperator>(
    solution: &WorkingSolution,
    neighbourhood: &Neighbourhood,
    strategy: SearchStrategy,
    pair: RoutePair,
    best: &mut Option<(Cost, LocalSearchMove)>,
    into_move: fn(O) -> LocalSearchMove,
) {
    if strategy == SearchStrategy::FirstImprovement && best.is_some() {
        return;
    }

    O::generate_moves(solution, neighbourhood, pair, |op| {
        if strategy == SearchStrategy::FirstImprovement && best.is_some() {
            return;
        }

        let best_delta = best.as_ref().map_or(0, |(delta, _)| *delta);
        let delta = op.cost_delta(solution);
        if delta < best_delta && op.is_valid(solution) {
            *best = Some((delta, into_move(op)));
        }
    });
}

type VersionPair = (usize, usize);

/// Best move of every evaluated route pair, keyed by the versions of the two
/// routes. `None` records that the pair has no improving move.
struct LocalSearchState(FxHashMap<VersionPair, Option<(Cost, LocalSearchMove)>>);

impl LocalSearchState {
    fn new() -> Self {
        Self(FxHashMap::with_capacity_and_hasher(
            256,
            FxBuildHasher::default(),
        ))
    }

    fn key(solution: &WorkingSolution, r1: RouteIdx, r2: RouteIdx) -> VersionPair {
        (solution.route(r1).version(), solution.route(r2).version())
    }

    fn contains_key(&self, versions: VersionPair) -> bool {
        self.0.contains_key(&versions)
    }

    fn delta(&self, solution: &WorkingSolution, r1: RouteIdx, r2: RouteIdx) -> Cost {
        self.0
            .get(&Self::key(solution, r1, r2))
            .and_then(|entry| entry.as_ref())
            .map_or(0, |(delta, _)| *delta)
    }

    fn take_best_move(
        &mut self,
        solution: &WorkingSolution,
        r1: RouteIdx,
        r2: RouteIdx,
    ) -> Option<(Cost, LocalSearchMove)> {
        self.0
            .get_mut(&Self::key(solution, r1, r2))
            .and_then(Option::take)
    }

    fn update_best(
        &mut self,
        solution: &WorkingSolution,
        r1: RouteIdx,
        r2: RouteIdx,
        best: Option<(Cost, LocalSearchMove)>,
    ) {
        self.0.insert(Self::key(solution, r1, r2), best);
    }

    /// Forgets the pairs of route versions that no longer exist.
    fn clear_stale(&mut self, solution: &WorkingSolution) {
        let versions = solution
            .routes()
            .iter()
            .map(|route| route.version())
            .collect::<FxHashSet<_>>();

        self.0
            .retain(|&(v1, v2), _| versions.contains(&v1) && versions.contains(&v2))
    }
}
