use crate::{
    problem::{cost::Cost, node::NodeIdx},
    solver::{
        insertion::{Insertion, for_each_route_insertion},
        insertion_cache::{InsertionCache, InsertionCacheEntry},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Global cheapest feasible insertion. Each round scores every unassigned
/// customer at every position of every route and applies the single cheapest
/// feasible insertion. Ties go to the lowest customer, then the lowest
/// vehicle, then the lowest position.
#[derive(Default)]
pub struct CheapestInsertion;

impl CheapestInsertion {
    /// Inserts customers until none of the remaining ones fits anywhere.
    /// Returns the number of insertions applied.
    pub fn insert_customers(solution: &mut WorkingSolution) -> usize {
        // The best insertion into a route does not change while the route is untouched
        let mut insertion_cache = InsertionCache::new();
        let mut inserted = 0;

        loop {
            let mut best: Option<InsertionCacheEntry> = None;

            for &node in solution.unassigned() {
                for (route_id, route) in solution.routes().iter().enumerate_idx::<RouteIdx>() {
                    let version = route.version();
                    let entry = match insertion_cache.get(route_id, version, node) {
                        Some(entry) => *entry,
                        None => {
                            let entry = Self::best_route_insertion(solution, route_id, node);
                            insertion_cache.insert(route_id, version, node, entry);
                            entry
                        }
                    };

                    if let Some(entry) = entry
                        && best.is_none_or(|best| entry.cost_delta < best.cost_delta)
                    {
                        best = Some(entry);
                    }
                }
            }

            let Some(best) = best else {
                break;
            };

            solution.insert(&best.insertion);
            insertion_cache.clear(solution.routes());
            inserted += 1;
        }

        inserted
    }

    /// Cheapest feasible position of `node` in one route, lowest position on ties.
    pub fn best_route_insertion(
        solution: &WorkingSolution,
        route_id: RouteIdx,
        node: NodeIdx,
    ) -> Option<InsertionCacheEntry> {
        let problem = solution.problem();
        let route = solution.route(route_id);

        let mut best_cost: Option<Cost> = None;
        let mut best_insertion: Option<Insertion> = None;

        for_each_route_insertion(solution, route_id, node, |insertion| {
            if !route.can_insert(problem, node, insertion.position) {
                return;
            }

            let cost_delta = route.insertion_cost_delta(problem, node, insertion.position);
            if best_cost.is_none_or(|best| cost_delta < best) {
                best_cost = Some(cost_delta);
                best_insertion = Some(insertion);
            }
        });

        match (best_cost, best_insertion) {
            (Some(cost_delta), Some(insertion)) => Some(InsertionCacheEntry {
                cost_delta,
                insertion,
            }),
            _ => None,
        }
    }
}
