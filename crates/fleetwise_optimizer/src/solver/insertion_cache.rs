use fxhash::FxHashMap;

use crate::{
    problem::{cost::Cost, node::NodeIdx},
    solver::{
        insertion::Insertion,
        solution::{route::WorkingSolutionRoute, route_id::RouteIdx},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct InsertionCacheEntry {
    pub cost_delta: Cost,
    pub insertion: Insertion,
}

/// Best insertion of a customer into a route, valid as long as the route keeps
/// the same version. `None` records that no position of the route is feasible.
#[derive(Default)]
pub struct InsertionCache {
    cache: FxHashMap<(RouteIdx, usize, NodeIdx), Option<InsertionCacheEntry>>,
}

impl InsertionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        route_id: RouteIdx,
        version: usize,
        node: NodeIdx,
    ) -> Option<&Option<InsertionCacheEntry>> {
        self.cache.get(&(route_id, version, node))
    }

    pub fn insert(
        &mut self,
        route_id: RouteIdx,
        version: usize,
        node: NodeIdx,
        entry: Option<InsertionCacheEntry>,
    ) {
        self.cache.insert((route_id, version, node), entry);
    }

    /// Drops the entries of routes that changed since they were computed.
    pub fn clear(&mut self, routes: &[WorkingSolutionRoute]) {
        self.cache.retain(|(route_id, version, _), _| {
            if let Some(route) = routes.get(route_id.get()) {
                *version == route.version()
            } else {
                false
            }
        });
    }
}
