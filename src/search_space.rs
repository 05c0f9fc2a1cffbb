//! Per-state search bookkeeping: how a state was reached, at what cost, and
//! whether it is still open for expansion.

use crate::per_state_information::PerStateInformation;
use crate::state_registry::{StateId, StateRegistry};
use crate::task::OperatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchNodeStatus {
    New,
    Open,
    Closed,
    DeadEnd,
}

/// The edge a state was reached by: the operator applied and the parent it
/// was applied in. The initial state has no creating operator.
#[derive(Debug, Clone, Copy)]
struct Predecessor {
    parent: StateId,
    creating_operator: OperatorId,
}

#[derive(Debug, Clone)]
struct NodeInfo {
    status: SearchNodeStatus,
    g: i32,
    real_g: i32,
    predecessor: Option<Predecessor>,
    /// Set once a heuristic value cached in an [`crate::evaluation_context`]
    /// might be stale, e.g. after this node is reached again via a cheaper
    /// path under multi-path dependence. Evaluators that are not safe under
    /// re-opening should check this before trusting a cached value.
    h_dirty: bool,
    /// The heuristic value this node was last inserted into an open list
    /// with, if any. Used under multi-path dependence to detect a
    /// path-dependent evaluator reporting a higher value after a reopening,
    /// which means the stale open-list entry must be superseded.
    h: Option<i32>,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            status: SearchNodeStatus::New,
            g: 0,
            real_g: 0,
            predecessor: None,
            h_dirty: false,
            h: None,
        }
    }
}

/// A read/write handle onto one state's search metadata. Borrows the owning
/// [`SearchSpace`] mutably so that writes through it are immediately visible.
#[derive(Debug)]
pub struct SearchNode<'a> {
    registry: &'a StateRegistry,
    id: StateId,
    info: &'a mut NodeInfo,
}

impl<'a> SearchNode<'a> {
    pub fn state_id(&self) -> StateId {
        self.id
    }

    pub fn status(&self) -> SearchNodeStatus {
        self.info.status
    }

    pub fn g(&self) -> i32 {
        self.info.g
    }

    pub fn real_g(&self) -> i32 {
        self.info.real_g
    }

    pub fn is_new(&self) -> bool {
        self.info.status == SearchNodeStatus::New
    }

    pub fn is_open(&self) -> bool {
        self.info.status == SearchNodeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.info.status, SearchNodeStatus::Closed | SearchNodeStatus::DeadEnd)
    }

    pub fn is_dead_end(&self) -> bool {
        self.info.status == SearchNodeStatus::DeadEnd
    }

    pub fn h_is_dirty(&self) -> bool {
        self.info.h_dirty
    }

    pub fn clear_h_dirty(&mut self) {
        self.info.h_dirty = false;
    }

    pub fn h(&self) -> Option<i32> {
        self.info.h
    }

    pub fn set_h(&mut self, h: i32) {
        self.info.h = Some(h);
    }

    pub fn parent_edge(&self) -> Option<(StateId, OperatorId)> {
        self.info
            .predecessor
            .map(|p| (p.parent, p.creating_operator))
    }

    /// Opens the initial state: `g = real_g = 0`, no predecessor.
    pub fn open_initial(&mut self) {
        self.info.status = SearchNodeStatus::Open;
        self.info.g = 0;
        self.info.real_g = 0;
        self.info.predecessor = None;
    }

    /// Opens this (currently-new) node as reached from `parent` via
    /// `creating_operator`, with the given `g`/`real_g` costs.
    pub fn open(&mut self, g: i32, real_g: i32, parent: StateId, creating_operator: OperatorId) {
        self.info.status = SearchNodeStatus::Open;
        self.info.g = g;
        self.info.real_g = real_g;
        self.info.predecessor = Some(Predecessor {
            parent,
            creating_operator,
        });
    }

    /// Re-opens an already-visited node because a cheaper path to it was
    /// found (multi-path dependence). Marks the cached heuristic value
    /// dirty, since it may have been computed along the old, costlier path.
    pub fn reopen(&mut self, g: i32, real_g: i32, parent: StateId, creating_operator: OperatorId) {
        self.info.status = SearchNodeStatus::Open;
        self.info.g = g;
        self.info.real_g = real_g;
        self.info.predecessor = Some(Predecessor {
            parent,
            creating_operator,
        });
        self.info.h_dirty = true;
    }

    pub fn close(&mut self) {
        self.info.status = SearchNodeStatus::Closed;
    }

    pub fn mark_dead_end(&mut self) {
        self.info.status = SearchNodeStatus::DeadEnd;
    }

    pub fn registry(&self) -> &StateRegistry {
        self.registry
    }
}

/// Owns the per-state search metadata for one search run.
#[derive(Debug)]
pub struct SearchSpace {
    nodes: PerStateInformation<NodeInfo>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSpace {
    pub fn new() -> Self {
        Self {
            nodes: PerStateInformation::new(NodeInfo::default()),
        }
    }

    pub fn node<'a>(&'a mut self, registry: &'a StateRegistry, id: StateId) -> SearchNode<'a> {
        let info = self.nodes.get_mut(registry, id);
        SearchNode { registry, id, info }
    }

    /// Walks predecessor links from `goal_state` back to an initial state,
    /// returning the operators applied in forward order.
    pub fn trace_plan(
        &mut self,
        registry: &StateRegistry,
        goal_state: StateId,
    ) -> Vec<OperatorId> {
        let mut plan = Vec::new();
        let mut current = goal_state;
        loop {
            let info = self.nodes.get(registry, current).clone();
            match info.predecessor {
                Some(Predecessor {
                    parent,
                    creating_operator,
                }) => {
                    plan.push(creating_operator);
                    current = parent;
                }
                None => break,
            }
        }
        plan.reverse();
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Fact, Operator, TaskBuilder, Variable};

    fn toy_task() -> crate::task::Task {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![crate::task::Effect::unconditional(Fact::new(0, 1))],
            1,
        ));
        builder.set_goal(vec![Fact::new(0, 1)]);
        builder.build().unwrap()
    }

    #[test]
    fn new_node_starts_new() {
        let task = toy_task();
        let registry = StateRegistry::new(&task).unwrap();
        let mut space = SearchSpace::new();
        let node = space.node(&registry, registry.initial_state_id());
        assert!(node.is_new());
    }

    #[test]
    fn open_then_close_tracks_status() {
        let task = toy_task();
        let registry = StateRegistry::new(&task).unwrap();
        let mut space = SearchSpace::new();
        let id = registry.initial_state_id();
        {
            let mut node = space.node(&registry, id);
            node.open_initial();
        }
        assert!(space.node(&registry, id).is_open());
        space.node(&registry, id).close();
        assert!(space.node(&registry, id).is_closed());
    }

    #[test]
    fn trace_plan_follows_predecessors_to_the_root() {
        let task = toy_task();
        let mut registry = StateRegistry::new(&task).unwrap();
        let mut space = SearchSpace::new();
        let root = registry.initial_state_id();
        space.node(&registry, root).open_initial();
        let child = registry.lookup_or_insert(&[1]);
        space.node(&registry, child).open(1, 1, root, 0);
        let plan = space.trace_plan(&registry, child);
        assert_eq!(plan, vec![0]);
    }
}
