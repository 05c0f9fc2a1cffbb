//! Generates the operators applicable in a state without scanning every
//! operator's precondition list: a decision tree branches on one variable at
//! a time, so testing a state against it costs roughly one lookup per
//! relevant variable rather than one scan per operator.

use crate::task::{Fact, Operator, OperatorId, Task, VarValue};

#[derive(Debug)]
enum Node {
    /// Branch on `var`: `children[value]` holds operators requiring
    /// `var == value`, and `default` holds operators with no precondition on
    /// `var` at all (so they must be considered regardless of its value).
    Switch {
        var: usize,
        children: Vec<Option<Box<Node>>>,
        default: Option<Box<Node>>,
    },
    /// No more preconditions to branch on: every operator listed here is
    /// applicable whenever control reaches this leaf.
    Leaf { operators: Vec<OperatorId> },
    Empty,
}

/// A decision tree over operator preconditions, built once per task and
/// queried once per expanded state.
#[derive(Debug)]
pub struct SuccessorGenerator {
    root: Node,
}

impl SuccessorGenerator {
    pub fn new(task: &Task) -> Self {
        let domain_sizes = task.domain_sizes();
        let entries: Vec<(OperatorId, Vec<Fact>)> = task
            .operators
            .iter()
            .enumerate()
            .map(|(id, op): (usize, &Operator)| (id, op.preconditions.clone()))
            .collect();
        let root = build(entries, &domain_sizes);
        Self { root }
    }

    /// Appends the ids of every operator applicable in `state` to `out`.
    pub fn generate_applicable_ops(&self, state: &[VarValue], out: &mut Vec<OperatorId>) {
        collect(&self.root, state, out);
    }
}

fn build(mut entries: Vec<(OperatorId, Vec<Fact>)>, domain_sizes: &[usize]) -> Node {
    if entries.is_empty() {
        return Node::Empty;
    }
    if entries.iter().all(|(_, facts)| facts.is_empty()) {
        return Node::Leaf {
            operators: entries.into_iter().map(|(id, _)| id).collect(),
        };
    }

    // Branch on the lowest-numbered variable any remaining entry still has a
    // precondition on, so the tree shape is deterministic.
    let branch_var = entries
        .iter()
        .flat_map(|(_, facts)| facts.iter().map(|f| f.var))
        .min()
        .expect("at least one entry has a non-empty precondition list");

    let mut by_value: Vec<Vec<(OperatorId, Vec<Fact>)>> = vec![Vec::new(); domain_sizes[branch_var]];
    let mut default: Vec<(OperatorId, Vec<Fact>)> = Vec::new();

    for (id, facts) in entries.drain(..) {
        match facts.iter().position(|f| f.var == branch_var) {
            Some(pos) => {
                let mut remaining = facts;
                let fact = remaining.remove(pos);
                by_value[fact.value].push((id, remaining));
            }
            None => default.push((id, facts)),
        }
    }

    let children = by_value
        .into_iter()
        .map(|group| {
            if group.is_empty() {
                None
            } else {
                Some(Box::new(build(group, domain_sizes)))
            }
        })
        .collect();

    let default_node = if default.is_empty() {
        None
    } else {
        Some(Box::new(build(default, domain_sizes)))
    };

    Node::Switch {
        var: branch_var,
        children,
        default: default_node,
    }
}

fn collect(node: &Node, state: &[VarValue], out: &mut Vec<OperatorId>) {
    match node {
        Node::Empty => {}
        Node::Leaf { operators } => out.extend(operators.iter().copied()),
        Node::Switch {
            var,
            children,
            default,
        } => {
            let value = state[*var];
            if let Some(Some(child)) = children.get(value) {
                collect(child, state, out);
            }
            if let Some(default) = default {
                collect(default, state, out);
            }
        }
    }
}
