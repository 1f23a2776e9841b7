use crate::ast::{AtomicCondition, ConditionTree, LogicNode};
use crate::error::CompileError;
use crate::graph::{GraphIndex, Node, NodePayload};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Translates the nodes of a validated graph into condition trees.
///
/// Nodes are translated in post-order from an explicit work stack. A node
/// reachable along several paths is translated once; every parent but the
/// last one to consume it gets a clone.
pub(super) struct TreeBuilder<'a> {
    index: &'a GraphIndex<'a>,
    cache: AHashMap<&'a str, Option<ConditionTree>>,
    uses_left: AHashMap<&'a str, usize>,
    on_path: AHashSet<&'a str>,
}

struct Frame<'a> {
    node: &'a Node,
    next_child: usize,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(index: &'a GraphIndex<'a>) -> Self {
        Self {
            index,
            cache: AHashMap::new(),
            uses_left: AHashMap::new(),
            on_path: AHashSet::new(),
        }
    }

    /// Builds the tree rooted at `root_id`. `None` means the node is an Output
    /// and contributes no condition.
    pub(super) fn build(&mut self, root_id: &'a str) -> Result<Option<ConditionTree>, CompileError> {
        if !self.cache.contains_key(root_id) {
            let root = self.enter(root_id)?;
            let mut stack = vec![Frame {
                node: root,
                next_child: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let node = frame.node;
                let Some(child) = self.walked_children(node).get(frame.next_child) else {
                    stack.pop();
                    self.finish(node)?;
                    continue;
                };
                frame.next_child += 1;

                let child_id = child.id.as_str();
                if !self.cache.contains_key(child_id) {
                    let child = self.enter(child_id)?;
                    stack.push(Frame {
                        node: child,
                        next_child: 0,
                    });
                }
            }
        }
        Ok(self.take(root_id))
    }

    /// Only logic groups contribute their children to the tree.
    fn walked_children(&self, node: &Node) -> &'a [&'a Node] {
        let index = self.index;
        match node.data {
            NodePayload::LogicGroup { .. } => index.children(&node.id),
            _ => &[],
        }
    }

    fn enter(&mut self, node_id: &'a str) -> Result<&'a Node, CompileError> {
        let node = self
            .index
            .node(node_id)
            .ok_or_else(|| inconsistent(node_id, "node does not exist"))?;
        if matches!(node.data, NodePayload::Start) {
            return Err(inconsistent(node_id, "Start node used as a condition"));
        }
        if !self.on_path.insert(node_id) {
            return Err(inconsistent(node_id, "node is reachable from itself"));
        }
        Ok(node)
    }

    /// Translates `node` once all of its children are in the cache.
    fn finish(&mut self, node: &'a Node) -> Result<(), CompileError> {
        let node_id = node.id.as_str();
        let tree = match &node.data {
            NodePayload::Output => None,
            NodePayload::Indicator(payload) => {
                debug!(node_id, indicator = %payload.indicator, "compiled atomic condition");
                Some(ConditionTree::Atomic(AtomicCondition::from(payload)))
            }
            NodePayload::LogicGroup { operator } => {
                let index = self.index;
                let mut children = Vec::new();
                for child in index.children(node_id) {
                    if let Some(tree) = self.take(child.id.as_str()) {
                        children.push(tree);
                    }
                }
                debug!(node_id, %operator, children = children.len(), "compiled logic group");
                Some(ConditionTree::Logic(LogicNode {
                    operator: *operator,
                    children,
                }))
            }
            NodePayload::Start => {
                return Err(inconsistent(node_id, "Start node used as a condition"));
            }
        };

        self.on_path.remove(node_id);
        self.cache.insert(node_id, tree);
        Ok(())
    }

    /// Hands out the cached tree of `node_id` for one incoming edge. The last
    /// edge takes the tree itself, earlier ones get clones.
    fn take(&mut self, node_id: &'a str) -> Option<ConditionTree> {
        let index = self.index;
        let left = self
            .uses_left
            .entry(node_id)
            .or_insert_with(|| index.in_degree(node_id));
        *left = left.saturating_sub(1);
        if *left == 0 {
            self.cache.remove(node_id).flatten()
        } else {
            self.cache.get(node_id).cloned().flatten()
        }
    }
}

fn inconsistent(node_id: &str, reason: &str) -> CompileError {
    CompileError::Inconsistent {
        node_id: node_id.to_string(),
        reason: reason.to_string(),
    }
}
