//! Compilation of a validated strategy graph into a [`ConditionTree`].

use crate::ast::ConditionTree;
use crate::error::CompileError;
use crate::graph::{Graph, LogicOperator};
use crate::validator::{RootPolicy, ValidationResult, Validator};
use tracing::info;

mod builder;

use builder::TreeBuilder;

/// Compiles a graph into the nested AND/OR structure sent to the execution engine.
///
/// The graph is validated first; compilation is refused for any graph that
/// does not validate cleanly.
pub struct Compiler<'g> {
    graph: &'g Graph,
    validator: Validator,
}

pub struct CompilerBuilder<'g> {
    graph: &'g Graph,
    root_policy: RootPolicy,
}

impl<'g> CompilerBuilder<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            root_policy: RootPolicy::default(),
        }
    }

    pub fn root_policy(mut self, policy: RootPolicy) -> Self {
        self.root_policy = policy;
        self
    }

    pub fn build(self) -> Compiler<'g> {
        Compiler {
            graph: self.graph,
            validator: Validator::new().with_root_policy(self.root_policy),
        }
    }
}

/// Compiles with the default root policy.
pub fn compile(graph: &Graph) -> Result<ConditionTree, CompileError> {
    Compiler::builder(graph).build().compile()
}

impl<'g> Compiler<'g> {
    pub fn builder(graph: &'g Graph) -> CompilerBuilder<'g> {
        CompilerBuilder::new(graph)
    }

    pub fn compile(&self) -> Result<ConditionTree, CompileError> {
        if let ValidationResult::Invalid(violations) = self.validator.validate(self.graph) {
            return Err(CompileError::NotValidated { violations });
        }

        let start = self
            .graph
            .start_node()
            .ok_or_else(|| CompileError::Inconsistent {
                node_id: "N/A".to_string(),
                reason: "no Start node".to_string(),
            })?;
        let index = self.graph.index();
        let roots = index.children(&start.id);

        let mut builder = TreeBuilder::new(&index);
        let mut compiled = Vec::with_capacity(roots.len());
        for root in roots {
            if let Some(tree) = builder.build(root.id.as_str())? {
                compiled.push(tree);
            }
        }

        let tree = match compiled.len() {
            0 => {
                return Err(CompileError::Inconsistent {
                    node_id: start.id.clone(),
                    reason: "Start has no condition to compile".to_string(),
                });
            }
            1 => compiled.remove(0),
            _ if self.validator.root_policy() == RootPolicy::ImplicitOr => {
                ConditionTree::logic(LogicOperator::Or, compiled)
            }
            n => {
                return Err(CompileError::Inconsistent {
                    node_id: start.id.clone(),
                    reason: format!("{} roots found but the root policy rejects them", n),
                });
            }
        };

        info!(
            revision = self.graph.revision(),
            depth = tree.depth(),
            conditions = tree.atomics().len(),
            "compiled condition tree"
        );
        Ok(tree)
    }
}
