use super::ConditionTree;
use std::fmt;

/// Box-drawing view of a condition tree, used for debugging output.
pub struct DisplayTree<'a> {
    pub tree: &'a ConditionTree,
}

impl<'a> fmt::Display for DisplayTree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.tree, f, "", true)
    }
}

impl<'a> DisplayTree<'a> {
    fn fmt_as_tree(
        &self,
        tree: &ConditionTree,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match tree {
            ConditionTree::Atomic(atomic) => writeln!(f, "{}", atomic)?,
            ConditionTree::Logic(node) => {
                writeln!(f, "{}", node.operator)?;
                let count = node.children.len();
                for (i, child) in node.children.iter().enumerate() {
                    self.fmt_as_tree(child, f, &child_prefix, i + 1 == count)?;
                }
            }
        }
        Ok(())
    }
}
