//! Traversal and display helpers for project forests.

use termtree::Tree;

use crate::domain::entities::{Forest, Node};

/// Pre-order iterator over a forest, yielding `(depth, node)` with roots at depth 0.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

pub fn walk(forest: &[Node]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().map(|node| (0, node)).collect(),
    }
}

/// Total number of nodes in the forest.
pub fn forest_size(forest: &[Node]) -> usize {
    forest.iter().map(Node::count).sum()
}

/// Find a node by source id.
pub fn find<'a>(forest: &'a Forest, id: &str) -> Option<&'a Node> {
    walk(forest).map(|(_, node)| node).find(|node| node.id == id)
}

/// Render a node and its descendants as `name (id)` lines.
///
/// Built bottom-up from the pre-order walk: finished subtrees wait on a stack
/// until their parent is reached.
pub fn to_tree(root: &Node) -> Tree<String> {
    let preorder: Vec<(usize, &Node)> = walk(std::slice::from_ref(root)).collect();
    let mut finished: Vec<(usize, Tree<String>)> = Vec::new();

    for (depth, node) in preorder.into_iter().rev() {
        // Subtrees above the last entry at this depth or shallower are the children,
        // topmost being the first child.
        let first_child = finished
            .iter()
            .rposition(|(d, _)| *d <= depth)
            .map_or(0, |pos| pos + 1);
        let leaves: Vec<Tree<String>> = finished
            .drain(first_child..)
            .rev()
            .map(|(_, tree)| tree)
            .collect();
        finished.push((depth, Tree::new(label(node)).with_leaves(leaves)));
    }

    match finished.pop() {
        Some((_, tree)) => tree,
        None => Tree::new(label(root)),
    }
}

fn label(node: &Node) -> String {
    format!("{} ({})", node.name, node.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Forest {
        vec![
            Node::new("1", "A").with_children(vec![
                Node::new("2", "B").with_children(vec![Node::new("4", "D")]),
                Node::new("3", "C"),
            ]),
            Node::new("5", "E"),
        ]
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let visited: Vec<_> = walk(&forest())
            .map(|(depth, node)| (depth, node.name.clone()))
            .collect();

        assert_eq!(
            visited,
            vec![
                (0, "A".to_string()),
                (1, "B".to_string()),
                (2, "D".to_string()),
                (1, "C".to_string()),
                (0, "E".to_string()),
            ]
        );
    }

    #[test]
    fn test_forest_size_and_find() {
        let forest = forest();
        assert_eq!(forest_size(&forest), 5);
        assert_eq!(find(&forest, "4").map(|n| n.name.as_str()), Some("D"));
        assert!(find(&forest, "9").is_none());
    }

    #[test]
    fn test_to_tree_keeps_child_order_at_every_level() {
        let tree = to_tree(&forest()[0]);

        assert_eq!(tree.root, "A (1)");
        let children: Vec<&str> = tree.leaves.iter().map(|t| t.root.as_str()).collect();
        assert_eq!(children, vec!["B (2)", "C (3)"]);
        assert_eq!(tree.leaves[0].leaves[0].root, "D (4)");
        assert!(tree.leaves[1].leaves.is_empty());
    }

    #[test]
    fn test_to_tree_of_deep_chain_has_one_level_per_node() {
        let depth = 2_000;
        let mut chain = Node::new(depth.to_string(), "leaf");
        for i in (0..depth).rev() {
            chain = Node::new(i.to_string(), format!("p{i}")).with_children(vec![chain]);
        }

        let tree = to_tree(&chain);

        let mut levels = 0;
        let mut current = Some(&tree);
        while let Some(t) = current {
            levels += 1;
            current = t.leaves.first();
        }
        assert_eq!(levels, depth + 1);
    }

    #[test]
    fn test_to_tree_renders_names_and_ids() {
        let rendered = to_tree(&forest()[0]).to_string();
        assert!(rendered.starts_with("A (1)\n"));
        assert!(rendered.contains("D (4)"));
    }
}
