use termtree::Tree;
use tracing::instrument;

use crate::arena::JsonKind;
use crate::container::Container;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Container {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        build_tree(self, None)
    }
}

/// Objects and arrays become branches; scalars are rendered inline as `key: value`.
fn build_tree(node: &Container, label: Option<String>) -> Tree<String> {
    let summary = match node.kind() {
        JsonKind::Object => "{}".to_string(),
        JsonKind::Array => "[]".to_string(),
        _ => node.data().to_string(),
    };
    let root = match label {
        Some(label) => format!("{}: {}", label, summary),
        None => summary,
    };

    let leaves: Vec<Tree<String>> = match node.kind() {
        JsonKind::Object => {
            let mut entries: Vec<_> = node.child_map().unwrap_or_default().into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            entries
                .into_iter()
                .map(|(key, child)| build_tree(&child, Some(key)))
                .collect()
        }
        JsonKind::Array => node
            .children()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, child)| build_tree(child, Some(format!("[{}]", i))))
            .collect(),
        _ => Vec::new(),
    };

    Tree::new(root).with_leaves(leaves)
}
