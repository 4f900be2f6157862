//! Text renderings of a tree: the node structure and the layout constants.

use crate::common::{PageId, Result};
use crate::storage::page::NodeType;

use super::layout::{TreeLayout, COMMON_NODE_HEADER_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_SPACE_FOR_CELLS};
use super::tree::BTree;

/// Render the tree rooted at page 0, one line per node and per key.
///
/// ```text
/// - internal (size 1)
///   - leaf (size 2)
///     - 1
///     - 2
///   - key 2
///   - leaf (size 1)
///     - 3
/// ```
pub fn render_tree(tree: &mut BTree) -> Result<String> {
    let mut out = String::new();
    let root = tree.root();
    render_node(tree, root, 0, &mut out)?;
    Ok(out)
}

fn render_node(tree: &mut BTree, page: PageId, level: usize, out: &mut String) -> Result<()> {
    match tree.node_type(page)? {
        NodeType::Leaf => {
            let leaf = tree.leaf(page)?;
            let num_cells = leaf.num_cells();
            line(out, level, &format!("- leaf (size {})", num_cells));
            for i in 0..num_cells {
                line(out, level + 1, &format!("- {}", leaf.key(i)));
            }
        }
        NodeType::Internal => {
            let (num_keys, keys, children) = {
                let node = tree.internal(page)?;
                let num_keys = node.num_keys();
                let keys: Vec<u32> = (0..num_keys).map(|i| node.key(i)).collect();
                // An empty internal node has no valid children to print.
                let children = if num_keys > 0 { node.children()? } else { Vec::new() };
                (num_keys, keys, children)
            };

            line(out, level, &format!("- internal (size {})", num_keys));
            for (i, child) in children.into_iter().enumerate() {
                render_node(tree, child, level + 1, out)?;
                if let Some(key) = keys.get(i) {
                    line(out, level + 1, &format!("- key {}", key));
                }
            }
        }
    }
    Ok(())
}

fn line(out: &mut String, level: usize, text: &str) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

/// Render the derived layout constants, one `NAME: value` per line.
pub fn render_constants(layout: &TreeLayout) -> String {
    [
        ("ROW_SIZE", layout.value_size),
        ("COMMON_NODE_HEADER_SIZE", COMMON_NODE_HEADER_SIZE),
        ("LEAF_NODE_HEADER_SIZE", LEAF_NODE_HEADER_SIZE),
        ("LEAF_NODE_CELL_SIZE", layout.leaf_cell_size()),
        ("LEAF_NODE_SPACE_FOR_CELLS", LEAF_NODE_SPACE_FOR_CELLS),
        ("LEAF_NODE_MAX_CELLS", layout.leaf_max_cells),
    ]
    .iter()
    .map(|(name, value)| format!("{}: {}\n", name, value))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::StorageConfig;
    use crate::storage::Pager;
    use tempfile::tempdir;

    #[test]
    fn test_render_constants() {
        let rendered = render_constants(&TreeLayout::physical(293));
        assert_eq!(
            rendered,
            "ROW_SIZE: 293\n\
             COMMON_NODE_HEADER_SIZE: 6\n\
             LEAF_NODE_HEADER_SIZE: 14\n\
             LEAF_NODE_CELL_SIZE: 297\n\
             LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
             LEAF_NODE_MAX_CELLS: 13\n"
        );
    }

    #[test]
    fn test_render_two_level_tree() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::default().with_leaf_max_cells(2);
        let pager = Pager::open(dir.path().join("test.db"), config.max_pages).unwrap();
        let layout = TreeLayout::from_config(4, &config).unwrap();
        let mut tree = BTree::open(pager, layout).unwrap();

        assert_eq!(render_tree(&mut tree).unwrap(), "- leaf (size 0)\n");

        for key in 1..=3 {
            tree.insert(key, &[]).unwrap();
        }
        assert_eq!(
            render_tree(&mut tree).unwrap(),
            "- internal (size 1)\n\
             \x20 - leaf (size 2)\n\
             \x20   - 1\n\
             \x20   - 2\n\
             \x20 - key 2\n\
             \x20 - leaf (size 1)\n\
             \x20   - 3\n"
        );
    }
}
