//! Lookups over the folder tree returned by `GET /folders?tree=true`.
//!
//! Folder pages only know their own id; the display name, the parent to go
//! "up" to and the breadcrumb trail all come from searching the tree.

use crate::api::types::FolderNode;

/// Id of the implicit top-level folder.
pub const ROOT_ID: &str = "root";

/// Depth-first search for the node with `id`.
pub fn find<'a>(nodes: &'a [FolderNode], id: &str) -> Option<&'a FolderNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_name<'a>(nodes: &'a [FolderNode], id: &str) -> Option<&'a str> {
    find(nodes, id).map(|node| node.name.as_str())
}

/// Parent id of `id`; top-level folders have parent [`ROOT_ID`].
pub fn find_parent_id(nodes: &[FolderNode], id: &str) -> Option<String> {
    fn walk(nodes: &[FolderNode], id: &str, parent: &str) -> Option<String> {
        for node in nodes {
            if node.id == id {
                return Some(parent.to_string());
            }
            if let Some(found) = walk(&node.children, id, &node.id) {
                return Some(found);
            }
        }
        None
    }
    walk(nodes, id, ROOT_ID)
}

/// Nodes from the top level down to `id`, inclusive. Empty if not found.
pub fn path_to<'a>(nodes: &'a [FolderNode], id: &str) -> Vec<&'a FolderNode> {
    fn walk<'a>(nodes: &'a [FolderNode], id: &str, trail: &mut Vec<&'a FolderNode>) -> bool {
        for node in nodes {
            trail.push(node);
            if node.id == id || walk(&node.children, id, trail) {
                return true;
            }
            trail.pop();
        }
        false
    }
    let mut trail = Vec::new();
    walk(nodes, id, &mut trail);
    trail
}

/// Indented text rendering, one folder per line as `name (id)`.
pub fn render(nodes: &[FolderNode]) -> String {
    fn walk(nodes: &[FolderNode], depth: usize, out: &mut String) {
        for node in nodes {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{} ({})\n", node.name, node.id));
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(nodes, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, children: Vec<FolderNode>) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            name: name.to_string(),
            children,
        }
    }

    fn sample() -> Vec<FolderNode> {
        vec![
            node(
                "a",
                "Finance",
                vec![
                    node("b", "Invoices", vec![node("c", "2024", vec![])]),
                    node("d", "Receipts", vec![]),
                ],
            ),
            node("e", "Legal", vec![]),
        ]
    }

    #[test]
    fn test_find_name() {
        let tree = sample();
        assert_eq!(find_name(&tree, "a"), Some("Finance"));
        assert_eq!(find_name(&tree, "c"), Some("2024"));
        assert_eq!(find_name(&tree, "e"), Some("Legal"));
        assert_eq!(find_name(&tree, "zzz"), None);
        assert_eq!(find_name(&[], "a"), None);
    }

    #[test]
    fn test_find_parent_id() {
        let tree = sample();
        assert_eq!(find_parent_id(&tree, "a").as_deref(), Some(ROOT_ID));
        assert_eq!(find_parent_id(&tree, "e").as_deref(), Some(ROOT_ID));
        assert_eq!(find_parent_id(&tree, "b").as_deref(), Some("a"));
        assert_eq!(find_parent_id(&tree, "c").as_deref(), Some("b"));
        assert_eq!(find_parent_id(&tree, "d").as_deref(), Some("a"));
        assert_eq!(find_parent_id(&tree, "zzz"), None);
    }

    #[test]
    fn test_path_to() {
        let tree = sample();
        let names: Vec<_> = path_to(&tree, "c").iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Finance", "Invoices", "2024"]);

        let names: Vec<_> = path_to(&tree, "d").iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Finance", "Receipts"]);

        assert!(path_to(&tree, "missing").is_empty());
    }

    #[test]
    fn test_render_indents_children() {
        let rendered = render(&sample());
        assert_eq!(
            rendered,
            "Finance (a)\n  Invoices (b)\n    2024 (c)\n  Receipts (d)\nLegal (e)\n"
        );
    }
}
