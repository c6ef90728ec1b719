//! Dependency tree construction and rendering.
//!
//! The tree is a presentation structure: it mirrors the declared
//! dependency edges of one root configuration, including edges the
//! resolver would refuse to follow. Missing targets become leaf nodes
//! flagged `missing`, repeat visits along the current path become leaf
//! nodes flagged `circular`, and repeated ids on different branches are
//! expanded each time they occur.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, DependencySpec, DependencyType};
use crate::version::VersionConstraint;

/// One node of a rendered dependency tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyTreeNode {
    /// Configuration id this node stands for.
    pub config_id: String,
    /// Display name, or the id when the target is missing.
    pub name: String,
    /// Catalog version, empty when the target is missing.
    pub version: String,
    /// How the parent depends on this node. Roots are `Required`.
    pub dependency_type: DependencyType,
    /// Version constraint on the edge from the parent, if any.
    pub constraint: Option<VersionConstraint>,
    /// True when this id already occurs on the path from the root.
    pub circular: bool,
    /// True when the id is not in the catalog.
    pub missing: bool,
    /// Child nodes in declaration order.
    pub dependencies: Vec<DependencyTreeNode>,
}

/// Work items for the explicit-stack tree walk.
enum Frame {
    Visit {
        id: String,
        edge: DependencyType,
        constraint: Option<VersionConstraint>,
        parent: Option<usize>,
    },
    Leave {
        id: String,
    },
}

/// Flat node storage while the tree is being walked; children are
/// attached afterwards.
struct Slot {
    node: DependencyTreeNode,
    parent: Option<usize>,
}

impl DependencyTreeNode {
    /// Builds the dependency tree rooted at `root_id` using an explicit
    /// work stack, so arbitrarily deep chains cannot overflow the call
    /// stack.
    pub(crate) fn build(catalog: &Catalog, root_id: &str) -> Self {
        let mut slots: Vec<Slot> = Vec::new();
        let mut path: HashSet<String> = HashSet::new();
        let mut stack: Vec<Frame> = vec![Frame::Visit {
            id: root_id.to_string(),
            edge: DependencyType::Required,
            constraint: None,
            parent: None,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Leave { id } => {
                    path.remove(&id);
                }
                Frame::Visit {
                    id,
                    edge,
                    constraint,
                    parent,
                } => {
                    let item = catalog.get(&id);
                    let circular = path.contains(&id);
                    let node = DependencyTreeNode {
                        config_id: id.clone(),
                        name: item.map_or_else(|| id.clone(), |i| i.display_name().to_string()),
                        version: item.map_or_else(String::new, |i| i.version.clone()),
                        dependency_type: edge,
                        constraint,
                        circular,
                        missing: item.is_none(),
                        dependencies: Vec::new(),
                    };
                    let index = slots.len();
                    slots.push(Slot { node, parent });

                    if circular {
                        continue;
                    }
                    if let Some(item) = item {
                        path.insert(id.clone());
                        stack.push(Frame::Leave { id });
                        // Reverse push order so children pop in
                        // declaration order.
                        for raw in item.dependencies.iter().rev() {
                            let spec = DependencySpec::parse(raw);
                            stack.push(Frame::Visit {
                                id: spec.config_id,
                                edge: spec.dependency_type,
                                constraint: spec.version_constraint,
                                parent: Some(index),
                            });
                        }
                    }
                }
            }
        }

        // Every slot was created after its parent, so draining backwards
        // completes each subtree before its parent is taken.
        let mut assembled: HashMap<usize, Vec<DependencyTreeNode>> = HashMap::new();
        while let Some(Slot { mut node, parent }) = slots.pop() {
            let index = slots.len();
            if let Some(mut children) = assembled.remove(&index) {
                children.reverse();
                node.dependencies = children;
            }
            match parent {
                Some(parent_index) => assembled.entry(parent_index).or_default().push(node),
                None => return node,
            }
        }

        // The root slot has no parent and is returned above; this is only
        // reachable if the walk produced no slots at all, which it cannot.
        Self {
            config_id: root_id.to_string(),
            name: root_id.to_string(),
            version: String::new(),
            dependency_type: DependencyType::Required,
            constraint: None,
            circular: false,
            missing: !catalog.contains(root_id),
            dependencies: Vec::new(),
        }
    }

    /// Number of nodes in this tree, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.dependencies.iter());
        }
        count
    }

    /// Renders the tree with box-drawing connectors:
    ///
    /// ```text
    /// base-context v1.2.0
    /// ├── common-defs v1.1.0 [>=1.0]
    /// └── extras (optional) (missing)
    /// ```
    #[must_use]
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&DependencyTreeNode, String, bool, bool)> =
            vec![(self, String::new(), true, true)];

        while let Some((node, prefix, is_last, is_root)) = stack.pop() {
            if is_root {
                out.push_str(&node.label());
            } else {
                let connector = if is_last { "└── " } else { "├── " };
                out.push_str(&format!("{prefix}{connector}{}", node.label()));
            }
            out.push('\n');

            let child_prefix = if is_root {
                String::new()
            } else if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            let last_index = node.dependencies.len().saturating_sub(1);
            for (i, child) in node.dependencies.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i == last_index, false));
            }
        }

        out
    }

    fn label(&self) -> String {
        let mut label = self.config_id.clone();
        if !self.version.is_empty() {
            label.push_str(&format!(" v{}", self.version));
        }
        if let Some(constraint) = &self.constraint {
            label.push_str(&format!(" [{constraint}]"));
        }
        if self.dependency_type == DependencyType::Optional {
            label.push_str(" (optional)");
        }
        if self.circular {
            label.push_str(" (circular)");
        }
        if self.missing {
            label.push_str(" (missing)");
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConfigItem;

    fn item(id: &str, version: &str, deps: &[&str]) -> ConfigItem {
        let mut item = ConfigItem::new(id, version, format!("contexts/{id}.md"));
        for dep in deps {
            item = item.with_dependency(*dep);
        }
        item
    }

    #[test]
    fn test_tree_follows_declaration_order() {
        let catalog = Catalog::from_items([
            item("root", "1.0", &["first", "second"]),
            item("first", "1.0", &[]),
            item("second", "1.0", &[]),
        ]);

        let tree = DependencyTreeNode::build(&catalog, "root");
        assert_eq!(tree.config_id, "root");
        assert_eq!(tree.dependencies.len(), 2);
        assert_eq!(tree.dependencies[0].config_id, "first");
        assert_eq!(tree.dependencies[1].config_id, "second");
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_tree_marks_missing_nodes() {
        let catalog = Catalog::from_items([item("root", "1.0", &["ghost"])]);

        let tree = DependencyTreeNode::build(&catalog, "root");
        let ghost = &tree.dependencies[0];
        assert!(ghost.missing);
        assert!(ghost.version.is_empty());
        assert!(ghost.dependencies.is_empty());
    }

    #[test]
    fn test_tree_stops_at_cycles() {
        let catalog = Catalog::from_items([
            item("a", "1.0", &["b"]),
            item("b", "1.0", &["a"]),
        ]);

        let tree = DependencyTreeNode::build(&catalog, "a");
        let b = &tree.dependencies[0];
        assert_eq!(b.config_id, "b");
        let back = &b.dependencies[0];
        assert_eq!(back.config_id, "a");
        assert!(back.circular);
        assert!(back.dependencies.is_empty());
    }

    #[test]
    fn test_shared_dependency_expands_per_branch() {
        let catalog = Catalog::from_items([
            item("root", "1.0", &["left", "right"]),
            item("left", "1.0", &["shared"]),
            item("right", "1.0", &["shared"]),
            item("shared", "1.0", &[]),
        ]);

        let tree = DependencyTreeNode::build(&catalog, "root");
        assert_eq!(tree.dependencies[0].dependencies[0].config_id, "shared");
        assert_eq!(tree.dependencies[1].dependencies[0].config_id, "shared");
        assert!(!tree.dependencies[1].dependencies[0].circular);
    }

    #[test]
    fn test_edge_metadata_carried_onto_nodes() {
        let catalog = Catalog::from_items([
            item("root", "1.0", &["lib>=2.0", "extras@optional"]),
            item("lib", "2.5", &[]),
            item("extras", "0.1", &[]),
        ]);

        let tree = DependencyTreeNode::build(&catalog, "root");
        let lib = &tree.dependencies[0];
        assert_eq!(lib.constraint.as_ref().map(ToString::to_string), Some(">=2.0".to_string()));
        assert_eq!(lib.dependency_type, DependencyType::Required);
        let extras = &tree.dependencies[1];
        assert_eq!(extras.dependency_type, DependencyType::Optional);
        assert!(extras.constraint.is_none());
    }

    #[test]
    fn test_missing_root() {
        let catalog = Catalog::new();
        let tree = DependencyTreeNode::build(&catalog, "nothing");
        assert!(tree.missing);
        assert_eq!(tree.name, "nothing");
        assert!(tree.dependencies.is_empty());
    }

    #[test]
    fn test_tree_string_rendering() {
        let catalog = Catalog::from_items([
            item("root", "1.0", &["mid", "extras@optional"]),
            item("mid", "2.0", &["leaf"]),
            item("leaf", "3.0", &[]),
        ]);

        let rendered = DependencyTreeNode::build(&catalog, "root").to_tree_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "root v1.0");
        assert_eq!(lines[1], "├── mid v2.0");
        assert_eq!(lines[2], "│   └── leaf v3.0");
        assert_eq!(lines[3], "└── extras (optional) (missing)");
    }
}
