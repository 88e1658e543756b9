//! Parent/child graph built from normalized outline records.
//!
//! Nodes live in an arena indexed by [`NodeIndex`]. Insertion happens in
//! depth-first preorder, so index order is also the traversal order
//! returned by [`Hierarchy::descendants`].

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::outline::HierarchyRecord;

pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    index: NodeIndex,
    id: String,
    parents: Vec<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl HierarchyNode {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parents(&self) -> &[NodeIndex] {
        &self.parents
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A directed parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: NodeIndex,
    pub target: NodeIndex,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("duplicate node id `{id}`: labels must be unique across the whole outline")]
    DuplicateId { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    roots: Vec<NodeIndex>,
    index: HashMap<String, NodeIndex>,
}

impl Hierarchy {
    /// Builds the hierarchy of a forest of records.
    ///
    /// Ids are the join key between parents and children, so a repeated id
    /// anywhere in the forest is rejected.
    pub fn build(records: &[HierarchyRecord]) -> Result<Self, HierarchyError> {
        let mut hierarchy = Self::default();
        for record in records {
            let root = hierarchy.insert(record, None)?;
            hierarchy.roots.push(root);
        }
        debug!(
            nodes = hierarchy.len(),
            roots = hierarchy.roots.len();
            "Hierarchy built",
        );
        Ok(hierarchy)
    }

    fn insert(
        &mut self,
        record: &HierarchyRecord,
        parent: Option<NodeIndex>,
    ) -> Result<NodeIndex, HierarchyError> {
        if self.index.contains_key(&record.id) {
            return Err(HierarchyError::DuplicateId {
                id: record.id.clone(),
            });
        }
        let index = self.nodes.len();
        self.nodes.push(HierarchyNode {
            index,
            id: record.id.clone(),
            parents: parent.into_iter().collect(),
            children: Vec::new(),
        });
        self.index.insert(record.id.clone(), index);
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        for child in record.children() {
            self.insert(child, Some(index))?;
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn node(&self, index: NodeIndex) -> Option<&HierarchyNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.nodes
            .get(index)
            .map(HierarchyNode::children)
            .unwrap_or(&[])
    }

    pub fn parents(&self, index: NodeIndex) -> &[NodeIndex] {
        self.nodes
            .get(index)
            .map(HierarchyNode::parents)
            .unwrap_or(&[])
    }

    /// All nodes in depth-first preorder, roots in input order.
    pub fn descendants(&self) -> std::slice::Iter<'_, HierarchyNode> {
        self.nodes.iter()
    }

    /// All parent → child edges, grouped by parent in preorder.
    pub fn links(&self) -> Vec<Link> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.children.iter().map(move |&child| Link {
                    source: node.index,
                    target: child,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<HierarchyRecord> {
        vec![
            HierarchyRecord::leaf("A"),
            HierarchyRecord::with_children(
                "B",
                vec![HierarchyRecord::leaf("C"), HierarchyRecord::leaf("D")],
            ),
        ]
    }

    #[test]
    fn builds_forest_with_links() {
        let hierarchy = Hierarchy::build(&sample()).unwrap();
        assert_eq!(hierarchy.len(), 4);
        assert_eq!(hierarchy.roots().len(), 2);

        let id = |index: NodeIndex| hierarchy.node(index).unwrap().id().to_string();
        let links: Vec<(String, String)> = hierarchy
            .links()
            .into_iter()
            .map(|link| (id(link.source), id(link.target)))
            .collect();
        assert_eq!(
            links,
            vec![
                ("B".to_string(), "C".to_string()),
                ("B".to_string(), "D".to_string())
            ]
        );

        let a = hierarchy.index_of("A").unwrap();
        assert!(hierarchy.children(a).is_empty());
        assert!(hierarchy.parents(a).is_empty());

        let b = hierarchy.index_of("B").unwrap();
        assert!(hierarchy.node(b).unwrap().is_root());
        assert_eq!(hierarchy.children(b).len(), 2);
    }

    #[test]
    fn descendants_are_preorder_and_stable() {
        let records = vec![HierarchyRecord::with_children(
            "root",
            vec![
                HierarchyRecord::with_children("x", vec![HierarchyRecord::leaf("x1")]),
                HierarchyRecord::leaf("y"),
            ],
        )];
        let hierarchy = Hierarchy::build(&records).unwrap();
        let first: Vec<&str> = hierarchy.descendants().map(HierarchyNode::id).collect();
        let second: Vec<&str> = hierarchy.descendants().map(HierarchyNode::id).collect();
        assert_eq!(first, vec!["root", "x", "x1", "y"]);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_duplicate_ids_across_levels() {
        let records = vec![
            HierarchyRecord::leaf("A"),
            HierarchyRecord::with_children("A", vec![HierarchyRecord::leaf("B")]),
        ];
        assert_eq!(
            Hierarchy::build(&records).unwrap_err(),
            HierarchyError::DuplicateId { id: "A".to_string() }
        );
    }

    #[test]
    fn rejects_duplicate_ids_in_separate_subtrees() {
        let records = vec![
            HierarchyRecord::with_children("P", vec![HierarchyRecord::leaf("shared")]),
            HierarchyRecord::with_children("Q", vec![HierarchyRecord::leaf("shared")]),
        ];
        assert!(Hierarchy::build(&records).is_err());
    }

    #[test]
    fn empty_forest_has_no_nodes_or_links() {
        let hierarchy = Hierarchy::build(&[]).unwrap();
        assert!(hierarchy.is_empty());
        assert!(hierarchy.links().is_empty());
        assert_eq!(hierarchy.descendants().count(), 0);
    }
}
