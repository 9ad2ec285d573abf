//! Tree Utilities
//!
//! Building, flattening and revenue roll-up for the project structure.
//! All walks tolerate dangling parents and cycles in the input.

use rust_decimal::Decimal;

use crate::models::{Aggregate, BillingType, StructureNode};
use std::collections::{HashMap, HashSet};

/// A structure node together with its ordered children
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub node: StructureNode,
    pub children: Vec<TreeNode>,
}

/// Parent id as used for tree building: `None` for roots, dangling parents and self-parents
fn effective_parent(node: &StructureNode, ids: &HashSet<u32>) -> Option<u32> {
    node.parent_id
        .filter(|pid| *pid != node.id && ids.contains(pid))
}

/// Build parent -> children map, first occurrence of an id wins.
/// Every sibling group is sorted by ascending id.
fn children_map(nodes: &[StructureNode]) -> HashMap<Option<u32>, Vec<&StructureNode>> {
    let ids: HashSet<u32> = nodes.iter().map(|n| n.id).collect();
    let mut seen = HashSet::new();
    let mut map: HashMap<Option<u32>, Vec<&StructureNode>> = HashMap::new();
    for node in nodes {
        if !seen.insert(node.id) {
            continue;
        }
        map.entry(effective_parent(node, &ids)).or_default().push(node);
    }
    for children in map.values_mut() {
        children.sort_by_key(|n| n.id);
    }
    map
}

/// Build a forest from a flat node list.
///
/// Nodes whose parent does not exist become roots. Nodes only reachable
/// through a cycle are attached below the smallest id of that cycle, which
/// is promoted to a root. Each input id appears exactly once.
pub fn build_tree(nodes: &[StructureNode]) -> Vec<TreeNode> {
    fn attach(
        node: &StructureNode,
        children_map: &HashMap<Option<u32>, Vec<&StructureNode>>,
        visited: &mut HashSet<u32>,
    ) -> Option<TreeNode> {
        if !visited.insert(node.id) {
            return None;
        }
        let children = children_map
            .get(&Some(node.id))
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| attach(child, children_map, visited))
                    .collect()
            })
            .unwrap_or_default();
        Some(TreeNode { node: node.clone(), children })
    }

    let map = children_map(nodes);
    let mut visited = HashSet::new();
    let mut roots: Vec<TreeNode> = map
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .filter_map(|root| attach(root, &map, &mut visited))
                .collect()
        })
        .unwrap_or_default();

    // Whatever is left hangs in a cycle
    let mut stranded: Vec<&StructureNode> = map
        .values()
        .flatten()
        .copied()
        .filter(|n| !visited.contains(&n.id))
        .collect();
    stranded.sort_by_key(|n| n.id);
    for node in stranded {
        if let Some(tree) = attach(node, &map, &mut visited) {
            roots.push(tree);
        }
    }

    roots.sort_by_key(|t| t.node.id);
    roots
}

/// Depth-first pre-order walk over a built forest.
///
/// Yields `(node, depth)`. Calling [`flatten_tree`] again starts a fresh walk.
pub struct FlattenIter<'a> {
    stack: Vec<(&'a TreeNode, usize)>,
    collapsed: Option<&'a HashSet<u32>>,
}

impl<'a> Iterator for FlattenIter<'a> {
    type Item = (&'a StructureNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (tree, depth) = self.stack.pop()?;
        let expanded = self
            .collapsed
            .map_or(true, |collapsed| !collapsed.contains(&tree.node.id));
        if expanded {
            // Reverse so the smallest id is popped first
            for child in tree.children.iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some((&tree.node, depth))
    }
}

pub fn flatten_tree(roots: &[TreeNode]) -> FlattenIter<'_> {
    FlattenIter {
        stack: roots.iter().rev().map(|r| (r, 0)).collect(),
        collapsed: None,
    }
}

/// Like [`flatten_tree`], but hides the children of collapsed nodes
pub fn flatten_visible<'a>(roots: &'a [TreeNode], collapsed: &'a HashSet<u32>) -> FlattenIter<'a> {
    FlattenIter {
        stack: roots.iter().rev().map(|r| (r, 0)).collect(),
        collapsed: Some(collapsed),
    }
}

// ========================
// Aggregation
// ========================

#[derive(Clone, Copy, Default)]
struct Sums {
    revenue: Decimal,
    extras: Decimal,
    completion_extras: Decimal,
    earned_revenue: Decimal,
    earned_extras: Decimal,
}

impl Sums {
    fn add(&mut self, other: Sums) {
        self.revenue += other.revenue;
        self.extras += other.extras;
        self.completion_extras += other.completion_extras;
        self.earned_revenue += other.earned_revenue;
        self.earned_extras += other.earned_extras;
    }
}

enum Visit {
    InProgress,
    Done(Sums),
}

/// Revenue of a leaf according to its billing type
fn leaf_revenue(node: &StructureNode) -> Decimal {
    match node.billing_type_id {
        BillingType::Fixed => node.time_booking_total.unwrap_or(Decimal::ZERO),
        BillingType::StoredRevenue | BillingType::Other(_) => node.stored_revenue,
    }
}

fn leaf_sums(node: &StructureNode) -> Sums {
    let revenue = leaf_revenue(node);
    let completion_extras = revenue * node.extras_percent / Decimal::ONE_HUNDRED;
    Sums {
        revenue,
        extras: node.extras.unwrap_or(completion_extras),
        completion_extras,
        earned_revenue: revenue * node.revenue_completion_percent / Decimal::ONE_HUNDRED,
        earned_extras: completion_extras * node.extras_completion_percent / Decimal::ONE_HUNDRED,
    }
}

/// Recompute every node's [`Aggregate`] in place.
///
/// Memoized by id, so one pass is O(n). A node met again while still on the
/// walk stack contributes zero.
pub fn compute_aggregates(nodes: &mut [StructureNode]) {
    fn visit(
        id: u32,
        index: &HashMap<u32, usize>,
        nodes: &[StructureNode],
        children: &HashMap<u32, Vec<u32>>,
        memo: &mut HashMap<u32, Visit>,
    ) -> Sums {
        match memo.get(&id) {
            Some(Visit::Done(sums)) => return *sums,
            Some(Visit::InProgress) => return Sums::default(),
            None => {}
        }
        memo.insert(id, Visit::InProgress);
        let sums = match children.get(&id) {
            Some(kids) => {
                let mut total = Sums::default();
                for kid in kids {
                    total.add(visit(*kid, index, nodes, children, memo));
                }
                total
            }
            None => leaf_sums(&nodes[index[&id]]),
        };
        memo.insert(id, Visit::Done(sums));
        sums
    }

    let view: &[StructureNode] = &*nodes;
    let ids: HashSet<u32> = view.iter().map(|n| n.id).collect();
    let mut index = HashMap::new();
    for (i, node) in view.iter().enumerate() {
        index.entry(node.id).or_insert(i);
    }
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (i, node) in view.iter().enumerate() {
        if index[&node.id] != i {
            continue;
        }
        if let Some(pid) = effective_parent(node, &ids) {
            children.entry(pid).or_default().push(node.id);
        }
    }

    let mut memo = HashMap::with_capacity(view.len());
    let results: Vec<(Sums, bool)> = view
        .iter()
        .map(|n| {
            let sums = visit(n.id, &index, view, &children, &mut memo);
            (sums, children.contains_key(&n.id))
        })
        .collect();

    for (node, (sums, has_children)) in nodes.iter_mut().zip(results) {
        node.aggregate = Aggregate {
            has_children,
            computed_revenue: sums.revenue,
            computed_extras: sums.extras,
            completion_extras: sums.completion_extras,
            earned_revenue: sums.earned_revenue,
            earned_extras: sums.earned_extras,
        };
    }
}

// ========================
// Depth / Subtree Queries
// ========================

fn depth_in(parents: &HashMap<u32, Option<u32>>, id: u32) -> usize {
    let mut seen = HashSet::from([id]);
    let mut depth = 0;
    let mut current = parents.get(&id).copied().flatten();
    while let Some(pid) = current {
        if !parents.contains_key(&pid) || !seen.insert(pid) {
            break;
        }
        depth += 1;
        current = parents.get(&pid).copied().flatten();
    }
    depth
}

/// Order in which `ids` must be deleted: children before parents
pub fn deletion_order(nodes: &[StructureNode], ids: &[u32]) -> Vec<u32> {
    let parents: HashMap<u32, Option<u32>> = nodes.iter().map(|n| (n.id, n.parent_id)).collect();
    let mut unique: Vec<u32> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    let mut with_depth: Vec<(usize, u32)> = unique.into_iter().map(|id| (depth_in(&parents, id), id)).collect();
    with_depth.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    with_depth.into_iter().map(|(_, id)| id).collect()
}

/// All ids below `id`, in no particular order
pub fn descendants(nodes: &[StructureNode], id: u32) -> Vec<u32> {
    let map = children_map(nodes);
    let mut result = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if let Some(children) = map.get(&Some(current)) {
            for child in children {
                if seen.insert(child.id) {
                    result.push(child.id);
                    stack.push(child.id);
                }
            }
        }
    }
    result
}

pub fn is_descendant(nodes: &[StructureNode], ancestor: u32, candidate: u32) -> bool {
    descendants(nodes, ancestor).contains(&candidate)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn make_node(id: u32, parent_id: Option<u32>) -> StructureNode {
        StructureNode {
            id,
            parent_id,
            name_short: format!("N{}", id),
            name_long: String::new(),
            billing_type_id: BillingType::StoredRevenue,
            stored_revenue: Decimal::ZERO,
            time_booking_total: None,
            extras: None,
            extras_percent: Decimal::ZERO,
            revenue_completion_percent: Decimal::ZERO,
            extras_completion_percent: Decimal::ZERO,
            aggregate: Aggregate::default(),
        }
    }

    fn with_revenue(id: u32, parent_id: Option<u32>, revenue: Decimal) -> StructureNode {
        StructureNode { stored_revenue: revenue, ..make_node(id, parent_id) }
    }

    fn ids_and_depths(nodes: &[StructureNode]) -> Vec<(u32, usize)> {
        let roots = build_tree(nodes);
        flatten_tree(&roots).map(|(n, d)| (n.id, d)).collect()
    }

    fn aggregate_of(nodes: &[StructureNode], id: u32) -> Aggregate {
        nodes.iter().find(|n| n.id == id).unwrap().aggregate
    }

    #[test]
    fn test_flatten_tree() {
        let nodes = vec![
            make_node(4, Some(1)),
            make_node(2, None),
            make_node(5, Some(3)),
            make_node(1, None),
            make_node(3, Some(1)),
        ];

        // 1 (0), 3 (1), 5 (2), 4 (1), 2 (0)
        assert_eq!(
            ids_and_depths(&nodes),
            vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]
        );
    }

    #[test]
    fn test_flatten_is_restartable() {
        let roots = build_tree(&[make_node(1, None), make_node(2, Some(1))]);
        let first: Vec<u32> = flatten_tree(&roots).map(|(n, _)| n.id).collect();
        let second: Vec<u32> = flatten_tree(&roots).map(|(n, _)| n.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let nodes = vec![make_node(2, Some(99)), make_node(1, None)];
        assert_eq!(ids_and_depths(&nodes), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn test_cycle_and_self_parent_still_listed_once() {
        let nodes = vec![
            make_node(10, Some(11)),
            make_node(11, Some(10)),
            make_node(12, Some(10)),
            make_node(3, Some(3)),
            make_node(1, None),
        ];
        let rows = ids_and_depths(&nodes);
        assert_eq!(rows, vec![(1, 0), (3, 0), (10, 0), (11, 1), (12, 1)]);
    }

    #[test]
    fn test_every_node_exactly_once() {
        let nodes = vec![
            make_node(1, Some(3)),
            make_node(2, Some(1)),
            make_node(3, Some(2)),
            make_node(4, Some(42)),
            make_node(5, Some(4)),
            make_node(6, None),
            make_node(7, Some(7)),
        ];
        let mut ids: Vec<u32> = ids_and_depths(&nodes).into_iter().map(|(id, _)| id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_collapsed_children_hidden() {
        let nodes = vec![make_node(1, None), make_node(2, Some(1)), make_node(3, None)];
        let collapsed = HashSet::from([1]);
        let roots = build_tree(&nodes);
        let rows: Vec<u32> = flatten_visible(&roots, &collapsed).map(|(n, _)| n.id).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_root_revenue_is_sum_of_leaves() {
        let mut nodes = vec![
            make_node(1, None),
            with_revenue(2, Some(1), dec!(100)),
            with_revenue(3, Some(1), dec!(250)),
            with_revenue(4, Some(1), dec!(50)),
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(400));
        assert!(aggregate_of(&nodes, 1).has_children);
        assert!(!aggregate_of(&nodes, 2).has_children);
    }

    #[test]
    fn test_interior_stored_revenue_ignored() {
        let mut nodes = vec![
            with_revenue(1, None, dec!(9999)),
            with_revenue(2, Some(1), dec!(10)),
            with_revenue(3, Some(2), dec!(20)),
            with_revenue(4, Some(2), dec!(30)),
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 2).computed_revenue, dec!(50));
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(50));
    }

    #[test]
    fn test_extras_roll_up() {
        let mut nodes = vec![
            make_node(1, None),
            StructureNode { extras_percent: dec!(10), ..with_revenue(2, Some(1), dec!(200)) },
            StructureNode {
                billing_type_id: BillingType::Fixed,
                time_booking_total: Some(dec!(300)),
                extras_percent: dec!(5),
                stored_revenue: dec!(1),
                ..make_node(3, Some(1))
            },
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(500));
        assert_eq!(aggregate_of(&nodes, 2).completion_extras, dec!(20));
        assert_eq!(aggregate_of(&nodes, 3).completion_extras, dec!(15));
        assert_eq!(aggregate_of(&nodes, 1).completion_extras, dec!(35));
    }

    #[test]
    fn test_backend_extras_used_at_rest() {
        let mut nodes = vec![
            make_node(1, None),
            StructureNode { extras: Some(dec!(7)), extras_percent: dec!(10), ..with_revenue(2, Some(1), dec!(200)) },
            StructureNode { extras_percent: dec!(10), ..with_revenue(3, Some(1), dec!(100)) },
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 2).computed_extras, dec!(7));
        assert_eq!(aggregate_of(&nodes, 2).completion_extras, dec!(20));
        assert_eq!(aggregate_of(&nodes, 1).computed_extras, dec!(17));
    }

    #[test]
    fn test_earned_amounts() {
        let mut nodes = vec![
            make_node(1, None),
            StructureNode {
                extras_percent: dec!(10),
                revenue_completion_percent: dec!(50),
                extras_completion_percent: dec!(100),
                ..with_revenue(2, Some(1), dec!(200))
            },
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).earned_revenue, dec!(100));
        assert_eq!(aggregate_of(&nodes, 1).earned_extras, dec!(20));
    }

    #[test]
    fn test_fixed_leaf_without_total_is_zero() {
        let mut nodes = vec![StructureNode {
            billing_type_id: BillingType::Fixed,
            ..with_revenue(1, None, dec!(80))
        }];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(0));
    }

    #[test]
    fn test_other_billing_type_uses_stored_revenue() {
        let mut nodes = vec![
            make_node(1, None),
            StructureNode {
                billing_type_id: BillingType::Other(4),
                time_booking_total: Some(dec!(900)),
                ..with_revenue(2, Some(1), dec!(120))
            },
            with_revenue(3, Some(1), dec!(30)),
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 2).computed_revenue, dec!(120));
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(150));
    }

    #[test]
    fn test_roll_up_is_exact() {
        let mut nodes = vec![
            make_node(1, None),
            with_revenue(2, Some(1), dec!(0.1)),
            with_revenue(3, Some(1), dec!(0.2)),
        ];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(0.3));
    }

    #[test]
    fn test_cycle_aggregation_terminates() {
        let mut nodes = vec![with_revenue(1, Some(2), dec!(10)), with_revenue(2, Some(1), dec!(20))];
        compute_aggregates(&mut nodes);
        assert_eq!(aggregate_of(&nodes, 1).computed_revenue, dec!(0));
        assert_eq!(aggregate_of(&nodes, 2).computed_revenue, dec!(0));
        assert_eq!(ids_and_depths(&nodes), vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_deletion_order_deepest_first() {
        let nodes = vec![make_node(1, None), make_node(2, Some(1)), make_node(3, Some(2))];
        assert_eq!(deletion_order(&nodes, &[1, 2, 3]), vec![3, 2, 1]);
        assert_eq!(deletion_order(&nodes, &[3, 1, 3]), vec![3, 1]);
    }

    #[test]
    fn test_deletion_order_with_cycle_terminates() {
        let nodes = vec![make_node(1, Some(2)), make_node(2, Some(1)), make_node(3, Some(1))];
        assert_eq!(deletion_order(&nodes, &[1, 2, 3]), vec![3, 1, 2]);
    }

    #[test]
    fn test_descendants() {
        let nodes = vec![
            make_node(1, None),
            make_node(2, Some(1)),
            make_node(3, Some(2)),
            make_node(4, None),
        ];
        let mut below = descendants(&nodes, 1);
        below.sort();
        assert_eq!(below, vec![2, 3]);
        assert!(is_descendant(&nodes, 1, 3));
        assert!(!is_descendant(&nodes, 3, 1));
    }
}
