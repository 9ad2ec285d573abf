//! List Pipeline
//!
//! Filter, sort and paginate any list of records the same way.

use std::cmp::Ordering;

use crate::models::StructureNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A record that can be shown in a filtered, sorted list
pub trait Listable {
    type SortKey: Copy + PartialEq;

    /// `needle` is already lowercased and non-empty
    fn matches(&self, needle: &str) -> bool;

    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<K> {
    pub filter: String,
    pub sort: Option<(K, SortDirection)>,
    /// Zero-based
    pub page: usize,
    pub page_size: usize,
}

impl<K> Default for ListQuery<K> {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort: None,
            page: 0,
            page_size: 25,
        }
    }
}

impl<K: Copy + PartialEq> ListQuery<K> {
    /// Sort by `key`, flipping direction when it is already the active key
    pub fn sort_by(&mut self, key: K) {
        self.sort = match self.sort {
            Some((current, direction)) if current == key => Some((key, direction.toggled())),
            _ => Some((key, SortDirection::Ascending)),
        };
        self.page = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually shown after clamping
    pub page: usize,
    pub page_count: usize,
    /// Matches before pagination
    pub total: usize,
}

pub fn apply_query<T: Listable + Clone>(items: &[T], query: &ListQuery<T::SortKey>) -> Page<T> {
    let needle = query.filter.trim().to_lowercase();
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| needle.is_empty() || item.matches(&needle))
        .collect();

    if let Some((key, direction)) = query.sort {
        // Stable, so equal keys keep their input order
        matched.sort_by(|a, b| {
            let ord = a.compare(b, key);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    let total = matched.len();
    let page_size = query.page_size.max(1);
    let page_count = total.div_ceil(page_size).max(1);
    let page = query.page.min(page_count - 1);
    let items = matched
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Page { items, page, page_count, total }
}

// ========================
// Structure Nodes
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSortKey {
    Id,
    NameShort,
    Revenue,
}

impl Listable for StructureNode {
    type SortKey = NodeSortKey;

    fn matches(&self, needle: &str) -> bool {
        self.name_short.to_lowercase().contains(needle)
            || self.name_long.to_lowercase().contains(needle)
            || self.id.to_string() == needle
    }

    fn compare(&self, other: &Self, key: NodeSortKey) -> Ordering {
        match key {
            NodeSortKey::Id => self.id.cmp(&other.id),
            NodeSortKey::NameShort => self.name_short.to_lowercase().cmp(&other.name_short.to_lowercase()),
            NodeSortKey::Revenue => self
                .aggregate
                .computed_revenue
                .cmp(&other.aggregate.computed_revenue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Aggregate;
    use crate::tree::tests::make_node;
    use rust_decimal_macros::dec;

    fn named(id: u32, name: &str) -> StructureNode {
        StructureNode { name_short: name.to_string(), ..make_node(id, None) }
    }

    fn ids(page: &Page<StructureNode>) -> Vec<u32> {
        page.items.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let nodes = vec![named(1, "Planung"), named(2, "Bauleitung"), named(3, "PLANUNG 2")];
        let query = ListQuery { filter: " planung ".into(), ..Default::default() };
        let page = apply_query(&nodes, &query);
        assert_eq!(ids(&page), vec![1, 3]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_sort_toggles_direction() {
        let nodes = vec![named(1, "b"), named(2, "a"), named(3, "c")];
        let mut query = ListQuery::default();
        query.sort_by(NodeSortKey::NameShort);
        assert_eq!(ids(&apply_query(&nodes, &query)), vec![2, 1, 3]);
        query.sort_by(NodeSortKey::NameShort);
        assert_eq!(ids(&apply_query(&nodes, &query)), vec![3, 1, 2]);
    }

    #[test]
    fn test_page_is_clamped() {
        let nodes: Vec<StructureNode> = (1..=5).map(|i| named(i, "x")).collect();
        let query = ListQuery { page: 9, page_size: 2, ..Default::default() };
        let page = apply_query(&nodes, &query);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_count, 3);
        assert_eq!(ids(&page), vec![5]);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = apply_query::<StructureNode>(&[], &ListQuery::default());
        assert_eq!(page.page_count, 1);
        assert_eq!(page.page, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_sort_by_revenue() {
        let earning = |id, revenue| StructureNode {
            aggregate: Aggregate { computed_revenue: revenue, ..Default::default() },
            ..make_node(id, None)
        };
        let nodes = vec![earning(1, dec!(10.5)), earning(2, dec!(3)), earning(3, dec!(10.25))];
        let mut query = ListQuery::default();
        query.sort_by(NodeSortKey::Revenue);
        assert_eq!(ids(&apply_query(&nodes, &query)), vec![2, 3, 1]);
    }
}
