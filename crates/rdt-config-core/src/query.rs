//! Keyword search and paging over a forest.

use crate::{ConfigNode, Forest, TreeError};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive match against name or description.
    pub keyword: Option<String>,
    /// 1-based; 0 is read as 1.
    pub page: usize,
    /// 0 is read as [`DEFAULT_PAGE_SIZE`].
    pub size: usize,
}

impl ListQuery {
    fn page(&self) -> usize {
        self.page.max(1)
    }

    fn size(&self) -> usize {
        if self.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.size
        }
    }

    fn needle(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

/// A subsystem flattened out of its system, with the owner's name attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsystemRow {
    #[serde(flatten)]
    pub node: ConfigNode,
    pub parent_name: String,
}

fn matches(node: &ConfigNode, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    node.name.to_lowercase().contains(needle)
        || node
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

fn paginate<T>(items: Vec<T>, query: &ListQuery) -> Page<T> {
    let (page, size) = (query.page(), query.size());
    let total = items.len();
    let records = items
        .into_iter()
        .skip((page - 1).saturating_mul(size))
        .take(size)
        .collect();
    Page {
        records,
        total,
        page,
        size,
    }
}

/// Systems (with their subsystems) in forest order.
pub fn list_systems(forest: &Forest, query: &ListQuery) -> Page<ConfigNode> {
    let needle = query.needle();
    let hits = forest
        .systems()
        .iter()
        .filter(|sys| matches(sys, needle.as_deref()))
        .cloned()
        .collect();
    paginate(hits, query)
}

/// Subsystems across the forest, or only those of `system_id`.
pub fn list_subsystems(
    forest: &Forest,
    system_id: Option<&str>,
    query: &ListQuery,
) -> Result<Page<SubsystemRow>, TreeError> {
    if let Some(id) = system_id {
        if forest.system(id).is_none() {
            return Err(TreeError::system_not_found(id));
        }
    }
    let needle = query.needle();
    let hits = forest
        .subsystems()
        .filter(|(sys, _)| system_id.map_or(true, |id| sys.id == id))
        .filter(|(_, sub)| matches(sub, needle.as_deref()))
        .map(|(sys, sub)| SubsystemRow {
            node: sub.clone(),
            parent_name: sys.name.clone(),
        })
        .collect();
    Ok(paginate(hits, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_forest;

    fn ids<T>(page: &Page<T>, id: impl Fn(&T) -> &str) -> Vec<String> {
        page.records.iter().map(|r| id(r).to_string()).collect()
    }

    #[test]
    fn keyword_matches_name_or_description_ignoring_case() {
        let forest = demo_forest();
        let q = ListQuery {
            keyword: Some("SETTLEMENT".into()),
            ..Default::default()
        };
        let page = list_systems(&forest, &q);
        assert_eq!(ids(&page, |n| n.id.as_str()), vec!["sys-2"]);

        let subs = list_subsystems(&forest, None, &q).unwrap();
        assert_eq!(ids(&subs, |r| r.node.id.as_str()), vec!["sub-1-3"]);
        assert_eq!(subs.records[0].parent_name, "Accounting System");
    }

    #[test]
    fn pages_slice_in_forest_order() {
        let forest = demo_forest();
        let q = ListQuery {
            keyword: None,
            page: 2,
            size: 3,
        };
        let page = list_subsystems(&forest, None, &q).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(ids(&page, |r| r.node.id.as_str()), vec!["sub-2-1"]);

        let past_end = ListQuery { page: 9, ..q };
        assert!(list_subsystems(&forest, None, &past_end)
            .unwrap()
            .records
            .is_empty());
    }

    #[test]
    fn zero_page_and_size_use_defaults() {
        let page = list_systems(&demo_forest(), &ListQuery::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 3);
        assert_eq!(page.records[0].children.len(), 3);
    }

    #[test]
    fn scoped_listing_requires_known_system() {
        let forest = demo_forest();
        let q = ListQuery::default();
        let page = list_subsystems(&forest, Some("sys-1"), &q).unwrap();
        assert_eq!(page.total, 3);
        assert!(matches!(
            list_subsystems(&forest, Some("sys-404"), &q),
            Err(TreeError::NotFound { .. })
        ));
    }

    #[test]
    fn row_flattens_node_fields() {
        let forest = demo_forest();
        let page = list_subsystems(&forest, Some("sys-2"), &ListQuery::default()).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["records"][0]["id"], "sub-2-1");
        assert_eq!(json["records"][0]["parentName"], "Global Clearing");
        assert_eq!(json["records"][0]["parentId"], "sys-2");
    }
}
