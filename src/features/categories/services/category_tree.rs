use std::collections::{HashMap, HashSet, VecDeque};

use crate::features::categories::models::Category;

/// In-memory view of the category hierarchy.
///
/// The categories table is small and read far more often than written, so
/// subtree and cycle questions are answered over one loaded snapshot instead
/// of one query per level.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    /// Categories in load order (`display_order, name`)
    categories: Vec<Category>,
    index: HashMap<i64, usize>,
    children: HashMap<i64, Vec<i64>>,
}

impl CategoryTree {
    pub fn new(categories: Vec<Category>) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for c in &categories {
            if let Some(parent_id) = c.parent_id {
                children.entry(parent_id).or_default().push(c.id);
            }
        }

        Self {
            categories,
            index,
            children,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.index.get(&id).map(|&i| &self.categories[i])
    }

    /// Active categories in load order
    pub fn active(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_active)
    }

    /// Resolve a slug or numeric id to an active category.
    ///
    /// The slug is tried first; the numeric id is only a fallback.
    pub fn find(&self, reference: &str) -> Option<&Category> {
        let reference = reference.trim();
        self.active()
            .find(|c| c.slug == reference)
            .or_else(|| {
                reference
                    .parse::<i64>()
                    .ok()
                    .and_then(|id| self.get(id))
                    .filter(|c| c.is_active)
            })
    }

    /// Id of `root` followed by the ids of all active descendants, at any depth.
    ///
    /// Descent stops below an inactive category. Already visited ids are never
    /// expanded again, so corrupt cyclic data cannot loop.
    pub fn subtree_ids(&self, root: i64) -> Vec<i64> {
        let mut ids = vec![root];
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            let Some(kids) = self.children.get(&current) else {
                continue;
            };
            for &kid in kids {
                let active = self.get(kid).is_some_and(|c| c.is_active);
                if active && visited.insert(kid) {
                    ids.push(kid);
                    queue.push_back(kid);
                }
            }
        }

        ids
    }

    /// Whether making `new_parent` the parent of `category_id` would close a loop.
    ///
    /// True when `new_parent` is the category itself or one of its descendants
    /// (active or not).
    pub fn would_create_cycle(&self, category_id: i64, new_parent: i64) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = Some(new_parent);

        while let Some(id) = cursor {
            if id == category_id {
                return true;
            }
            if !seen.insert(id) {
                // existing data already loops above us; refuse to extend it
                return true;
            }
            cursor = self.get(id).and_then(|c| c.parent_id);
        }

        false
    }

    /// Active categories with the number of listings in their whole subtree.
    ///
    /// `direct_counts` maps a category id to the listings attached to it
    /// directly. Sorted by count descending; ties keep load order.
    pub fn subtree_counts(&self, direct_counts: &HashMap<i64, i64>) -> Vec<(&Category, i64)> {
        let mut counted: Vec<(&Category, i64)> = self
            .active()
            .map(|c| {
                let total = self
                    .subtree_ids(c.id)
                    .iter()
                    .filter_map(|id| direct_counts.get(id))
                    .sum();
                (c, total)
            })
            .collect();

        counted.sort_by(|a, b| b.1.cmp(&a.1));
        counted
    }
}
