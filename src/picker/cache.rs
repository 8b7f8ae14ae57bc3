//! Identity-deduplicated, append-only collection of loaded items.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::source::Page;
use crate::{ItemId, PickItem};

/// Items loaded so far for the committed filter, in page order.
///
/// The store is keyed by [`ItemId`]: insertion order is page order, and an id can
/// only ever be present once.
#[derive(Debug)]
pub struct CollectionCache {
    query: String,
    items: IndexMap<ItemId, Arc<dyn PickItem>>,
    pages_loaded: usize,
    page_size: usize,
    total_count: Option<usize>,
}

impl CollectionCache {
    /// Creates an empty cache
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            items: IndexMap::new(),
            pages_loaded: 0,
            page_size: page_size.max(1),
            total_count: None,
        }
    }

    /// Empties the cache and rekeys it to `query`
    pub fn reset(&mut self, query: &str) {
        debug!("cache reset for {query:?} ({} items dropped)", self.items.len());
        self.query = query.to_owned();
        self.items.clear();
        self.pages_loaded = 0;
        self.total_count = None;
    }

    /// Merges a page into the cache and returns how many items were added.
    ///
    /// Page 1 replaces the contents. Later pages append the items whose id is not
    /// present yet, in page order; the others are dropped.
    pub fn merge(&mut self, page: &Page) -> usize {
        if page.page_number <= 1 {
            self.items.clear();
        }
        let before = self.items.len();
        for item in &page.items {
            self.items.entry(item.id()).or_insert_with(|| item.clone());
        }
        let added = self.items.len() - before;
        if added < page.items.len() {
            trace!(
                "page {} of {:?}: dropped {} duplicate items",
                page.page_number,
                page.query,
                page.items.len() - added
            );
        }

        self.pages_loaded = page.page_number.max(1);
        self.page_size = page.page_size.max(1);
        self.total_count = Some(page.total_count);
        added
    }

    /// Whether the server holds more items than the pages loaded so far.
    ///
    /// Unknown (and therefore true) until the first page of the filter is merged.
    pub fn has_more(&self) -> bool {
        match self.total_count {
            None => true,
            Some(total) => self.pages_loaded * self.page_size < total,
        }
    }

    /// The filter this cache holds items for
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item is loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages merged since the last reset
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Total reported by the latest page, if any
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&Arc<dyn PickItem>> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    /// Item with the given id
    pub fn get_by_id(&self, id: &ItemId) -> Option<&Arc<dyn PickItem>> {
        self.items.get(id)
    }

    /// Position of the item with the given id
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.get_index_of(id)
    }

    /// Iterates over the items in order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PickItem>> {
        self.items.values()
    }

    /// Ids in order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.keys().cloned().collect()
    }

    /// Clones the items out
    pub fn items(&self) -> Vec<Arc<dyn PickItem>> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    fn page(number: usize, ids: &[u64], total: usize) -> Page {
        Page {
            items: ids
                .iter()
                .map(|id| Arc::new(Record::new(*id, format!("item {id}"))) as Arc<dyn PickItem>)
                .collect(),
            page_number: number,
            total_count: total,
            page_size: 3,
            query: String::from("q"),
        }
    }

    fn ids(cache: &CollectionCache) -> Vec<String> {
        cache.ids().iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn later_pages_append_without_duplicates() {
        let mut cache = CollectionCache::new(3);
        assert_eq!(cache.merge(&page(1, &[1, 2, 3], 9)), 3);
        assert_eq!(cache.merge(&page(2, &[3, 4, 5], 9)), 2);
        assert_eq!(cache.merge(&page(3, &[1, 6, 5], 9)), 1);
        assert_eq!(ids(&cache), vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(cache.pages_loaded(), 3);
        assert!(!cache.has_more());
    }

    #[test]
    fn first_page_replaces_contents() {
        let mut cache = CollectionCache::new(3);
        cache.merge(&page(1, &[1, 2, 3], 9));
        cache.merge(&page(2, &[4, 5, 6], 9));
        cache.merge(&page(1, &[7, 7, 8], 2));
        assert_eq!(ids(&cache), vec!["7", "8"]);
        assert!(!cache.has_more());
    }

    #[test]
    fn duplicate_keeps_first_loaded_value() {
        let mut cache = CollectionCache::new(3);
        cache.merge(&page(1, &[1], 9));
        let mut second = page(2, &[], 9);
        second.items.push(Arc::new(Record::new(1u64, "renamed")));
        cache.merge(&second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0).unwrap().text(), "item 1");
    }

    #[test]
    fn has_more_from_total() {
        let mut cache = CollectionCache::new(3);
        assert!(cache.has_more());
        cache.merge(&page(1, &[1, 2, 3], 4));
        assert!(cache.has_more());
        cache.merge(&page(2, &[4], 4));
        assert!(!cache.has_more());
        cache.reset("other");
        assert!(cache.has_more());
        assert!(cache.is_empty());
        assert_eq!(cache.query(), "other");
    }

    #[test]
    fn lookup_by_id_and_position() {
        let mut cache = CollectionCache::new(3);
        cache.merge(&page(1, &[10, 20, 30], 3));
        let id = ItemId::from(20u64);
        assert_eq!(cache.position(&id), Some(1));
        assert_eq!(cache.get_by_id(&id).unwrap().text(), "item 20");
        assert!(cache.get_by_id(&ItemId::from("missing")).is_none());
    }
}
