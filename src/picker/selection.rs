//! The single persistent selection.
//!
//! Only [`SelectionTracker::select`], [`SelectionTracker::clear`] and
//! [`SelectionTracker::seed`] may change which item is selected. Reconciliation
//! refreshes the stored value in place and can never evict the selection: an item
//! that scrolled out of, or never entered, the loaded window stays selected.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{ItemId, PickItem};

/// Identity and last known value of the selected item
#[derive(Clone, Debug, Default)]
pub struct Selection {
    /// Identity of the selected item
    pub id: Option<ItemId>,
    /// Last known value; may be missing when seeded from an id alone
    pub value: Option<Arc<dyn PickItem>>,
}

impl Selection {
    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }

    /// Text of the last known value
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.value.as_ref().map(|item| item.text())
    }
}

/// Keeps the [`Selection`] in sync with freshly loaded pages
#[derive(Debug, Default)]
pub struct SelectionTracker {
    selection: Selection,
}

impl SelectionTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Identity of the selected item
    pub fn id(&self) -> Option<&ItemId> {
        self.selection.id.as_ref()
    }

    /// Installs an externally supplied initial selection.
    ///
    /// `value`, when given, wins over `id`. With an id alone, the value is filled
    /// in by reconciliation once the item shows up in a page.
    pub fn seed(&mut self, id: Option<ItemId>, value: Option<Arc<dyn PickItem>>) {
        self.selection = match (id, value) {
            (_, Some(item)) => Selection {
                id: Some(item.id()),
                value: Some(item),
            },
            (id, None) => Selection { id, value: None },
        };
    }

    /// Selects `item`; returns whether the selection changed
    pub fn select(&mut self, item: Arc<dyn PickItem>) -> bool {
        let id = item.id();
        let changed = self.selection.id.as_ref() != Some(&id)
            || !matches!(&self.selection.value, Some(value) if Arc::ptr_eq(value, &item));
        debug!("selecting {id}");
        self.selection = Selection {
            id: Some(id),
            value: Some(item),
        };
        changed
    }

    /// Clears the selection; returns whether something was selected
    pub fn clear(&mut self) -> bool {
        let changed = !self.selection.is_empty();
        self.selection = Selection::default();
        changed
    }

    /// Refreshes the selected value from `items`; returns whether it changed.
    ///
    /// Leaves the selection untouched when the selected id is not among `items`.
    pub fn reconcile(&mut self, items: &[Arc<dyn PickItem>]) -> bool {
        let Some(id) = &self.selection.id else {
            return false;
        };
        let Some(fresh) = items.iter().find(|item| &item.id() == id) else {
            return false;
        };
        if matches!(&self.selection.value, Some(value) if Arc::ptr_eq(value, fresh)) {
            return false;
        }
        trace!("refreshing selected value for {id}");
        self.selection.value = Some(fresh.clone());
        true
    }
}
