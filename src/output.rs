use std::sync::Arc;

use crate::PickItem;
use crate::picker::Selection;

/// What a finished session hands back
#[derive(Clone, Debug)]
pub struct PicklistOutput {
    /// Raw input at the end of the session
    pub query: String,
    /// Filter the loaded items belong to
    pub committed_query: String,
    /// The selection, possibly an item that is not loaded
    pub selection: Selection,
    /// Items loaded for the committed filter, in order
    pub items: Vec<Arc<dyn PickItem>>,
    /// Total reported by the last loaded page
    pub total_count: Option<usize>,
    /// The session was aborted or cancelled instead of accepted
    pub is_abort: bool,
}

impl PicklistOutput {
    /// The selected item's value, if known
    pub fn selected(&self) -> Option<&Arc<dyn PickItem>> {
        self.selection.value.as_ref()
    }
}
