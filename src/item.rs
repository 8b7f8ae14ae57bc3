//! Items handled by the picker and their identity.
//!
//! Identity ([`ItemId`]) is the only key used for deduplication and selection
//! reconciliation. Every other attribute of an item may change between two loads
//! of the "same" item, e.g. when the server enriches records.

use std::borrow::Cow;
use std::fmt::{Debug, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::AsAny;

//------------------------------------------------------------------------------
/// Opaque, stable identity of an item.
///
/// Server-side identities may be numeric or textual, both are stored as text so
/// that `1` and `"1"` designate the same item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Returns the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

//------------------------------------------------------------------------------
/// A `PickItem` is what the picker loads, caches, selects and hands back.
///
/// # Downcast Example
/// The picker returns items as `Arc<dyn PickItem>`. Use [`AsAny`] to get back to
/// the concrete type:
///
/// ```rust
/// use picklist::prelude::*;
///
/// let item: Arc<dyn PickItem> = Arc::new(Record::new(7u64, "Ann Lee"));
/// let record: &Record = (*item).as_any().downcast_ref::<Record>().expect("not a record");
/// assert_eq!(record.text, "Ann Lee");
/// ```
pub trait PickItem: AsAny + Send + Sync + 'static {
    /// The identity of the item, used for deduplication and selection tracking
    fn id(&self) -> ItemId;

    /// The text shown for this item in a list
    fn text(&self) -> Cow<'_, str>;

    /// Get output text (after accept), default to `text()`
    fn output(&self) -> Cow<'_, str> {
        self.text()
    }
}

impl Display for dyn PickItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

impl Debug for dyn PickItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("PickItem {{ id: {}, text: {} }}", self.id(), self.text()))
    }
}

//------------------------------------------------------------------------------
/// A generic directory record: an identity, a display text and arbitrary fields.
///
/// Deserializes from JSON objects such as `{"id": 2, "name": "Ann Lee", "role": "staff"}`:
/// `name` (or `text`) becomes the display text and all other keys are kept, in
/// order, in `fields`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity
    pub id: ItemId,
    /// Display text
    #[serde(default, alias = "name")]
    pub text: String,
    /// Remaining business attributes
    #[serde(flatten)]
    pub fields: IndexMap<String, serde_json::Value>,
}

impl Record {
    /// Creates a record without extra fields
    pub fn new(id: impl Into<ItemId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds (or replaces) a field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field's value, if present
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

impl PickItem for Record {
    fn id(&self) -> ItemId {
        self.id.clone()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}
