//! Picklist is an incremental, paginated selection cache for "search and pick
//! one item" pickers over large server-side collections.
//!
//! It debounces the search input into committed queries, loads pages one at a
//! time while the list is scrolled, drops responses that a newer request made
//! obsolete, deduplicates items by identity, and keeps a single selection alive
//! across query changes, even when the selected item is not loaded.
//!
//! # Examples
//!
//! ```
//! use picklist::prelude::*;
//!
//! let records = "{\"id\": 1, \"name\": \"Ann Lee\"}\n{\"id\": 2, \"name\": \"Anna Berg\"}";
//! let items = RecordReader::default().items_of_bufread(records.as_bytes()).unwrap();
//! let options = PicklistOptionsBuilder::default().page_size(10).build().unwrap();
//!
//! let output = Picklist::run_with(
//!     options.clone(),
//!     Arc::new(MemorySource::from_options(&options, items)),
//!     [
//!         Command::SetQuery(String::from("anna")),
//!         Command::CommitQuery,
//!         Command::Settle,
//!         Command::SelectRow(0),
//!         Command::Accept,
//!     ],
//! )
//! .unwrap();
//! assert_eq!(output.selection.text().as_deref(), Some("Anna Berg"));
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

use std::any::Any;

pub use crate::item::{ItemId, PickItem, Record};
pub use crate::options::{PicklistOptions, PicklistOptionsBuilder};
pub use crate::output::PicklistOutput;
pub use crate::picker::{Command, Event, LoadingState, Picker, Selection, parse_command};
pub use crate::picklist::{Picklist, PicklistHandle};
pub use crate::source::{FetchError, Page, PageResponse, PageSource};

pub mod helper;
pub mod item;
pub mod options;
mod output;
pub mod picker;
mod picklist;
pub mod prelude;
pub mod source;
pub mod util;

//------------------------------------------------------------------------------
/// Trait for downcasting to concrete types from trait objects
pub trait AsAny {
    /// Returns a reference to the value as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Returns a mutable reference to the value as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//------------------------------------------------------------------------------
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", clap(rename_all = "snake_case"))]
/// Case sensitivity mode for filtering
pub enum CaseMatching {
    /// Case-sensitive matching
    Respect,
    /// Case-insensitive matching
    Ignore,
    /// Smart case: case-insensitive unless query contains uppercase
    #[default]
    Smart,
}
