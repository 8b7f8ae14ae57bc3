//! Convenience re-exports of commonly used types.
//!
//! This module provides a convenient way to import all the commonly used
//! picklist types and traits with a single `use picklist::prelude::*;` statement.

pub use crate::helper::memory_source::MemorySource;
pub use crate::helper::record_reader::{RecordError, RecordReader};
pub use crate::options::{PicklistOptions, PicklistOptionsBuilder};
pub use crate::output::PicklistOutput;
pub use crate::picker::{Command, Event, LoadingState, Selection};
pub use crate::*;
pub use futures::FutureExt;
pub use futures::future::BoxFuture;
pub use std::borrow::Cow;
pub use std::sync::Arc;
