//! Ready-made sources and readers: an in-memory [`PageSource`](crate::PageSource)
//! and a reader turning JSON into [`Record`](crate::Record)s.

pub mod memory_source;
pub mod record_reader;
