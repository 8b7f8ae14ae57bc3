//! Configuration options for a picklist session.
//!
//! `PicklistOptions` carries both the picker tuning (debounce, page size, scroll
//! threshold, frame rate) and the knobs of the `picklist` command line tool.

use std::sync::Arc;

use derive_builder::Builder;

use crate::{CaseMatching, PickItem};

/// picklist - paginated search-and-pick over a record collection
///
/// Loads pages of records matching a debounced query, appends more pages as the
/// list is scrolled, and tracks a single selection across query changes.
/// Commands are read from a script (or -c) in RON (`SetQuery("ann")`) or in the
/// short form (`set-query:ann`).
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(name = "final_build"))]
#[builder(default)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "picklist", args_override_self = true, verbatim_doc_comment, version, about)
)]
pub struct PicklistOptions {
    //  --- Search ---
    /// Initial committed query
    #[cfg_attr(feature = "cli", arg(short, long, default_value = "", help_heading = "Search"))]
    pub query: String,

    /// Quiet period after the last keystroke before the query is committed, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "300", help_heading = "Search"))]
    pub debounce: u64,

    /// Case sensitivity of the built-in record filter
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "smart", value_enum, help_heading = "Search")
    )]
    pub case: CaseMatching,

    /// Ignore accents and other combining marks when filtering records
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Search"))]
    pub normalize: bool,

    //  --- Paging ---
    /// Number of items per page
    #[cfg_attr(feature = "cli", arg(long, default_value = "20", help_heading = "Paging"))]
    pub page_size: usize,

    /// Load the next page when scrolled closer than this to the end of the list
    #[cfg_attr(feature = "cli", arg(long, default_value = "150", help_heading = "Paging"))]
    pub scroll_threshold: u32,

    /// Interval between two scroll samples, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "16", help_heading = "Paging"))]
    pub frame_interval: u64,

    /// Simulated latency of each page request, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "0", help_heading = "Paging"))]
    pub latency: u64,

    //  --- Input ---
    /// Read records from this file (JSON lines or a JSON array) instead of stdin
    #[cfg_attr(feature = "cli", arg(short, long, help_heading = "Input"))]
    pub source: Option<String>,

    /// Read commands from this file, one per line
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Input"))]
    pub script: Option<String>,

    /// Run this command; can be repeated and runs after the script
    #[cfg_attr(feature = "cli", arg(short = 'c', long = "command", help_heading = "Input"))]
    pub command: Vec<String>,

    /// Id of the initially selected item
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Input"))]
    pub select: Option<String>,

    //  --- Output ---
    /// Print the query as the first line
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Output"))]
    pub print_query: bool,

    /// Print output delimited by NUL characters
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Output"))]
    pub print0: bool,

    /// Print session events to stderr
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Output"))]
    pub print_events: bool,

    /// Initially selected item; takes precedence over `select`
    #[cfg_attr(feature = "cli", clap(skip))]
    pub initial_selection: Option<Arc<dyn PickItem>>,
}

impl Default for PicklistOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            debounce: 300,
            case: CaseMatching::default(),
            normalize: false,
            page_size: 20,
            scroll_threshold: 150,
            frame_interval: 16,
            latency: 0,
            source: None,
            script: None,
            command: Vec::new(),
            select: None,
            print_query: false,
            print0: false,
            print_events: false,
            initial_selection: None,
        }
    }
}

impl PicklistOptionsBuilder {
    /// Builds the PicklistOptions from the builder
    pub fn build(&mut self) -> Result<PicklistOptions, PicklistOptionsBuilderError> {
        self.final_build().map(|opts| opts.build())
    }
}

impl PicklistOptions {
    /// Finalizes the options
    pub fn build(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.frame_interval = self.frame_interval.max(1);
        self
    }
}
