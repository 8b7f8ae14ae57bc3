//! Raw vs. committed filter text and the keystroke debounce.

use std::time::Duration;

use tokio::time::Instant;

/// The two views of the search text
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    /// Unprocessed keystrokes, echoed immediately
    pub raw: String,
    /// Debounced, settled text that drives the queries
    pub committed: String,
}

/// Debounces raw input into committed filters.
///
/// Every call to [`QueryController::set_raw_input`] restarts the quiet period, so at
/// most one commit is produced per interval of silence. The controller only decides
/// *what* to commit and *when*; resetting the cursor and the cache on a commit is
/// done by the picker.
#[derive(Debug)]
pub struct QueryController {
    filter: Filter,
    delay: Duration,
    deadline: Option<Instant>,
}

impl QueryController {
    /// Creates a controller with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            filter: Filter::default(),
            delay,
            deadline: None,
        }
    }

    /// Sets both raw and committed text, dropping any pending commit
    pub fn activate(&mut self, query: &str) {
        self.filter.raw = query.to_owned();
        self.filter.committed = query.to_owned();
        self.deadline = None;
    }

    /// The current filter
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The text currently driving the queries
    pub fn committed(&self) -> &str {
        &self.filter.committed
    }

    /// Updates the raw text and (re)starts the quiet period
    pub fn set_raw_input(&mut self, text: impl Into<String>, now: Instant) {
        self.filter.raw = text.into();
        self.deadline = Some(now + self.delay);
        trace!("raw input {:?}, commit due at {:?}", self.filter.raw, self.deadline);
    }

    /// When the pending commit is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a commit is scheduled
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the text to commit once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(self.filter.raw.clone())
            }
            _ => None,
        }
    }

    /// Returns the pending text right away, skipping the rest of the quiet period
    pub fn flush(&mut self) -> Option<String> {
        self.deadline.take().map(|_| self.filter.raw.clone())
    }

    /// Records `text` as the committed filter.
    ///
    /// Returns false, and changes nothing, when `text` is already committed.
    pub fn commit(&mut self, text: String) -> bool {
        if text == self.filter.committed {
            debug!("query {text:?} already committed, skipping");
            return false;
        }
        debug!("committing query {text:?}");
        self.filter.committed = text;
        true
    }
}
