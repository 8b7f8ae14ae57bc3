//! The paginated selection state machine.
//!
//! [`Picker`] owns the query controller, the fetcher, the cache, the selection and
//! the scroll sentinel, and maps every stimulus of a session to one operation on
//! them. It is driven by a single task (see [`crate::Picklist`]); nothing else
//! mutates its state, fetch tasks included.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::options::PicklistOptions;
use crate::output::PicklistOutput;
use crate::source::{FetchError, PageSource};
use crate::{ItemId, PickItem};

pub mod cache;
pub mod event;
pub mod fetcher;
pub mod query;
pub mod selection;
pub mod sentinel;

pub use cache::CollectionCache;
pub use event::{Command, CommandParseError, Event, LoadingState, parse_command};
pub use fetcher::{FetchCursor, FetchOutcome, PageFetcher, Resolution};
pub use query::{Filter, QueryController};
pub use selection::{Selection, SelectionTracker};
pub use sentinel::ScrollSentinel;

/// Picker state for one session
#[derive(Debug)]
pub struct Picker {
    query: QueryController,
    fetcher: PageFetcher,
    cache: CollectionCache,
    selection: SelectionTracker,
    sentinel: ScrollSentinel,
    last_error: Option<FetchError>,
    loading: LoadingState,
    event_tx: UnboundedSender<Event>,
    hold_until: Option<Instant>,
    settling: bool,
    /// Set once the session should end
    pub should_quit: bool,
    /// Whether the session ended without accepting
    pub is_abort: bool,
}

impl Picker {
    /// Creates a picker and the receiving end of its fetch completions
    pub fn from_options(
        options: &PicklistOptions,
        source: Arc<dyn PageSource>,
        event_tx: UnboundedSender<Event>,
    ) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (fetcher, fetch_rx) = PageFetcher::new(source, options.page_size);
        let mut query = QueryController::new(Duration::from_millis(options.debounce));
        query.activate(&options.query);
        let mut selection = SelectionTracker::new();
        selection.seed(
            options.select.as_deref().map(ItemId::from),
            options.initial_selection.clone(),
        );
        let picker = Self {
            query,
            fetcher,
            cache: CollectionCache::new(options.page_size),
            selection,
            sentinel: ScrollSentinel::new(options.scroll_threshold),
            last_error: None,
            loading: LoadingState::default(),
            event_tx,
            hold_until: None,
            settling: false,
            should_quit: false,
            is_abort: false,
        };
        (picker, fetch_rx)
    }

    /// Loads page 1 of the initial filter.
    ///
    /// Must be called once, from within the tokio runtime that drives the session.
    pub fn activate(&mut self) {
        let query = self.query.committed().to_owned();
        debug!("activating picker with query {query:?}");
        self.cache.reset(&query);
        self.emit(Event::QueryCommitted(query.clone()));
        if !self.selection.selection().is_empty() {
            self.emit(Event::SelectionChanged(self.selection.selection().clone()));
        }
        self.fetcher.restart(&query);
        self.emit_loading_state();
    }

    /// Runs one command
    pub fn handle_command(&mut self, command: Command, now: Instant) {
        debug!("handle_command: {command:?}");
        match command {
            Command::SetQuery(text) => self.query.set_raw_input(text, now),
            Command::CommitQuery => {
                if let Some(text) = self.query.flush() {
                    self.commit(text);
                }
            }
            Command::Scroll(distance) => self.sentinel.record(distance),
            Command::Select(id) => match self.cache.get_by_id(&id).cloned() {
                Some(item) => self.select(item),
                None => warn!("cannot select {id}: not loaded"),
            },
            Command::SelectRow(row) => match self.cache.get(row).cloned() {
                Some(item) => self.select(item),
                None => warn!("cannot select row {row}: only {} items loaded", self.cache.len()),
            },
            Command::Clear => self.clear_selection(),
            Command::Refresh => {
                self.refresh();
            }
            Command::Wait(ms) => self.hold_until = Some(now + Duration::from_millis(ms)),
            Command::Settle => self.settling = true,
            Command::Accept => {
                self.should_quit = true;
                self.is_abort = false;
            }
            Command::Abort => self.abort(),
        }
    }

    /// Ends the session without accepting
    pub fn abort(&mut self) {
        self.should_quit = true;
        self.is_abort = true;
    }

    /// Applies a fetch completion.
    ///
    /// The selection is reconciled against the page as delivered, so a later page
    /// repeating an already loaded id refreshes the selected value while the list
    /// keeps its first occurrence.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        match self.fetcher.resolve(outcome) {
            Resolution::Stale => return,
            Resolution::Loaded(page) => {
                self.last_error = None;
                self.cache.merge(&page);
                self.emit(Event::ItemsChanged { len: self.cache.len() });
                if self.selection.reconcile(&page.items) {
                    self.emit(Event::SelectionChanged(self.selection.selection().clone()));
                }
            }
            Resolution::Failed(err) => {
                self.emit(Event::FetchFailed(err.to_string()));
                self.last_error = Some(err);
            }
        }
        self.emit_loading_state();
    }

    /// Commits the raw input if its quiet period is over
    pub fn on_debounce(&mut self, now: Instant) {
        if let Some(text) = self.query.poll(now) {
            self.commit(text);
        }
    }

    /// Evaluates the scroll sample gathered since the previous frame
    pub fn on_frame(&mut self) {
        if self.sentinel.sample(self.cache.has_more(), self.fetcher.in_flight()) {
            self.load_next_page();
        }
    }

    /// Makes `text` the committed filter: resets cursor and cache, then loads page 1.
    ///
    /// Does nothing when `text` is already committed.
    pub fn commit(&mut self, text: String) {
        if !self.query.commit(text.clone()) {
            return;
        }
        self.cache.reset(&text);
        self.last_error = None;
        self.emit(Event::QueryCommitted(text.clone()));
        self.emit(Event::ItemsChanged { len: 0 });
        self.fetcher.restart(&text);
        self.emit_loading_state();
    }

    /// Requests the next page of the committed filter.
    ///
    /// Returns false when nothing was requested: no more pages, or a request is
    /// already in flight.
    pub fn load_next_page(&mut self) -> bool {
        if !self.cache.has_more() || self.fetcher.in_flight() {
            return false;
        }
        let next_page = self.fetcher.cursor().next_page;
        let query = self.query.committed().to_owned();
        let issued = self.fetcher.request_page(&query, next_page).is_some();
        self.emit_loading_state();
        issued
    }

    /// Retries after a failure, or fetches more without a scroll
    pub fn refresh(&mut self) -> bool {
        if self.last_error.is_some() {
            debug!("retrying page {} after {:?}", self.fetcher.cursor().next_page, self.last_error);
        }
        self.load_next_page()
    }

    /// Selects `item`, loaded or not
    pub fn select(&mut self, item: Arc<dyn PickItem>) {
        if self.selection.select(item) {
            self.emit(Event::SelectionChanged(self.selection.selection().clone()));
        }
    }

    /// Drops the selection
    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.emit(Event::SelectionChanged(self.selection.selection().clone()));
        }
    }

    /// Whether queued commands may run now.
    ///
    /// Clears an elapsed `Wait` and a satisfied `Settle` on the way.
    pub fn ready_for_commands(&mut self, now: Instant) -> bool {
        if self.hold_until.is_some_and(|until| until <= now) {
            self.hold_until = None;
        }
        if self.settling && self.is_idle() {
            self.settling = false;
        }
        self.hold_until.is_none() && !self.settling
    }

    /// When a `Wait` ends, if one is running
    pub fn hold_deadline(&self) -> Option<Instant> {
        self.hold_until
    }

    /// When the pending raw input gets committed, if any
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    /// Whether no commit, fetch or scroll sample is pending
    pub fn is_idle(&self) -> bool {
        !self.query.is_pending() && !self.fetcher.in_flight() && !self.sentinel.has_pending()
    }

    /// Abandons outstanding requests
    pub fn shutdown(&self) {
        self.fetcher.shutdown();
    }

    /// The current filter
    pub fn filter(&self) -> &Filter {
        self.query.filter()
    }

    /// The current cursor
    pub fn cursor(&self) -> FetchCursor {
        self.fetcher.cursor()
    }

    /// The loaded items
    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    /// The current selection
    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    /// The last reported loading state
    pub fn loading_state(&self) -> &LoadingState {
        &self.loading
    }

    /// The session result as of now
    pub fn output(&self) -> PicklistOutput {
        PicklistOutput {
            query: self.query.filter().raw.clone(),
            committed_query: self.query.committed().to_owned(),
            selection: self.selection.selection().clone(),
            items: self.cache.items(),
            total_count: self.cache.total_count(),
            is_abort: self.is_abort,
        }
    }

    fn emit_loading_state(&mut self) {
        let state = LoadingState {
            in_flight: self.fetcher.in_flight(),
            has_more: self.cache.has_more(),
            error: self.last_error.as_ref().map(ToString::to_string),
        };
        if state != self.loading {
            self.loading = state.clone();
            self.emit(Event::LoadingStateChanged(state));
        }
    }

    fn emit(&self, event: Event) {
        trace!("emitting {event:?}");
        // nobody listening is fine
        _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use crate::options::PicklistOptionsBuilder;
    use crate::source::PageResponse;
    use futures::FutureExt;
    use tokio::sync::mpsc::unbounded_channel;

    fn source() -> Arc<dyn PageSource> {
        Arc::new(|query: &str, page: usize, size: usize| {
            let items: Vec<Arc<dyn PickItem>> = (0..size)
                .map(|i| {
                    let n = (page - 1) * size + i;
                    Arc::new(Record::new(n as u64, format!("{query}{n}"))) as Arc<dyn PickItem>
                })
                .collect();
            async move { Ok::<_, FetchError>(PageResponse::new(items, 10)) }.boxed()
        })
    }

    #[tokio::test]
    async fn activation_loads_first_page() {
        let options = PicklistOptionsBuilder::default().page_size(4).build().unwrap();
        let (tx, mut events) = unbounded_channel();
        let (mut picker, mut fetch_rx) = Picker::from_options(&options, source(), tx);
        picker.activate();
        assert!(matches!(events.recv().await, Some(Event::QueryCommitted(q)) if q.is_empty()));
        assert!(picker.loading_state().in_flight);

        picker.handle_outcome(fetch_rx.recv().await.unwrap());
        assert_eq!(picker.cache().len(), 4);
        assert_eq!(picker.cursor().next_page, 2);
        assert_eq!(
            picker.loading_state(),
            &LoadingState {
                in_flight: false,
                has_more: true,
                error: None
            }
        );
    }

    #[tokio::test]
    async fn scroll_fires_once_per_frame() {
        let options = PicklistOptionsBuilder::default().page_size(4).build().unwrap();
        let (tx, _events) = unbounded_channel();
        let (mut picker, mut fetch_rx) = Picker::from_options(&options, source(), tx);
        picker.activate();
        picker.handle_outcome(fetch_rx.recv().await.unwrap());

        let now = Instant::now();
        for distance in [10, 5, 0] {
            picker.handle_command(Command::Scroll(distance), now);
        }
        picker.on_frame();
        picker.on_frame();
        let outcome = fetch_rx.recv().await.unwrap();
        assert_eq!(outcome.page_number, 2);
        picker.handle_outcome(outcome);
        assert!(fetch_rx.try_recv().is_err());
        assert_eq!(picker.cache().len(), 8);
        assert_eq!(picker.cursor().next_page, 3);
    }

    #[tokio::test]
    async fn accept_and_abort() {
        let options = PicklistOptions::default();
        let (tx, _events) = unbounded_channel();
        let (mut picker, _fetch_rx) = Picker::from_options(&options, source(), tx);
        picker.handle_command(Command::Accept, Instant::now());
        assert!(picker.should_quit && !picker.is_abort);
        picker.handle_command(Command::Abort, Instant::now());
        assert!(picker.is_abort);
    }

    #[tokio::test]
    async fn wait_holds_commands() {
        let options = PicklistOptions::default();
        let (tx, _events) = unbounded_channel();
        let (mut picker, _fetch_rx) = Picker::from_options(&options, source(), tx);
        let now = Instant::now();
        assert!(picker.ready_for_commands(now));
        picker.handle_command(Command::Wait(100), now);
        assert!(!picker.ready_for_commands(now + Duration::from_millis(99)));
        assert!(picker.ready_for_commands(now + Duration::from_millis(100)));
        assert!(picker.hold_deadline().is_none());
    }
}
