//! The session runtime: one task owning a [`Picker`] and multiplexing commands,
//! fetch completions, the debounce deadline and the frame clock onto it.

use std::collections::VecDeque;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, eyre};
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::picker::{Command, Event, FetchOutcome, Picker};
use crate::{PageSource, PicklistOptions, PicklistOutput};

/// Main entry point for running a picklist session
pub struct Picklist {}

impl Picklist {
    /// Starts a session on the current tokio runtime.
    ///
    /// The session loads page 1 of `options.query` right away and then runs the
    /// commands sent through the returned handle. It ends on `Accept` or `Abort`,
    /// on cancellation, or once the command channel is closed and every queued
    /// command has run and settled.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn spawn(options: PicklistOptions, source: Arc<dyn PageSource>) -> PicklistHandle {
        let (command_tx, command_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();
        let cancellation_token = CancellationToken::new();

        let (picker, fetch_rx) = Picker::from_options(&options, source, event_tx);
        let frame_interval = Duration::from_millis(options.frame_interval.max(1));
        let task = tokio::spawn(run_session(
            picker,
            fetch_rx,
            command_rx,
            frame_interval,
            cancellation_token.clone(),
        ));

        PicklistHandle {
            commands: Some(command_tx),
            events: event_rx,
            task,
            cancellation_token,
        }
    }

    /// Runs a whole session on a fresh runtime: feeds `commands`, then waits for
    /// the session to end.
    pub fn run_with(
        options: PicklistOptions,
        source: Arc<dyn PageSource>,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<PicklistOutput> {
        Self::run_with_events(options, source, commands, |event| debug!("event: {event:?}"))
    }

    /// Same as [`Picklist::run_with`], handing every event to `on_event`
    pub fn run_with_events(
        options: PicklistOptions,
        source: Arc<dyn PageSource>,
        commands: impl IntoIterator<Item = Command>,
        on_event: impl FnMut(Event),
    ) -> Result<PicklistOutput> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async move { drive(Self::spawn(options, source), commands, on_event).await })
    }
}

async fn drive(
    mut handle: PicklistHandle,
    commands: impl IntoIterator<Item = Command>,
    mut on_event: impl FnMut(Event),
) -> Result<PicklistOutput> {
    for command in commands {
        handle.send(command)?;
    }
    handle.close();

    loop {
        select! {
            Some(event) = handle.events.recv() => on_event(event),
            result = &mut handle.task => {
                while let Ok(event) = handle.events.try_recv() {
                    on_event(event);
                }
                return result?;
            }
        }
    }
}

/// Controls a running session
#[derive(Debug)]
pub struct PicklistHandle {
    commands: Option<UnboundedSender<Command>>,
    events: UnboundedReceiver<Event>,
    task: JoinHandle<Result<PicklistOutput>>,
    cancellation_token: CancellationToken,
}

impl PicklistHandle {
    /// Queues a command
    pub fn send(&self, command: Command) -> Result<()> {
        let commands = self
            .commands
            .as_ref()
            .ok_or_eyre("command channel already closed")?;
        commands
            .send(command)
            .map_err(|e| eyre!("session is over, could not send {:?}", e.0))
    }

    /// Closes the command channel; the session ends once the queued commands have settled
    pub fn close(&mut self) {
        self.commands = None;
    }

    /// Waits for the next event; `None` once the session is over and drained
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Returns an already emitted event, if any
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Ends the session as aborted
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Waits for the session to end and returns its outcome
    pub async fn join(self) -> Result<PicklistOutput> {
        self.task.await?
    }
}

async fn run_session(
    mut picker: Picker,
    mut fetch_rx: UnboundedReceiver<FetchOutcome>,
    mut commands: UnboundedReceiver<Command>,
    frame_interval: Duration,
    token: CancellationToken,
) -> Result<PicklistOutput> {
    picker.activate();

    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut queue = VecDeque::new();
    let mut commands_open = true;

    loop {
        let now = Instant::now();
        while picker.ready_for_commands(now) {
            let Some(command) = queue.pop_front() else {
                break;
            };
            picker.handle_command(command, now);
            if picker.should_quit {
                break;
            }
        }
        if picker.should_quit {
            break;
        }
        if !commands_open && queue.is_empty() && picker.is_idle() {
            debug!("command stream exhausted, ending session");
            break;
        }

        let debounce = picker.debounce_deadline();
        let hold = picker.hold_deadline();
        select! {
            _ = token.cancelled() => {
                debug!("session cancelled");
                picker.abort();
                break;
            }
            command = commands.recv(), if commands_open => match command {
                Some(command) => queue.push_back(command),
                None => {
                    trace!("command channel closed");
                    commands_open = false;
                }
            },
            Some(outcome) = fetch_rx.recv() => picker.handle_outcome(outcome),
            _ = wait_until(debounce) => picker.on_debounce(Instant::now()),
            _ = wait_until(hold) => {}
            _ = frames.tick() => picker.on_frame(),
        }
    }

    picker.shutdown();
    Ok(picker.output())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
