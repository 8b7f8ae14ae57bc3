//! Commands driving a picker session and events reported back to the UI layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ItemId;
use crate::picker::Selection;

/// The operations a UI (or a script) may invoke on a running session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Replace the raw input; the committed filter follows after the quiet period
    SetQuery(String),
    /// Commit the pending raw input now
    CommitQuery,
    /// A raw scroll sample: distance from the bottom of the loaded list
    Scroll(u32),
    /// Select the loaded item with this id
    Select(ItemId),
    /// Select the loaded item at this row
    SelectRow(usize),
    /// Drop the selection
    Clear,
    /// Ask for the next page again, e.g. after a failure
    Refresh,
    /// Hold the following commands for this many milliseconds
    Wait(u64),
    /// Hold the following commands until no commit, fetch or scroll sample is pending
    Settle,
    /// End the session, keeping the selection
    Accept,
    /// End the session, discarding the outcome
    Abort,
}

/// What the UI needs to render the loading indicator
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadingState {
    /// A page request is outstanding
    pub in_flight: bool,
    /// More pages exist for the committed filter
    pub has_more: bool,
    /// Message of the last failed request, cleared by the next success
    pub error: Option<String>,
}

/// Notifications emitted by a session
#[derive(Clone, Debug)]
pub enum Event {
    /// The selected identity or its value changed
    SelectionChanged(Selection),
    /// The loading indicator changed
    LoadingStateChanged(LoadingState),
    /// The loaded list was replaced or grew
    ItemsChanged {
        /// Number of loaded items
        len: usize,
    },
    /// A new filter is driving the queries
    QueryCommitted(String),
    /// A page request failed; the same page is asked again on the next trigger
    FetchFailed(String),
}

/// Error returned by [`parse_command`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    /// Neither RON nor a known short name
    #[error("unknown command `{0}`")]
    Unknown(String),
    /// The command needs an argument
    #[error("command `{0}` needs an argument")]
    MissingArgument(String),
    /// The argument does not have the expected type
    #[error("invalid argument `{arg}` for command `{command}`")]
    InvalidArgument {
        /// Command name
        command: String,
        /// Offending argument
        arg: String,
    },
}

/// Parses one command line.
///
/// Accepts the RON encoding of [`Command`] (`SetQuery("ann")`, `Scroll(20)`) as
/// well as the short `name:arg` form (`set-query:ann`, `scroll:20`, `accept`).
pub fn parse_command(line: &str) -> Result<Command, CommandParseError> {
    let line = line.trim();
    if let Ok(cmd) = ron::from_str::<Command>(line) {
        return Ok(cmd);
    }

    let (name, arg) = match line.split_once(':') {
        None => (line, None),
        Some((name, arg)) => (name, Some(arg)),
    };
    trace!("parse_command: name={name}, arg={arg:?}");

    let required = |arg: Option<&str>| -> Result<String, CommandParseError> {
        match arg {
            Some(a) if !a.is_empty() => Ok(a.to_owned()),
            _ => Err(CommandParseError::MissingArgument(name.to_owned())),
        }
    };
    let number = |arg: Option<&str>| -> Result<u64, CommandParseError> {
        let a = required(arg)?;
        a.trim().parse::<u64>().map_err(|_| CommandParseError::InvalidArgument {
            command: name.to_owned(),
            arg: a,
        })
    };

    Ok(match name {
        "set-query" => Command::SetQuery(arg.unwrap_or_default().to_owned()),
        "commit" | "commit-query" => Command::CommitQuery,
        "scroll" => Command::Scroll(u32::try_from(number(arg)?).unwrap_or(u32::MAX)),
        "select" => Command::Select(ItemId::from(required(arg)?)),
        "select-row" => Command::SelectRow(usize::try_from(number(arg)?).unwrap_or(usize::MAX)),
        "clear" => Command::Clear,
        "refresh" => Command::Refresh,
        "wait" => Command::Wait(number(arg)?),
        "settle" => Command::Settle,
        "accept" => Command::Accept,
        "abort" => Command::Abort,
        _ => return Err(CommandParseError::Unknown(line.to_owned())),
    })
}
