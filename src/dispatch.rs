//! Push adapter over the pull tokenizer
//!
//! Keeps an explicit registry mapping each event kind to an ordered list of
//! callbacks, and drives a full scan pass, dispatching every event to the
//! callbacks registered for its kind. Dispatch is synchronous: events arrive
//! in scan order, and callbacks for one event run in registration order.
//!
//! Re-entering [`Dispatcher::run`] while a drive on the same instance is
//! still in progress is a usage error ([`DriveError::ReentrantDrive`]),
//! distinct from the in-band markup `Error` events.

use crate::event::{Event, EventKind};
use crate::tokenizer::Tokenizer;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Handle for a registered callback, used to remove it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener object form: anything exposing a `handle_event` method.
///
/// Plain closures can be registered directly with [`Dispatcher::on`]; this
/// trait covers stateful listener objects registered with
/// [`Dispatcher::on_handler`].
pub trait Handler {
    fn handle_event(&mut self, event: &Event<'_>);
}

/// Usage errors raised by the dispatcher. These are programmer errors, never
/// produced by malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveError {
    /// `run` was invoked while a prior drive on this instance was still
    /// marked in progress
    ReentrantDrive,
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::ReentrantDrive => write!(f, "scan already in progress"),
        }
    }
}

impl Error for DriveError {}

type BoxedCallback<'cb> = Box<dyn FnMut(&Event<'_>) + 'cb>;

/// Per-kind callback registry plus a drive-to-completion loop.
///
/// Wraps one [`Tokenizer`]; each successful [`run`](Dispatcher::run) performs
/// a fresh, complete scan pass and may be repeated.
pub struct Dispatcher<'xml, 'cb> {
    tokenizer: Tokenizer<'xml>,
    listeners: HashMap<EventKind, Vec<(ListenerId, BoxedCallback<'cb>)>>,
    next_id: u64,
    driving: bool,
}

impl<'xml, 'cb> Dispatcher<'xml, 'cb> {
    /// Create a dispatcher around a tokenizer
    pub fn new(tokenizer: Tokenizer<'xml>) -> Self {
        Dispatcher {
            tokenizer,
            listeners: HashMap::new(),
            next_id: 0,
            driving: false,
        }
    }

    /// Register a callback for one event kind. Multiple callbacks may be
    /// registered per kind; they run in registration order.
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&Event<'_>) + 'cb,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Register a listener object for one event kind
    pub fn on_handler<H>(&mut self, kind: EventKind, mut handler: H) -> ListenerId
    where
        H: Handler + 'cb,
    {
        self.on(kind, move |event| handler.handle_event(event))
    }

    /// Remove a previously registered callback. Returns whether anything was
    /// removed.
    pub fn remove(&mut self, kind: EventKind, id: ListenerId) -> bool {
        match self.listeners.get_mut(&kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|(listener_id, _)| *listener_id != id);
                before != list.len()
            }
            None => false,
        }
    }

    /// Scan the whole input and dispatch every event to the callbacks
    /// registered for its kind.
    ///
    /// Fails with [`DriveError::ReentrantDrive`] if a drive on this instance
    /// is still marked in progress; a callback that panicked out of a prior
    /// drive leaves the instance in that state.
    pub fn run(&mut self) -> Result<(), DriveError> {
        if self.driving {
            return Err(DriveError::ReentrantDrive);
        }
        self.driving = true;
        for event in self.tokenizer.events() {
            if let Some(list) = self.listeners.get_mut(&event.kind()) {
                for (_, callback) in list.iter_mut() {
                    callback(&event);
                }
            }
        }
        self.driving = false;
        Ok(())
    }
}
