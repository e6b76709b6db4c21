//! saxlex - permissive SAX-style lexical scanner for XML-like markup
//!
//! A single-pass scanner that turns a complete in-memory document into an
//! ordered sequence of lexical events. No tree is built, no entities are
//! resolved, no well-formedness is enforced: this is the lexical foundation
//! for event-driven markup consumers.
//!
//! ## Architecture
//!
//! ```text
//! raw text ---> Tokenizer ---> Event sequence ---> Dispatcher ---> callbacks
//! ```
//!
//! The [`Tokenizer`] is the pull side: [`Tokenizer::events`] yields
//! [`Event`]s lazily and is restartable (each call scans from offset 0). The
//! [`Dispatcher`] is the push side: callbacks subscribe per [`EventKind`] and
//! a single `run` drives the whole scan.
//!
//! ## Example
//!
//! ```
//! use saxlex::{Event, Tokenizer};
//!
//! let tokenizer = Tokenizer::new("<p class=\"intro\">hello</p>");
//! for event in tokenizer.events() {
//!     if let Event::Text { data, .. } = event {
//!         assert_eq!(data, "hello");
//!     }
//! }
//! ```

pub mod dispatch;
pub mod event;
pub mod scanner;
pub mod tokenizer;

pub use dispatch::{Dispatcher, DriveError, Handler, ListenerId};
pub use event::{Attributes, Event, EventKind};
pub use tokenizer::{Events, ScanOptions, Tokenizer};

/// Scan a document and collect the full event sequence
pub fn scan(input: &str) -> Vec<Event<'_>> {
    Tokenizer::new(input).events().collect()
}
