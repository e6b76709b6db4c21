//! Lexical event types
//!
//! Defines the events emitted during a scan. Events are a tagged union:
//! consumers pattern-match on the variant rather than downcasting. Payloads
//! are zero-copy slices of the input; only attribute values that contained a
//! backslash-escaped quote are owned.

use std::borrow::Cow;
use std::collections::HashMap;

/// Attribute map for a start or empty tag.
///
/// Keys are unique (a repeated key keeps the last value written). A value of
/// `None` marks a boolean attribute, one present without an `=value` clause,
/// e.g. `<input disabled>`. Values are never entity-decoded.
pub type Attributes<'a> = HashMap<&'a str, Option<Cow<'a, str>>>;

/// A lexical event produced by the [`Tokenizer`](crate::Tokenizer).
///
/// Every variant except `Error` and `Eof` carries the `[start, end)` byte
/// span it was scanned from. In emission order those spans tile the input
/// exactly (for inputs producing no `Error` events), and the sequence ends
/// with exactly one `Eof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Comment: `<!--...-->`, payload is the text between the markers
    Comment {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// CDATA section: `<![CDATA[...]]>`, payload is the text between the markers
    CData {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// Doctype declaration: `<!DOCTYPE ...>`, payload is the text after the
    /// keyword's trailing whitespace up to the closing `>`
    Doctype {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// Processing instruction: `<?xml ...?>`, payload is the text after the
    /// target up to the terminator
    ProcessingInstruction {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// Element start tag: `<name ...>`
    StartTag {
        name: &'a str,
        attributes: Attributes<'a>,
        start: usize,
        end: usize,
    },
    /// Element end tag: `</name>`
    EndTag {
        name: &'a str,
        start: usize,
        end: usize,
    },
    /// Self-closing tag: `<name .../>`
    EmptyTag {
        name: &'a str,
        attributes: Attributes<'a>,
        start: usize,
        end: usize,
    },
    /// Text run between markup constructs
    Text {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// Malformed `<!...` or `<?...` declaration. Advisory: the scan continues
    /// past the construct. Carries no span.
    Error { message: &'static str },
    /// End of input. Emitted exactly once, after all other events.
    Eof,
}

impl<'a> Event<'a> {
    /// The discriminant for this event, used as the dispatch registry key
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Comment { .. } => EventKind::Comment,
            Event::CData { .. } => EventKind::CData,
            Event::Doctype { .. } => EventKind::Doctype,
            Event::ProcessingInstruction { .. } => EventKind::ProcessingInstruction,
            Event::StartTag { .. } => EventKind::StartTag,
            Event::EndTag { .. } => EventKind::EndTag,
            Event::EmptyTag { .. } => EventKind::EmptyTag,
            Event::Text { .. } => EventKind::Text,
            Event::Error { .. } => EventKind::Error,
            Event::Eof => EventKind::Eof,
        }
    }

    /// The `[start, end)` span, if this variant carries one
    pub fn span(&self) -> Option<(usize, usize)> {
        match *self {
            Event::Comment { start, end, .. }
            | Event::CData { start, end, .. }
            | Event::Doctype { start, end, .. }
            | Event::ProcessingInstruction { start, end, .. }
            | Event::StartTag { start, end, .. }
            | Event::EndTag { start, end, .. }
            | Event::EmptyTag { start, end, .. }
            | Event::Text { start, end, .. } => Some((start, end)),
            Event::Error { .. } | Event::Eof => None,
        }
    }

    /// Get the tag name if this is a start, end, or empty tag
    pub fn tag_name(&self) -> Option<&'a str> {
        match *self {
            Event::StartTag { name, .. }
            | Event::EndTag { name, .. }
            | Event::EmptyTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Check if this is a text event
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Event::Text { .. })
    }

    /// Check if this is the end-of-input event
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Event::Eof)
    }
}

/// Event discriminant, the key consumers subscribe on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Comment,
    CData,
    Doctype,
    ProcessingInstruction,
    StartTag,
    EndTag,
    EmptyTag,
    Text,
    Error,
    Eof,
}
