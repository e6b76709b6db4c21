//! Markup tokenizer - single-pass lexical scan
//!
//! Implements a permissive pull-tokenizer over a complete in-memory document.
//! One scan pass emits a finite sequence of [`Event`]s covering the whole
//! input, then exactly one `Eof`. Nothing is validated: names are taken as
//! written, nesting is not checked, entities are not decoded. Malformed
//! `<!...`/`<?...` declarations produce an in-band `Error` event and the scan
//! resumes at the next plausible construct boundary. Constructs left
//! unterminated at end of text are closed there with their spans clamped.

use crate::event::{Attributes, Event};
use crate::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

const TRACE_TARGET: &str = "saxlex.tokenizer";

/// Free-text trace callback, invoked at key decision points during a scan
pub type DebugFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Scan configuration.
#[derive(Clone, Default)]
pub struct ScanOptions {
    /// Reserved for a future validating mode; currently inert.
    pub strict: bool,
    /// Optional trace callback. Purely observational: it never affects the
    /// emitted events. The same messages go to the `log` facade at trace
    /// level regardless.
    pub debug: Option<DebugFn>,
}

/// Tokenizer for one fixed input text.
///
/// A tokenizer may be scanned repeatedly; every call to [`events`] starts an
/// independent pass from offset 0 and yields an identical sequence for the
/// same input.
///
/// [`events`]: Tokenizer::events
pub struct Tokenizer<'a> {
    input: &'a str,
    options: ScanOptions,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer with default options
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            options: ScanOptions::default(),
        }
    }

    /// Create a tokenizer with explicit options
    pub fn with_options(input: &'a str, options: ScanOptions) -> Self {
        Tokenizer { input, options }
    }

    /// The input text this tokenizer scans
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Start a fresh scan pass over the input
    pub fn events(&self) -> Events<'a> {
        let events = Events {
            input: self.input,
            scanner: Scanner::new(self.input.as_bytes()),
            debug: self.options.debug.clone(),
            done: false,
        };
        events.trace(format_args!("start scan"));
        events
    }
}

impl<'t, 'a> IntoIterator for &'t Tokenizer<'a> {
    type Item = Event<'a>;
    type IntoIter = Events<'a>;

    fn into_iter(self) -> Events<'a> {
        self.events()
    }
}

/// One scan pass: a pull-based, finite event sequence.
///
/// Suspension happens only between events; a partial construct is never
/// observable. The cursor never moves backward.
pub struct Events<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
    debug: Option<DebugFn>,
    done: bool,
}

impl<'a> Iterator for Events<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if self.done {
            return None;
        }
        if self.scanner.is_eof() {
            self.done = true;
            self.trace(format_args!("end scan"));
            return Some(Event::Eof);
        }
        Some(self.next_event())
    }
}

impl<'a> Events<'a> {
    fn trace(&self, args: fmt::Arguments<'_>) {
        log::trace!(target: TRACE_TARGET, "{args}");
        if let Some(debug) = &self.debug {
            debug(&args.to_string());
        }
    }

    /// Payload slice, empty when a terminator matched inside the opener or
    /// the construct ran out of text before its payload began
    fn payload(&self, from: usize, to: usize) -> &'a str {
        if to <= from {
            ""
        } else {
            &self.input[from..to]
        }
    }

    fn next_event(&mut self) -> Event<'a> {
        let start = self.scanner.position();
        if self.scanner.peek() != Some(b'<') {
            self.trace(format_args!("found text"));
            let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
            self.scanner.set_position(end);
            return Event::Text {
                data: &self.input[start..end],
                start,
                end,
            };
        }
        self.scanner.advance(1);
        match self.scanner.peek() {
            Some(b'!') => self.scan_declaration(start),
            Some(b'/') => self.scan_end_tag(start),
            Some(b'?') => self.scan_processing_instruction(start),
            // anything else, including a lone '<' at end of text, starts a tag
            _ => self.scan_tag(start),
        }
    }

    /// Dispatch `<!...`: comment, CDATA, doctype, or malformed. Cursor sits
    /// on the '!'.
    fn scan_declaration(&mut self, start: usize) -> Event<'a> {
        if self.scanner.starts_with(b"!--") {
            self.trace(format_args!("found <!--"));
            let (data_end, end) = match self.scanner.find_terminator(b"-->") {
                Some(t) => (t, t + 3),
                None => (self.input.len(), self.input.len()),
            };
            self.scanner.set_position(end);
            Event::Comment {
                data: self.payload(start + 4, data_end),
                start,
                end,
            }
        } else if self.scanner.starts_with(b"![CDATA[") {
            self.trace(format_args!("found <![CDATA["));
            let (data_end, end) = match self.scanner.find_terminator(b"]]>") {
                Some(t) => (t, t + 3),
                None => (self.input.len(), self.input.len()),
            };
            self.scanner.set_position(end);
            Event::CData {
                data: self.payload(start + 9, data_end),
                start,
                end,
            }
        } else if self.scanner.starts_with(b"!DOCTYPE")
            && self.scanner.peek_at(8).is_some_and(is_whitespace)
        {
            self.trace(format_args!("found <!DOCTYPE"));
            let (data_end, end) = match self.scanner.find_tag_end() {
                Some(g) => (g, g + 1),
                None => (self.input.len(), self.input.len()),
            };
            self.scanner.set_position(end);
            Event::Doctype {
                data: self.payload(start + 10, data_end),
                start,
                end,
            }
        } else {
            self.recover()
        }
    }

    /// Malformed declaration: emit an advisory error and resume at
    /// `min(next '<', one past next '>')`, clamped to end of text. The cursor
    /// sits one past the '<' of the bad construct, so this always makes
    /// forward progress.
    fn recover(&mut self) -> Event<'a> {
        self.trace(format_args!("malformed declaration"));
        let lt = self.scanner.find_tag_start().unwrap_or(self.input.len());
        let gt = self
            .scanner
            .find_tag_end()
            .map(|g| g + 1)
            .unwrap_or(self.input.len());
        self.scanner.set_position(lt.min(gt));
        Event::Error {
            message: "Invalid XML",
        }
    }

    /// `</name>`: everything up to the '>' is the name, no trimming, no
    /// validation. Cursor sits on the '/'.
    fn scan_end_tag(&mut self, start: usize) -> Event<'a> {
        self.trace(format_args!("found </"));
        self.scanner.advance(1);
        let name_start = self.scanner.position();
        let (name_end, end) = match self.scanner.find_tag_end() {
            Some(g) => (g, g + 1),
            None => (self.input.len(), self.input.len()),
        };
        self.scanner.set_position(end);
        Event::EndTag {
            name: &self.input[name_start..name_end],
            start,
            end,
        }
    }

    /// `<?xml ...?>`, target matched case-insensitively and followed by
    /// whitespace; any other `<?...` is malformed. Cursor sits on the '?'.
    fn scan_processing_instruction(&mut self, start: usize) -> Event<'a> {
        let target_is_xml = matches!(
            (
                self.scanner.peek_at(1),
                self.scanner.peek_at(2),
                self.scanner.peek_at(3),
            ),
            (Some(x), Some(m), Some(l))
                if x.eq_ignore_ascii_case(&b'x')
                    && m.eq_ignore_ascii_case(&b'm')
                    && l.eq_ignore_ascii_case(&b'l')
        ) && self.scanner.peek_at(4).is_some_and(is_whitespace);
        if !target_is_xml {
            return self.recover();
        }
        self.trace(format_args!("found <?xml"));
        let (data_end, end) = match self.scanner.find_terminator(b"?>") {
            Some(t) => (t, t + 2),
            None => (self.input.len(), self.input.len()),
        };
        self.scanner.set_position(end);
        Event::ProcessingInstruction {
            data: self.payload(start + 5, data_end),
            start,
            end,
        }
    }

    /// Start or empty tag. Cursor sits on the first name character (or at a
    /// terminator for a nameless tag like `<>`).
    fn scan_tag(&mut self, start: usize) -> Event<'a> {
        self.trace(format_args!("found <"));
        let name_start = self.scanner.position();
        let name_end;
        loop {
            match self.scanner.peek() {
                None | Some(b'>') => {
                    name_end = self.scanner.position();
                    break;
                }
                Some(b'/') if self.scanner.peek_at(1) == Some(b'>') => {
                    name_end = self.scanner.position();
                    break;
                }
                Some(b) if is_whitespace(b) => {
                    name_end = self.scanner.position();
                    self.scanner.advance(1);
                    break;
                }
                Some(_) => self.scanner.advance(1),
            }
        }
        let name = &self.input[name_start..name_end];
        self.scan_attributes(start, name)
    }

    /// Attribute sub-scanner: runs until `>`, `/>`, or end of text, then
    /// emits the tag event.
    fn scan_attributes(&mut self, start: usize, name: &'a str) -> Event<'a> {
        let mut attributes = Attributes::new();
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None => return self.unterminated_tag(start, name, attributes),
                Some(b'>') => {
                    self.scanner.advance(1);
                    let end = self.scanner.position();
                    return Event::StartTag {
                        name,
                        attributes,
                        start,
                        end,
                    };
                }
                Some(b'/') if self.scanner.peek_at(1) == Some(b'>') => {
                    self.scanner.advance(2);
                    let end = self.scanner.position();
                    return Event::EmptyTag {
                        name,
                        attributes,
                        start,
                        end,
                    };
                }
                Some(_) => {}
            }

            self.trace(format_args!("found attribute"));
            let key_start = self.scanner.position();
            loop {
                match self.scanner.peek() {
                    None | Some(b'=') | Some(b'>') => break,
                    Some(b) if is_whitespace(b) => break,
                    Some(_) => self.scanner.advance(1),
                }
            }
            let key = &self.input[key_start..self.scanner.position()];
            self.trace(format_args!("found key: {key}"));

            // whitespace may separate the key from its '='
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                Some(b'=') => self.scanner.advance(1),
                Some(_) => {
                    // no value follows: boolean attribute; the terminator is
                    // left for the outer loop to classify
                    if !key.is_empty() {
                        attributes.insert(key, None);
                    }
                    continue;
                }
                None => {
                    if !key.is_empty() {
                        attributes.insert(key, None);
                    }
                    return self.unterminated_tag(start, name, attributes);
                }
            }

            self.scanner.skip_whitespace();
            let quote = match self.scanner.peek() {
                Some(q @ (b'"' | b'\'')) => {
                    self.scanner.advance(1);
                    Some(q)
                }
                _ => None,
            };
            let scanned = match quote {
                Some(q) => self.scan_quoted_value(q),
                None => self.scan_unquoted_value(),
            };
            match scanned {
                Ok(value) => {
                    self.trace(format_args!("found value: {value}"));
                    if !key.is_empty() {
                        attributes.insert(key, Some(value));
                    }
                }
                Err(value) => {
                    // value ran to end of text
                    if !key.is_empty() {
                        attributes.insert(key, Some(value));
                    }
                    return self.unterminated_tag(start, name, attributes);
                }
            }
        }
    }

    /// Quoted value: runs to the closing quote. A backslash immediately
    /// before the quote character escapes it: the backslash is dropped, the
    /// quote becomes part of the value, and scanning continues. `Err` means
    /// the closing quote never arrived; it carries the value accumulated
    /// through end of text.
    fn scan_quoted_value(&mut self, quote: u8) -> Result<Cow<'a, str>, Cow<'a, str>> {
        let value_start = self.scanner.position();
        let mut owned: Option<String> = None;
        loop {
            let segment_start = self.scanner.position();
            match self.scanner.find_byte(quote) {
                None => {
                    let tail = &self.input[segment_start..];
                    self.scanner.set_position(self.input.len());
                    return Err(match owned {
                        None => Cow::Borrowed(tail),
                        Some(mut s) => {
                            s.push_str(tail);
                            Cow::Owned(s)
                        }
                    });
                }
                Some(q_pos) if q_pos > value_start && self.input.as_bytes()[q_pos - 1] == b'\\' => {
                    let s = owned.get_or_insert_with(String::new);
                    s.push_str(&self.input[segment_start..q_pos - 1]);
                    s.push(quote as char);
                    self.scanner.set_position(q_pos + 1);
                }
                Some(q_pos) => {
                    self.scanner.set_position(q_pos + 1);
                    return Ok(match owned {
                        None => Cow::Borrowed(&self.input[value_start..q_pos]),
                        Some(mut s) => {
                            s.push_str(&self.input[segment_start..q_pos]);
                            Cow::Owned(s)
                        }
                    });
                }
            }
        }
    }

    /// Unquoted value: runs to whitespace, `>`, or `/>`; the terminator is
    /// not consumed. `Err` means end of text was reached first.
    fn scan_unquoted_value(&mut self) -> Result<Cow<'a, str>, Cow<'a, str>> {
        let value_start = self.scanner.position();
        loop {
            match self.scanner.peek() {
                None => return Err(Cow::Borrowed(&self.input[value_start..])),
                Some(b'>') => break,
                Some(b) if is_whitespace(b) => break,
                Some(b'/') if self.scanner.peek_at(1) == Some(b'>') => break,
                Some(_) => self.scanner.advance(1),
            }
        }
        Ok(Cow::Borrowed(
            &self.input[value_start..self.scanner.position()],
        ))
    }

    /// A tag whose `>` or `/>` never arrived: close it at end of text with
    /// the span clamped. `/>` was never seen, so this is always a start tag.
    fn unterminated_tag(
        &mut self,
        start: usize,
        name: &'a str,
        attributes: Attributes<'a>,
    ) -> Event<'a> {
        self.trace(format_args!("unterminated tag"));
        let end = self.input.len();
        self.scanner.set_position(end);
        Event::StartTag {
            name,
            attributes,
            start,
            end,
        }
    }
}
