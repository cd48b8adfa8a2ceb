//! Streaming JSON writer.
//!
//! Tokens go straight to the sink as they are produced; nothing but the
//! nesting stack is kept in memory. The writer enforces the JSON grammar with
//! a small state machine: calling it out of order is a caller defect and
//! panics.
//!
//! ```rust
//! use treecreeper_cli::serializers::json_stream::JsonStream;
//!
//! let mut stream = JsonStream::new(Vec::new());
//! stream.begin_object(false).unwrap();
//! stream.field("a").unwrap().integer(1).unwrap();
//! stream.field("b").unwrap().bool(true).unwrap();
//! stream.end_object().unwrap();
//!
//! let bytes = stream.close().unwrap();
//! assert_eq!(String::from_utf8(bytes).unwrap(), "{\n    \"a\": 1,\n    \"b\": true\n}\n");
//! ```

use std::io::{self, Write};

/// Spaces per nesting level in non-compact blocks.
pub const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewDocument,
    AfterOpenBrace,
    AfterOpenBracket,
    AfterColon,
    AfterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    compact: bool,
}

/// Incremental JSON writer over any [`Write`] sink.
///
/// Every method returns `&mut Self` so calls can be chained:
/// `stream.field("line")?.integer(3)?`.
pub struct JsonStream<W: Write> {
    sink: W,
    state: State,
    frames: Vec<Frame>,
}

impl<W: Write> JsonStream<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: State::NewDocument,
            frames: vec![Frame {
                kind: FrameKind::Root,
                compact: false,
            }],
        }
    }

    /// Start an object value. A compact object is written on one line.
    pub fn begin_object(&mut self, compact: bool) -> io::Result<&mut Self> {
        self.open_block(FrameKind::Object, compact, b'{', State::AfterOpenBrace)
    }

    /// Start an array value. A compact array is written on one line.
    pub fn begin_array(&mut self, compact: bool) -> io::Result<&mut Self> {
        self.open_block(FrameKind::Array, compact, b'[', State::AfterOpenBracket)
    }

    /// Write a field name; the next call must write the field's value.
    pub fn field(&mut self, name: &str) -> io::Result<&mut Self> {
        assert!(
            self.current().kind == FrameKind::Object
                && matches!(self.state, State::AfterOpenBrace | State::AfterValue),
            "field name {name:?} written in state {:?} inside {:?}",
            self.state,
            self.current().kind,
        );
        self.new_item()?;
        self.write_quoted(name.as_bytes())?;
        self.sink.write_all(b":")?;
        self.state = State::AfterColon;
        Ok(self)
    }

    pub fn string(&mut self, value: &str) -> io::Result<&mut Self> {
        self.bytes(value.as_bytes())
    }

    /// Write a string from raw bytes. Bytes at or above 0x80 pass through.
    pub fn bytes(&mut self, value: &[u8]) -> io::Result<&mut Self> {
        self.begin_value()?;
        self.write_quoted(value)?;
        self.state = State::AfterValue;
        Ok(self)
    }

    /// Write a string, or null for `None`.
    pub fn opt_string(&mut self, value: Option<&str>) -> io::Result<&mut Self> {
        match value {
            Some(value) => self.string(value),
            None => self.null(),
        }
    }

    pub fn bool(&mut self, value: bool) -> io::Result<&mut Self> {
        self.raw(if value { "true" } else { "false" })
    }

    pub fn integer(&mut self, value: i64) -> io::Result<&mut Self> {
        self.raw(&value.to_string())
    }

    pub fn unsigned(&mut self, value: u64) -> io::Result<&mut Self> {
        self.raw(&value.to_string())
    }

    pub fn null(&mut self) -> io::Result<&mut Self> {
        self.raw("null")
    }

    /// Write a pre-formatted value verbatim.
    ///
    /// The caller is responsible for `fragment` being a valid JSON value.
    pub fn raw(&mut self, fragment: &str) -> io::Result<&mut Self> {
        self.begin_value()?;
        self.sink.write_all(fragment.as_bytes())?;
        self.state = State::AfterValue;
        Ok(self)
    }

    pub fn end_object(&mut self) -> io::Result<&mut Self> {
        self.close_block(FrameKind::Object, State::AfterOpenBrace, b'}')
    }

    pub fn end_array(&mut self) -> io::Result<&mut Self> {
        self.close_block(FrameKind::Array, State::AfterOpenBracket, b']')
    }

    /// Nesting depth below the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Finish the document and hand back the sink.
    ///
    /// Every block must be closed. A trailing newline is written if anything
    /// was written at all.
    pub fn close(mut self) -> io::Result<W> {
        assert!(
            self.frames.len() == 1,
            "stream closed with {} open block(s)",
            self.depth()
        );
        if self.state != State::NewDocument {
            self.sink.write_all(b"\n")?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn current(&self) -> Frame {
        self.frames[self.frames.len() - 1]
    }

    fn begin_value(&mut self) -> io::Result<()> {
        let legal = match self.current().kind {
            FrameKind::Root => self.state == State::NewDocument,
            FrameKind::Array => {
                matches!(self.state, State::AfterOpenBracket | State::AfterValue)
            }
            FrameKind::Object => self.state == State::AfterColon,
        };
        assert!(
            legal,
            "value written in state {:?} inside {:?}",
            self.state,
            self.current().kind
        );
        self.new_item()
    }

    fn open_block(
        &mut self,
        kind: FrameKind,
        compact: bool,
        opener: u8,
        state: State,
    ) -> io::Result<&mut Self> {
        self.begin_value()?;
        self.sink.write_all(&[opener])?;
        self.frames.push(Frame { kind, compact });
        self.state = state;
        Ok(self)
    }

    fn close_block(
        &mut self,
        kind: FrameKind,
        open_state: State,
        closer: u8,
    ) -> io::Result<&mut Self> {
        let frame = self.current();
        assert!(
            frame.kind == kind && (self.state == State::AfterValue || self.state == open_state),
            "cannot close {kind:?} in state {:?} inside {:?}",
            self.state,
            frame.kind
        );
        let empty = self.state == open_state;
        self.frames.pop();
        if empty || frame.compact {
            self.sink.write_all(b" ")?;
        } else {
            self.line_break()?;
        }
        self.sink.write_all(&[closer])?;
        self.state = State::AfterValue;
        Ok(self)
    }

    /// Separator and whitespace before the next item of the current block.
    fn new_item(&mut self) -> io::Result<()> {
        match self.state {
            State::NewDocument => return Ok(()),
            State::AfterValue => self.sink.write_all(b",")?,
            _ => {}
        }
        if self.state == State::AfterColon || self.current().compact {
            self.sink.write_all(b" ")
        } else {
            self.line_break()
        }
    }

    fn line_break(&mut self) -> io::Result<()> {
        let indent = self.depth() * INDENT_WIDTH;
        write!(self.sink, "\n{:indent$}", "", indent = indent)
    }

    fn write_quoted(&mut self, value: &[u8]) -> io::Result<()> {
        self.sink.write_all(b"\"")?;
        let mut start = 0;
        for (i, &byte) in value.iter().enumerate() {
            let escape: &[u8] = match byte {
                b'\t' => b"\\t",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                0x08 => b"\\b",
                0x0c => b"\\f",
                b'\\' => b"\\\\",
                b'"' => b"\\\"",
                0x00..=0x1f => b"",
                _ => continue,
            };
            self.sink.write_all(&value[start..i])?;
            if escape.is_empty() {
                write!(self.sink, "\\u{:04x}", byte)?;
            } else {
                self.sink.write_all(escape)?;
            }
            start = i + 1;
        }
        self.sink.write_all(&value[start..])?;
        self.sink.write_all(b"\"")
    }
}
