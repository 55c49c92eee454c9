//! Incremental decoders for streamed page descriptions.
//!
//! Both decoders are synchronous state machines fed arbitrary text chunks.
//! They emit a section object as soon as its closing boundary arrives and
//! never expose a partial one. Internal buffering is bounded: a fragment
//! that outgrows the limit is discarded and the decoder resynchronizes.

use serde_json::Value;
use tracing::debug;

/// Shared interface for the async consumers.
pub trait Decoder {
    /// Feed one chunk; returns every section completed by it.
    fn push(&mut self, chunk: &str) -> Vec<Value>;

    /// Signal end of input; returns anything still pending.
    fn finish(&mut self) -> Vec<Value>;

    /// Page theme seen in the stream, if any. Returned once.
    fn take_theme(&mut self) -> Option<String>;
}

/// Longest key or theme name tracked while looking for `"sections"`.
const MAX_TOKEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Scanning the root object for the `"sections"` key.
    Header,
    /// Inside the sections array.
    Sections,
    Done,
}

/// Decoder for a single JSON page object streamed in pieces.
///
/// Finds `"sections"` at the top level of the root object, then emits one
/// value per balanced `{...}` at the array's top nesting level. Braces in
/// strings, escaped quotes included, do not count. A root that is itself
/// an array is treated as the section list.
#[derive(Debug)]
pub struct BracketDecoder {
    max_buffer: usize,
    phase: Phase,
    depth: usize,
    in_string: bool,
    escaped: bool,
    // header scanning
    token: String,
    last_string: Option<String>,
    key: Option<String>,
    theme: Option<String>,
    // section capture
    buffer: String,
    object_depth: usize,
    discarding: bool,
}

impl BracketDecoder {
    pub fn new(max_buffer: usize) -> Self {
        Self {
            max_buffer,
            phase: Phase::Header,
            depth: 0,
            in_string: false,
            escaped: false,
            token: String::new(),
            last_string: None,
            key: None,
            theme: None,
            buffer: String::new(),
            object_depth: 0,
            discarding: false,
        }
    }

    /// True once the closing bracket of the sections array was seen.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    fn header_char(&mut self, c: char) {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
                if self.depth == 1 && self.token.len() < MAX_TOKEN {
                    self.token.push(c);
                }
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
                if self.depth == 1 {
                    let s = std::mem::take(&mut self.token);
                    if self.key.as_deref() == Some("theme") {
                        self.theme = Some(s);
                        self.key = None;
                    } else {
                        self.last_string = Some(s);
                    }
                }
            } else if self.depth == 1 && self.token.len() < MAX_TOKEN {
                self.token.push(c);
            }
            return;
        }
        match c {
            '"' => {
                self.in_string = true;
                self.token.clear();
            }
            ':' if self.depth == 1 => self.key = self.last_string.take(),
            ',' if self.depth == 1 => {
                self.key = None;
                self.last_string = None;
            }
            '[' if self.depth == 0 => {
                // bare array root
                self.phase = Phase::Sections;
                self.depth = 0;
            }
            '[' if self.depth == 1 && self.key.as_deref() == Some("sections") => {
                self.phase = Phase::Sections;
                self.depth = 0;
                self.key = None;
            }
            '{' | '[' => self.depth += 1,
            '}' | ']' => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    debug!("stream root closed without a sections array");
                    self.phase = Phase::Done;
                }
            }
            _ => {}
        }
    }

    fn section_char(&mut self, c: char, out: &mut Vec<Value>) {
        if self.object_depth == 0 {
            // Between entries at the array's top level.
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                return;
            }
            match c {
                '"' => self.in_string = true,
                '{' if self.depth == 0 => {
                    self.object_depth = 1;
                    self.discarding = false;
                    self.buffer.clear();
                    self.buffer.push(c);
                }
                '[' | '{' => self.depth += 1,
                ']' if self.depth == 0 => self.phase = Phase::Done,
                ']' | '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            return;
        }

        if !self.discarding {
            if self.buffer.len() + c.len_utf8() > self.max_buffer {
                debug!(max_buffer = self.max_buffer, "stream fragment discarded: buffer limit");
                self.discarding = true;
                self.buffer = String::new();
            } else {
                self.buffer.push(c);
            }
        }

        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            return;
        }
        match c {
            '"' => self.in_string = true,
            '{' | '[' => self.object_depth += 1,
            '}' | ']' => {
                self.object_depth -= 1;
                if self.object_depth == 0 {
                    self.complete(out);
                }
            }
            _ => {}
        }
    }

    fn complete(&mut self, out: &mut Vec<Value>) {
        let fragment = std::mem::take(&mut self.buffer);
        if std::mem::replace(&mut self.discarding, false) {
            return;
        }
        match serde_json::from_str::<Value>(&fragment) {
            Ok(value @ Value::Object(_)) => out.push(value),
            Ok(_) => debug!("stream fragment discarded: not an object"),
            Err(err) => debug!(reason = %err, "stream fragment discarded: parse failure"),
        }
    }
}

impl Decoder for BracketDecoder {
    fn push(&mut self, chunk: &str) -> Vec<Value> {
        let mut out = Vec::new();
        for c in chunk.chars() {
            match self.phase {
                Phase::Header => self.header_char(c),
                Phase::Sections => self.section_char(c, &mut out),
                Phase::Done => break,
            }
        }
        out
    }

    fn finish(&mut self) -> Vec<Value> {
        if self.object_depth > 0 {
            debug!("stream ended inside a section; fragment discarded");
        }
        self.buffer.clear();
        self.object_depth = 0;
        self.phase = Phase::Done;
        Vec::new()
    }

    fn take_theme(&mut self) -> Option<String> {
        self.theme.take()
    }
}

/// Decoder for newline-delimited JSON. Each line is a bare section
/// (`{"type": ...}`), a wrapper (`{"section": {...}}`) or a page setting
/// line (`{"theme": "dark"}`). Malformed lines are skipped.
#[derive(Debug)]
pub struct LineDecoder {
    max_buffer: usize,
    buffer: String,
    discarding: bool,
    theme: Option<String>,
}

impl LineDecoder {
    pub fn new(max_buffer: usize) -> Self {
        Self {
            max_buffer,
            buffer: String::new(),
            discarding: false,
            theme: None,
        }
    }

    fn line(&mut self, line: &str, out: &mut Vec<Value>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let value = match serde_json::from_str::<Value>(line) {
            Ok(value) => value,
            Err(err) => {
                debug!(reason = %err, "stream line discarded: parse failure");
                return;
            }
        };
        let Value::Object(mut obj) = value else {
            debug!("stream line discarded: not an object");
            return;
        };
        if let Some(section) = obj.remove("section") {
            if section.is_object() {
                out.push(section);
            } else {
                debug!("stream line discarded: section wrapper without object");
            }
        } else if obj.contains_key("type") {
            out.push(Value::Object(obj));
        } else if let Some(Value::String(theme)) = obj.remove("theme") {
            self.theme = Some(theme);
        } else {
            debug!("stream line discarded: no section");
        }
    }
}

impl Decoder for LineDecoder {
    fn push(&mut self, chunk: &str) -> Vec<Value> {
        let mut out = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.find('\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];
            if std::mem::replace(&mut self.discarding, false) {
                self.buffer.clear();
                continue;
            }
            if self.buffer.len() + head.len() > self.max_buffer {
                debug!(max_buffer = self.max_buffer, "stream line discarded: buffer limit");
                self.buffer.clear();
                continue;
            }
            if self.buffer.is_empty() {
                self.line(head, &mut out);
            } else {
                self.buffer.push_str(head);
                let line = std::mem::take(&mut self.buffer);
                self.line(&line, &mut out);
            }
        }
        if !self.discarding && !rest.is_empty() {
            if self.buffer.len() + rest.len() > self.max_buffer {
                debug!(max_buffer = self.max_buffer, "stream line discarded: buffer limit");
                self.buffer.clear();
                self.discarding = true;
            } else {
                self.buffer.push_str(rest);
            }
        }
        out
    }

    fn finish(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        let line = std::mem::take(&mut self.buffer);
        if !std::mem::replace(&mut self.discarding, false) {
            self.line(&line, &mut out);
        }
        out
    }

    fn take_theme(&mut self) -> Option<String> {
        self.theme.take()
    }
}
