// Dweve JStream - Streaming JSON Event Engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Incremental JSON tokenization.
//!
//! [`JsonTokenizer`] turns raw bytes into typed [`Token`]s. It is fully
//! resumable: a chunk may end in the middle of a string, an escape sequence,
//! a number, or a keyword, and the next chunk picks up exactly where the
//! previous one stopped. The produced token sequence depends only on the
//! concatenated input, never on where the chunk boundaries fall.
//!
//! The tokenizer also enforces JSON's structural grammar (key/colon/comma
//! placement, matching brackets), so a [`Token::Key`] is distinguished from a
//! [`Token::String`] at the source. Multiple whitespace-separated documents
//! in one stream are accepted; the consumer sees the tokens of each in turn.
//!
//! Tokens are pushed into a [`TokenSink`] as soon as they complete. The sink
//! is also notified of string growth through
//! [`string_bytes`](TokenSink::string_bytes) while a string or key is still
//! being accumulated, which is what allows size limits to fire before an
//! oversized string is ever exposed.

use crate::error::{StreamError, StreamResult};

/// A typed JSON token.
///
/// Object keys arrive as [`Key`](Token::Key), not as plain strings, because
/// the tokenizer tracks the structural grammar. String and key payloads are
/// fully unescaped. Number payloads keep the literal spelling so that the
/// consumer can classify them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object key.
    Key(String),
    /// A string value.
    String(String),
    /// A number value, as its literal spelling.
    Number(String),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

/// Receiver for tokens and string-growth notifications.
///
/// Errors returned from the sink abort tokenization immediately and
/// propagate to the caller of [`Tokenizer::feed`].
pub trait TokenSink {
    /// A complete token, with the byte offset where it started.
    fn token(&mut self, token: Token, offset: u64) -> StreamResult<()>;

    /// `len` more decoded bytes were accumulated into the string or key
    /// currently being lexed.
    fn string_bytes(&mut self, len: usize, offset: u64) -> StreamResult<()>;
}

/// A resumable byte-to-token converter.
pub trait Tokenizer {
    /// Consume a chunk, pushing completed tokens into `sink`.
    fn feed(&mut self, chunk: &[u8], sink: &mut dyn TokenSink) -> StreamResult<()>;

    /// Signal end of input, flushing any token that only a terminating byte
    /// could have completed (numbers). Fails if the input ends inside a
    /// string or keyword.
    fn finish(&mut self, sink: &mut dyn TokenSink) -> StreamResult<()>;

    /// Absolute offset of the next unconsumed byte.
    fn offset(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows at the next non-whitespace byte.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    Value,
    ValueOrArrayEnd,
    KeyOrObjectEnd,
    Key,
    Colon,
    CommaOrObjectEnd,
    CommaOrArrayEnd,
}

/// Escape-decoding state inside a string.
#[derive(Debug, Clone, Copy)]
enum Esc {
    None,
    Start,
    Unicode { acc: u16, digits: u8 },
    LowSlash { high: u16 },
    LowU { high: u16 },
    LowUnicode { high: u16, acc: u16, digits: u8 },
}

#[derive(Debug)]
struct StrLex {
    buf: Vec<u8>,
    reported: usize,
    esc: Esc,
    is_key: bool,
    start: u64,
}

impl StrLex {
    fn new(is_key: bool, start: u64) -> Self {
        Self {
            buf: Vec::new(),
            reported: 0,
            esc: Esc::None,
            is_key,
            start,
        }
    }
}

#[derive(Debug)]
struct NumLex {
    buf: Vec<u8>,
    start: u64,
}

#[derive(Debug)]
struct KeywordLex {
    lit: &'static str,
    matched: usize,
    start: u64,
}

#[derive(Debug)]
enum Lex {
    Ready,
    Str(StrLex),
    Number(NumLex),
    Keyword(KeywordLex),
}

/// The standard incremental JSON tokenizer.
///
/// # Examples
///
/// ```rust
/// use jstream::{JsonTokenizer, Token, Tokenizer, TokenSink, StreamResult};
///
/// struct Collect(Vec<Token>);
///
/// impl TokenSink for Collect {
///     fn token(&mut self, token: Token, _offset: u64) -> StreamResult<()> {
///         self.0.push(token);
///         Ok(())
///     }
///     fn string_bytes(&mut self, _len: usize, _offset: u64) -> StreamResult<()> {
///         Ok(())
///     }
/// }
///
/// # fn example() -> StreamResult<()> {
/// let mut tokenizer = JsonTokenizer::new();
/// let mut sink = Collect(Vec::new());
/// tokenizer.feed(b"[true, nu", &mut sink)?;
/// tokenizer.feed(b"ll]", &mut sink)?;
/// tokenizer.finish(&mut sink)?;
/// assert_eq!(
///     sink.0,
///     vec![Token::StartArray, Token::Bool(true), Token::Null, Token::EndArray]
/// );
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct JsonTokenizer {
    offset: u64,
    lex: Lex,
    frames: Vec<Container>,
    expect: Expect,
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonTokenizer {
    /// Create a tokenizer positioned at offset 0.
    pub fn new() -> Self {
        Self {
            offset: 0,
            lex: Lex::Ready,
            frames: Vec::new(),
            expect: Expect::Value,
        }
    }

    /// Consume one byte, returning the offset it occupied.
    fn consume(&mut self, i: &mut usize) -> u64 {
        let off = self.offset;
        *i += 1;
        self.offset += 1;
        off
    }

    /// Set the expectation that follows a completed value.
    fn settle(&mut self) {
        self.expect = match self.frames.last() {
            None => Expect::Value,
            Some(Container::Object) => Expect::CommaOrObjectEnd,
            Some(Container::Array) => Expect::CommaOrArrayEnd,
        };
    }

    fn unexpected(&self, b: u8, expected: &str) -> StreamError {
        StreamError::malformed(
            self.offset,
            format!("unexpected byte {:#04x} ({:?}), expected {}", b, b as char, expected),
        )
    }

    /// Handle one non-whitespace byte in the `Ready` state. May emit a
    /// structural token or switch into a lexeme state.
    fn scan_ready(
        &mut self,
        chunk: &[u8],
        i: &mut usize,
        sink: &mut dyn TokenSink,
    ) -> StreamResult<()> {
        while *i < chunk.len() && is_json_whitespace(chunk[*i]) {
            self.consume(i);
        }
        if *i >= chunk.len() {
            return Ok(());
        }
        let b = chunk[*i];
        match self.expect {
            Expect::Value | Expect::ValueOrArrayEnd => match b {
                b'{' => {
                    let off = self.consume(i);
                    self.frames.push(Container::Object);
                    self.expect = Expect::KeyOrObjectEnd;
                    sink.token(Token::StartObject, off)
                }
                b'[' => {
                    let off = self.consume(i);
                    self.frames.push(Container::Array);
                    self.expect = Expect::ValueOrArrayEnd;
                    sink.token(Token::StartArray, off)
                }
                b']' if self.expect == Expect::ValueOrArrayEnd => {
                    let off = self.consume(i);
                    let _ = self.frames.pop();
                    self.settle();
                    sink.token(Token::EndArray, off)
                }
                b'"' => {
                    let off = self.consume(i);
                    self.lex = Lex::Str(StrLex::new(false, off));
                    Ok(())
                }
                b'-' | b'0'..=b'9' => {
                    self.lex = Lex::Number(NumLex {
                        buf: Vec::new(),
                        start: self.offset,
                    });
                    Ok(())
                }
                b't' => {
                    self.lex = Lex::Keyword(KeywordLex {
                        lit: "true",
                        matched: 0,
                        start: self.offset,
                    });
                    Ok(())
                }
                b'f' => {
                    self.lex = Lex::Keyword(KeywordLex {
                        lit: "false",
                        matched: 0,
                        start: self.offset,
                    });
                    Ok(())
                }
                b'n' => {
                    self.lex = Lex::Keyword(KeywordLex {
                        lit: "null",
                        matched: 0,
                        start: self.offset,
                    });
                    Ok(())
                }
                _ => Err(self.unexpected(b, "a JSON value")),
            },
            Expect::KeyOrObjectEnd => match b {
                b'"' => {
                    let off = self.consume(i);
                    self.lex = Lex::Str(StrLex::new(true, off));
                    Ok(())
                }
                b'}' => {
                    let off = self.consume(i);
                    let _ = self.frames.pop();
                    self.settle();
                    sink.token(Token::EndObject, off)
                }
                _ => Err(self.unexpected(b, "an object key or '}'")),
            },
            Expect::Key => match b {
                b'"' => {
                    let off = self.consume(i);
                    self.lex = Lex::Str(StrLex::new(true, off));
                    Ok(())
                }
                _ => Err(self.unexpected(b, "an object key")),
            },
            Expect::Colon => match b {
                b':' => {
                    self.consume(i);
                    self.expect = Expect::Value;
                    Ok(())
                }
                _ => Err(self.unexpected(b, "':'")),
            },
            Expect::CommaOrObjectEnd => match b {
                b',' => {
                    self.consume(i);
                    self.expect = Expect::Key;
                    Ok(())
                }
                b'}' => {
                    let off = self.consume(i);
                    let _ = self.frames.pop();
                    self.settle();
                    sink.token(Token::EndObject, off)
                }
                _ => Err(self.unexpected(b, "',' or '}'")),
            },
            Expect::CommaOrArrayEnd => match b {
                b',' => {
                    self.consume(i);
                    self.expect = Expect::Value;
                    Ok(())
                }
                b']' => {
                    let off = self.consume(i);
                    let _ = self.frames.pop();
                    self.settle();
                    sink.token(Token::EndArray, off)
                }
                _ => Err(self.unexpected(b, "',' or ']'")),
            },
        }
    }

    /// Advance through string content. Returns `true` when the closing quote
    /// was consumed.
    fn scan_string(
        &mut self,
        chunk: &[u8],
        i: &mut usize,
        s: &mut StrLex,
        sink: &mut dyn TokenSink,
    ) -> StreamResult<bool> {
        while *i < chunk.len() {
            let b = chunk[*i];
            match s.esc {
                Esc::None => {
                    if b == b'"' {
                        self.consume(i);
                        self.report_growth(s, sink)?;
                        return Ok(true);
                    } else if b == b'\\' {
                        s.esc = Esc::Start;
                        self.consume(i);
                    } else if b < 0x20 {
                        return Err(StreamError::malformed(
                            self.offset,
                            format!("control character {:#04x} in string", b),
                        ));
                    } else {
                        let run_start = *i;
                        while *i < chunk.len() {
                            let c = chunk[*i];
                            if c == b'"' || c == b'\\' || c < 0x20 {
                                break;
                            }
                            *i += 1;
                        }
                        s.buf.extend_from_slice(&chunk[run_start..*i]);
                        self.offset += (*i - run_start) as u64;
                        self.report_growth(s, sink)?;
                    }
                }
                Esc::Start => {
                    let decoded = match b {
                        b'"' => Some(b'"'),
                        b'\\' => Some(b'\\'),
                        b'/' => Some(b'/'),
                        b'b' => Some(0x08),
                        b'f' => Some(0x0c),
                        b'n' => Some(b'\n'),
                        b'r' => Some(b'\r'),
                        b't' => Some(b'\t'),
                        b'u' => None,
                        _ => {
                            return Err(StreamError::malformed(
                                self.offset,
                                format!("invalid escape character {:?}", b as char),
                            ))
                        }
                    };
                    self.consume(i);
                    match decoded {
                        Some(byte) => {
                            s.buf.push(byte);
                            s.esc = Esc::None;
                        }
                        None => s.esc = Esc::Unicode { acc: 0, digits: 0 },
                    }
                }
                Esc::Unicode { acc, digits } => {
                    let h = self.hex_digit(b)?;
                    self.consume(i);
                    let acc = acc * 0x10 + u16::from(h);
                    if digits + 1 < 4 {
                        s.esc = Esc::Unicode {
                            acc,
                            digits: digits + 1,
                        };
                    } else {
                        match acc {
                            0xD800..=0xDBFF => s.esc = Esc::LowSlash { high: acc },
                            0xDC00..=0xDFFF => {
                                return Err(StreamError::malformed(
                                    self.offset,
                                    format!("unpaired UTF-16 low surrogate {:#06x}", acc),
                                ))
                            }
                            _ => {
                                push_code_point(&mut s.buf, u32::from(acc), self.offset)?;
                                s.esc = Esc::None;
                            }
                        }
                    }
                }
                Esc::LowSlash { high } => {
                    if b != b'\\' {
                        return Err(StreamError::malformed(
                            self.offset,
                            "UTF-16 high surrogate not followed by \\uXXXX low surrogate",
                        ));
                    }
                    self.consume(i);
                    s.esc = Esc::LowU { high };
                }
                Esc::LowU { high } => {
                    if b != b'u' {
                        return Err(StreamError::malformed(
                            self.offset,
                            "UTF-16 high surrogate not followed by \\uXXXX low surrogate",
                        ));
                    }
                    self.consume(i);
                    s.esc = Esc::LowUnicode {
                        high,
                        acc: 0,
                        digits: 0,
                    };
                }
                Esc::LowUnicode { high, acc, digits } => {
                    let h = self.hex_digit(b)?;
                    self.consume(i);
                    let acc = acc * 0x10 + u16::from(h);
                    if digits + 1 < 4 {
                        s.esc = Esc::LowUnicode {
                            high,
                            acc,
                            digits: digits + 1,
                        };
                    } else if !(0xDC00..=0xDFFF).contains(&acc) {
                        return Err(StreamError::malformed(
                            self.offset,
                            format!("expected UTF-16 low surrogate, found {:#06x}", acc),
                        ));
                    } else {
                        let cp = 0x1_0000
                            + ((u32::from(high & 0x3FF) << 10) | u32::from(acc & 0x3FF));
                        push_code_point(&mut s.buf, cp, self.offset)?;
                        s.esc = Esc::None;
                    }
                }
            }
        }
        self.report_growth(s, sink)?;
        Ok(false)
    }

    /// Report accumulated string growth to the sink since the last report.
    fn report_growth(&self, s: &mut StrLex, sink: &mut dyn TokenSink) -> StreamResult<()> {
        if s.buf.len() > s.reported {
            let grown = s.buf.len() - s.reported;
            s.reported = s.buf.len();
            sink.string_bytes(grown, self.offset)?;
        }
        Ok(())
    }

    fn hex_digit(&self, b: u8) -> StreamResult<u8> {
        match b {
            b'0'..=b'9' => Ok(b - b'0'),
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            _ => Err(StreamError::malformed(
                self.offset,
                format!("invalid hex digit {:?} in \\u escape", b as char),
            )),
        }
    }

    fn complete_string(&mut self, s: StrLex, sink: &mut dyn TokenSink) -> StreamResult<()> {
        let StrLex {
            buf, is_key, start, ..
        } = s;
        let text = String::from_utf8(buf)
            .map_err(|_| StreamError::malformed(start, "invalid UTF-8 in string"))?;
        if is_key {
            self.expect = Expect::Colon;
            sink.token(Token::Key(text), start)
        } else {
            self.settle();
            sink.token(Token::String(text), start)
        }
    }

    /// Advance through number bytes. Returns `true` when a terminating byte
    /// was seen (which is not consumed).
    fn scan_number(&mut self, chunk: &[u8], i: &mut usize, n: &mut NumLex) -> bool {
        while *i < chunk.len() {
            let b = chunk[*i];
            if matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                n.buf.push(b);
                *i += 1;
                self.offset += 1;
            } else {
                return true;
            }
        }
        false
    }

    fn emit_number(&mut self, n: NumLex, sink: &mut dyn TokenSink) -> StreamResult<()> {
        if !is_valid_number_literal(&n.buf) {
            let literal = String::from_utf8_lossy(&n.buf).into_owned();
            return Err(StreamError::malformed(
                n.start,
                format!("invalid number literal '{}'", literal),
            ));
        }
        let literal = String::from_utf8_lossy(&n.buf).into_owned();
        self.settle();
        sink.token(Token::Number(literal), n.start)
    }

    /// Advance through keyword bytes. Returns `true` when the full literal
    /// matched.
    fn scan_keyword(&mut self, chunk: &[u8], i: &mut usize, k: &mut KeywordLex) -> StreamResult<bool> {
        let lit = k.lit.as_bytes();
        while *i < chunk.len() && k.matched < lit.len() {
            if chunk[*i] != lit[k.matched] {
                return Err(StreamError::malformed(
                    self.offset,
                    format!("invalid literal, expected '{}'", k.lit),
                ));
            }
            self.consume(i);
            k.matched += 1;
        }
        Ok(k.matched == lit.len())
    }

    fn emit_keyword(&mut self, k: KeywordLex, sink: &mut dyn TokenSink) -> StreamResult<()> {
        let token = match k.lit {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => Token::Null,
        };
        self.settle();
        sink.token(token, k.start)
    }
}

impl Tokenizer for JsonTokenizer {
    fn feed(&mut self, chunk: &[u8], sink: &mut dyn TokenSink) -> StreamResult<()> {
        let mut i = 0;
        while i < chunk.len() {
            match std::mem::replace(&mut self.lex, Lex::Ready) {
                Lex::Ready => self.scan_ready(chunk, &mut i, sink)?,
                Lex::Str(mut s) => {
                    if self.scan_string(chunk, &mut i, &mut s, sink)? {
                        self.complete_string(s, sink)?;
                    } else {
                        self.lex = Lex::Str(s);
                    }
                }
                Lex::Number(mut n) => {
                    if self.scan_number(chunk, &mut i, &mut n) {
                        self.emit_number(n, sink)?;
                    } else {
                        self.lex = Lex::Number(n);
                    }
                }
                Lex::Keyword(mut k) => {
                    if self.scan_keyword(chunk, &mut i, &mut k)? {
                        self.emit_keyword(k, sink)?;
                    } else {
                        self.lex = Lex::Keyword(k);
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, sink: &mut dyn TokenSink) -> StreamResult<()> {
        match std::mem::replace(&mut self.lex, Lex::Ready) {
            Lex::Ready => Ok(()),
            Lex::Number(n) => self.emit_number(n, sink),
            Lex::Str(s) => Err(StreamError::malformed(
                s.start,
                "unterminated string at end of input",
            )),
            Lex::Keyword(k) => Err(StreamError::malformed(
                k.start,
                "truncated literal at end of input",
            )),
        }
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}

#[inline]
fn is_json_whitespace(b: u8) -> bool {
    matches!(b, 0x20 | 0x0a | 0x0d | 0x09)
}

fn push_code_point(buf: &mut Vec<u8>, cp: u32, offset: u64) -> StreamResult<()> {
    let c = char::from_u32(cp).ok_or_else(|| {
        StreamError::malformed(offset, format!("invalid code point {:#x} in \\u escape", cp))
    })?;
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
    Ok(())
}

/// Validate a complete number literal against the JSON grammar.
fn is_valid_number_literal(s: &[u8]) -> bool {
    let len = s.len();
    let mut i = 0;
    if i < len && s[i] == b'-' {
        i += 1;
    }
    if i >= len {
        return false;
    }
    match s[i] {
        b'0' => i += 1,
        b'1'..=b'9' => {
            while i < len && s[i].is_ascii_digit() {
                i += 1;
            }
        }
        _ => return false,
    }
    if i < len && s[i] == b'.' {
        i += 1;
        let fraction = i;
        while i < len && s[i].is_ascii_digit() {
            i += 1;
        }
        if i == fraction {
            return false;
        }
    }
    if i < len && (s[i] == b'e' || s[i] == b'E') {
        i += 1;
        if i < len && (s[i] == b'+' || s[i] == b'-') {
            i += 1;
        }
        let exponent = i;
        while i < len && s[i].is_ascii_digit() {
            i += 1;
        }
        if i == exponent {
            return false;
        }
    }
    i == len
}
