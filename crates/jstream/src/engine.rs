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

//! Token-to-event state machine.
//!
//! [`EventEngine`] consumes [`Token`]s and produces the low-level [`Event`]
//! stream. It tracks the nesting context (which container each token lands
//! in) so that a scalar becomes a `value` inside an object and an `element`
//! inside an array, and it owns the document lifecycle: `doc_start` on the
//! first token, `doc_end` when the root closes, then quiescence until fresh
//! input starts the next document.
//!
//! Resource guards live here as well: the nesting-depth limit is checked
//! before any container frame is pushed, and the string-size limit is fed by
//! the tokenizer's growth notifications so it can fire while a string is
//! still accumulating.

use crate::error::{StreamError, StreamResult};
use crate::event::Event;
use crate::tokenizer::Token;
use crate::value::Scalar;

/// The kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ContainerKind {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    kind: ContainerKind,
    pending_key: bool,
}

#[derive(Debug)]
pub(crate) struct EventEngine {
    stack: Vec<Frame>,
    started: bool,
    string_bytes: usize,
    max_depth: Option<usize>,
    max_string_size: Option<usize>,
}

impl EventEngine {
    pub(crate) fn new(max_depth: Option<usize>, max_string_size: Option<usize>) -> Self {
        Self {
            stack: Vec::new(),
            started: false,
            string_bytes: 0,
            max_depth,
            max_string_size,
        }
    }

    /// Count string growth against the size limit.
    ///
    /// Called by the tokenizer while a string or key is accumulating; the
    /// counter resets when the completed token arrives, so the limit applies
    /// to each string individually.
    pub(crate) fn accumulate_string(&mut self, len: usize, offset: u64) -> StreamResult<()> {
        self.string_bytes += len;
        if let Some(limit) = self.max_string_size {
            if self.string_bytes > limit {
                return Err(StreamError::StringTooLarge { limit, offset });
            }
        }
        Ok(())
    }

    /// Translate one token into events, appended to `out`.
    pub(crate) fn process(
        &mut self,
        token: Token,
        offset: u64,
        out: &mut Vec<Event>,
    ) -> StreamResult<()> {
        if !self.started {
            self.started = true;
            out.push(Event::DocStart);
        }
        self.string_bytes = 0;
        match token {
            Token::StartObject => {
                self.check_depth(offset)?;
                self.stack.push(Frame {
                    kind: ContainerKind::Object,
                    pending_key: false,
                });
                out.push(Event::ObjectStart);
                Ok(())
            }
            Token::StartArray => {
                self.check_depth(offset)?;
                self.stack.push(Frame {
                    kind: ContainerKind::Array,
                    pending_key: false,
                });
                out.push(Event::ArrayStart);
                Ok(())
            }
            Token::EndObject => {
                let _ = self.stack.pop();
                out.push(Event::ObjectEnd);
                self.close_doc_if_root(out);
                Ok(())
            }
            Token::EndArray => {
                let _ = self.stack.pop();
                out.push(Event::ArrayEnd);
                self.close_doc_if_root(out);
                Ok(())
            }
            Token::Key(name) => match self.stack.last_mut() {
                Some(frame) if frame.kind == ContainerKind::Object && !frame.pending_key => {
                    frame.pending_key = true;
                    out.push(Event::Key(name));
                    Ok(())
                }
                _ => Err(StreamError::malformed(offset, "unexpected object key")),
            },
            scalar => {
                let value = scalar_from_token(scalar, offset)?;
                match self.stack.last_mut() {
                    Some(frame) if frame.kind == ContainerKind::Object => {
                        frame.pending_key = false;
                        out.push(Event::Value(value));
                    }
                    Some(_) => out.push(Event::Element(value)),
                    None => {
                        out.push(Event::Element(value));
                        out.push(Event::DocEnd);
                        self.started = false;
                    }
                }
                Ok(())
            }
        }
    }

    /// Force `doc_end` for a document that is still open at end of input.
    pub(crate) fn finish(&mut self, out: &mut Vec<Event>) {
        if self.started {
            out.push(Event::DocEnd);
            self.started = false;
        }
        self.stack.clear();
        self.string_bytes = 0;
    }

    fn close_doc_if_root(&mut self, out: &mut Vec<Event>) {
        if self.stack.is_empty() {
            out.push(Event::DocEnd);
            self.started = false;
        }
    }

    fn check_depth(&self, offset: u64) -> StreamResult<()> {
        if let Some(limit) = self.max_depth {
            if self.stack.len() >= limit {
                return Err(StreamError::DepthExceeded { limit, offset });
            }
        }
        Ok(())
    }
}

fn scalar_from_token(token: Token, offset: u64) -> StreamResult<Scalar> {
    match token {
        Token::String(s) => Ok(Scalar::String(s)),
        Token::Number(literal) => Scalar::from_number_literal(&literal).ok_or_else(|| {
            StreamError::malformed(offset, format!("invalid number literal '{}'", literal))
        }),
        Token::Bool(b) => Ok(Scalar::Bool(b)),
        Token::Null => Ok(Scalar::Null),
        other => Err(StreamError::malformed(
            offset,
            format!("unexpected token {:?}", other),
        )),
    }
}
