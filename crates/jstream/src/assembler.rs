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

//! Top-level entity assembly.
//!
//! [`Assembler`] folds the low-level [`Event`] stream into high-level
//! [`EntityEvent`]s: each direct child of the document root is materialized
//! into a complete [`JsonValue`] and emitted the moment it closes. The root
//! container itself is never built; it only marks which stream wrapper
//! events (`object_stream_*` or `array_stream_*`) frame the output.
//!
//! Memory therefore stays bounded by the largest single top-level entity,
//! not the document: once a pair or element is emitted, its storage is
//! handed to the listener and dropped.

use crate::engine::ContainerKind;
use crate::error::{StreamError, StreamResult};
use crate::event::{EntityEvent, Event};
use crate::value::JsonValue;

#[derive(Debug)]
enum Construction {
    Object(Vec<(String, JsonValue)>),
    Array(Vec<JsonValue>),
}

impl Construction {
    fn into_value(self) -> JsonValue {
        match self {
            Self::Object(members) => JsonValue::Object(members),
            Self::Array(items) => JsonValue::Array(items),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Assembler {
    root: Option<ContainerKind>,
    root_closed: bool,
    stack: Vec<Construction>,
    keys: Vec<String>,
}

impl Assembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fold one low-level event, appending any completed entities to `out`.
    pub(crate) fn process(
        &mut self,
        event: &Event,
        out: &mut Vec<EntityEvent>,
    ) -> StreamResult<()> {
        match event {
            Event::DocStart => {
                self.root = None;
                self.root_closed = false;
                self.stack.clear();
                self.keys.clear();
                Ok(())
            }
            Event::DocEnd => {
                // Forced end of input closes the wrapper of a still-open root.
                if !self.root_closed {
                    self.emit_stream_end(out);
                }
                Ok(())
            }
            Event::ObjectStart => {
                if self.root.is_none() {
                    self.root = Some(ContainerKind::Object);
                    out.push(EntityEvent::ObjectStreamStart);
                } else {
                    self.stack.push(Construction::Object(Vec::new()));
                }
                Ok(())
            }
            Event::ArrayStart => {
                if self.root.is_none() {
                    self.root = Some(ContainerKind::Array);
                    out.push(EntityEvent::ArrayStreamStart);
                } else {
                    self.stack.push(Construction::Array(Vec::new()));
                }
                Ok(())
            }
            Event::ObjectEnd | Event::ArrayEnd => match self.stack.pop() {
                Some(construction) => self.attach(construction.into_value(), out),
                None => {
                    self.emit_stream_end(out);
                    Ok(())
                }
            },
            Event::Key(name) => {
                self.keys.push(name.clone());
                Ok(())
            }
            Event::Value(scalar) | Event::Element(scalar) => {
                self.attach(JsonValue::from(scalar.clone()), out)
            }
        }
    }

    /// Attach a completed value to its parent, or emit it if the parent is
    /// the root.
    fn attach(&mut self, value: JsonValue, out: &mut Vec<EntityEvent>) -> StreamResult<()> {
        match self.stack.last_mut() {
            Some(Construction::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Construction::Object(members)) => {
                let key = self
                    .keys
                    .pop()
                    .ok_or_else(|| StreamError::misuse("value event without a pending key"))?;
                members.push((key, value));
                Ok(())
            }
            None => match self.root {
                Some(ContainerKind::Object) => {
                    let key = self.pop_key()?;
                    out.push(EntityEvent::Pair { key, value });
                    Ok(())
                }
                Some(ContainerKind::Array) | None => {
                    out.push(EntityEvent::Element(value));
                    Ok(())
                }
            },
        }
    }

    fn pop_key(&mut self) -> StreamResult<String> {
        self.keys
            .pop()
            .ok_or_else(|| StreamError::misuse("value event without a pending key"))
    }

    fn emit_stream_end(&mut self, out: &mut Vec<EntityEvent>) {
        match self.root {
            Some(ContainerKind::Object) => out.push(EntityEvent::ObjectStreamEnd),
            Some(ContainerKind::Array) => out.push(EntityEvent::ArrayStreamEnd),
            None => {}
        }
        self.root_closed = true;
    }
}
