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

//! Event definitions.
//!
//! Two closed event sets are emitted by the two streamers:
//!
//! - [`Event`]: the low-level structural stream produced by
//!   [`JsonStreamer`](crate::JsonStreamer). One event per structural element
//!   of the document, in input order.
//! - [`EntityEvent`]: the high-level stream produced by
//!   [`ObjectStreamer`](crate::ObjectStreamer). Top-level pairs and elements
//!   arrive fully materialized; nothing below the top level is exposed.
//!
//! Each event has a matching kind ([`EventKind`], [`EntityEventKind`]) used
//! to register listeners for just that event, and a stable wire name
//! (`"doc_start"`, `"pair"`, ...) reported to catch-all listeners.

use crate::value::{JsonValue, Scalar};

/// A low-level parse event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new document began.
    DocStart,
    /// The current document ended.
    DocEnd,
    /// `{` opened an object.
    ObjectStart,
    /// `}` closed the innermost object.
    ObjectEnd,
    /// `[` opened an array.
    ArrayStart,
    /// `]` closed the innermost array.
    ArrayEnd,
    /// An object key.
    Key(String),
    /// A scalar value inside an object.
    Value(Scalar),
    /// A scalar element inside an array, or a bare top-level scalar.
    Element(Scalar),
}

impl Event {
    /// The kind tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DocStart => EventKind::DocStart,
            Self::DocEnd => EventKind::DocEnd,
            Self::ObjectStart => EventKind::ObjectStart,
            Self::ObjectEnd => EventKind::ObjectEnd,
            Self::ArrayStart => EventKind::ArrayStart,
            Self::ArrayEnd => EventKind::ArrayEnd,
            Self::Key(_) => EventKind::Key,
            Self::Value(_) => EventKind::Value,
            Self::Element(_) => EventKind::Element,
        }
    }

    /// The stable wire name of this event.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Kind tag for [`Event`], used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DocStart,
    DocEnd,
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Key,
    Value,
    Element,
}

impl EventKind {
    /// The stable wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::DocStart => "doc_start",
            Self::DocEnd => "doc_end",
            Self::ObjectStart => "object_start",
            Self::ObjectEnd => "object_end",
            Self::ArrayStart => "array_start",
            Self::ArrayEnd => "array_end",
            Self::Key => "key",
            Self::Value => "value",
            Self::Element => "element",
        }
    }
}

/// A high-level, top-level-entity event.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    /// The document root is an object.
    ObjectStreamStart,
    /// The root object closed.
    ObjectStreamEnd,
    /// The document root is an array.
    ArrayStreamStart,
    /// The root array closed.
    ArrayStreamEnd,
    /// A complete top-level key/value pair of a root object.
    Pair { key: String, value: JsonValue },
    /// A complete top-level element of a root array, or a bare top-level
    /// scalar.
    Element(JsonValue),
}

impl EntityEvent {
    /// The kind tag of this event.
    pub fn kind(&self) -> EntityEventKind {
        match self {
            Self::ObjectStreamStart => EntityEventKind::ObjectStreamStart,
            Self::ObjectStreamEnd => EntityEventKind::ObjectStreamEnd,
            Self::ArrayStreamStart => EntityEventKind::ArrayStreamStart,
            Self::ArrayStreamEnd => EntityEventKind::ArrayStreamEnd,
            Self::Pair { .. } => EntityEventKind::Pair,
            Self::Element(_) => EntityEventKind::Element,
        }
    }

    /// The stable wire name of this event.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Kind tag for [`EntityEvent`], used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    ObjectStreamStart,
    ObjectStreamEnd,
    ArrayStreamStart,
    ArrayStreamEnd,
    Pair,
    Element,
}

impl EntityEventKind {
    /// The stable wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::ObjectStreamStart => "object_stream_start",
            Self::ObjectStreamEnd => "object_stream_end",
            Self::ArrayStreamStart => "array_stream_start",
            Self::ArrayStreamEnd => "array_stream_end",
            Self::Pair => "pair",
            Self::Element => "element",
        }
    }
}
