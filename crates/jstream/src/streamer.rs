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

//! The two push-parser entry points.
//!
//! [`JsonStreamer`] emits the low-level structural [`Event`] stream;
//! [`ObjectStreamer`] emits the high-level [`EntityEvent`] stream of
//! materialized top-level pairs and elements. Both accept input in arbitrary
//! fragments through [`feed`](JsonStreamer::feed) and are sealed with
//! [`finalize`](JsonStreamer::finalize); the emitted event sequence depends
//! only on the concatenated bytes, never on fragment boundaries.
//!
//! # Lifecycle
//!
//! A streamer is **open** after construction. A terminal parse error
//! (malformed input, depth, or string-size violation) **poisons** it;
//! `finalize` **closes** it. Feeding a poisoned or closed streamer fails
//! with [`StreamError::ProtocolMisuse`]. The [`scoped`](JsonStreamer::scoped)
//! form runs a closure against a fresh streamer and guarantees finalize on
//! every exit path.
//!
//! # Examples
//!
//! ```rust
//! use jstream::{Event, EventKind, JsonStreamer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&keys);
//!
//! let mut streamer = JsonStreamer::new();
//! streamer.add_listener(EventKind::Key, move |event| {
//!     if let Event::Key(name) = event {
//!         sink.borrow_mut().push(name.clone());
//!     }
//!     Ok(())
//! });
//!
//! streamer.feed(br#"{"a": 1, "#)?;
//! streamer.feed(br#""b": 2}"#)?;
//! streamer.finalize()?;
//!
//! assert_eq!(keys.borrow().as_slice(), &["a", "b"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::assembler::Assembler;
use crate::buffer::StreamBuffer;
use crate::engine::EventEngine;
use crate::error::{StreamError, StreamResult};
use crate::event::{EntityEvent, EntityEventKind, Event, EventKind};
use crate::listener::{
    dispatch_entity_handler, dispatch_json_handler, Dispatcher, EntityEventHandler,
    JsonEventHandler, ListenerId, ListenerResult,
};
use crate::tokenizer::{JsonTokenizer, Token, TokenSink, Tokenizer};

/// Default drain chunk size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Configuration for [`JsonStreamer`] and [`ObjectStreamer`].
///
/// All limits are explicit at construction; nothing is reconfigurable
/// mid-stream.
///
/// # Examples
///
/// ```rust
/// use jstream::{JsonStreamer, StreamerConfig};
///
/// let config = StreamerConfig {
///     max_depth: Some(32),
///     ..Default::default()
/// };
/// let streamer = JsonStreamer::with_config(config);
/// assert!(streamer.is_open());
/// ```
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Maximum container nesting depth, or `None` for unlimited.
    ///
    /// Default: `None`.
    pub max_depth: Option<usize>,

    /// Maximum decoded size of a single string or key in bytes, or `None`
    /// for unlimited.
    ///
    /// Default: `None`.
    pub max_string_size: Option<usize>,

    /// How many buffered bytes are handed to the tokenizer per drain.
    ///
    /// Default: 65536.
    pub buffer_size: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_string_size: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl StreamerConfig {
    /// A preset with conservative limits for input from untrusted sources:
    /// depth 100, strings up to 10 MB.
    pub fn untrusted() -> Self {
        Self {
            max_depth: Some(100),
            max_string_size: Some(10 * 1024 * 1024),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Open,
    Poisoned,
    Closed,
}

fn ensure_open(phase: Phase, call: &str) -> StreamResult<()> {
    match phase {
        Phase::Open => Ok(()),
        Phase::Closed => Err(StreamError::misuse(format!(
            "{} called after finalize",
            call
        ))),
        Phase::Poisoned => Err(StreamError::misuse(format!(
            "{} called after a terminal parse error",
            call
        ))),
    }
}

fn fire_event(
    listeners: &mut Dispatcher<Event, EventKind>,
    handlers: &mut [Box<dyn JsonEventHandler>],
    event: &Event,
) -> StreamResult<()> {
    let name = event.name();
    listeners.fire_kind(event.kind(), name, event)?;
    for handler in handlers.iter_mut() {
        dispatch_json_handler(handler.as_mut(), event)
            .map_err(|source| StreamError::Listener { event: name, source })?;
    }
    listeners.fire_catch_all(name, event)
}

fn fire_entity_event(
    listeners: &mut Dispatcher<EntityEvent, EntityEventKind>,
    handlers: &mut [Box<dyn EntityEventHandler>],
    event: &EntityEvent,
) -> StreamResult<()> {
    let name = event.name();
    listeners.fire_kind(event.kind(), name, event)?;
    for handler in handlers.iter_mut() {
        dispatch_entity_handler(handler.as_mut(), event)
            .map_err(|source| StreamError::Listener { event: name, source })?;
    }
    listeners.fire_catch_all(name, event)
}

/// Sink wiring the tokenizer to the engine and the low-level dispatch chain.
struct EngineSink<'a> {
    engine: &'a mut EventEngine,
    listeners: &'a mut Dispatcher<Event, EventKind>,
    handlers: &'a mut Vec<Box<dyn JsonEventHandler>>,
    scratch: &'a mut Vec<Event>,
}

impl TokenSink for EngineSink<'_> {
    fn token(&mut self, token: Token, offset: u64) -> StreamResult<()> {
        self.scratch.clear();
        self.engine.process(token, offset, self.scratch)?;
        for event in self.scratch.drain(..) {
            fire_event(self.listeners, self.handlers, &event)?;
        }
        Ok(())
    }

    fn string_bytes(&mut self, len: usize, offset: u64) -> StreamResult<()> {
        self.engine.accumulate_string(len, offset)
    }
}

/// Sink wiring the tokenizer through the engine and assembler to the
/// high-level dispatch chain.
struct AssemblerSink<'a> {
    engine: &'a mut EventEngine,
    assembler: &'a mut Assembler,
    listeners: &'a mut Dispatcher<EntityEvent, EntityEventKind>,
    handlers: &'a mut Vec<Box<dyn EntityEventHandler>>,
    events: &'a mut Vec<Event>,
    entities: &'a mut Vec<EntityEvent>,
}

impl TokenSink for AssemblerSink<'_> {
    fn token(&mut self, token: Token, offset: u64) -> StreamResult<()> {
        self.events.clear();
        self.engine.process(token, offset, self.events)?;
        for event in self.events.drain(..) {
            self.entities.clear();
            self.assembler.process(&event, self.entities)?;
            for entity in self.entities.drain(..) {
                fire_entity_event(self.listeners, self.handlers, &entity)?;
            }
        }
        Ok(())
    }

    fn string_bytes(&mut self, len: usize, offset: u64) -> StreamResult<()> {
        self.engine.accumulate_string(len, offset)
    }
}

/// Low-level push parser emitting one [`Event`] per structural element.
///
/// See the [module documentation](self) for the lifecycle and an example.
pub struct JsonStreamer {
    config: StreamerConfig,
    buffer: StreamBuffer,
    tokenizer: JsonTokenizer,
    engine: EventEngine,
    listeners: Dispatcher<Event, EventKind>,
    handlers: Vec<Box<dyn JsonEventHandler>>,
    scratch: Vec<Event>,
    phase: Phase,
}

impl Default for JsonStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonStreamer {
    /// Create a streamer with default configuration (no limits).
    pub fn new() -> Self {
        Self::with_config(StreamerConfig::default())
    }

    /// Create a streamer with the given configuration.
    pub fn with_config(mut config: StreamerConfig) -> Self {
        // A zero drain size would stall the pump loop.
        config.buffer_size = config.buffer_size.max(1);
        let engine = EventEngine::new(config.max_depth, config.max_string_size);
        Self {
            config,
            buffer: StreamBuffer::new(),
            tokenizer: JsonTokenizer::new(),
            engine,
            listeners: Dispatcher::new(),
            handlers: Vec::new(),
            scratch: Vec::new(),
            phase: Phase::Open,
        }
    }

    /// Run `f` against a fresh streamer, finalizing on every exit path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jstream::{JsonStreamer, StreamerConfig};
    ///
    /// let result = JsonStreamer::scoped(StreamerConfig::default(), |streamer| {
    ///     streamer.feed(br#"{"done": true}"#)
    /// });
    /// assert!(result.is_ok());
    /// ```
    pub fn scoped<T>(
        config: StreamerConfig,
        f: impl FnOnce(&mut JsonStreamer) -> StreamResult<T>,
    ) -> StreamResult<T> {
        let mut streamer = JsonStreamer::with_config(config);
        match f(&mut streamer) {
            Ok(value) => {
                if streamer.is_open() {
                    streamer.finalize()?;
                }
                Ok(value)
            }
            Err(err) => {
                if streamer.is_open() {
                    let _ = streamer.finalize();
                }
                Err(err)
            }
        }
    }

    /// Register a listener for one event kind. Returns a handle for removal.
    pub fn add_listener(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&Event) -> ListenerResult + 'static,
    ) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    /// Register a listener that receives every event with its wire name.
    pub fn add_catch_all_listener(
        &mut self,
        listener: impl FnMut(&str, &Event) -> ListenerResult + 'static,
    ) -> ListenerId {
        self.listeners.add_catch_all(listener)
    }

    /// Remove a previously registered listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Bind a typed handler whose `on_*` methods are called per event.
    pub fn bind(&mut self, handler: impl JsonEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Feed an input fragment, dispatching all events it completes.
    ///
    /// # Errors
    ///
    /// Terminal parse errors poison the streamer. A
    /// [`StreamError::Listener`] fault aborts dispatch for the current feed
    /// but leaves the streamer usable; unconsumed bytes stay buffered.
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<()> {
        ensure_open(self.phase, "feed")?;
        self.buffer.append(bytes);
        let result = self.pump();
        self.poison_on_terminal(&result);
        result
    }

    /// Seal the stream: process everything buffered, flush pending lexemes,
    /// and force `doc_end` for a document still open at end of input.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::MalformedInput`] if the input ends inside a
    /// string or keyword, and with [`StreamError::ProtocolMisuse`] if the
    /// streamer is already finalized or poisoned.
    pub fn finalize(&mut self) -> StreamResult<()> {
        ensure_open(self.phase, "finalize")?;
        self.buffer.finalize();
        let result = self.finish_inner();
        self.phase = match &result {
            Err(err) if err.is_terminal() => Phase::Poisoned,
            _ => Phase::Closed,
        };
        result
    }

    /// Whether the streamer still accepts input.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Whether `finalize` completed.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Closed
    }

    fn pump(&mut self) -> StreamResult<()> {
        loop {
            let chunk = self.buffer.drain(self.config.buffer_size);
            if chunk.is_empty() {
                return Ok(());
            }
            let base = self.tokenizer.offset();
            let mut sink = EngineSink {
                engine: &mut self.engine,
                listeners: &mut self.listeners,
                handlers: &mut self.handlers,
                scratch: &mut self.scratch,
            };
            if let Err(err) = self.tokenizer.feed(&chunk, &mut sink) {
                // Keep what the tokenizer did not consume so a recoverable
                // listener fault can resume on the next feed.
                let consumed = (self.tokenizer.offset() - base) as usize;
                if consumed < chunk.len() {
                    self.buffer.requeue(&chunk[consumed..]);
                }
                return Err(err);
            }
        }
    }

    fn finish_inner(&mut self) -> StreamResult<()> {
        self.pump()?;
        let mut sink = EngineSink {
            engine: &mut self.engine,
            listeners: &mut self.listeners,
            handlers: &mut self.handlers,
            scratch: &mut self.scratch,
        };
        self.tokenizer.finish(&mut sink)?;
        let mut forced = Vec::new();
        self.engine.finish(&mut forced);
        for event in &forced {
            fire_event(&mut self.listeners, &mut self.handlers, event)?;
        }
        Ok(())
    }

    fn poison_on_terminal(&mut self, result: &StreamResult<()>) {
        if let Err(err) = result {
            if err.is_terminal() {
                self.phase = Phase::Poisoned;
            }
        }
    }
}

/// High-level push parser emitting materialized top-level entities.
///
/// For a root object it emits `object_stream_start`, one
/// [`EntityEvent::Pair`] per top-level member, then `object_stream_end`; for
/// a root array, `array_stream_start`/[`EntityEvent::Element`]s/
/// `array_stream_end`; a bare top-level scalar is a single `element` with no
/// wrappers. At most one top-level entity is held in memory at a time.
///
/// # Examples
///
/// ```rust
/// use jstream::{EntityEvent, EntityEventKind, ObjectStreamer};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pairs = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&pairs);
///
/// let mut streamer = ObjectStreamer::new();
/// streamer.add_listener(EntityEventKind::Pair, move |event| {
///     if let EntityEvent::Pair { key, value } = event {
///         sink.borrow_mut().push(format!("{}={}", key, value));
///     }
///     Ok(())
/// });
///
/// streamer.feed(br#"{"a": 1, "b": [2, 3]}"#)?;
/// streamer.finalize()?;
///
/// assert_eq!(pairs.borrow().as_slice(), &["a=1", "b=[2,3]"]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct ObjectStreamer {
    config: StreamerConfig,
    buffer: StreamBuffer,
    tokenizer: JsonTokenizer,
    engine: EventEngine,
    assembler: Assembler,
    listeners: Dispatcher<EntityEvent, EntityEventKind>,
    handlers: Vec<Box<dyn EntityEventHandler>>,
    events: Vec<Event>,
    entities: Vec<EntityEvent>,
    phase: Phase,
}

impl Default for ObjectStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStreamer {
    /// Create a streamer with default configuration (no limits).
    pub fn new() -> Self {
        Self::with_config(StreamerConfig::default())
    }

    /// Create a streamer with the given configuration.
    pub fn with_config(mut config: StreamerConfig) -> Self {
        config.buffer_size = config.buffer_size.max(1);
        let engine = EventEngine::new(config.max_depth, config.max_string_size);
        Self {
            config,
            buffer: StreamBuffer::new(),
            tokenizer: JsonTokenizer::new(),
            engine,
            assembler: Assembler::new(),
            listeners: Dispatcher::new(),
            handlers: Vec::new(),
            events: Vec::new(),
            entities: Vec::new(),
            phase: Phase::Open,
        }
    }

    /// Run `f` against a fresh streamer, finalizing on every exit path.
    pub fn scoped<T>(
        config: StreamerConfig,
        f: impl FnOnce(&mut ObjectStreamer) -> StreamResult<T>,
    ) -> StreamResult<T> {
        let mut streamer = ObjectStreamer::with_config(config);
        match f(&mut streamer) {
            Ok(value) => {
                if streamer.is_open() {
                    streamer.finalize()?;
                }
                Ok(value)
            }
            Err(err) => {
                if streamer.is_open() {
                    let _ = streamer.finalize();
                }
                Err(err)
            }
        }
    }

    /// Register a listener for one entity-event kind.
    pub fn add_listener(
        &mut self,
        kind: EntityEventKind,
        listener: impl FnMut(&EntityEvent) -> ListenerResult + 'static,
    ) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    /// Register a listener that receives every entity event with its wire
    /// name.
    pub fn add_catch_all_listener(
        &mut self,
        listener: impl FnMut(&str, &EntityEvent) -> ListenerResult + 'static,
    ) -> ListenerId {
        self.listeners.add_catch_all(listener)
    }

    /// Remove a previously registered listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Bind a typed handler whose `on_*` methods are called per event.
    pub fn bind(&mut self, handler: impl EntityEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Feed an input fragment, dispatching all entities it completes.
    ///
    /// # Errors
    ///
    /// Same contract as [`JsonStreamer::feed`].
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<()> {
        ensure_open(self.phase, "feed")?;
        self.buffer.append(bytes);
        let result = self.pump();
        self.poison_on_terminal(&result);
        result
    }

    /// Seal the stream, forcing the terminating stream-end events for a
    /// document still open at end of input.
    ///
    /// # Errors
    ///
    /// Same contract as [`JsonStreamer::finalize`].
    pub fn finalize(&mut self) -> StreamResult<()> {
        ensure_open(self.phase, "finalize")?;
        self.buffer.finalize();
        let result = self.finish_inner();
        self.phase = match &result {
            Err(err) if err.is_terminal() => Phase::Poisoned,
            _ => Phase::Closed,
        };
        result
    }

    /// Whether the streamer still accepts input.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Whether `finalize` completed.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Closed
    }

    fn pump(&mut self) -> StreamResult<()> {
        loop {
            let chunk = self.buffer.drain(self.config.buffer_size);
            if chunk.is_empty() {
                return Ok(());
            }
            let base = self.tokenizer.offset();
            let mut sink = AssemblerSink {
                engine: &mut self.engine,
                assembler: &mut self.assembler,
                listeners: &mut self.listeners,
                handlers: &mut self.handlers,
                events: &mut self.events,
                entities: &mut self.entities,
            };
            if let Err(err) = self.tokenizer.feed(&chunk, &mut sink) {
                let consumed = (self.tokenizer.offset() - base) as usize;
                if consumed < chunk.len() {
                    self.buffer.requeue(&chunk[consumed..]);
                }
                return Err(err);
            }
        }
    }

    fn finish_inner(&mut self) -> StreamResult<()> {
        self.pump()?;
        let mut sink = AssemblerSink {
            engine: &mut self.engine,
            assembler: &mut self.assembler,
            listeners: &mut self.listeners,
            handlers: &mut self.handlers,
            events: &mut self.events,
            entities: &mut self.entities,
        };
        self.tokenizer.finish(&mut sink)?;
        let mut forced = Vec::new();
        self.engine.finish(&mut forced);
        for event in &forced {
            let mut entities = Vec::new();
            self.assembler.process(event, &mut entities)?;
            for entity in &entities {
                fire_entity_event(&mut self.listeners, &mut self.handlers, entity)?;
            }
        }
        Ok(())
    }

    fn poison_on_terminal(&mut self, result: &StreamResult<()>) {
        if let Err(err) = result {
            if err.is_terminal() {
                self.phase = Phase::Poisoned;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{JsonValue, Scalar};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event_collector(streamer: &mut JsonStreamer) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        streamer.add_catch_all_listener(move |_, event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
        events
    }

    // ==================== Config tests ====================

    #[test]
    fn test_default_config() {
        let config = StreamerConfig::default();
        assert_eq!(config.max_depth, None);
        assert_eq!(config.max_string_size, None);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_untrusted_preset() {
        let config = StreamerConfig::untrusted();
        assert_eq!(config.max_depth, Some(100));
        assert_eq!(config.max_string_size, Some(10 * 1024 * 1024));
    }

    #[test]
    fn test_zero_buffer_size_is_clamped() {
        let mut streamer = JsonStreamer::with_config(StreamerConfig {
            buffer_size: 0,
            ..Default::default()
        });
        let events = event_collector(&mut streamer);
        streamer.feed(b"[1]").unwrap();
        streamer.finalize().unwrap();
        assert!(!events.borrow().is_empty());
    }

    // ==================== Lifecycle tests ====================

    #[test]
    fn test_feed_after_finalize_is_misuse() {
        let mut streamer = JsonStreamer::new();
        streamer.feed(b"[1]").unwrap();
        streamer.finalize().unwrap();
        let err = streamer.feed(b"[2]").unwrap_err();
        assert!(matches!(err, StreamError::ProtocolMisuse(_)));
    }

    #[test]
    fn test_double_finalize_is_misuse() {
        let mut streamer = JsonStreamer::new();
        streamer.finalize().unwrap();
        assert!(matches!(
            streamer.finalize(),
            Err(StreamError::ProtocolMisuse(_))
        ));
    }

    #[test]
    fn test_terminal_error_poisons() {
        let mut streamer = JsonStreamer::new();
        assert!(streamer.feed(b"{nope}").is_err());
        assert!(!streamer.is_open());
        let err = streamer.feed(b"{}").unwrap_err();
        assert!(matches!(err, StreamError::ProtocolMisuse(_)));
        assert!(matches!(
            streamer.finalize(),
            Err(StreamError::ProtocolMisuse(_))
        ));
    }

    #[test]
    fn test_scoped_finalizes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        JsonStreamer::scoped(StreamerConfig::default(), |streamer| {
            streamer.add_catch_all_listener(move |name, _| {
                sink.borrow_mut().push(name.to_string());
                Ok(())
            });
            // The document stays open; scoped finalize must close it.
            streamer.feed(b"{\"a\": 1")
        })
        .unwrap();
        assert_eq!(events.borrow().last().map(String::as_str), Some("doc_end"));
    }

    #[test]
    fn test_scoped_propagates_closure_error() {
        let result: StreamResult<()> = JsonStreamer::scoped(StreamerConfig::default(), |s| {
            s.feed(b"not json")?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_scoped_tolerates_explicit_finalize() {
        let result = JsonStreamer::scoped(StreamerConfig::default(), |s| {
            s.feed(b"[1]")?;
            s.finalize()
        });
        assert!(result.is_ok());
    }

    // ==================== Listener fault tests ====================

    #[test]
    fn test_listener_fault_is_recoverable() {
        let mut streamer = JsonStreamer::new();
        let fired = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&fired);
        streamer.add_listener(EventKind::Value, move |_| {
            *counter.borrow_mut() += 1;
            if *counter.borrow() == 1 {
                Err("first value rejected".into())
            } else {
                Ok(())
            }
        });

        let err = streamer.feed(br#"{"a": 1, "b": 2}"#).unwrap_err();
        assert!(matches!(err, StreamError::Listener { .. }));
        assert!(streamer.is_open());

        // The remaining buffered input parses on the next feed.
        streamer.feed(b"").unwrap();
        streamer.finalize().unwrap();
        assert_eq!(*fired.borrow(), 2);
    }

    // ==================== ObjectStreamer smoke tests ====================

    #[test]
    fn test_object_streamer_pairs() {
        let pairs = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pairs);
        let mut streamer = ObjectStreamer::new();
        streamer.add_listener(EntityEventKind::Pair, move |event| {
            if let EntityEvent::Pair { key, value } = event {
                sink.borrow_mut().push((key.clone(), value.clone()));
            }
            Ok(())
        });
        streamer.feed(br#"{"a": 1, "b": 2}"#).unwrap();
        streamer.finalize().unwrap();
        assert_eq!(
            pairs.borrow().as_slice(),
            &[
                ("a".to_string(), JsonValue::Scalar(Scalar::Int(1))),
                ("b".to_string(), JsonValue::Scalar(Scalar::Int(2))),
            ]
        );
    }

    #[test]
    fn test_object_streamer_feed_after_finalize_is_misuse() {
        let mut streamer = ObjectStreamer::new();
        streamer.feed(b"[]").unwrap();
        streamer.finalize().unwrap();
        assert!(matches!(
            streamer.feed(b"[]"),
            Err(StreamError::ProtocolMisuse(_))
        ));
    }

    #[test]
    fn test_object_streamer_scoped_forces_stream_end() {
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        ObjectStreamer::scoped(StreamerConfig::default(), |streamer| {
            streamer.add_catch_all_listener(move |name, _| {
                sink.borrow_mut().push(name.to_string());
                Ok(())
            });
            streamer.feed(br#"{"a": 1"#)
        })
        .unwrap();
        assert_eq!(
            names.borrow().as_slice(),
            &["object_stream_start", "pair", "object_stream_end"]
        );
    }
}
