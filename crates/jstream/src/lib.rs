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

//! Streaming JSON Event Engine
//!
//! This crate parses JSON that arrives in arbitrary fragments - network
//! reads, file chunks, byte-at-a-time - and pushes typed events to
//! registered listeners as soon as they are decidable. Nothing is buffered
//! beyond the unprocessed input remainder and the entity currently under
//! construction, so multi-GB documents stream in bounded memory.
//!
//! # The two streamers
//!
//! - [`JsonStreamer`] emits one low-level [`Event`] per structural element:
//!   `doc_start`, `object_start`, `key`, `value`, `element`, and so on, in
//!   input order.
//! - [`ObjectStreamer`] emits high-level [`EntityEvent`]s: each top-level
//!   pair or element of the root container arrives as one fully
//!   materialized [`JsonValue`].
//!
//! The emitted sequence depends only on the concatenated input bytes, never
//! on how the input was split across [`feed`](JsonStreamer::feed) calls.
//!
//! # Features
//!
//! - **Chunk invariant**: feed fragments of any size, even mid-escape
//! - **Push-based**: listeners by event kind, typed handler traits, or a
//!   catch-all
//! - **Bounded**: configurable nesting-depth and string-size limits that
//!   fail fast on hostile input
//! - **Multiple documents**: concatenated top-level values in one stream
//!
//! # Low-level events
//!
//! ```rust
//! use jstream::{Event, EventKind, JsonStreamer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let names = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&names);
//!
//! let mut streamer = JsonStreamer::new();
//! streamer.add_catch_all_listener(move |name, _event| {
//!     sink.borrow_mut().push(name.to_string());
//!     Ok(())
//! });
//!
//! // Split anywhere - even inside the number.
//! streamer.feed(br#"{"a": [1, 2"#)?;
//! streamer.feed(br#"3, 4]}"#)?;
//! streamer.finalize()?;
//!
//! assert_eq!(
//!     names.borrow().as_slice(),
//!     &[
//!         "doc_start", "object_start", "key", "array_start", "element",
//!         "element", "element", "array_end", "object_end", "doc_end",
//!     ]
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Top-level entities
//!
//! ```rust
//! use jstream::{EntityEvent, EntityEventKind, ObjectStreamer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&keys);
//!
//! let mut streamer = ObjectStreamer::new();
//! streamer.add_listener(EntityEventKind::Pair, move |event| {
//!     if let EntityEvent::Pair { key, .. } = event {
//!         sink.borrow_mut().push(key.clone());
//!     }
//!     Ok(())
//! });
//!
//! streamer.feed(br#"{"user": {"id": 1}, "ok": true}"#)?;
//! streamer.finalize()?;
//!
//! assert_eq!(keys.borrow().as_slice(), &["user", "ok"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Untrusted input
//!
//! ```rust
//! use jstream::{JsonStreamer, StreamerConfig, StreamError};
//!
//! let mut streamer = JsonStreamer::with_config(StreamerConfig {
//!     max_depth: Some(2),
//!     ..Default::default()
//! });
//!
//! let err = streamer.feed(br#"[[[1]]]"#).unwrap_err();
//! assert!(matches!(err, StreamError::DepthExceeded { limit: 2, .. }));
//! ```

mod assembler;
mod buffer;
mod engine;
mod error;
mod event;
mod listener;
mod streamer;
mod tokenizer;
mod value;

pub use buffer::StreamBuffer;
pub use error::{StreamError, StreamResult};
pub use event::{EntityEvent, EntityEventKind, Event, EventKind};
pub use listener::{
    EntityEventHandler, JsonEventHandler, ListenerId, ListenerResult,
};
pub use streamer::{
    JsonStreamer, ObjectStreamer, StreamerConfig, DEFAULT_BUFFER_SIZE,
};
pub use tokenizer::{JsonTokenizer, Token, TokenSink, Tokenizer};
pub use value::{JsonValue, Scalar};
