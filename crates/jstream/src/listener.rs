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

//! Listener registration and dispatch.
//!
//! Consumers observe events in three ways, fired in this order for each
//! event:
//!
//! 1. **Kind listeners**: closures registered for a single event kind, in
//!    registration order.
//! 2. **Bound handlers**: implementations of [`JsonEventHandler`] or
//!    [`EntityEventHandler`] whose typed methods are called per event. Every
//!    method has a no-op default, so a handler implements only what it needs.
//! 3. **Catch-all listeners**: closures that receive every event along with
//!    its wire name.
//!
//! Any listener can fail by returning an error; dispatch for that event
//! stops there and the error surfaces from the `feed` or `finalize` call as
//! [`StreamError::Listener`]. The streamer itself stays usable.

use crate::error::{StreamError, StreamResult};
use crate::event::{EntityEvent, Event};
use crate::value::{JsonValue, Scalar};

/// What a listener returns: `Ok(())` to continue, or any error to abort
/// dispatch of the current event.
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Opaque handle identifying a registered listener, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type BoxedListener<E> = Box<dyn FnMut(&str, &E) -> ListenerResult>;

struct Entry<E, K> {
    id: ListenerId,
    filter: Option<K>,
    listener: BoxedListener<E>,
}

/// Registry of kind and catch-all listeners for one event type.
pub(crate) struct Dispatcher<E, K> {
    kind_entries: Vec<Entry<E, K>>,
    catch_all_entries: Vec<Entry<E, K>>,
    next_id: u64,
}

impl<E, K: Copy + PartialEq> Dispatcher<E, K> {
    pub(crate) fn new() -> Self {
        Self {
            kind_entries: Vec::new(),
            catch_all_entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn add(
        &mut self,
        kind: K,
        mut listener: impl FnMut(&E) -> ListenerResult + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.kind_entries.push(Entry {
            id,
            filter: Some(kind),
            listener: Box::new(move |_, event| listener(event)),
        });
        id
    }

    pub(crate) fn add_catch_all(
        &mut self,
        listener: impl FnMut(&str, &E) -> ListenerResult + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.catch_all_entries.push(Entry {
            id,
            filter: None,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener. Returns `false` if the id is unknown.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.kind_entries.len() + self.catch_all_entries.len();
        self.kind_entries.retain(|entry| entry.id != id);
        self.catch_all_entries.retain(|entry| entry.id != id);
        before != self.kind_entries.len() + self.catch_all_entries.len()
    }

    pub(crate) fn fire_kind(
        &mut self,
        kind: K,
        name: &'static str,
        event: &E,
    ) -> StreamResult<()> {
        for entry in &mut self.kind_entries {
            if entry.filter == Some(kind) {
                (entry.listener)(name, event)
                    .map_err(|source| StreamError::Listener { event: name, source })?;
            }
        }
        Ok(())
    }

    pub(crate) fn fire_catch_all(&mut self, name: &'static str, event: &E) -> StreamResult<()> {
        for entry in &mut self.catch_all_entries {
            (entry.listener)(name, event)
                .map_err(|source| StreamError::Listener { event: name, source })?;
        }
        Ok(())
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Typed per-event methods for the low-level stream.
///
/// All methods default to no-ops; implement only the events of interest and
/// pass the handler to [`JsonStreamer::bind`](crate::JsonStreamer::bind).
///
/// # Examples
///
/// ```rust
/// use jstream::{JsonEventHandler, JsonStreamer, ListenerResult, Scalar};
///
/// struct KeyCounter {
///     keys: usize,
/// }
///
/// impl JsonEventHandler for KeyCounter {
///     fn on_key(&mut self, _name: &str) -> ListenerResult {
///         self.keys += 1;
///         Ok(())
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait JsonEventHandler {
    /// A new document began.
    fn on_doc_start(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The current document ended.
    fn on_doc_end(&mut self) -> ListenerResult {
        Ok(())
    }

    /// An object opened.
    fn on_object_start(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The innermost object closed.
    fn on_object_end(&mut self) -> ListenerResult {
        Ok(())
    }

    /// An array opened.
    fn on_array_start(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The innermost array closed.
    fn on_array_end(&mut self) -> ListenerResult {
        Ok(())
    }

    /// An object key.
    fn on_key(&mut self, name: &str) -> ListenerResult {
        Ok(())
    }

    /// A scalar value inside an object.
    fn on_value(&mut self, value: &Scalar) -> ListenerResult {
        Ok(())
    }

    /// A scalar element inside an array, or a bare top-level scalar.
    fn on_element(&mut self, value: &Scalar) -> ListenerResult {
        Ok(())
    }
}

/// Typed per-event methods for the high-level stream.
///
/// All methods default to no-ops; implement only the events of interest and
/// pass the handler to [`ObjectStreamer::bind`](crate::ObjectStreamer::bind).
#[allow(unused_variables)]
pub trait EntityEventHandler {
    /// The document root is an object.
    fn on_object_stream_start(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The root object closed.
    fn on_object_stream_end(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The document root is an array.
    fn on_array_stream_start(&mut self) -> ListenerResult {
        Ok(())
    }

    /// The root array closed.
    fn on_array_stream_end(&mut self) -> ListenerResult {
        Ok(())
    }

    /// A complete top-level key/value pair.
    fn on_pair(&mut self, key: &str, value: &JsonValue) -> ListenerResult {
        Ok(())
    }

    /// A complete top-level element, or a bare top-level scalar.
    fn on_element(&mut self, value: &JsonValue) -> ListenerResult {
        Ok(())
    }
}

/// Route an event to the matching typed method of a bound handler.
pub(crate) fn dispatch_json_handler(
    handler: &mut dyn JsonEventHandler,
    event: &Event,
) -> ListenerResult {
    match event {
        Event::DocStart => handler.on_doc_start(),
        Event::DocEnd => handler.on_doc_end(),
        Event::ObjectStart => handler.on_object_start(),
        Event::ObjectEnd => handler.on_object_end(),
        Event::ArrayStart => handler.on_array_start(),
        Event::ArrayEnd => handler.on_array_end(),
        Event::Key(name) => handler.on_key(name),
        Event::Value(value) => handler.on_value(value),
        Event::Element(value) => handler.on_element(value),
    }
}

/// Route an entity event to the matching typed method of a bound handler.
pub(crate) fn dispatch_entity_handler(
    handler: &mut dyn EntityEventHandler,
    event: &EntityEvent,
) -> ListenerResult {
    match event {
        EntityEvent::ObjectStreamStart => handler.on_object_stream_start(),
        EntityEvent::ObjectStreamEnd => handler.on_object_stream_end(),
        EntityEvent::ArrayStreamStart => handler.on_array_stream_start(),
        EntityEvent::ArrayStreamEnd => handler.on_array_stream_end(),
        EntityEvent::Pair { key, value } => handler.on_pair(key, value),
        EntityEvent::Element(value) => handler.on_element(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    // ==================== Dispatcher tests ====================

    #[test]
    fn test_kind_listener_receives_matching_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        dispatcher.add(EventKind::Key, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });

        let key = Event::Key("a".to_string());
        dispatcher.fire_kind(key.kind(), key.name(), &key).unwrap();
        let start = Event::DocStart;
        dispatcher
            .fire_kind(start.kind(), start.name(), &start)
            .unwrap();

        assert_eq!(seen.borrow().as_slice(), &[Event::Key("a".to_string())]);
    }

    #[test]
    fn test_catch_all_sees_names() {
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        dispatcher.add_catch_all(move |name, _| {
            sink.borrow_mut().push(name.to_string());
            Ok(())
        });

        dispatcher
            .fire_catch_all("doc_start", &Event::DocStart)
            .unwrap();
        dispatcher
            .fire_catch_all("key", &Event::Key("x".to_string()))
            .unwrap();

        assert_eq!(names.borrow().as_slice(), &["doc_start", "key"]);
    }

    #[test]
    fn test_registration_order_preserved() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            dispatcher.add(EventKind::DocStart, move |_| {
                sink.borrow_mut().push(tag);
                Ok(())
            });
        }
        dispatcher
            .fire_kind(EventKind::DocStart, "doc_start", &Event::DocStart)
            .unwrap();
        assert_eq!(order.borrow().as_slice(), &["first", "second", "third"]);
    }

    #[test]
    fn test_remove_listener() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        let id = dispatcher.add(EventKind::DocStart, move |_| {
            *sink.borrow_mut() += 1;
            Ok(())
        });

        dispatcher
            .fire_kind(EventKind::DocStart, "doc_start", &Event::DocStart)
            .unwrap();
        assert!(dispatcher.remove(id));
        dispatcher
            .fire_kind(EventKind::DocStart, "doc_start", &Event::DocStart)
            .unwrap();

        assert_eq!(*count.borrow(), 1);
        assert!(!dispatcher.remove(id));
    }

    #[test]
    fn test_listener_error_becomes_listener_fault() {
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        dispatcher.add(EventKind::Value, |_| Err("nope".into()));

        let event = Event::Value(Scalar::Int(1));
        let err = dispatcher
            .fire_kind(event.kind(), event.name(), &event)
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::Listener { event: "value", .. }
        ));
    }

    #[test]
    fn test_error_stops_dispatch_for_event() {
        let reached = Rc::new(RefCell::new(false));
        let sink = Rc::clone(&reached);
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        dispatcher.add(EventKind::DocStart, |_| Err("first fails".into()));
        dispatcher.add(EventKind::DocStart, move |_| {
            *sink.borrow_mut() = true;
            Ok(())
        });

        let result = dispatcher.fire_kind(EventKind::DocStart, "doc_start", &Event::DocStart);
        assert!(result.is_err());
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_ids_are_unique_across_both_registries() {
        let mut dispatcher: Dispatcher<Event, EventKind> = Dispatcher::new();
        let a = dispatcher.add(EventKind::Key, |_| Ok(()));
        let b = dispatcher.add_catch_all(|_, _| Ok(()));
        let c = dispatcher.add(EventKind::Key, |_| Ok(()));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    // ==================== Handler routing tests ====================

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl JsonEventHandler for Recorder {
        fn on_key(&mut self, name: &str) -> ListenerResult {
            self.calls.push(format!("key:{}", name));
            Ok(())
        }

        fn on_value(&mut self, value: &Scalar) -> ListenerResult {
            self.calls.push(format!("value:{}", value));
            Ok(())
        }
    }

    #[test]
    fn test_json_handler_routing() {
        let mut recorder = Recorder::default();
        dispatch_json_handler(&mut recorder, &Event::Key("a".to_string())).unwrap();
        dispatch_json_handler(&mut recorder, &Event::Value(Scalar::Int(3))).unwrap();
        // Defaulted methods are silent.
        dispatch_json_handler(&mut recorder, &Event::DocStart).unwrap();
        assert_eq!(recorder.calls, vec!["key:a", "value:3"]);
    }

    #[derive(Default)]
    struct PairRecorder {
        pairs: Vec<(String, String)>,
    }

    impl EntityEventHandler for PairRecorder {
        fn on_pair(&mut self, key: &str, value: &JsonValue) -> ListenerResult {
            self.pairs.push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_entity_handler_routing() {
        let mut recorder = PairRecorder::default();
        dispatch_entity_handler(&mut recorder, &EntityEvent::ObjectStreamStart).unwrap();
        dispatch_entity_handler(
            &mut recorder,
            &EntityEvent::Pair {
                key: "n".to_string(),
                value: JsonValue::Scalar(Scalar::Int(9)),
            },
        )
        .unwrap();
        assert_eq!(recorder.pairs, vec![("n".to_string(), "9".to_string())]);
    }
}
