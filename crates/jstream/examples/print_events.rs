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

//! Print the event stream of a JSON document fed in small fragments.
//!
//! Run with: cargo run --example print_events

use jstream::{EntityEvent, EntityEventKind, Event, JsonStreamer, ObjectStreamer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = br#"{"user": {"id": 7, "name": "alice"}, "tags": ["a", "b"], "active": true}"#;

    println!("=== Low-level events ===\n");

    let mut streamer = JsonStreamer::new();
    streamer.add_catch_all_listener(|name, event| {
        match event {
            Event::Key(key) => println!("{:>14}  {:?}", name, key),
            Event::Value(scalar) | Event::Element(scalar) => {
                println!("{:>14}  {}", name, scalar)
            }
            _ => println!("{:>14}", name),
        }
        Ok(())
    });

    // Fragment boundaries are irrelevant; feed five bytes at a time.
    for chunk in input.chunks(5) {
        streamer.feed(chunk)?;
    }
    streamer.finalize()?;

    println!("\n=== Top-level entities ===\n");

    let mut streamer = ObjectStreamer::new();
    streamer.add_listener(EntityEventKind::Pair, |event| {
        if let EntityEvent::Pair { key, value } = event {
            println!("{} = {}", key, value);
        }
        Ok(())
    });
    streamer.feed(input)?;
    streamer.finalize()?;

    Ok(())
}
