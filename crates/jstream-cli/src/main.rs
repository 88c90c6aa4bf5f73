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

//! JStream Command Line Interface
//!
//! Reads JSON from stdin in fixed-size chunks and prints one line per
//! emitted event, making the streaming behavior observable on documents of
//! any size.

use clap::Parser;
use jstream::{
    EntityEvent, Event, JsonStreamer, ObjectStreamer, StreamerConfig, DEFAULT_BUFFER_SIZE,
};
use std::io::Read;
use std::process::ExitCode;

/// JStream - streaming JSON event printer
///
/// Parses JSON from stdin incrementally and prints each event as it is
/// decided, without ever holding the whole document in memory.
///
/// # Examples
///
/// ```bash
/// # Print the low-level event stream
/// echo '{"a": [1, 2]}' | jstream
///
/// # Print materialized top-level pairs and elements
/// echo '{"a": [1, 2]}' | jstream --entities
///
/// # Reject deeply nested or oversized input
/// jstream --max-depth 100 --max-string-size 1048576 < big.json
/// ```
#[derive(Parser)]
#[command(name = "jstream")]
#[command(author, version, about = "JStream - streaming JSON event printer", long_about = None)]
struct Cli {
    /// Maximum container nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum size of a single string or key in bytes
    #[arg(long)]
    max_string_size: Option<usize>,

    /// Read size per chunk in bytes
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Print materialized top-level entities instead of low-level events
    #[arg(long)]
    entities: bool,
}

impl Cli {
    fn config(&self) -> StreamerConfig {
        StreamerConfig {
            max_depth: self.max_depth,
            max_string_size: self.max_string_size,
            buffer_size: self.buffer_size,
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.entities {
        stream_entities(cli)
    } else {
        stream_events(cli)
    }
}

fn stream_events(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut streamer = JsonStreamer::with_config(cli.config());
    streamer.add_catch_all_listener(|name, event| {
        match event {
            Event::Key(key) => println!("{}: {:?}", name, key),
            Event::Value(scalar) | Event::Element(scalar) => {
                println!("{}: {}", name, scalar)
            }
            _ => println!("{}", name),
        }
        Ok(())
    });
    pump_stdin(cli.buffer_size.max(1), |chunk| Ok(streamer.feed(chunk)?))?;
    streamer.finalize()?;
    Ok(())
}

fn stream_entities(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut streamer = ObjectStreamer::with_config(cli.config());
    streamer.add_catch_all_listener(|name, event| {
        match event {
            EntityEvent::Pair { key, value } => {
                println!("{}: {:?} = {}", name, key, value)
            }
            EntityEvent::Element(value) => println!("{}: {}", name, value),
            _ => println!("{}", name),
        }
        Ok(())
    });
    pump_stdin(cli.buffer_size.max(1), |chunk| Ok(streamer.feed(chunk)?))?;
    streamer.finalize()?;
    Ok(())
}

/// Read stdin in `chunk_size` pieces and hand each to `feed`.
fn pump_stdin(
    chunk_size: usize,
    mut feed: impl FnMut(&[u8]) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdin = std::io::stdin().lock();
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let n = stdin.read(&mut chunk)?;
        if n == 0 {
            return Ok(());
        }
        feed(&chunk[..n])?;
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
