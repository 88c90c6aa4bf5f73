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

//! Error types for the streaming engine.
//!
//! This module defines all error types that can occur while feeding input to
//! a streamer. Parse errors include the absolute byte offset of the offending
//! input; use the [`offset()`](StreamError::offset) method to extract it
//! uniformly.
//!
//! # Error Categories
//!
//! - **Malformed Input**: the bytes are not valid JSON
//! - **Depth Exceeded**: nesting deeper than the configured limit
//! - **String Too Large**: a string or key grew past the configured limit
//! - **Protocol Misuse**: methods called in an invalid order
//! - **Listener Faults**: a registered listener returned an error
//!
//! The first three are terminal: the streamer that produced them refuses all
//! further input. A listener fault leaves the streamer usable.
//!
//! # Examples
//!
//! ```rust
//! use jstream::{JsonStreamer, StreamError};
//!
//! let mut streamer = JsonStreamer::new();
//! match streamer.feed(b"{\"a\": nope}") {
//!     Err(StreamError::MalformedInput { offset, .. }) => {
//!         eprintln!("bad input at byte {}", offset);
//!     }
//!     other => panic!("expected a parse error, got {:?}", other),
//! }
//! ```

use thiserror::Error;

/// Errors that can occur while streaming JSON input.
///
/// Parse errors carry the absolute byte offset (counted across all `feed`
/// calls) where the problem was detected.
///
/// # Examples
///
/// ```rust
/// use jstream::StreamError;
///
/// let err = StreamError::malformed(42, "unexpected byte");
/// assert_eq!(err.offset(), Some(42));
/// assert!(err.is_terminal());
///
/// let misuse = StreamError::misuse("feed called after finalize");
/// assert_eq!(misuse.offset(), None);
/// assert!(!misuse.is_terminal());
/// ```
#[derive(Error, Debug)]
pub enum StreamError {
    /// The input is not valid JSON.
    #[error("Malformed input at byte {offset}: {message}")]
    MalformedInput { offset: u64, message: String },

    /// Nesting exceeded the configured maximum depth.
    #[error("Maximum nesting depth of {limit} exceeded at byte {offset}")]
    DepthExceeded { limit: usize, offset: u64 },

    /// A string or key exceeded the configured maximum size.
    #[error("String exceeds maximum size of {limit} bytes at byte {offset}")]
    StringTooLarge { limit: usize, offset: u64 },

    /// A method was called in an invalid order.
    #[error("Protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// A registered listener returned an error.
    #[error("Listener for '{event}' failed: {source}")]
    Listener {
        event: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StreamError {
    /// Create a malformed-input error.
    #[inline]
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            message: message.into(),
        }
    }

    /// Create a protocol-misuse error.
    #[inline]
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::ProtocolMisuse(message.into())
    }

    /// Get the byte offset if available.
    #[inline]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::MalformedInput { offset, .. }
            | Self::DepthExceeded { offset, .. }
            | Self::StringTooLarge { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Whether this error poisons the streamer that produced it.
    ///
    /// Terminal errors mean the input byte stream can no longer be trusted;
    /// every later `feed` or `finalize` call fails with
    /// [`ProtocolMisuse`](Self::ProtocolMisuse). Listener faults and misuse
    /// errors are not terminal.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::DepthExceeded { .. } | Self::StringTooLarge { .. }
        )
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
