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

//! Buffered input staging.
//!
//! [`StreamBuffer`] sits between `feed` calls and the tokenizer: arbitrary
//! fragments are appended at the back, and the tokenizer drains bounded
//! chunks from the front. Consumed bytes are released immediately, so the
//! buffer never retains more than the unprocessed remainder of the input.

/// An append-at-back, drain-at-front byte buffer.
///
/// # Examples
///
/// ```rust
/// use jstream::StreamBuffer;
///
/// let mut buffer = StreamBuffer::new();
/// buffer.append(b"hello ");
/// buffer.append(b"world");
/// assert_eq!(buffer.unread(), 11);
///
/// let chunk = buffer.drain(5);
/// assert_eq!(chunk, b"hello");
/// assert_eq!(buffer.unread(), 6);
/// ```
#[derive(Debug, Default)]
pub struct StreamBuffer {
    data: Vec<u8>,
    read: usize,
    finalized: bool,
}

impl StreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment at the back.
    pub fn append(&mut self, bytes: &[u8]) {
        debug_assert!(!self.finalized, "append after finalize");
        self.data.extend_from_slice(bytes);
    }

    /// Remove and return up to `max_len` bytes from the front.
    ///
    /// Returns an empty vector when nothing is buffered.
    pub fn drain(&mut self, max_len: usize) -> Vec<u8> {
        let available = self.data.len() - self.read;
        let n = available.min(max_len);
        let chunk = self.data[self.read..self.read + n].to_vec();
        self.read += n;
        self.release_consumed();
        chunk
    }

    /// Put unconsumed bytes back at the front, ahead of any buffered input.
    pub(crate) fn requeue(&mut self, bytes: &[u8]) {
        self.data
            .splice(self.read..self.read, bytes.iter().copied());
    }

    /// Mark the end of input. Buffered bytes can still be drained.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Whether `finalize` has been called.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of buffered bytes not yet drained.
    #[inline]
    pub fn unread(&self) -> usize {
        self.data.len() - self.read
    }

    /// Whether the buffer holds no unread bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.unread() == 0
    }

    fn release_consumed(&mut self) {
        if self.read > 0 {
            self.data.drain(..self.read);
            self.read = 0;
        }
    }
}
