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

//! Value types carried by events.
//!
//! [`Scalar`] is the payload of low-level `value`/`element` events;
//! [`JsonValue`] is the fully materialized tree carried by high-level
//! `pair`/`element` events. Objects preserve the key order of the input and
//! keep duplicate keys as-is.
//!
//! Both types render as compact JSON via `Display`:
//!
//! ```rust
//! use jstream::{JsonValue, Scalar};
//!
//! let value = JsonValue::Array(vec![
//!     JsonValue::Scalar(Scalar::Int(1)),
//!     JsonValue::Scalar(Scalar::String("two".to_string())),
//! ]);
//! assert_eq!(value.to_string(), r#"[1,"two"]"#);
//! ```

use std::fmt;

/// A JSON scalar: string, number, boolean, or null.
///
/// Numbers are split into [`Int`](Scalar::Int) and [`Float`](Scalar::Float)
/// by the literal's spelling: a literal with no `.`, `e`, or `E` that fits in
/// an `i64` is an `Int`; everything else is a `Float`. So `1` is `Int(1)`
/// while `1.0` and `1e0` are both `Float(1.0)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    /// A string value.
    String(String),
    /// A whole number that fits in an `i64`.
    Int(i64),
    /// Any other number.
    Float(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

impl Scalar {
    /// Classify a JSON number literal.
    ///
    /// Returns `None` if the literal does not parse as a number at all. A
    /// whole-number literal outside the `i64` range falls back to `Float`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jstream::Scalar;
    ///
    /// assert_eq!(Scalar::from_number_literal("-42"), Some(Scalar::Int(-42)));
    /// assert_eq!(Scalar::from_number_literal("1e3"), Some(Scalar::Float(1000.0)));
    /// assert_eq!(Scalar::from_number_literal("2.5"), Some(Scalar::Float(2.5)));
    /// ```
    pub fn from_number_literal(literal: &str) -> Option<Self> {
        let fractional = literal
            .bytes()
            .any(|b| matches!(b, b'.' | b'e' | b'E'));
        if !fractional {
            if let Ok(n) = literal.parse::<i64>() {
                return Some(Self::Int(n));
            }
        }
        literal.parse::<f64>().ok().map(Self::Float)
    }

    /// Get the string value, if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer value, if this is an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the float value, if this is a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the boolean value, if this is a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this scalar is `null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write_json_string(f, s),
            Self::Int(n) => write!(f, "{}", n),
            // An integral float must keep its decimal point, or the output
            // would re-classify as an integer.
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A fully materialized JSON value.
///
/// Produced by [`ObjectStreamer`](crate::ObjectStreamer) for each top-level
/// pair or element. Object members keep input order; duplicate keys are
/// preserved rather than collapsed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JsonValue {
    /// A scalar leaf.
    Scalar(Scalar),
    /// An array of values.
    Array(Vec<JsonValue>),
    /// An object as an ordered list of key/value pairs.
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Get the scalar, if this is a leaf.
    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get the array items, if this is an array.
    #[inline]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the object members, if this is an object.
    #[inline]
    pub fn as_object(&self) -> Option<&[(String, JsonValue)]> {
        match self {
            Self::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Look up the first member with the given key, if this is an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            Self::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<Scalar> for JsonValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Object(members) => {
                write!(f, "{{")?;
                for (i, (key, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write_json_string(f, key)?;
                    write!(f, ":{}", value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Write a string as a quoted, escaped JSON string literal.
pub(crate) fn write_json_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            '\u{08}' => write!(f, "\\b")?,
            '\u{0c}' => write!(f, "\\f")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}
