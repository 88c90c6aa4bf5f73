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

//! End-to-end tests for the `jstream` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn jstream() -> Command {
    Command::cargo_bin("jstream").unwrap()
}

// ==================== Event output tests ====================

#[test]
fn prints_one_line_per_event() {
    jstream()
        .write_stdin(r#"{"a": 1}"#)
        .assert()
        .success()
        .stdout("doc_start\nobject_start\nkey: \"a\"\nvalue: 1\nobject_end\ndoc_end\n");
}

#[test]
fn array_elements_print_in_order() {
    jstream()
        .write_stdin(r#"[true, null, "x"]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "array_start\nelement: true\nelement: null\nelement: \"x\"\narray_end",
        ));
}

#[test]
fn tiny_buffer_size_produces_identical_output() {
    let input = r#"{"a": [1, 2, 3], "b": "c"}"#;
    let whole = jstream().write_stdin(input).assert().success();
    let whole_out = whole.get_output().stdout.clone();

    jstream()
        .args(["--buffer-size", "1"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(whole_out);
}

// ==================== Entity output tests ====================

#[test]
fn entities_flag_prints_materialized_pairs() {
    jstream()
        .arg("--entities")
        .write_stdin(r#"{"a": [1, 2], "b": 3}"#)
        .assert()
        .success()
        .stdout(
            "object_stream_start\npair: \"a\" = [1,2]\npair: \"b\" = 3\nobject_stream_end\n",
        );
}

#[test]
fn entities_flag_prints_array_elements() {
    jstream()
        .arg("--entities")
        .write_stdin(r#"[1, {"k": "v"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("element: {\"k\":\"v\"}"));
}

// ==================== Failure tests ====================

#[test]
fn malformed_input_fails_with_offset() {
    jstream()
        .write_stdin(r#"{"a": nope}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Malformed input at byte 7"));
}

#[test]
fn depth_limit_is_enforced() {
    jstream()
        .args(["--max-depth", "1"])
        .write_stdin(r#"[[1]]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Maximum nesting depth of 1 exceeded",
        ));
}

#[test]
fn string_limit_is_enforced() {
    jstream()
        .args(["--max-string-size", "4"])
        .write_stdin(r#""a string well over the limit""#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("String exceeds maximum size of 4"));
}

#[test]
fn truncated_input_fails_on_finalize() {
    jstream()
        .write_stdin(r#"{"a": "unterminated"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Malformed input"));
}
