// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Synthesis of the packed backing storage struct.

use crate::backends::csharp::StorageShape;
use crate::backends::{CancellationToken, Cancelled};

/// Slot fields emitted per declaration line.
pub const SLOTS_PER_LINE: usize = 12;

/// Generate the hidden storage struct declaration.
///
/// The struct packs `slot_count` consecutive fields of the element
/// type with no padding, so that a span cast over it sees exactly the
/// requested number of elements. Callers invoke this for positive
/// slot counts only; a zero size container carries no storage at all.
///
/// The token is polled once per slot field.
pub fn generate_storage_struct(
    shape: &StorageShape,
    storage_name: &str,
    token: &CancellationToken,
) -> Result<String, Cancelled> {
    let mut fields = String::new();
    for slot in 0..shape.slot_count {
        token.check()?;
        if slot > 0 {
            fields.push(',');
            if slot % SLOTS_PER_LINE == 0 {
                fields.push_str("\n        ");
            } else {
                fields.push(' ');
            }
        }
        fields.push_str(&format!("__t{:04}", slot));
    }

    let mut code = String::new();
    code.push_str("[StructLayout(LayoutKind.Sequential, Pack = 1)]\n");
    code.push_str(&format!("private struct {}\n", storage_name));
    code.push_str("{\n");
    code.push_str(&format!("    public {}() {{ }}\n", storage_name));
    code.push('\n');
    code.push_str(&format!("    public {} {};\n", shape.element, fields));
    code.push('}');
    Ok(code)
}
