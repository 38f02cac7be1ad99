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

//! Reconstruction of the declaration scope around a generated type.

use crate::analyzer::ScopeSegment;

fn indent(s: &str, level: usize) -> String {
    let prefix = "    ".repeat(level);
    s.lines()
        .map(|line| if line.is_empty() { line.to_string() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap the generated type body in the scope it was declared in.
///
/// Leading namespace segments collapse into a single dotted namespace
/// block. Enclosing types are reopened innermost last, with the
/// partial modifier and their declared kind keyword. An empty path
/// leaves the body in the global namespace.
pub fn generate_scoped(path: &[ScopeSegment], body: &str) -> String {
    let namespace: Vec<&str> = path
        .iter()
        .map_while(|segment| match segment {
            ScopeSegment::Namespace(id) => Some(id.as_str()),
            ScopeSegment::Type { .. } => None,
        })
        .collect();

    let mut code = body.to_owned();
    for segment in path[namespace.len()..].iter().rev() {
        let ScopeSegment::Type { id, kind } = segment else {
            unreachable!("namespace declarations cannot be nested in types");
        };
        code = format!("partial {} {}\n{{\n{}\n}}", kind.keyword(), id, indent(&code, 1));
    }

    if !namespace.is_empty() {
        code = format!("namespace {}\n{{\n{}\n}}", namespace.join("."), indent(&code, 1));
    }

    code.push('\n');
    code
}
