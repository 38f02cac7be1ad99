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

//! C# value array backend.

use std::collections::HashSet;

use crate::analyzer::{self, GenerationRequest, SizeClass};
use crate::ast;
use crate::backends::{CancellationToken, Cancelled};

mod container;
mod preamble;
mod scope;
mod storage;

/// One generated compilation unit, keyed by its output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub contents: String,
}

/// Result of a generation pass. Units and diagnostics are both
/// ordered by the declaration order of their originating markers.
#[derive(Debug, Default)]
pub struct Generated {
    pub units: Vec<SourceUnit>,
    pub diagnostics: analyzer::Diagnostics,
}

/// Validated storage dimensions of one container.
#[derive(Debug, Copy, Clone)]
pub struct StorageShape<'a> {
    pub element: &'a str,
    pub slot_count: usize,
}

/// Replace the characters invalid in output file names.
fn escape_file_name(name: &str) -> String {
    name.replace(['<', '>', ','], "_")
}

/// Output file name for a generation target.
pub fn unit_name(target: &str) -> String {
    format!("{}.ValueArray.g.cs", escape_file_name(target))
}

/// Run a generation pass over the resolved requests.
///
/// Requests sharing a fully qualified target name collapse into a
/// single unit, first marker wins. Targets are registered before size
/// validation, so re-declarations of a rejected target are not
/// reported a second time. A request with a negative size produces a
/// diagnostic and no unit; a zero size produces a warning and a
/// storage-less unit. The token is polled once per request and once
/// per storage slot, cancellation drops all completed units.
pub fn generate(
    sources: &ast::SourceDatabase,
    file: &ast::File,
    requests: &[GenerationRequest],
    token: &CancellationToken,
) -> Result<Generated, Cancelled> {
    let source = sources.get(file.file).expect("could not read source");
    let mut generated = Generated::default();
    let mut handled = HashSet::new();

    for request in requests {
        token.check()?;

        if !handled.insert(request.target.clone()) {
            continue;
        }

        let slot_count = match analyzer::classify_size(request.size) {
            SizeClass::Invalid => {
                generated.diagnostics.push(analyzer::invalid_array_size(request));
                continue;
            }
            SizeClass::Empty => {
                generated.diagnostics.push(analyzer::empty_array(request));
                0
            }
            SizeClass::Sized(count) => count,
        };

        let shape = StorageShape { element: &request.element, slot_count };
        let body = container::generate_array_struct(&request.id, &shape, token)?;

        let mut code = String::new();
        code.push_str(&format!("// File generated from {}, with the command:\n", source.name()));
        code.push_str("//  vadc ...\n");
        code.push_str("// /!\\ Do not edit by hand\n\n");
        code.push_str(preamble::DIRECTIVES);
        code.push('\n');
        code.push_str(preamble::USINGS);
        code.push('\n');
        code.push_str(&scope::generate_scoped(&request.path, &body));

        generated.units.push(SourceUnit { name: unit_name(&request.target), contents: code });
    }

    Ok(generated)
}
