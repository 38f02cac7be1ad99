// Copyright 2025 Google LLC
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

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files;
use codespan_reporting::term;
use codespan_reporting::term::termcolor;

use crate::ast::*;

/// Diagnostic codes attached to generation requests.
/// Negative sizes are rejected, zero sizes are admitted with a
/// warning.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArraySize = 1,
    EmptyArray = 2,
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        format!("{}", code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VAD{:04}", *self as u16)
    }
}

/// Aggregate analyzer diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic<FileId>>,
}

/// Location of a generation target within the manifest scope tree.
/// Namespace segments are single identifiers, dotted namespace
/// declarations contribute one segment per part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSegment {
    Namespace(String),
    Type { id: String, kind: TypeKind },
}

/// Fully resolved request for one value array definition.
/// The target name uniquely identifies the definition within a
/// generation pass.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Dot joined path of all enclosing scope identifiers and the
    /// target identifier.
    pub target: String,
    /// Identifier of the marked struct.
    pub id: String,
    /// Enclosing scope, outermost first. The marked struct itself is
    /// not included.
    pub path: Vec<ScopeSegment>,
    pub element: String,
    pub size: i64,
    pub loc: SourceRange,
    pub size_loc: SourceRange,
}

impl PartialEq for GenerationRequest {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc information.
        self.target == other.target
            && self.id == other.id
            && self.path == other.path
            && self.element == other.element
            && self.size == other.size
    }
}

impl Eq for GenerationRequest {}

/// Validation outcome for a requested array size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SizeClass {
    Invalid,
    Empty,
    Sized(usize),
}

/// Classify a requested size. Total over all i64 inputs.
pub fn classify_size(size: i64) -> SizeClass {
    match size {
        i64::MIN..=-1 => SizeClass::Invalid,
        0 => SizeClass::Empty,
        _ => SizeClass::Sized(size as usize),
    }
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == codespan_reporting::diagnostic::Severity::Error)
    }

    pub fn push(&mut self, diagnostic: Diagnostic<FileId>) {
        self.diagnostics.push(diagnostic)
    }

    pub fn emit(
        &self,
        sources: &SourceDatabase,
        writer: &mut dyn termcolor::WriteColor,
    ) -> Result<(), files::Error> {
        let config = term::Config::default();
        for d in self.diagnostics.iter() {
            term::emit(writer, &config, sources, d)?;
        }
        Ok(())
    }
}

/// Build the rejection diagnostic for a negative size request.
pub fn invalid_array_size(request: &GenerationRequest) -> Diagnostic<FileId> {
    Diagnostic::error()
        .with_code(ErrorCode::InvalidArraySize)
        .with_message(format!("cannot synthesize a negative-size container `{}`", request.id))
        .with_labels(vec![request
            .size_loc
            .primary()
            .with_message(format!("the requested size is {}", request.size))])
}

/// Build the advisory diagnostic for a zero size request.
pub fn empty_array(request: &GenerationRequest) -> Diagnostic<FileId> {
    Diagnostic::warning()
        .with_code(ErrorCode::EmptyArray)
        .with_message(format!("synthesizing an empty container `{}`", request.id))
        .with_labels(vec![request.size_loc.primary()])
}

/// Collect the generation requests declared in the parsed manifest.
///
/// Requests are returned in declaration order. Scope information is
/// captured for each request so that the emitted definition can
/// reopen the same nesting. Size validation is left to the
/// generation pass, so that duplicate targets are registered before
/// their sizes are checked.
pub fn resolve(file: &File) -> Vec<GenerationRequest> {
    fn visit(
        decls: &[Decl],
        path: &mut Vec<ScopeSegment>,
        requests: &mut Vec<GenerationRequest>,
    ) {
        for decl in decls {
            match &decl.desc {
                DeclDesc::Namespace { id, declarations } => {
                    let segments = id.split('.').count();
                    for part in id.split('.') {
                        path.push(ScopeSegment::Namespace(part.to_owned()));
                    }
                    visit(declarations, path, requests);
                    path.truncate(path.len() - segments);
                }
                DeclDesc::Type { id, kind, marker, declarations, .. } => {
                    if let Some(marker) = marker {
                        let mut target = String::new();
                        for segment in path.iter() {
                            let part = match segment {
                                ScopeSegment::Namespace(id) => id,
                                ScopeSegment::Type { id, .. } => id,
                            };
                            target.push_str(part);
                            target.push('.');
                        }
                        target.push_str(id);
                        requests.push(GenerationRequest {
                            target,
                            id: id.clone(),
                            path: path.clone(),
                            element: marker.element.clone(),
                            size: marker.size,
                            loc: decl.loc,
                            size_loc: marker.size_loc,
                        });
                    }
                    path.push(ScopeSegment::Type { id: id.clone(), kind: *kind });
                    visit(declarations, path, requests);
                    path.pop();
                }
            }
        }
    }

    let mut requests = Vec::new();
    visit(&file.declarations, &mut Vec::new(), &mut requests);
    requests
}
