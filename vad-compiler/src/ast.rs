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

use codespan_reporting::diagnostic;
use codespan_reporting::files;
use serde::Serialize;
use std::fmt;

/// File identifier.
/// References a source file in the source database.
pub type FileId = usize;

/// Source database.
/// Stores the source file contents for reference.
pub type SourceDatabase = files::SimpleFiles<String, String>;

#[derive(Debug, Default, Copy, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    /// Byte offset into the file (counted from zero).
    pub offset: usize,
    /// Line number (counted from zero).
    pub line: usize,
    /// Column number (counted from zero)
    pub column: usize,
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub file: FileId,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "kind", rename = "comment")]
pub struct Comment {
    pub loc: SourceRange,
    pub text: String,
}

/// Declaration kind of a scope in the input manifest.
///
/// The set is closed: a declaration the generator cannot reopen is a
/// syntax error at parse time, never a generation failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Record,
    Struct,
    RecordStruct,
}

/// Value array marker attached to a partial struct declaration,
/// pairing an element type with a requested element count.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "kind", rename = "marker")]
pub struct Marker {
    pub loc: SourceRange,
    /// Element type, recorded verbatim. The generator never resolves
    /// it; the host guarantees a fixed-layout value type.
    pub element: String,
    /// Requested element count, possibly negative.
    pub size: i64,
    /// Range of the size argument, used to attach diagnostics.
    pub size_loc: SourceRange,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum DeclDesc {
    #[serde(rename = "namespace_declaration")]
    Namespace {
        /// Dotted namespace name, as written.
        id: String,
        declarations: Vec<Decl>,
    },
    #[serde(rename = "type_declaration")]
    Type {
        id: String,
        // Serialized under a distinct name, "kind" is the variant tag.
        #[serde(rename = "type_kind")]
        kind: TypeKind,
        partial: bool,
        marker: Option<Marker>,
        declarations: Vec<Decl>,
    },
}

#[derive(Debug, Serialize, Clone)]
pub struct Decl {
    pub loc: SourceRange,
    #[serde(flatten)]
    pub desc: DeclDesc,
}

#[derive(Debug, Serialize, Clone)]
pub struct File {
    pub file: FileId,
    pub comments: Vec<Comment>,
    pub declarations: Vec<Decl>,
}

impl SourceLocation {
    /// Construct a new source location.
    ///
    /// The `line_starts` indicates the byte offsets where new lines
    /// start in the file. The first element should thus be `0` since
    /// every file has at least one line starting at offset `0`.
    pub fn new(offset: usize, line_starts: &[usize]) -> SourceLocation {
        let mut loc = SourceLocation { offset, line: 0, column: offset };
        for (line, start) in line_starts.iter().enumerate() {
            if *start > offset {
                break;
            }
            loc = SourceLocation { offset, line, column: offset - start };
        }
        loc
    }
}

impl SourceRange {
    pub fn primary(&self) -> diagnostic::Label<FileId> {
        diagnostic::Label::primary(self.file, self.start.offset..self.end.offset)
    }
    pub fn secondary(&self) -> diagnostic::Label<FileId> {
        diagnostic::Label::secondary(self.file, self.start.offset..self.end.offset)
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRange").finish_non_exhaustive()
    }
}

impl TypeKind {
    /// Return the declaration keyword reopening a scope of this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Record => "record",
            TypeKind::Struct => "struct",
            TypeKind::RecordStruct => "record struct",
        }
    }
}

impl Eq for Marker {}
impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.element == other.element && self.size == other.size
    }
}

impl Eq for Decl {}
impl PartialEq for Decl {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.desc == other.desc
    }
}

impl Decl {
    pub fn id(&self) -> &str {
        match &self.desc {
            DeclDesc::Namespace { id, .. } | DeclDesc::Type { id, .. } => id,
        }
    }
}

impl Eq for File {}
impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out comments.
        self.declarations == other.declarations
    }
}

impl File {
    pub fn new(file: FileId) -> File {
        File { file, comments: vec![], declarations: vec![] }
    }
}
