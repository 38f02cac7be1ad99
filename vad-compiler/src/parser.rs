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

use crate::ast;
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files;
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Token};
use std::iter::{Filter, Peekable};

// Generate the VAD manifest parser.
//
// Value array markers are only admitted on partial struct
// declarations; placing one anywhere else is a syntax error. The size
// argument is signed so that negative requests reach the size
// validator instead of failing here.
//
// TODO:
// - use silent atomic rules for keywords like
//   STRUCT = @{ "struct" ~ WHITESPACE }
//   currently not implemented in pest:
//   https://github.com/pest-parser/pest/issues/520
#[derive(pest_derive::Parser)]
#[grammar_inline = r#"
WHITESPACE = _{ " " | "\n" | "\r" | "\t" }
COMMENT = { block_comment | line_comment }

block_comment = { "/*" ~ (!"*/" ~ ANY)* ~ "*/" }
line_comment = { "//" ~ (!"\n" ~ ANY)* }

alpha = { 'a'..'z' | 'A'..'Z' }
digit = { '0'..'9' }
alphanum = { alpha | digit | "_" }

identifier = @{ (alpha | "_") ~ alphanum* }
qualified_identifier = @{ identifier ~ ("." ~ identifier)* }
size_argument = @{ "-"? ~ digit+ }

NAMESPACE = @{ "namespace" ~ WHITESPACE }
PARTIAL = @{ "partial" ~ WHITESPACE }
CLASS = @{ "class" ~ WHITESPACE }
RECORD = @{ "record" ~ WHITESPACE }
STRUCT = @{ "struct" ~ WHITESPACE }

class_kind = { CLASS }
record_struct_kind = { RECORD ~ STRUCT }
record_kind = { RECORD }
struct_kind = { STRUCT }

marker = {
    "[" ~ "ValueArray" ~ "<" ~ qualified_identifier ~ ">" ~
        "(" ~ size_argument ~ ")" ~ "]"
}

namespace_declaration = {
    NAMESPACE ~ qualified_identifier ~ "{" ~ declaration* ~ "}"
}
marked_type_declaration = {
    marker ~ PARTIAL ~ struct_kind ~ identifier ~ (type_body | ";")
}
plain_type_declaration = {
    PARTIAL? ~ (class_kind | record_struct_kind | record_kind | struct_kind) ~
        identifier ~ (type_body | ";")
}
type_declaration = _{ marked_type_declaration | plain_type_declaration }
type_body = _{ "{" ~ type_declaration* ~ "}" }
declaration = _{ namespace_declaration | type_declaration }

file = {
    SOI ~
    declaration* ~
    EOI
}
"#]
pub struct VadParser;

type Node<'i> = Pair<'i, Rule>;
type NodeIterator<'i> = Peekable<Filter<Pairs<'i, Rule>, fn(&Node<'i>) -> bool>>;
struct Context<'a> {
    file: ast::FileId,
    line_starts: &'a Vec<usize>,
}

trait Helpers<'i> {
    fn children(self) -> NodeIterator<'i>;
    fn as_loc(&self, context: &Context) -> ast::SourceRange;
    fn as_string(&self) -> String;
    fn as_i64(&self) -> Result<i64, String>;
}

impl<'i> Helpers<'i> for Node<'i> {
    fn children(self) -> NodeIterator<'i> {
        self.into_inner().filter((|n| n.as_rule() != Rule::COMMENT) as fn(&Self) -> bool).peekable()
    }

    fn as_loc(&self, context: &Context) -> ast::SourceRange {
        let span = self.as_span();
        ast::SourceRange {
            file: context.file,
            start: ast::SourceLocation::new(span.start_pos().pos(), context.line_starts),
            end: ast::SourceLocation::new(span.end_pos().pos(), context.line_starts),
        }
    }

    fn as_string(&self) -> String {
        self.as_str().to_owned()
    }

    fn as_i64(&self) -> Result<i64, String> {
        self.as_str().parse().map_err(|_| format!("cannot convert '{}' to i64", self.as_str()))
    }
}

fn err_unexpected_rule<T>(expected: Rule, found: Rule) -> Result<T, String> {
    Err(format!("expected rule {:?}, got {:?}", expected, found))
}

fn err_missing_rule<T>(expected: Rule) -> Result<T, String> {
    Err(format!("expected rule {:?}, got nothing", expected))
}

fn expect<'i>(iter: &mut impl Iterator<Item = Node<'i>>, rule: Rule) -> Result<Node<'i>, String> {
    match iter.next() {
        Some(node) if node.as_rule() == rule => Ok(node),
        Some(node) => err_unexpected_rule(rule, node.as_rule()),
        None => err_missing_rule(rule),
    }
}

fn maybe<'i>(iter: &mut NodeIterator<'i>, rule: Rule) -> Option<Node<'i>> {
    iter.next_if(|n| n.as_rule() == rule)
}

fn parse_identifier(iter: &mut NodeIterator<'_>) -> Result<String, String> {
    expect(iter, Rule::identifier).map(|n| n.as_string())
}

fn parse_qualified_identifier(iter: &mut NodeIterator<'_>) -> Result<String, String> {
    expect(iter, Rule::qualified_identifier).map(|n| n.as_string())
}

fn parse_type_kind(iter: &mut NodeIterator<'_>) -> Result<ast::TypeKind, String> {
    match iter.next() {
        Some(node) => match node.as_rule() {
            Rule::class_kind => Ok(ast::TypeKind::Class),
            Rule::record_struct_kind => Ok(ast::TypeKind::RecordStruct),
            Rule::record_kind => Ok(ast::TypeKind::Record),
            Rule::struct_kind => Ok(ast::TypeKind::Struct),
            rule => Err(format!("expected rule *_kind, got {:?}", rule)),
        },
        None => Err("expected rule *_kind, got nothing".to_owned()),
    }
}

fn parse_marker(iter: &mut NodeIterator<'_>, context: &Context) -> Result<ast::Marker, String> {
    let node = expect(iter, Rule::marker)?;
    let loc = node.as_loc(context);
    let mut children = node.children();
    let element = parse_qualified_identifier(&mut children)?;
    let size = expect(&mut children, Rule::size_argument)?;
    Ok(ast::Marker { loc, element, size: size.as_i64()?, size_loc: size.as_loc(context) })
}

fn parse_declaration_list(
    iter: &mut NodeIterator<'_>,
    context: &Context,
) -> Result<Vec<ast::Decl>, String> {
    iter.map(|n| parse_declaration(n, context)).collect()
}

fn parse_declaration(node: Node<'_>, context: &Context) -> Result<ast::Decl, String> {
    let loc = node.as_loc(context);
    let rule = node.as_rule();
    let mut children = node.children();
    match rule {
        Rule::namespace_declaration => {
            expect(&mut children, Rule::NAMESPACE)?;
            let id = parse_qualified_identifier(&mut children)?;
            let declarations = parse_declaration_list(&mut children, context)?;
            Ok(ast::Decl { loc, desc: ast::DeclDesc::Namespace { id, declarations } })
        }
        Rule::marked_type_declaration => {
            let marker = parse_marker(&mut children, context)?;
            expect(&mut children, Rule::PARTIAL)?;
            expect(&mut children, Rule::struct_kind)?;
            let id = parse_identifier(&mut children)?;
            let declarations = parse_declaration_list(&mut children, context)?;
            Ok(ast::Decl {
                loc,
                desc: ast::DeclDesc::Type {
                    id,
                    kind: ast::TypeKind::Struct,
                    partial: true,
                    marker: Some(marker),
                    declarations,
                },
            })
        }
        Rule::plain_type_declaration => {
            let partial = maybe(&mut children, Rule::PARTIAL).is_some();
            let kind = parse_type_kind(&mut children)?;
            let id = parse_identifier(&mut children)?;
            let declarations = parse_declaration_list(&mut children, context)?;
            Ok(ast::Decl {
                loc,
                desc: ast::DeclDesc::Type { id, kind, partial, marker: None, declarations },
            })
        }
        _ => Err(format!("expected rule *_declaration, got {:?}", rule)),
    }
}

fn parse_toplevel(root: Node<'_>, context: &Context) -> Result<ast::File, String> {
    let mut file = ast::File::new(context.file);

    let mut comment_start = vec![];
    for token in root.clone().tokens() {
        match token {
            Token::Start { rule: Rule::COMMENT, pos } => comment_start.push(pos),
            Token::End { rule: Rule::COMMENT, pos } => {
                let start_pos = comment_start.pop().unwrap();
                file.comments.push(ast::Comment {
                    loc: ast::SourceRange {
                        file: context.file,
                        start: ast::SourceLocation::new(start_pos.pos(), context.line_starts),
                        end: ast::SourceLocation::new(pos.pos(), context.line_starts),
                    },
                    text: start_pos.span(&pos).as_str().to_owned(),
                })
            }
            _ => (),
        }
    }

    for node in root.children() {
        match node.as_rule() {
            Rule::namespace_declaration
            | Rule::marked_type_declaration
            | Rule::plain_type_declaration => {
                let decl = parse_declaration(node, context)?;
                file.declarations.push(decl);
            }
            Rule::EOI => (),
            _ => unreachable!(),
        }
    }
    Ok(file)
}

/// Parse VAD source code from a string.
///
/// The file is added to the compilation database under the provided
/// name.
pub fn parse_inline(
    sources: &mut ast::SourceDatabase,
    name: &str,
    source: String,
) -> Result<ast::File, Diagnostic<ast::FileId>> {
    let root = VadParser::parse(Rule::file, &source)
        .map_err(|e| {
            Diagnostic::error()
                .with_message(format!("failed to parse input file '{}': {}", name, e))
        })?
        .next()
        .unwrap();
    let line_starts: Vec<_> = files::line_starts(&source).collect();
    let file = sources.add(name.to_owned(), source.clone());
    parse_toplevel(root, &Context { file, line_starts: &line_starts })
        .map_err(|e| Diagnostic::error().with_message(e))
}

/// Parse a new source file.
///
/// The source file is fully read and added to the compilation
/// database. Returns the constructed AST, or a descriptive error
/// message in case of syntax error.
pub fn parse_file(
    sources: &mut ast::SourceDatabase,
    name: &str,
) -> Result<ast::File, Diagnostic<ast::FileId>> {
    let source = std::fs::read_to_string(name).map_err(|e| {
        Diagnostic::error().with_message(format!("failed to read input file '{}': {}", name, e))
    })?;
    parse_inline(sources, name, source)
}
