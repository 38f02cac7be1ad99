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

//! VAD analyzer and generator.

use argh::FromArgs;
use codespan_reporting::term::{self, termcolor};

use vad_compiler::{analyzer, ast, backends, parser};

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    CSharp,
    JSON,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "json" => Ok(Self::JSON),
            "csharp" => Ok(Self::CSharp),
            _ => Err(format!("could not parse {input:?}, valid options are 'json', 'csharp'.")),
        }
    }
}

#[derive(FromArgs, Debug)]
/// VAD analyzer and generator.
struct Opt {
    #[argh(switch)]
    /// print tool version and exit.
    version: bool,

    #[argh(option, default = "OutputFormat::JSON")]
    /// generate output in this format ("json", "csharp").
    /// The JSON output is printed on stdout, the csharp output is
    /// written to the output directory.
    /// The input file is the source VAD file.
    output_format: OutputFormat,

    #[argh(positional)]
    /// input files.
    input_file: Option<String>,

    #[argh(option)]
    /// exclude declarations from the generated output, matched by
    /// fully qualified name.
    exclude_declaration: Vec<String>,

    #[argh(option)]
    /// directory where generated files should go. This is required
    /// when 'output_format' is 'csharp'.
    output_dir: Option<String>,
}

/// Remove declarations listed in the input filter, matched by fully
/// qualified name. Removing a scope removes everything declared in it.
fn filter_declarations(file: ast::File, exclude_declarations: &[String]) -> ast::File {
    fn filter_scope(
        declarations: Vec<ast::Decl>,
        prefix: &str,
        exclude_declarations: &[String],
    ) -> Vec<ast::Decl> {
        declarations
            .into_iter()
            .filter_map(|decl| {
                let target = if prefix.is_empty() {
                    decl.id().to_owned()
                } else {
                    format!("{}.{}", prefix, decl.id())
                };
                if exclude_declarations.contains(&target) {
                    return None;
                }
                let ast::Decl { loc, desc } = decl;
                let desc = match desc {
                    ast::DeclDesc::Namespace { id, declarations } => ast::DeclDesc::Namespace {
                        id,
                        declarations: filter_scope(declarations, &target, exclude_declarations),
                    },
                    ast::DeclDesc::Type { id, kind, partial, marker, declarations } => {
                        ast::DeclDesc::Type {
                            id,
                            kind,
                            partial,
                            marker,
                            declarations: filter_scope(declarations, &target, exclude_declarations),
                        }
                    }
                };
                Some(ast::Decl { loc, desc })
            })
            .collect()
    }

    ast::File {
        declarations: filter_scope(file.declarations, "", exclude_declarations),
        ..file
    }
}

fn generate_backend(opt: &Opt, input_file: &str) -> Result<(), String> {
    let mut sources = ast::SourceDatabase::new();
    match parser::parse_file(&mut sources, input_file) {
        Ok(file) => {
            let file = filter_declarations(file, &opt.exclude_declaration);
            match opt.output_format {
                OutputFormat::JSON => {
                    println!("{}", backends::json::generate(&file)?);
                    Ok(())
                }
                OutputFormat::CSharp => {
                    let output_dir = opt.output_dir.as_ref().ok_or(String::from(
                        "'--output-dir' is required for '--output-format csharp'",
                    ))?;

                    let requests = analyzer::resolve(&file);
                    let token = backends::CancellationToken::new();
                    let generated = backends::csharp::generate(&sources, &file, &requests, &token)
                        .map_err(|err| err.to_string())?;

                    generated
                        .diagnostics
                        .emit(
                            &sources,
                            &mut termcolor::StandardStream::stderr(termcolor::ColorChoice::Always)
                                .lock(),
                        )
                        .expect("Could not print generator diagnostics");

                    std::fs::create_dir_all(output_dir).map_err(|err| {
                        format!("could not create output directory '{}': {}", output_dir, err)
                    })?;
                    for unit in &generated.units {
                        let path = std::path::Path::new(output_dir).join(&unit.name);
                        std::fs::write(&path, &unit.contents).map_err(|err| {
                            format!("could not write output file '{}': {}", path.display(), err)
                        })?;
                    }

                    if generated.diagnostics.has_errors() {
                        return Err(String::from("Generation failed"));
                    }
                    Ok(())
                }
            }
        }

        Err(err) => {
            let writer = termcolor::StandardStream::stderr(termcolor::ColorChoice::Always);
            let config = term::Config::default();
            term::emit(&mut writer.lock(), &config, &sources, &err)
                .expect("Could not print error");
            Err(String::from("Error while parsing input"))
        }
    }
}

fn main() -> Result<(), String> {
    let opt: Opt = argh::from_env();

    if opt.version {
        println!("vadc {}\nCopyright (C) 2026 Google LLC", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(input_file) = opt.input_file.as_ref() else {
        return Err("No input file is specified".to_owned());
    };

    generate_backend(&opt, input_file)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(text: &str) -> ast::File {
        let mut db = ast::SourceDatabase::new();
        parser::parse_inline(&mut db, "stdin", text.to_owned()).expect("parsing failure")
    }

    fn targets(file: &ast::File) -> Vec<String> {
        analyzer::resolve(file).into_iter().map(|request| request.target).collect()
    }

    #[test]
    fn test_exclude_declaration_matches_qualified_names() {
        let file = parse(
            r#"
            namespace N {
                partial class Holder {
                    [ValueArray<byte>(3)]
                    partial struct A;

                    [ValueArray<byte>(4)]
                    partial struct B;
                }
            }

            [ValueArray<byte>(5)]
            partial struct A;
            "#,
        );
        let file = filter_declarations(file, &["N.Holder.A".to_owned()]);
        assert_eq!(targets(&file), vec!["N.Holder.B", "A"]);
    }

    #[test]
    fn test_exclude_declaration_removes_enclosed_targets() {
        let file = parse(
            r#"
            namespace N {
                partial class Holder {
                    [ValueArray<byte>(3)]
                    partial struct A;
                }
            }

            [ValueArray<byte>(5)]
            partial struct B;
            "#,
        );
        let file = filter_declarations(file, &["N".to_owned()]);
        assert_eq!(targets(&file), vec!["B"]);
    }
}
