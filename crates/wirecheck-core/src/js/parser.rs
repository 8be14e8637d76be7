//! Parser module for JavaScript source code
//!
//! Integrates with SWC for parsing source files into AST.

use std::ops::Range;

use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, SourceFile, SourceMap, Span, Spanned};
use swc_ecma_ast::ModuleItem;
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax, parse_file_as_module, parse_file_as_script};

pub use swc_ecma_ast::{EsVersion, Module};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
}

pub fn detect_language(filename: &str) -> Language {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "ts" | "mts" | "cts" => Language::TypeScript,
        "tsx" => Language::Tsx,
        "jsx" => Language::Jsx,
        _ => Language::JavaScript,
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct ParseResult {
    pub module: Option<Module>,
    pub errors: Vec<ParseError>,
    start_pos: BytePos,
}

/// Source text together with its syntax tree and the errors met on the way.
pub struct ParsedFile {
    source: String,
    module: Option<Module>,
    errors: Vec<ParseError>,
    start_pos: BytePos,
    line_starts: Vec<usize>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("source_len", &self.source.len())
            .field("has_module", &self.module.is_some())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let parser = Parser::for_file(filename);
        let result = parser.parse_module_recovering(source);

        Self {
            source: source.to_string(),
            module: result.module,
            errors: result.errors,
            start_pos: result.start_pos,
            line_starts: line_starts(source),
        }
    }

    pub fn module(&self) -> Option<&Module> {
        self.module.as_ref()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Byte range of `span` within the parsed source text.
    pub fn span_range(&self, span: Span) -> Range<usize> {
        let offset = |pos: BytePos| {
            (pos.0.saturating_sub(self.start_pos.0) as usize).min(self.source.len())
        };
        offset(span.lo)..offset(span.hi)
    }

    /// 1-based line of the start of `span`.
    pub fn line_of(&self, span: Span) -> usize {
        let offset = self.span_range(span).start;
        self.line_starts.partition_point(|&start| start <= offset).max(1)
    }
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    jsx: bool,
    typescript: bool,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jsx(mut self, enabled: bool) -> Self {
        self.jsx = enabled;
        self
    }

    pub fn typescript(mut self, enabled: bool) -> Self {
        self.typescript = enabled;
        self
    }

    pub fn build(self) -> Parser {
        let syntax = if self.typescript {
            Syntax::Typescript(TsSyntax {
                tsx: self.jsx,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx: self.jsx,
                ..Default::default()
            })
        };

        Parser { syntax }
    }
}

#[derive(Debug, Clone)]
pub struct Parser {
    syntax: Syntax,
}

impl Parser {
    pub fn new() -> Self {
        Self::builder().jsx(true).build()
    }

    pub fn for_file(filename: &str) -> Self {
        match detect_language(filename) {
            Language::JavaScript | Language::Jsx => Self::new(),
            Language::TypeScript => Self::builder().typescript(true).build(),
            Language::Tsx => Self::builder().typescript(true).jsx(true).build(),
        }
    }

    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    /// Parses `code` as a module, falling back to classic script rules when
    /// the module grammar rejects it. Recoverable errors are returned next to
    /// the tree; a fatal error leaves `module` empty.
    pub fn parse_module_recovering(&self, code: &str) -> ParseResult {
        let source_map: Lrc<SourceMap> = Default::default();
        let fm = source_map
            .new_source_file(FileName::Custom("input.js".into()).into(), code.to_string());

        let mut recovered_errors = Vec::new();
        let module_result = parse_file_as_module(
            &fm,
            self.syntax,
            EsVersion::latest(),
            None,
            &mut recovered_errors,
        );

        let module_error = match module_result {
            Ok(module) => {
                return ParseResult {
                    module: Some(module),
                    errors: convert_errors(&source_map, recovered_errors),
                    start_pos: fm.start_pos,
                };
            }
            Err(e) => e,
        };

        if let Some(result) = self.parse_as_script(&source_map, &fm) {
            return result;
        }

        let mut errors = convert_errors(&source_map, recovered_errors);
        errors.push(to_parse_error(&source_map, module_error));
        ParseResult {
            module: None,
            errors,
            start_pos: fm.start_pos,
        }
    }

    fn parse_as_script(&self, source_map: &SourceMap, fm: &SourceFile) -> Option<ParseResult> {
        let mut recovered_errors = Vec::new();
        let script = parse_file_as_script(
            fm,
            self.syntax,
            EsVersion::latest(),
            None,
            &mut recovered_errors,
        )
        .ok()?;

        let module = Module {
            span: script.span,
            body: script.body.into_iter().map(ModuleItem::Stmt).collect::<Vec<_>>(),
            shebang: script.shebang,
        };

        Some(ParseResult {
            module: Some(module),
            errors: convert_errors(source_map, recovered_errors),
            start_pos: fm.start_pos,
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_errors(source_map: &SourceMap, errors: Vec<swc_ecma_parser::error::Error>) -> Vec<ParseError> {
    errors
        .into_iter()
        .map(|e| to_parse_error(source_map, e))
        .collect()
}

fn to_parse_error(source_map: &SourceMap, error: swc_ecma_parser::error::Error) -> ParseError {
    let loc = source_map.lookup_char_pos(error.span().lo);
    ParseError {
        line: loc.line,
        column: loc.col_display,
        message: error.kind().msg().to_string(),
    }
}
