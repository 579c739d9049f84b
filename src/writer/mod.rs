//! Query writer - serializes a pipeline to Malloy source text.
//!
//! Four forms are produced from the same token stream:
//!
//! | Form      | Shape                                          |
//! |-----------|------------------------------------------------|
//! | source    | `view: <name> is { … } -> { … }`               |
//! | model     | `query: <query> is <source> -> { … }`          |
//! | notebook  | `run: <source> -> { … }`                       |
//! | markdown  | fenced `malloy` block around the notebook form |
//!
//! The pipeline text is identical in every form, so the notebook and the
//! model form always describe the same query.

pub mod token;

pub use token::{quote_identifier, Token, TokenStream};

use serde::{Deserialize, Serialize};

use crate::model::schema::{query_field_kind, stage_inputs};
use crate::model::{
    FieldKind, PipeSegment, QueryField, QueryFieldDef, SegmentKind, SortDirection, SourceDef,
    TurtleDef,
};

/// Formatting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Writes one query against one source.
#[derive(Debug, Clone)]
pub struct QueryWriter<'a> {
    source: &'a SourceDef,
    query: &'a TurtleDef,
    options: WriterOptions,
}

impl<'a> QueryWriter<'a> {
    pub fn new(source: &'a SourceDef, query: &'a TurtleDef) -> Self {
        Self {
            source,
            query,
            options: WriterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = options;
        self
    }

    /// A view definition named `name`, to be placed inside a source.
    pub fn query_string_for_source(&self, name: &str) -> String {
        let mut ts = TokenStream::new();
        ts.statement(Token::View)
            .push(Token::Ident(name.into()))
            .space()
            .push(Token::Is)
            .space()
            .append(&self.pipeline_tokens());
        ts.serialize(&self.options)
    }

    /// A named query statement for a model file.
    pub fn query_string_for_model(&self) -> String {
        let mut ts = TokenStream::new();
        ts.statement(Token::Query)
            .push(Token::Ident(self.query.name.clone()))
            .space()
            .push(Token::Is)
            .space()
            .append(&self.sourced_pipeline_tokens());
        ts.serialize(&self.options)
    }

    /// An anonymous `run:` statement.
    pub fn query_string_for_notebook(&self) -> String {
        let mut ts = TokenStream::new();
        ts.statement(Token::Run)
            .append(&self.sourced_pipeline_tokens());
        ts.serialize(&self.options)
    }

    /// The notebook form in a fenced code block, optionally importing the
    /// model it runs against.
    pub fn query_string_for_markdown(&self, import: Option<&str>) -> String {
        let mut ts = TokenStream::new();
        ts.push(Token::Raw("```malloy".into())).newline();
        if let Some(path) = import {
            ts.push(Token::Import)
                .space()
                .push(Token::LitString(path.into()))
                .newline();
        }
        ts.statement(Token::Run)
            .append(&self.sourced_pipeline_tokens())
            .newline()
            .push(Token::Raw("```".into()));
        ts.serialize(&self.options)
    }

    /// `<source> -> { … } -> { … }`
    fn sourced_pipeline_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.source.name.clone()))
            .space()
            .push(Token::Arrow)
            .space()
            .append(&self.pipeline_tokens());
        ts
    }

    /// `{ … } -> { … }` for the whole query.
    pub fn pipeline_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        write_pipeline(&mut ts, self.source, &self.query.pipeline, 0);
        ts
    }
}

fn write_pipeline(ts: &mut TokenStream, input: &SourceDef, pipeline: &[PipeSegment], indent: usize) {
    if pipeline.is_empty() {
        ts.push(Token::LBrace).newline().indent(indent).push(Token::RBrace);
        return;
    }
    for (i, (stage_input, segment)) in stage_inputs(input, pipeline)
        .iter()
        .zip(pipeline)
        .enumerate()
    {
        if i > 0 {
            ts.space().push(Token::Arrow).space();
        }
        ts.push(Token::LBrace).newline();
        write_segment(ts, stage_input, segment, indent + 1);
        ts.indent(indent).push(Token::RBrace);
    }
}

fn write_segment(ts: &mut TokenStream, input: &SourceDef, segment: &PipeSegment, indent: usize) {
    // Consecutive simple fields under the same keyword share a statement.
    let mut pending: Option<(Token, Vec<TokenStream>)> = None;

    for field in &segment.fields {
        let keyword = field_keyword(input, segment.kind, field);
        let standalone = field.renderer.is_some() || matches!(field.def, QueryFieldDef::Nest(_));

        if standalone {
            flush(ts, &mut pending, indent);
            if let Some(renderer) = &field.renderer {
                ts.indent(indent)
                    .push(Token::Annotation(renderer.clone()))
                    .newline();
            }
            ts.indent(indent).statement(keyword);
            write_field(ts, input, field, indent);
            ts.newline();
            continue;
        }

        let mut item = TokenStream::new();
        write_field(&mut item, input, field, indent);
        match &mut pending {
            Some((current, items)) if *current == keyword => items.push(item),
            _ => {
                flush(ts, &mut pending, indent);
                pending = Some((keyword, vec![item]));
            }
        }
    }
    flush(ts, &mut pending, indent);

    for filter in &segment.filters {
        let keyword = if filter.aggregate {
            Token::Having
        } else {
            Token::Where
        };
        ts.indent(indent)
            .statement(keyword)
            .push(Token::Code(filter.code.clone()))
            .newline();
    }

    if !segment.order_by.is_empty() {
        ts.indent(indent).statement(Token::OrderBy);
        for (i, order_by) in segment.order_by.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Ident(order_by.field.clone()));
            if let Some(direction) = order_by.direction {
                ts.space().push(match direction {
                    SortDirection::Asc => Token::Asc,
                    SortDirection::Desc => Token::Desc,
                });
            }
        }
        ts.newline();
    }

    if let Some(limit) = segment.limit {
        ts.indent(indent)
            .statement(Token::Limit)
            .push(Token::LitInt(limit))
            .newline();
    }
}

fn flush(ts: &mut TokenStream, pending: &mut Option<(Token, Vec<TokenStream>)>, indent: usize) {
    let Some((keyword, items)) = pending.take() else {
        return;
    };
    ts.indent(indent).statement(keyword);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(item);
    }
    ts.newline();
}

/// The statement a field is written under.
fn field_keyword(input: &SourceDef, kind: SegmentKind, field: &QueryField) -> Token {
    match query_field_kind(input, field) {
        Some(FieldKind::Query) => Token::Nest,
        _ if kind == SegmentKind::Project => Token::Select,
        Some(FieldKind::Measure) => Token::Aggregate,
        // Unresolved references are kept so the text shows what needs fixing.
        Some(FieldKind::Dimension) | Some(FieldKind::Source) | None => Token::GroupBy,
    }
}

fn write_field(ts: &mut TokenStream, input: &SourceDef, field: &QueryField, indent: usize) {
    match &field.def {
        QueryFieldDef::Reference { path } => {
            if let Some(rename) = &field.rename {
                ts.push(Token::Ident(rename.clone()))
                    .space()
                    .push(Token::Is)
                    .space();
            }
            ts.push(Token::Path(path.clone()));
        }
        QueryFieldDef::Definition(def) => {
            ts.push(Token::Ident(field.output_name().to_string()))
                .space()
                .push(Token::Is)
                .space()
                .push(Token::Code(def.expression.clone().unwrap_or_default()));
        }
        QueryFieldDef::Nest(turtle) => {
            ts.push(Token::Ident(field.output_name().to_string()))
                .space()
                .push(Token::Is)
                .space();
            write_pipeline(ts, input, &turtle.pipeline, indent);
        }
    }

    if !field.filters.is_empty() {
        ts.space()
            .push(Token::LBrace)
            .space()
            .statement(Token::Where);
        for (i, filter) in field.filters.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Code(filter.code.clone()));
        }
        ts.space().push(Token::RBrace);
    }
}
