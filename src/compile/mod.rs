//! Seam to the external Malloy compiler.
//!
//! The composer never parses Malloy itself. Free-text filters, new
//! dimensions and measures, and SQL previews are handed to a [`Compiler`],
//! and only its structured answers enter the query.
//!
//! ```text
//!   Filter ──to_malloy──▶ text ──Compiler──▶ FilterCondition ──▶ QueryBuilder
//!   QueryBuilder ──QueryWriter──▶ malloy ──Compiler──▶ SQL
//! ```

mod error;
mod session;

pub use error::{strip_locations, CompileError, CompileResult};
pub use session::{CompileSession, Outcome};

use async_trait::async_trait;

use crate::filters::Filter;
use crate::model::{AtomicField, FilterCondition, SourceDef};

/// An implementation of the Malloy compiler.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use composer::compile::{Compiler, CompileResult};
///
/// struct Remote { client: Client }
///
/// #[async_trait]
/// impl Compiler for Remote {
///     async fn compile_filter(&self, source: &SourceDef, filter: &str)
///         -> CompileResult<FilterCondition> {
///         self.client.post("/filter", source, filter).await
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile a filter expression against `source`.
    async fn compile_filter(&self, source: &SourceDef, filter: &str)
        -> CompileResult<FilterCondition>;

    /// Compile a measure expression into a named aggregate field.
    async fn compile_measure(
        &self,
        source: &SourceDef,
        name: &str,
        measure: &str,
    ) -> CompileResult<AtomicField>;

    /// Compile a scalar expression into a named dimension.
    async fn compile_select(
        &self,
        source: &SourceDef,
        name: &str,
        dimension: &str,
    ) -> CompileResult<AtomicField>;

    /// Translate a full query document into SQL.
    async fn compile_query_to_sql(&self, source: &SourceDef, query: &str) -> CompileResult<String>;
}

/// Compile a structured filter on the field at `field_path`.
pub async fn compile_structured_filter<C: Compiler + ?Sized>(
    compiler: &C,
    source: &SourceDef,
    field_path: &str,
    filter: &Filter,
) -> CompileResult<FilterCondition> {
    filter.validate()?;
    let text = filter.to_malloy(field_path);
    compiler.compile_filter(source, &text).await
}

/// Compile a measure and check the result really aggregates.
pub async fn compile_checked_measure<C: Compiler + ?Sized>(
    compiler: &C,
    source: &SourceDef,
    name: &str,
    measure: &str,
) -> CompileResult<AtomicField> {
    let field = compiler.compile_measure(source, name, measure).await?;
    if !field.aggregate {
        return Err(CompileError::unexpected("measure", "dimension"));
    }
    Ok(field)
}

/// Compile a dimension and check the result does not aggregate.
pub async fn compile_checked_dimension<C: Compiler + ?Sized>(
    compiler: &C,
    source: &SourceDef,
    name: &str,
    dimension: &str,
) -> CompileResult<AtomicField> {
    let field = compiler.compile_select(source, name, dimension).await?;
    if field.aggregate {
        return Err(CompileError::unexpected("dimension", "measure"));
    }
    Ok(field)
}
