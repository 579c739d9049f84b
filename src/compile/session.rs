use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{CompileResult, Compiler};
use crate::modifiers::QueryBuilder;

/// Result of a request that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    /// A newer request started before this one finished.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

/// Serializes compile requests so only the latest one reports a result.
///
/// Every call to [`CompileSession::run`] bumps a generation counter. A
/// request still in flight when the counter moves resolves to
/// [`Outcome::Superseded`] instead of its value. Use one session per kind
/// of request (query runs, filter editors) so unrelated requests do not
/// cancel each other.
pub struct CompileSession<C> {
    compiler: C,
    generation: watch::Sender<u64>,
}

impl<C: Compiler> CompileSession<C> {
    pub fn new(compiler: C) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            compiler,
            generation,
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Generation of the most recent request.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Supersede whatever is in flight without starting a new request.
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g += 1);
        debug!(generation = self.generation(), "cancelled in-flight compile");
    }

    /// Run `request` as the newest generation.
    pub async fn run<T, F>(&self, request: F) -> CompileResult<Outcome<T>>
    where
        F: Future<Output = CompileResult<T>>,
    {
        let mut changes = self.generation.subscribe();
        self.generation.send_modify(|g| *g += 1);
        let mine = *changes.borrow_and_update();
        debug!(generation = mine, "compile started");

        tokio::select! {
            result = request => {
                if *self.generation.borrow() != mine {
                    debug!(generation = mine, "compile finished after being superseded");
                    return Ok(Outcome::Superseded);
                }
                match result {
                    Ok(value) => {
                        debug!(generation = mine, "compile completed");
                        Ok(Outcome::Completed(value))
                    }
                    Err(err) => {
                        warn!(generation = mine, error = %err, "compile failed");
                        Err(err)
                    }
                }
            }
            _ = changes.changed() => {
                debug!(generation = mine, "compile superseded");
                Ok(Outcome::Superseded)
            }
        }
    }

    /// SQL for the current state of `builder`.
    pub async fn query_to_sql(&self, builder: &QueryBuilder) -> CompileResult<Outcome<String>> {
        let malloy = builder.writer().query_string_for_notebook();
        self.run(self.compiler.compile_query_to_sql(builder.source(), &malloy))
            .await
    }
}
