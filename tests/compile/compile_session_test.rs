// tests/compile/compile_session_test.rs
#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{carrier_counts, flights, top};
    use async_trait::async_trait;
    use composer::compile::{
        compile_checked_dimension, compile_checked_measure, compile_structured_filter,
        CompileError, CompileResult, CompileSession, Compiler, Outcome,
    };
    use composer::filters::{Filter, FilterError, NumberFilter, StringFilter};
    use composer::model::{AtomicField, AtomicType, FilterCondition, SourceDef};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Echoes its input back, optionally after a delay.
    struct EchoCompiler {
        delay: Duration,
    }

    impl EchoCompiler {
        fn instant() -> Self {
            Self {
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Compiler for EchoCompiler {
        async fn compile_filter(
            &self,
            _source: &SourceDef,
            filter: &str,
        ) -> CompileResult<FilterCondition> {
            sleep(self.delay).await;
            if filter.contains("missing") {
                return Err(CompileError::diagnostic(
                    "internal://filter.malloy:1:12: 'missing' is not defined",
                ));
            }
            Ok(FilterCondition::new(filter))
        }

        async fn compile_measure(
            &self,
            _source: &SourceDef,
            name: &str,
            measure: &str,
        ) -> CompileResult<AtomicField> {
            Ok(AtomicField::measure(name, AtomicType::Number, measure))
        }

        async fn compile_select(
            &self,
            _source: &SourceDef,
            name: &str,
            dimension: &str,
        ) -> CompileResult<AtomicField> {
            // always claims to aggregate, to exercise the kind check
            Ok(AtomicField::measure(name, AtomicType::String, dimension))
        }

        async fn compile_query_to_sql(
            &self,
            source: &SourceDef,
            query: &str,
        ) -> CompileResult<String> {
            sleep(self.delay).await;
            Ok(format!("-- {}\n{}", source.name, query))
        }
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let session = CompileSession::new(EchoCompiler::instant());

        let slow = session.run(async {
            sleep(Duration::from_millis(200)).await;
            Ok::<_, CompileError>("slow")
        });
        let fast = session.run(async { Ok::<_, CompileError>("fast") });

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow.unwrap(), Outcome::Superseded);
        assert_eq!(fast.unwrap(), Outcome::Completed("fast"));
        assert_eq!(session.generation(), 2);
    }

    #[tokio::test]
    async fn test_single_request_completes() {
        let session = CompileSession::new(EchoCompiler::instant());
        let outcome = session.run(async { Ok::<_, CompileError>(42) }).await.unwrap();
        assert_eq!(outcome.completed(), Some(42));
    }

    #[tokio::test]
    async fn test_cancel_supersedes_in_flight() {
        let session = CompileSession::new(EchoCompiler::instant());
        let pending = session.run(async {
            sleep(Duration::from_millis(200)).await;
            Ok::<_, CompileError>(())
        });
        let cancel = async {
            sleep(Duration::from_millis(10)).await;
            session.cancel();
        };

        let (outcome, ()) = tokio::join!(pending, cancel);
        assert!(outcome.unwrap().is_superseded());
    }

    #[tokio::test]
    async fn test_errors_are_reported_for_latest_request() {
        let session = CompileSession::new(EchoCompiler::instant());
        let source = flights();
        let err = session
            .run(session.compiler().compile_filter(&source, "missing > 1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "'missing' is not defined");
    }

    #[tokio::test]
    async fn test_query_to_sql_uses_notebook_form() {
        let session = CompileSession::new(EchoCompiler {
            delay: Duration::from_millis(1),
        });
        let query = carrier_counts();
        let sql = session.query_to_sql(&query).await.unwrap();
        assert_eq!(
            sql,
            Outcome::Completed(format!(
                "-- flights\n{}",
                query.writer().query_string_for_notebook()
            ))
        );
    }

    #[tokio::test]
    async fn test_structured_filter_round_trip_into_query() {
        let compiler = EchoCompiler::instant();
        let source = flights();
        let filter = Filter::String(StringFilter::IsEqualTo {
            values: vec!["SFO".to_string()],
        });

        let condition = compile_structured_filter(&compiler, &source, "origin", &filter)
            .await
            .unwrap();
        assert_eq!(condition.code, "origin = 'SFO'");

        let query = carrier_counts().add_filter(&top(), condition).unwrap();
        assert!(query
            .writer()
            .query_string_for_notebook()
            .contains("where: origin = 'SFO'"));
    }

    #[tokio::test]
    async fn test_non_finite_filter_is_not_compiled() {
        let compiler = EchoCompiler::instant();
        let source = flights();
        let filter = Filter::Number(NumberFilter::IsLessThan { value: f64::INFINITY });

        let err = compile_structured_filter(&compiler, &source, "distance", &filter)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidFilter(FilterError::NonFinite(f64::INFINITY))
        );
    }

    #[tokio::test]
    async fn test_checked_definitions() {
        let compiler = EchoCompiler::instant();
        let source = flights();

        let measure = compile_checked_measure(&compiler, &source, "avg_distance", "distance.avg()")
            .await
            .unwrap();
        assert!(measure.aggregate);

        let err = compile_checked_dimension(&compiler, &source, "route", "concat(origin)")
            .await
            .unwrap_err();
        assert_eq!(err, CompileError::unexpected("dimension", "measure"));
    }
}
