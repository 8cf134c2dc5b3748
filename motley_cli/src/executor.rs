//! Plan executor seam
//!
//! A [`PlanExecutor`] receives a plan one clause at a time. Every hook
//! defaults to a no-op so executors only override the stages they act on.

use motleyql::grammar::{Condition, Plan, QueryType};
use motleyql::logging::codes;
use motleyql::{log_info, log_success};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("Executor '{executor}' failed at {stage}: {reason}")]
    StageFailed {
        executor: String,
        stage: &'static str,
        reason: String,
    },

    #[error("Executor '{executor}' does not support query type {kind}")]
    UnsupportedQueryType { executor: String, kind: QueryType },
}

pub type ExecutorResult = Result<(), ExecutorError>;

pub trait PlanExecutor {
    fn name(&self) -> &str;

    fn process_type(&mut self, _kind: QueryType) -> ExecutorResult {
        Ok(())
    }

    fn process_fields(&mut self, _fields: &[String]) -> ExecutorResult {
        Ok(())
    }

    fn process_model_zoo(&mut self, _model_zoo: &str) -> ExecutorResult {
        Ok(())
    }

    fn process_conditions(&mut self, _conditions: &[Condition]) -> ExecutorResult {
        Ok(())
    }

    /// `desc` applies to all items
    fn process_order_by(&mut self, _items: &[String], _desc: bool) -> ExecutorResult {
        Ok(())
    }

    /// `count` is 0 when the query has no LIMIT
    fn process_limit(&mut self, _count: i64) -> ExecutorResult {
        Ok(())
    }

    fn process_data(&mut self, _data: &str) -> ExecutorResult {
        Ok(())
    }

    fn process_mode(&mut self, _mode: &str) -> ExecutorResult {
        Ok(())
    }
}

/// Hand each clause of `plan` to `executor` in plan order. The first failing
/// hook stops execution.
pub fn execute(plan: &Plan, executor: &mut dyn PlanExecutor) -> ExecutorResult {
    executor.process_type(plan.kind)?;
    executor.process_fields(&plan.fields)?;
    executor.process_model_zoo(&plan.model_zoo)?;
    executor.process_conditions(&plan.conditions)?;
    executor.process_order_by(&plan.order_by_items, plan.desc)?;
    executor.process_limit(plan.count)?;
    executor.process_data(&plan.data)?;
    executor.process_mode(&plan.mode)?;

    log_success!(
        codes::success::PLAN_EXECUTED,
        "Plan executed",
        "executor" => executor.name(),
        "model_zoo" => plan.model_zoo
    );

    Ok(())
}

/// Logs every stage it sees and remembers the order
#[derive(Debug, Default)]
pub struct TracingExecutor {
    stages: Vec<&'static str>,
}

impl TracingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }

    fn trace(&mut self, stage: &'static str, detail: String) {
        log_info!("Executor stage", "stage" => stage, "value" => detail);
        self.stages.push(stage);
    }
}

impl PlanExecutor for TracingExecutor {
    fn name(&self) -> &str {
        "tracing"
    }

    fn process_type(&mut self, kind: QueryType) -> ExecutorResult {
        if kind != QueryType::Select {
            return Err(ExecutorError::UnsupportedQueryType {
                executor: self.name().to_string(),
                kind,
            });
        }
        self.trace("type", kind.to_string());
        Ok(())
    }

    fn process_fields(&mut self, fields: &[String]) -> ExecutorResult {
        self.trace("fields", fields.join(", "));
        Ok(())
    }

    fn process_model_zoo(&mut self, model_zoo: &str) -> ExecutorResult {
        self.trace("model_zoo", model_zoo.to_string());
        Ok(())
    }

    fn process_conditions(&mut self, conditions: &[Condition]) -> ExecutorResult {
        let rendered: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
        self.trace("conditions", rendered.join(" AND "));
        Ok(())
    }

    fn process_order_by(&mut self, items: &[String], desc: bool) -> ExecutorResult {
        let direction = if desc { "DESC" } else { "ASC" };
        self.trace("order_by", format!("{} {}", items.join(", "), direction));
        Ok(())
    }

    fn process_limit(&mut self, count: i64) -> ExecutorResult {
        self.trace("limit", count.to_string());
        Ok(())
    }

    fn process_data(&mut self, data: &str) -> ExecutorResult {
        self.trace("data", data.to_string());
        Ok(())
    }

    fn process_mode(&mut self, mode: &str) -> ExecutorResult {
        self.trace("mode", mode.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct NoopExecutor;

    impl PlanExecutor for NoopExecutor {
        fn name(&self) -> &str {
            "noop"
        }
    }

    /// Rejects model zoos it does not host
    struct ZooGuard {
        hosted: &'static str,
        saw_data: bool,
    }

    impl PlanExecutor for ZooGuard {
        fn name(&self) -> &str {
            "zoo-guard"
        }

        fn process_model_zoo(&mut self, model_zoo: &str) -> ExecutorResult {
            if model_zoo == self.hosted {
                Ok(())
            } else {
                Err(ExecutorError::StageFailed {
                    executor: self.name().to_string(),
                    stage: "model_zoo",
                    reason: format!("unknown model zoo {}", model_zoo),
                })
            }
        }

        fn process_data(&mut self, _data: &str) -> ExecutorResult {
            self.saw_data = true;
            Ok(())
        }
    }

    #[test]
    fn test_default_hooks_accept_any_plan() {
        let plan = motleyql::parse("SELECT * FROM models").unwrap();
        assert!(execute(&plan, &mut NoopExecutor).is_ok());
    }

    #[test]
    fn test_stages_run_in_plan_order() {
        let plan = motleyql::parse(
            "SELECT * FROM models WHERE task = object_detection ORDER BY n_param DESC LIMIT 1",
        )
        .unwrap();

        let mut executor = TracingExecutor::new();
        execute(&plan, &mut executor).unwrap();
        assert_eq!(
            executor.stages(),
            &[
                "type",
                "fields",
                "model_zoo",
                "conditions",
                "order_by",
                "limit",
                "data",
                "mode"
            ]
        );
    }

    #[test]
    fn test_failing_hook_stops_execution() {
        let plan = motleyql::parse("SELECT * FROM elsewhere USING local_data").unwrap();
        let mut guard = ZooGuard {
            hosted: "models",
            saw_data: false,
        };

        let result = execute(&plan, &mut guard);
        assert_matches!(
            result,
            Err(ExecutorError::StageFailed {
                stage: "model_zoo",
                ..
            })
        );
        assert!(!guard.saw_data);
    }

    #[test]
    fn test_tracing_rejects_unknown_type() {
        let plan = Plan::default();
        let mut executor = TracingExecutor::new();
        assert_matches!(
            execute(&plan, &mut executor),
            Err(ExecutorError::UnsupportedQueryType { .. })
        );
        assert!(executor.stages().is_empty());
    }
}
