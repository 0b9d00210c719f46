//! Aggregation of rule verdicts into a single report.

use crate::backend::Store;
use crate::rules::RuleId;
use crate::verdict::{Verdict, Violation};
use serde::Serialize;
use tracing::{error, info, info_span, warn};

/// How one rule ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail { violations: Vec<Violation> },
    /// The rule could not reach a verdict.
    Error { message: String },
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Pass => Outcome::Pass,
            Verdict::Fail { violations } => Outcome::Fail { violations },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: RuleId,
    pub title: &'static str,
    pub requirement: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub results: Vec<RuleReport>,
}

impl ConformanceReport {
    /// True when every rule that ran passed.
    pub fn is_conformant(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r.outcome, Outcome::Pass))
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Pass))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Fail { .. }))
    }

    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Error { .. }))
    }

    pub fn get(&self, rule: RuleId) -> Option<&RuleReport> {
        self.results.iter().find(|r| r.rule == rule)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Run `rules` in the given order. A fatal error in one rule is recorded and
/// the remaining rules still run.
pub fn run_rules<S: Store>(store: &S, rules: &[RuleId]) -> ConformanceReport {
    let mut results = Vec::with_capacity(rules.len());

    for &rule in rules {
        let span = info_span!("rule", id = rule.as_str());
        let _guard = span.enter();

        let outcome = match rule.check(store) {
            Ok(Verdict::Pass) => {
                info!("Rule passed");
                Outcome::Pass
            }
            Ok(verdict) => {
                warn!(violations = verdict.violations().len(), "Rule failed");
                verdict.into()
            }
            Err(err) => {
                error!(error = %err, "Rule aborted");
                Outcome::Error {
                    message: err.to_string(),
                }
            }
        };

        results.push(RuleReport {
            rule,
            title: rule.title(),
            requirement: rule.requirement(),
            outcome,
        });
    }

    ConformanceReport { results }
}

/// Run every rule in requirement order.
pub fn run_all<S: Store>(store: &S) -> ConformanceReport {
    run_rules(store, &RuleId::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DbValue;
    use crate::testing::ScriptedStore;

    const CONTENTS_SQL: &str = "SELECT table_name FROM gpkg_contents";

    #[test]
    fn fatal_error_does_not_stop_later_rules() {
        let store = ScriptedStore::new()
            .with_error(CONTENTS_SQL, "no such table: gpkg_contents")
            .with_rows("PRAGMA integrity_check", &["integrity_check"], vec![vec![DbValue::from("ok")]]);

        let report = run_rules(&store, &[RuleId::ColumnDataTypes, RuleId::IntegrityCheck]);

        assert!(matches!(
            report.get(RuleId::ColumnDataTypes).unwrap().outcome,
            Outcome::Error { .. }
        ));
        assert_eq!(report.get(RuleId::IntegrityCheck).unwrap().outcome, Outcome::Pass);
        assert_eq!((report.passed(), report.failed(), report.errored()), (1, 0, 1));
        assert!(!report.is_conformant());
    }

    #[test]
    fn results_follow_requested_order() {
        let store = ScriptedStore::new()
            .with_rows("SELECT * FROM sqlite_master", &["type"], vec![])
            .with_rows("PRAGMA foreign_key_check", &["table"], vec![]);

        let report = run_rules(&store, &[RuleId::SqlAccess, RuleId::ForeignKeyCheck]);

        let order: Vec<RuleId> = report.results.iter().map(|r| r.rule).collect();
        assert_eq!(order, vec![RuleId::SqlAccess, RuleId::ForeignKeyCheck]);
        assert!(report.is_conformant());
    }

    #[test]
    fn each_rule_queries_once() {
        let store = ScriptedStore::new().with_rows(
            "PRAGMA foreign_key_check",
            &["table", "rowid", "parent", "fkid"],
            vec![vec![
                DbValue::from("child"),
                DbValue::from(7_i64),
                DbValue::from("parent"),
                DbValue::from(0_i64),
            ]],
        );

        let report = run_rules(&store, &[RuleId::ForeignKeyCheck]);

        assert_eq!(report.failed(), 1);
        assert_eq!(store.calls(), vec!["PRAGMA foreign_key_check".to_string()]);
    }

    #[test]
    fn report_serializes_outcomes() {
        let report = ConformanceReport {
            results: vec![RuleReport {
                rule: RuleId::SqlAccess,
                title: RuleId::SqlAccess.title(),
                requirement: RuleId::SqlAccess.requirement(),
                outcome: Outcome::Error {
                    message: "boom".to_string(),
                },
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["rule"], "sql_access");
        assert_eq!(json["results"][0]["outcome"]["status"], "error");
        assert_eq!(json["results"][0]["outcome"]["message"], "boom");
    }
}
