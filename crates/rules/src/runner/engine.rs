use std::collections::HashMap;

use crate::core::filter::ResultFilter;
use crate::core::finding::{EngineResults, EngineVersion, Finding, RuleResults};
use crate::core::input::InputSet;
use crate::core::provider::ResultProvider;
use crate::core::rule::Rule;
use crate::core::rule_input::RuleContext;
use crate::core::scoring::{aggregate_score, sanitize_rule_score};
use crate::error::EngineError;
use crate::formatter::{FormattedResults, RuleSection, RuleSectionFormatter};

/// The rule orchestrator.
///
/// Lifecycle: construct, register rules, `init` exactly once, then run
/// any number of inputs through `compute_results` and shape the records
/// with `format_results` or `filter_results`. Registration after `init`
/// and a second `init` are programming errors and panic.
pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
    name_index: HashMap<&'static str, usize>,
    initialized: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            name_index: HashMap::new(),
            initialized: false,
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        let mut engine = Self::new();
        for rule in rules {
            engine.add_rule(rule);
        }
        engine
    }

    /// Registers a rule. Registration order is the run order and the
    /// order of sections in formatted output.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        assert!(!self.initialized, "rules cannot be added after init");
        self.rules.push(rule);
    }

    /// Finalizes the rule roster. Must be called exactly once before any
    /// other entry point. Duplicate rule names are logged; the
    /// last-registered instance wins name lookups.
    pub fn init(&mut self) {
        assert!(!self.initialized, "Engine::init called twice");
        for (idx, rule) in self.rules.iter().enumerate() {
            if self.name_index.insert(rule.name(), idx).is_some() {
                tracing::error!(rule = rule.name(), "duplicate rule name registered");
            }
        }
        self.initialized = true;
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    fn check_initialized(&self) {
        assert!(self.initialized, "Engine used before init");
    }

    fn rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.name_index.get(name).map(|&idx| self.rules[idx].as_ref())
    }

    /// Runs every registered rule over a frozen input set, producing the
    /// serializable record of the run.
    ///
    /// A rule that returns an error is recorded in `error_rules`; its
    /// findings made before the error are kept and rendered, but it gets
    /// no score and does not count toward the aggregate. Rule errors
    /// never abort the run.
    pub fn compute_results(&self, input: &InputSet) -> Result<EngineResults, EngineError> {
        self.check_initialized();
        if !input.is_frozen() {
            tracing::error!("compute_results requires a frozen input set");
            return Err(EngineError::InputNotFrozen);
        }

        let context = RuleContext::new(input);
        let summary = input.summary().clone();

        let mut rule_results = Vec::with_capacity(self.rules.len());
        let mut error_rules = Vec::new();
        let mut next_id: u64 = 0;

        for rule in &self.rules {
            let mut results = RuleResults::new(rule.name());
            let succeeded = {
                let mut provider =
                    ResultProvider::new(rule.name(), &mut results.findings, &mut next_id);
                match rule.append_results(&context, &mut provider) {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!(rule = rule.name(), %error, "rule failed");
                        false
                    }
                }
            };

            let impact: f64 = results
                .findings
                .iter()
                .map(|finding| rule.compute_impact(&summary, finding))
                .sum();
            results.impact = Some(impact);

            if succeeded {
                // A rule with nothing to report scores a perfect 100;
                // its own scoring model is consulted only when findings
                // exist.
                results.score = if results.findings.is_empty() {
                    Some(100)
                } else {
                    sanitize_rule_score(rule.name(), rule.compute_score(&summary, &results))
                };
            } else {
                error_rules.push(rule.name().to_string());
            }
            rule_results.push(results);
        }

        let score = self.aggregate_for(&rule_results, &error_rules);

        Ok(EngineResults {
            rule_names: self.rules.iter().map(|r| r.name().to_string()).collect(),
            rule_results,
            error_rules,
            score,
            input_summary: summary,
            version: EngineVersion::current(),
        })
    }

    /// Mean score over rules that are scored, not errored, and not
    /// experimental. None when no rule qualifies.
    fn aggregate_for(&self, rule_results: &[RuleResults], error_rules: &[String]) -> Option<i32> {
        aggregate_score(rule_results.iter().filter_map(|results| {
            if error_rules.contains(&results.rule_name) {
                return None;
            }
            if let Some(rule) = self.rule_by_name(&results.rule_name) {
                if rule.is_experimental() {
                    return None;
                }
            }
            results.score
        }))
    }

    /// Renders a result set into the formatter tree, dropping findings
    /// the filter rejects.
    ///
    /// A rule name in the record with no registered rule makes the
    /// render partially fail: that section lands in the output's
    /// `error_rules` while every other section renders normally.
    pub fn format_results(
        &self,
        results: &EngineResults,
        filter: &dyn ResultFilter,
    ) -> Result<FormattedResults, EngineError> {
        self.check_initialized();
        if !results.is_complete() {
            tracing::error!("refusing to format a structurally invalid result set");
            return Err(EngineError::IncompleteResults);
        }

        let mut formatted = FormattedResults {
            overall_score: results.score,
            sections: Vec::new(),
            error_rules: Vec::new(),
        };

        for rule_results in &results.rule_results {
            let Some(rule) = self.rule_by_name(&rule_results.rule_name) else {
                tracing::error!(
                    rule = %rule_results.rule_name,
                    "result set references an unregistered rule"
                );
                formatted.error_rules.push(rule_results.rule_name.clone());
                continue;
            };

            let mut findings: Vec<&Finding> = rule_results
                .findings
                .iter()
                .filter(|finding| filter.accepts(finding))
                .collect();
            rule.sort_findings_for_presentation(&mut findings);

            let mut section = RuleSection {
                rule_name: rule_results.rule_name.clone(),
                header: rule.header(),
                score: rule_results.score,
                impact: rule_results.impact,
                url_blocks: Vec::new(),
            };
            // A rule with nothing to report still gets its header, so
            // readers can tell "passed" from "not run".
            if !findings.is_empty() {
                let mut formatter = RuleSectionFormatter::new(&mut section);
                rule.format_results(&findings, &mut formatter);
            }
            formatted.sections.push(section);
        }

        Ok(formatted)
    }

    /// Produces a new result set containing only findings the filter
    /// accepts, with every impact, score, and the aggregate recomputed
    /// from the survivors. The input record is not modified.
    ///
    /// Rules the filter rejects wholesale are omitted from the new set
    /// entirely. Rules that errored during analysis keep their filtered
    /// findings and their errored status, and stay unscored.
    pub fn filter_results(
        &self,
        results: &EngineResults,
        filter: &dyn ResultFilter,
    ) -> Result<EngineResults, EngineError> {
        self.check_initialized();
        if !results.is_complete() {
            tracing::error!("refusing to filter a structurally invalid result set");
            return Err(EngineError::IncompleteResults);
        }

        let summary = &results.input_summary;
        let mut rule_names = Vec::new();
        let mut rule_results = Vec::new();
        let mut error_rules = Vec::new();

        for original in &results.rule_results {
            if !filter.accepts_rule_results(original) {
                continue;
            }
            rule_names.push(original.rule_name.clone());

            let mut filtered = RuleResults::new(original.rule_name.clone());
            filtered.findings = original
                .findings
                .iter()
                .filter(|finding| filter.accepts(finding))
                .cloned()
                .collect();

            let errored = results.error_rules.contains(&original.rule_name);
            match self.rule_by_name(&original.rule_name) {
                Some(rule) => {
                    let impact: f64 = filtered
                        .findings
                        .iter()
                        .map(|finding| rule.compute_impact(summary, finding))
                        .sum();
                    filtered.impact = Some(impact);
                    if errored {
                        error_rules.push(original.rule_name.clone());
                    } else if filtered.findings.is_empty() {
                        // Nothing survived the filter: the rule has
                        // nothing left to penalize.
                        filtered.score = Some(100);
                    } else {
                        filtered.score = sanitize_rule_score(
                            &original.rule_name,
                            rule.compute_score(summary, &filtered),
                        );
                    }
                }
                None => {
                    tracing::error!(
                        rule = %original.rule_name,
                        "cannot rescore an unregistered rule"
                    );
                    error_rules.push(original.rule_name.clone());
                }
            }
            rule_results.push(filtered);
        }

        let score = self.aggregate_for(&rule_results, &error_rules);

        Ok(EngineResults {
            rule_names,
            rule_results,
            error_rules,
            score,
            input_summary: summary.clone(),
            version: EngineVersion::current(),
        })
    }

    /// One-shot convenience: compute and immediately format.
    pub fn compute_and_format_results(
        &self,
        input: &InputSet,
        filter: &dyn ResultFilter,
    ) -> Result<FormattedResults, EngineError> {
        let results = self.compute_results(input)?;
        self.format_results(&results, filter)
    }
}
