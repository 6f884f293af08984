use anyhow::{bail, Result};

use pagecheck_rules::core::scoring::score_from_impact;
use pagecheck_rules::formatter::{int_argument, RuleSectionFormatter};
use pagecheck_rules::l10n::{not_localized, UserFacingString};
use pagecheck_rules::{
    Finding, InputSet, InputSummary, Resource, ResultProvider, Rule, RuleContext, RuleResults,
};

/// Configurable rule double: emits a fixed number of findings, may fail
/// after emitting them, and can report either a direct score or one
/// derived from a fixed per-finding impact.
pub struct TestRule {
    name: &'static str,
    num_findings: usize,
    fail: bool,
    direct_score: Option<i32>,
    experimental: bool,
    impact_per_finding: f64,
}

impl TestRule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            num_findings: 1,
            fail: false,
            direct_score: None,
            experimental: false,
            impact_per_finding: 0.0,
        }
    }

    pub fn findings(mut self, count: usize) -> Self {
        self.num_findings = count;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn direct_score(mut self, score: i32) -> Self {
        self.direct_score = Some(score);
        self
    }

    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    pub fn impact_per_finding(mut self, impact: f64) -> Self {
        self.impact_per_finding = impact;
        self
    }
}

impl Rule for TestRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn header(&self) -> UserFacingString {
        not_localized(self.name)
    }

    fn documentation_url(&self) -> &'static str {
        "http://docs.example.com/rule"
    }

    fn is_experimental(&self) -> bool {
        self.experimental
    }

    fn append_results(&self, _context: &RuleContext, provider: &mut ResultProvider) -> Result<()> {
        for i in 0..self.num_findings {
            let finding = provider.new_result();
            finding.add_resource_url(format!("http://www.example.com/{}/{i}", self.name));
        }
        if self.fail {
            bail!("analysis failed partway");
        }
        Ok(())
    }

    fn compute_impact(&self, _summary: &InputSummary, _finding: &Finding) -> f64 {
        self.impact_per_finding
    }

    fn compute_score(&self, _summary: &InputSummary, results: &RuleResults) -> i32 {
        match self.direct_score {
            Some(score) => score,
            None => score_from_impact(results.impact.unwrap_or(0.0)),
        }
    }

    fn format_results(&self, findings: &[&Finding], formatter: &mut RuleSectionFormatter) {
        let mut block = formatter.add_url_block(
            not_localized("Found {COUNT} issues:"),
            vec![int_argument("COUNT", findings.len() as i64)],
        );
        for finding in findings {
            for url in &finding.resource_urls {
                let mut entry = block.add_url(url);
                entry.set_finding_id(finding.id);
            }
        }
    }
}

pub fn frozen_input() -> InputSet {
    let mut input = InputSet::new();
    input
        .add_resource(Resource::new("http://www.example.com/", 200))
        .unwrap();
    input.freeze();
    input
}
