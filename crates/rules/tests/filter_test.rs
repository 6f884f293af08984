mod common;

use common::{frozen_input, TestRule};
use pagecheck_rules::{
    AlwaysAcceptFilter, Engine, Finding, ResultFilter, RuleResults, UrlExclusionFilter,
};

fn engine_with(rules: Vec<TestRule>) -> Engine {
    let mut engine = Engine::new();
    for rule in rules {
        engine.add_rule(Box::new(rule));
    }
    engine.init();
    engine
}

/// Rejects every finding, and optionally a whole rule by name.
struct RejectingFilter {
    rejected_rule: Option<&'static str>,
}

impl ResultFilter for RejectingFilter {
    fn accepts(&self, _finding: &Finding) -> bool {
        false
    }

    fn accepts_rule_results(&self, results: &RuleResults) -> bool {
        self.rejected_rule != Some(results.rule_name.as_str())
    }
}

#[test]
fn filtering_rescores_from_surviving_findings() {
    let engine = engine_with(vec![TestRule::new("Costly").findings(1).impact_per_finding(72.0)]);
    let results = engine.compute_results(&frozen_input()).unwrap();
    assert_eq!(results.score, Some(60));

    // Identity filter: the new record scores identically.
    let same = engine.filter_results(&results, &AlwaysAcceptFilter).unwrap();
    assert_eq!(same.rule_results[0].impact, Some(72.0));
    assert_eq!(same.score, Some(60));

    // Rejecting every finding leaves nothing to penalize.
    let emptied = engine
        .filter_results(&results, &RejectingFilter { rejected_rule: None })
        .unwrap();
    assert!(emptied.rule_results[0].findings.is_empty());
    assert_eq!(emptied.rule_results[0].impact, Some(0.0));
    assert_eq!(emptied.rule_results[0].score, Some(100));
    assert_eq!(emptied.score, Some(100));

    // The source record is untouched.
    assert_eq!(results.rule_results[0].findings.len(), 1);
    assert_eq!(results.score, Some(60));
}

#[test]
fn fully_filtered_direct_score_rule_rescored_to_100() {
    let engine = engine_with(vec![TestRule::new("Direct").findings(1).direct_score(30)]);
    let results = engine.compute_results(&frozen_input()).unwrap();
    assert_eq!(results.rule_results[0].score, Some(30));

    // While a finding survives, the rule's own score stands.
    let kept = engine.filter_results(&results, &AlwaysAcceptFilter).unwrap();
    assert_eq!(kept.rule_results[0].score, Some(30));

    // Once every finding is gone, the rule's scoring model is no
    // longer consulted.
    let emptied = engine
        .filter_results(&results, &RejectingFilter { rejected_rule: None })
        .unwrap();
    assert!(emptied.rule_results[0].findings.is_empty());
    assert_eq!(emptied.rule_results[0].score, Some(100));
    assert_eq!(emptied.score, Some(100));
}

#[test]
fn rejected_rule_is_omitted_entirely() {
    let engine = engine_with(vec![
        TestRule::new("Kept").findings(1),
        TestRule::new("Dropped").findings(1),
    ]);
    let results = engine.compute_results(&frozen_input()).unwrap();

    let filtered = engine
        .filter_results(
            &results,
            &RejectingFilter {
                rejected_rule: Some("Dropped"),
            },
        )
        .unwrap();
    assert_eq!(filtered.rule_names, vec!["Kept"]);
    assert_eq!(filtered.rule_results.len(), 1);
    assert_eq!(filtered.rule_results[0].rule_name, "Kept");
}

#[test]
fn errored_rules_stay_unscored_after_filtering() {
    let engine = engine_with(vec![
        TestRule::new("Broken").findings(2).failing(),
        TestRule::new("Fine").findings(0),
    ]);
    let results = engine.compute_results(&frozen_input()).unwrap();

    let filtered = engine.filter_results(&results, &AlwaysAcceptFilter).unwrap();
    assert_eq!(filtered.error_rules, vec!["Broken"]);
    assert_eq!(filtered.rule_results[0].score, None);
    assert_eq!(filtered.rule_results[0].findings.len(), 2);
    assert_eq!(filtered.score, Some(100));
}

#[test]
fn url_exclusion_drops_matching_findings_from_rendering() {
    let engine = engine_with(vec![TestRule::new("Noisy").findings(3)]);
    let results = engine.compute_results(&frozen_input()).unwrap();

    // TestRule URLs look like http://www.example.com/Noisy/<index>.
    let filter = UrlExclusionFilter::new(vec!["/Noisy/1".to_string()]);
    let formatted = engine.format_results(&results, &filter).unwrap();
    let entries = &formatted.sections[0].url_blocks[0].entries;
    assert_eq!(entries.len(), 2);

    let rescored = engine.filter_results(&results, &filter).unwrap();
    assert_eq!(rescored.rule_results[0].findings.len(), 2);
    // Finding identifiers persist across filtering, so the survivors
    // keep their original ids.
    assert_eq!(
        rescored.rule_results[0]
            .findings
            .iter()
            .map(|f| f.id)
            .collect::<Vec<_>>(),
        vec![0, 2]
    );
}
