use serde::{Deserialize, Deserializer, Serialize};

use crate::core::input::InputSummary;

/// Estimated savings a finding represents if the underlying problem is
/// fixed. Rules translate these into impact units via their own weights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Savings {
    #[serde(default)]
    pub dns_requests_saved: u32,
    #[serde(default)]
    pub requests_saved: u32,
    #[serde(default)]
    pub response_bytes_saved: u64,
}

/// Rule-specific structured payload attached to a finding. A closed set:
/// each known rule family gets one variant. Payloads of kinds this build
/// does not know deserialize as "no structured detail" rather than failing
/// the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetails {
    Redirect {
        chain_length: u32,
        cacheable_hops: u32,
    },
    Caching {
        freshness_lifetime_millis: u64,
    },
    Compression {
        origin_size: u64,
        compressed_size: u64,
    },
}

fn lenient_details<'de, D>(deserializer: D) -> Result<Option<FindingDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// One diagnostic record produced by a rule.
///
/// The identifier is globally unique for the engine run that produced the
/// finding: identifiers are assigned from a single counter across all
/// rules, never reused, and strictly increasing in registration-then-
/// creation order. The resource URL order is semantically meaningful (for
/// example, a redirect chain's hop order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: u64,
    pub rule_name: String,
    pub resource_urls: Vec<String>,
    #[serde(default)]
    pub savings: Savings,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_details"
    )]
    pub details: Option<FindingDetails>,
}

impl Finding {
    pub fn add_resource_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.resource_urls.push(url.into());
        self
    }

    pub fn set_savings(&mut self, savings: Savings) -> &mut Self {
        self.savings = savings;
        self
    }

    pub fn set_details(&mut self, details: FindingDetails) -> &mut Self {
        self.details = Some(details);
        self
    }
}

/// A rule's slice of an engine run: its findings in creation order plus
/// the scores derived from them.
///
/// `score` is present only if the rule completed without error; `impact`
/// accumulates only over findings that survived filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResults {
    pub rule_name: String,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub impact: Option<f64>,
}

impl RuleResults {
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            findings: Vec::new(),
            score: None,
            impact: None,
        }
    }
}

/// Library version stamped into every result set so that a record can be
/// traced back to the build that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub fn current() -> Self {
        let mut parts = env!("CARGO_PKG_VERSION").split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Self { major, minor }
    }

    fn is_set(&self) -> bool {
        self.major != 0 || self.minor != 0
    }
}

/// The opaque, serializable record set produced by one engine run.
///
/// Value object: formatting reads it without mutating it, and filtering
/// produces a brand-new one rather than projecting this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResults {
    /// Names of every rule declared for the run, in registration order.
    pub rule_names: Vec<String>,
    /// Per-rule outcomes, in registration order.
    pub rule_results: Vec<RuleResults>,
    /// Names of rules whose analysis failed partway. Their findings are
    /// still present and rendered, but they are excluded from the
    /// aggregate score.
    pub error_rules: Vec<String>,
    /// Aggregate 0-100 score; unset when no non-experimental, non-errored
    /// rule contributed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<i32>,
    pub input_summary: InputSummary,
    pub version: EngineVersion,
}

impl EngineResults {
    pub fn is_success(&self) -> bool {
        self.error_rules.is_empty()
    }

    /// The aggregate score as callers observe it: an absent score reads as
    /// the documented default of 100.
    pub fn score_or_default(&self) -> i32 {
        self.score.unwrap_or(100)
    }

    /// Structural validity check used by the formatting and filtering
    /// entry points before they touch a record set.
    pub fn is_complete(&self) -> bool {
        if !self.version.is_set() {
            return false;
        }
        for rule_results in &self.rule_results {
            if rule_results.rule_name.is_empty() {
                return false;
            }
            if let Some(score) = rule_results.score {
                if !(0..=100).contains(&score) {
                    return false;
                }
            }
            for finding in &rule_results.findings {
                if finding.rule_name != rule_results.rule_name {
                    return false;
                }
            }
        }
        true
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> EngineResults {
        EngineResults {
            rule_names: vec!["MinimizeRedirects".to_string()],
            rule_results: vec![RuleResults {
                rule_name: "MinimizeRedirects".to_string(),
                findings: vec![Finding {
                    id: 0,
                    rule_name: "MinimizeRedirects".to_string(),
                    resource_urls: vec![
                        "http://a.example.com/".to_string(),
                        "http://b.example.com/".to_string(),
                    ],
                    savings: Savings {
                        requests_saved: 1,
                        ..Savings::default()
                    },
                    details: Some(FindingDetails::Redirect {
                        chain_length: 2,
                        cacheable_hops: 0,
                    }),
                }],
                score: Some(80),
                impact: Some(24.0),
            }],
            error_rules: vec![],
            score: Some(80),
            input_summary: InputSummary::default(),
            version: EngineVersion::current(),
        }
    }

    #[test]
    fn result_set_round_trips_through_json() {
        let results = sample_results();
        let json = results.to_json().unwrap();
        let restored = EngineResults::from_json(&json).unwrap();
        assert_eq!(restored.rule_results[0].findings[0].id, 0);
        assert_eq!(
            restored.rule_results[0].findings[0].details,
            results.rule_results[0].findings[0].details
        );
        assert_eq!(restored.score, Some(80));
        assert!(restored.is_complete());
    }

    #[test]
    fn unknown_detail_kind_reads_as_no_detail() {
        let mut json: serde_json::Value =
            serde_json::to_value(sample_results()).unwrap();
        json["rule_results"][0]["findings"][0]["details"] =
            serde_json::json!({"kind": "hologram", "shine": 9000});
        let restored: EngineResults = serde_json::from_value(json).unwrap();
        assert_eq!(restored.rule_results[0].findings[0].details, None);
    }

    #[test]
    fn default_results_are_incomplete() {
        let results = EngineResults {
            rule_names: vec![],
            rule_results: vec![],
            error_rules: vec![],
            score: None,
            input_summary: InputSummary::default(),
            version: EngineVersion::default(),
        };
        assert!(!results.is_complete());
    }

    #[test]
    fn mismatched_finding_owner_is_incomplete() {
        let mut results = sample_results();
        results.rule_results[0].findings[0].rule_name = "SomethingElse".to_string();
        assert!(!results.is_complete());
    }

    #[test]
    fn absent_score_reads_as_default_100() {
        let mut results = sample_results();
        results.score = None;
        assert_eq!(results.score_or_default(), 100);
    }
}
