use crate::core::finding::{Finding, RuleResults};

/// Predicate applied during formatting and re-scoring to drop findings
/// (or whole rules) from consideration.
pub trait ResultFilter {
    /// Whether an individual finding should be kept.
    fn accepts(&self, finding: &Finding) -> bool;

    /// Whether a rule's results participate at all. Rejected rules are
    /// omitted from filtered result sets entirely, findings and score
    /// alike.
    fn accepts_rule_results(&self, _results: &RuleResults) -> bool {
        true
    }
}

/// The identity filter: everything passes.
#[derive(Debug, Default)]
pub struct AlwaysAcceptFilter;

impl ResultFilter for AlwaysAcceptFilter {
    fn accepts(&self, _finding: &Finding) -> bool {
        true
    }
}

/// Rejects findings mentioning any URL that contains one of the
/// configured substrings. Useful for carving third-party content out of
/// a report.
#[derive(Debug, Default)]
pub struct UrlExclusionFilter {
    substrings: Vec<String>,
}

impl UrlExclusionFilter {
    pub fn new(substrings: Vec<String>) -> Self {
        Self { substrings }
    }
}

impl ResultFilter for UrlExclusionFilter {
    fn accepts(&self, finding: &Finding) -> bool {
        !finding.resource_urls.iter().any(|url| {
            self.substrings
                .iter()
                .any(|substring| url.contains(substring))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finding::Savings;

    fn finding_with_urls(urls: &[&str]) -> Finding {
        Finding {
            id: 0,
            rule_name: "TestRule".to_string(),
            resource_urls: urls.iter().map(|u| u.to_string()).collect(),
            savings: Savings::default(),
            details: None,
        }
    }

    #[test]
    fn always_accept_passes_everything() {
        let filter = AlwaysAcceptFilter;
        assert!(filter.accepts(&finding_with_urls(&["http://www.example.com/"])));
        assert!(filter.accepts_rule_results(&RuleResults::new("AnyRule")));
    }

    #[test]
    fn exclusion_rejects_any_matching_url() {
        let filter = UrlExclusionFilter::new(vec!["ads.".to_string()]);
        assert!(filter.accepts(&finding_with_urls(&["http://www.example.com/a.js"])));
        assert!(!filter.accepts(&finding_with_urls(&[
            "http://www.example.com/a.js",
            "http://ads.example.com/track.js",
        ])));
    }
}
