use anyhow::Result;

use crate::core::finding::{Finding, Savings};
use crate::core::input::InputSummary;
use crate::core::provider::ResultProvider;
use crate::core::rule::Rule;
use crate::core::rule_input::RuleContext;
use crate::formatter::RuleSectionFormatter;
use crate::l10n::{not_localized, UserFacingString};

/// Impact units per request spent on a resource that does not exist.
const IMPACT_PER_BAD_REQUEST: f64 = 6.0;

/// Flags requests for resources that are gone: each one wastes a full
/// round trip and usually indicates a stale reference in the page.
pub struct AvoidBadRequests;

impl Rule for AvoidBadRequests {
    fn name(&self) -> &'static str {
        "AvoidBadRequests"
    }

    fn header(&self) -> UserFacingString {
        not_localized("Avoid bad requests")
    }

    fn documentation_url(&self) -> &'static str {
        "https://developers.google.com/speed/docs/insights/AvoidBadRequests"
    }

    fn append_results(&self, context: &RuleContext, provider: &mut ResultProvider) -> Result<()> {
        for resource in context.input().resources() {
            if resource.status_code() == 404 || resource.status_code() == 410 {
                let finding = provider.new_result();
                finding.add_resource_url(resource.request_url());
                finding.set_savings(Savings {
                    requests_saved: 1,
                    ..Savings::default()
                });
            }
        }
        Ok(())
    }

    fn compute_impact(&self, _summary: &InputSummary, finding: &Finding) -> f64 {
        IMPACT_PER_BAD_REQUEST * f64::from(finding.savings.requests_saved)
    }

    fn format_results(&self, findings: &[&Finding], formatter: &mut RuleSectionFormatter) {
        let mut block = formatter.add_url_block(
            not_localized("The following requests are returning 404/410 responses. Either fix the broken links, or remove the references to the non-existent resources:"),
            vec![],
        );
        for finding in findings {
            for url in &finding.resource_urls {
                let mut entry = block.add_url(url);
                entry.set_finding_id(finding.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::InputSet;
    use crate::core::resource::Resource;

    #[test]
    fn missing_resources_are_flagged() {
        let mut input = InputSet::new();
        input
            .add_resource(Resource::new("http://www.example.com/", 200))
            .unwrap();
        input
            .add_resource(Resource::new("http://www.example.com/gone.png", 404))
            .unwrap();
        input
            .add_resource(Resource::new("http://www.example.com/dead.js", 410))
            .unwrap();
        input
            .add_resource(Resource::new("http://www.example.com/error", 500))
            .unwrap();
        input.freeze();

        let context = RuleContext::new(&input);
        let mut findings = Vec::new();
        let mut next_id = 0u64;
        let mut provider = ResultProvider::new("AvoidBadRequests", &mut findings, &mut next_id);
        AvoidBadRequests
            .append_results(&context, &mut provider)
            .unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].resource_urls, vec!["http://www.example.com/gone.png"]);
        assert_eq!(findings[1].resource_urls, vec!["http://www.example.com/dead.js"]);
        assert_eq!(
            AvoidBadRequests.compute_impact(input.summary(), &findings[0]),
            6.0
        );
    }
}
