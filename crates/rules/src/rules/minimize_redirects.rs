use anyhow::Result;

use crate::core::finding::{Finding, FindingDetails, Savings};
use crate::core::input::InputSummary;
use crate::core::provider::ResultProvider;
use crate::core::rule::Rule;
use crate::core::rule_input::RuleContext;
use crate::formatter::{int_argument, RuleSectionFormatter};
use crate::l10n::{not_localized, UserFacingString};

/// Impact units per redirect hop that could be eliminated.
const IMPACT_PER_HOP: f64 = 6.0;

/// Flags redirect chains. Each hop costs an extra round trip before the
/// final resource starts loading, and chains of two or more hops almost
/// always collapse to a single redirect or none.
pub struct MinimizeRedirects;

impl MinimizeRedirects {
    /// Permanent redirects can be cached by the client, softening the
    /// cost of repeat visits.
    fn is_cacheable_hop(status_code: i32) -> bool {
        status_code == 301 || status_code == 308
    }
}

impl Rule for MinimizeRedirects {
    fn name(&self) -> &'static str {
        "MinimizeRedirects"
    }

    fn header(&self) -> UserFacingString {
        not_localized("Minimize redirects")
    }

    fn documentation_url(&self) -> &'static str {
        "https://developers.google.com/speed/docs/insights/AvoidRedirects"
    }

    fn append_results(&self, context: &RuleContext, provider: &mut ResultProvider) -> Result<()> {
        let input = context.input();
        for chain in context.redirect_registry().chains() {
            if chain.len() < 2 {
                continue;
            }
            let hops = (chain.len() - 1) as u32;
            let cacheable_hops = chain
                .iter()
                .map(|&idx| input.resource(idx))
                .filter(|r| r.is_redirect() && Self::is_cacheable_hop(r.status_code()))
                .count() as u32;

            let finding = provider.new_result();
            for &idx in chain {
                finding.add_resource_url(input.resource(idx).request_url());
            }
            finding.set_savings(Savings {
                requests_saved: hops,
                ..Savings::default()
            });
            finding.set_details(FindingDetails::Redirect {
                chain_length: chain.len() as u32,
                cacheable_hops,
            });
        }
        Ok(())
    }

    fn compute_impact(&self, _summary: &InputSummary, finding: &Finding) -> f64 {
        IMPACT_PER_HOP * f64::from(finding.savings.requests_saved)
    }

    fn format_results(&self, findings: &[&Finding], formatter: &mut RuleSectionFormatter) {
        for finding in findings {
            let hops = finding.savings.requests_saved;
            let mut block = formatter.add_url_block(
                not_localized("Remove the following redirect chain ({HOPS} hops):"),
                vec![int_argument("HOPS", i64::from(hops))],
            );
            for url in &finding.resource_urls {
                let mut entry = block.add_url(url);
                entry.set_finding_id(finding.id);
            }
        }
    }

    fn sort_findings_for_presentation(&self, findings: &mut Vec<&Finding>) {
        // Longest chains first.
        findings.sort_by(|a, b| b.savings.requests_saved.cmp(&a.savings.requests_saved));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::InputSet;
    use crate::core::resource::Resource;

    fn run_rule(input: &InputSet) -> Vec<Finding> {
        let context = RuleContext::new(input);
        let mut findings = Vec::new();
        let mut next_id = 0u64;
        let mut provider = ResultProvider::new("MinimizeRedirects", &mut findings, &mut next_id);
        MinimizeRedirects
            .append_results(&context, &mut provider)
            .unwrap();
        findings
    }

    #[test]
    fn chain_yields_one_finding_with_hop_savings() {
        let mut input = InputSet::new();
        input
            .add_resource(
                Resource::new("http://a.example.com/", 301)
                    .with_response_header("Location", "http://b.example.com/"),
            )
            .unwrap();
        input
            .add_resource(
                Resource::new("http://b.example.com/", 302)
                    .with_response_header("Location", "http://c.example.com/"),
            )
            .unwrap();
        input
            .add_resource(Resource::new("http://c.example.com/", 200))
            .unwrap();
        input.freeze();

        let findings = run_rule(&input);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].resource_urls.len(), 3);
        assert_eq!(findings[0].savings.requests_saved, 2);
        assert_eq!(
            findings[0].details,
            Some(FindingDetails::Redirect {
                chain_length: 3,
                cacheable_hops: 1,
            })
        );
        let summary = input.summary();
        assert_eq!(
            MinimizeRedirects.compute_impact(summary, &findings[0]),
            12.0
        );
    }

    #[test]
    fn redirect_free_page_yields_nothing() {
        let mut input = InputSet::new();
        input
            .add_resource(Resource::new("http://www.example.com/", 200))
            .unwrap();
        input.freeze();
        assert!(run_rule(&input).is_empty());
    }
}
