use anyhow::Result;

use crate::core::capabilities::InputCapabilities;
use crate::core::finding::{Finding, FindingDetails, Savings};
use crate::core::input::InputSummary;
use crate::core::provider::ResultProvider;
use crate::core::resource::{Resource, ResourceType};
use crate::core::rule::Rule;
use crate::core::rule_input::RuleContext;
use crate::formatter::{bytes_argument, RuleSectionFormatter};
use crate::l10n::{not_localized, UserFacingString};

/// Responses smaller than this gain little or nothing from compression.
const MIN_COMPRESSIBLE_BYTES: u64 = 150;

/// Impact units per 2KiB of estimated savings.
const BYTES_PER_IMPACT_UNIT: f64 = 2048.0;

/// Assumed compression ratio for text content: gzip typically removes
/// about two thirds of the payload.
const ESTIMATED_SAVINGS_RATIO: f64 = 2.0 / 3.0;

/// Flags compressible text responses served without Content-Encoding.
pub struct EnableGzipCompression;

impl EnableGzipCompression {
    fn is_compressible(resource: &Resource) -> bool {
        if resource.response_header("content-encoding").is_some() {
            return false;
        }
        if resource.response_body_len() < MIN_COMPRESSIBLE_BYTES {
            return false;
        }
        matches!(
            resource.resource_type(),
            ResourceType::Html | ResourceType::Text | ResourceType::Css | ResourceType::Js
        )
    }
}

impl Rule for EnableGzipCompression {
    fn name(&self) -> &'static str {
        "EnableGzipCompression"
    }

    fn header(&self) -> UserFacingString {
        not_localized("Enable compression")
    }

    fn documentation_url(&self) -> &'static str {
        "https://developers.google.com/speed/docs/insights/EnableCompression"
    }

    fn required_capabilities(&self) -> InputCapabilities {
        InputCapabilities::RESPONSE_BODY
    }

    fn append_results(&self, context: &RuleContext, provider: &mut ResultProvider) -> Result<()> {
        for resource in context.input().resources() {
            if !Self::is_compressible(resource) {
                continue;
            }
            let origin_size = resource.response_body_len();
            let saved = (origin_size as f64 * ESTIMATED_SAVINGS_RATIO) as u64;

            let finding = provider.new_result();
            finding.add_resource_url(resource.request_url());
            finding.set_savings(Savings {
                response_bytes_saved: saved,
                ..Savings::default()
            });
            finding.set_details(FindingDetails::Compression {
                origin_size,
                compressed_size: origin_size - saved,
            });
        }
        Ok(())
    }

    fn compute_impact(&self, _summary: &InputSummary, finding: &Finding) -> f64 {
        finding.savings.response_bytes_saved as f64 / BYTES_PER_IMPACT_UNIT
    }

    fn format_results(&self, findings: &[&Finding], formatter: &mut RuleSectionFormatter) {
        let total_saved: u64 = findings
            .iter()
            .map(|f| f.savings.response_bytes_saved)
            .sum();
        let mut block = formatter.add_url_block(
            not_localized(
                "Compressing the following resources with gzip could reduce their transfer size by about {SAVINGS}:",
            ),
            vec![bytes_argument("SAVINGS", total_saved)],
        );
        for finding in findings {
            for url in &finding.resource_urls {
                let mut entry = block.add_url_result(
                    not_localized("{URL} could save {SAVED}"),
                    vec![
                        crate::formatter::url_argument("URL", url),
                        bytes_argument("SAVED", finding.savings.response_bytes_saved),
                    ],
                );
                entry.set_finding_id(finding.id);
            }
        }
    }

    fn sort_findings_for_presentation(&self, findings: &mut Vec<&Finding>) {
        // Largest savings first.
        findings.sort_by(|a, b| {
            b.savings
                .response_bytes_saved
                .cmp(&a.savings.response_bytes_saved)
        });
    }
}
