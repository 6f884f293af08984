use anyhow::Result;

use crate::core::capabilities::InputCapabilities;
use crate::core::finding::{Finding, RuleResults};
use crate::core::input::InputSummary;
use crate::core::provider::ResultProvider;
use crate::core::rule_input::RuleContext;
use crate::core::scoring::score_from_impact;
use crate::formatter::RuleSectionFormatter;
use crate::l10n::UserFacingString;

/// A performance audit rule.
///
/// Rules are stateless across runs. Each participates in three phases of
/// an engine run: analysis (`append_results`), scoring (`compute_impact`
/// and optionally `compute_score`), and presentation (`format_results`).
/// Implementations own no input data; everything they inspect flows in
/// through the [`RuleContext`].
pub trait Rule: Send + Sync {
    /// Stable machine identifier, unique across registered rules.
    fn name(&self) -> &'static str;

    /// Localizable section heading for the rendered report.
    fn header(&self) -> UserFacingString;

    /// Reference documentation for the rendered report.
    fn documentation_url(&self) -> &'static str;

    /// Capabilities the rule needs from the input. Rules requiring more
    /// than the input can provide are excluded up front rather than run
    /// against partial data.
    fn required_capabilities(&self) -> InputCapabilities {
        InputCapabilities::NONE
    }

    /// Experimental rules run and render normally but never contribute
    /// to the aggregate score.
    fn is_experimental(&self) -> bool {
        false
    }

    /// Analyzes the input and appends zero or more findings. Returning
    /// an error marks the rule as errored for the run; findings appended
    /// before the error are kept.
    fn append_results(&self, context: &RuleContext, provider: &mut ResultProvider) -> Result<()>;

    /// Renders the rule's surviving findings into its report section.
    fn format_results(&self, findings: &[&Finding], formatter: &mut RuleSectionFormatter);

    /// Impact units attributed to one finding. Units approximate
    /// estimated round-trip cost; zero means the finding is purely
    /// informational.
    fn compute_impact(&self, _summary: &InputSummary, _finding: &Finding) -> f64 {
        0.0
    }

    /// The rule's 0-100 score, or -1 when no score can be computed. The
    /// default derives the score from accumulated impact; rules with
    /// their own scoring model override this.
    fn compute_score(&self, _summary: &InputSummary, results: &RuleResults) -> i32 {
        score_from_impact(results.impact.unwrap_or(0.0))
    }

    /// Orders findings for presentation. The default keeps creation
    /// order.
    fn sort_findings_for_presentation(&self, _findings: &mut Vec<&Finding>) {}
}
