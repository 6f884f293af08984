//! Web-page performance audit engine.
//!
//! Captured page data goes into an [`InputSet`], is frozen, and is then
//! run through an [`Engine`] holding a roster of [`Rule`]s. The run
//! produces a serializable [`EngineResults`] record, which can be
//! rendered into a formatter tree and filtered/re-scored without
//! re-running any rule.
//!
//! ```no_run
//! use pagecheck_rules::{AlwaysAcceptFilter, Engine, InputSet, Resource};
//! use pagecheck_rules::rules::builtin_rules;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut input = InputSet::new();
//! input.add_resource(Resource::new("http://www.example.com/", 200))?;
//! input.freeze();
//!
//! let mut engine = Engine::with_rules(builtin_rules());
//! engine.init();
//! let results = engine.compute_results(&input)?;
//! let formatted = engine.format_results(&results, &AlwaysAcceptFilter)?;
//! println!("{:?}", formatted.overall_score);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod formatter;
pub mod formatters;
pub mod l10n;
pub mod redirects;
pub mod rules;
pub mod runner;

pub use crate::core::{
    filter_compatible, AlwaysAcceptFilter, DomDocument, EngineResults, EngineVersion,
    ExcludedRule, Finding, FindingDetails, InputCapabilities, InputSet, InputSummary, Resource,
    ResourceType, ResultFilter, ResultProvider, Rule, RuleContext, RuleResults, Savings,
    TimelineEvent, UrlExclusionFilter,
};
pub use crate::error::{EngineError, InputError};
pub use crate::formatter::{FormattedResults, RuleSection, RuleSectionFormatter};
pub use crate::formatters::TextRenderer;
pub use crate::l10n::{BasicLocalizer, Localizer, UserFacingString};
pub use crate::redirects::RedirectRegistry;
pub use crate::runner::Engine;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin_rules;

    #[test]
    fn builtin_roster_runs_end_to_end() {
        let mut input = InputSet::new();
        input
            .add_resource(Resource::new("http://www.example.com/", 200).with_response_body("ok"))
            .unwrap();
        input.freeze();

        let mut engine = Engine::with_rules(builtin_rules());
        engine.init();
        let results = engine.compute_results(&input).unwrap();
        assert!(results.is_success());
        assert_eq!(results.score, Some(100));

        let formatted = engine.format_results(&results, &AlwaysAcceptFilter).unwrap();
        assert!(formatted.is_complete());
        assert_eq!(formatted.sections.len(), 3);
    }
}
