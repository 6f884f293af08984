//! Core vocabulary of the audit pipeline: inputs, rules, findings, and
//! the scoring machinery that ties them together.

pub mod capabilities;
pub mod filter;
pub mod finding;
pub mod input;
pub mod provider;
pub mod resource;
pub mod rule;
pub mod rule_input;
pub mod scoring;

pub use capabilities::{filter_compatible, ExcludedRule, InputCapabilities};
pub use filter::{AlwaysAcceptFilter, ResultFilter, UrlExclusionFilter};
pub use finding::{EngineResults, EngineVersion, Finding, FindingDetails, RuleResults, Savings};
pub use input::{DomDocument, InputSet, InputSummary, TimelineEvent};
pub use provider::ResultProvider;
pub use resource::{Resource, ResourceType};
pub use rule::Rule;
pub use rule_input::RuleContext;
pub use scoring::{aggregate_score, sanitize_rule_score, score_from_impact};
