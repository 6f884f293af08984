use std::fmt;

use crate::core::rule::Rule;

/// Bitset of the optional input facets a rule may require and an input set
/// may provide.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct InputCapabilities(u32);

impl InputCapabilities {
    pub const NONE: InputCapabilities = InputCapabilities(0);
    pub const DOM: InputCapabilities = InputCapabilities(1);
    pub const ONLOAD: InputCapabilities = InputCapabilities(1 << 1);
    pub const REQUEST_HEADERS: InputCapabilities = InputCapabilities(1 << 2);
    pub const RESPONSE_BODY: InputCapabilities = InputCapabilities(1 << 3);
    pub const REQUEST_START_TIMES: InputCapabilities = InputCapabilities(1 << 4);
    pub const TIMELINE_DATA: InputCapabilities = InputCapabilities(1 << 5);

    pub fn union(self, other: InputCapabilities) -> InputCapabilities {
        InputCapabilities(self.0 | other.0)
    }

    pub fn add(&mut self, other: InputCapabilities) {
        self.0 |= other.0;
    }

    /// True if every capability in `required` is present in `self`.
    pub fn satisfies(self, required: InputCapabilities) -> bool {
        self.0 & required.0 == required.0
    }

    /// The capabilities in `required` that `self` lacks.
    pub fn missing_for(self, required: InputCapabilities) -> InputCapabilities {
        InputCapabilities(required.0 & !self.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

const CAPABILITY_NAMES: &[(InputCapabilities, &str)] = &[
    (InputCapabilities::DOM, "DOM"),
    (InputCapabilities::ONLOAD, "ONLOAD"),
    (InputCapabilities::REQUEST_HEADERS, "REQUEST_HEADERS"),
    (InputCapabilities::RESPONSE_BODY, "RESPONSE_BODY"),
    (InputCapabilities::REQUEST_START_TIMES, "REQUEST_START_TIMES"),
    (InputCapabilities::TIMELINE_DATA, "TIMELINE_DATA"),
];

impl fmt::Debug for InputCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut has = Vec::new();
        let mut lacks = Vec::new();
        for (cap, name) in CAPABILITY_NAMES {
            if self.satisfies(*cap) {
                has.push(*name);
            } else {
                lacks.push(*name);
            }
        }
        write!(f, "(Has: {} ** Lacks: {})", has.join(" "), lacks.join(" "))
    }
}

/// A rule that was held back from a run because the input set lacks
/// capabilities the rule declared it needs.
#[derive(Debug)]
pub struct ExcludedRule {
    pub rule_name: String,
    pub missing: InputCapabilities,
}

/// Splits `rules` into those the input can support and those it cannot.
/// Runs before the engine is constructed; the engine itself never checks
/// capabilities again.
pub fn filter_compatible(
    rules: Vec<Box<dyn Rule>>,
    available: InputCapabilities,
) -> (Vec<Box<dyn Rule>>, Vec<ExcludedRule>) {
    let mut runnable = Vec::new();
    let mut excluded = Vec::new();
    for rule in rules {
        let required = rule.required_capabilities();
        if available.satisfies(required) {
            runnable.push(rule);
        } else {
            tracing::debug!(
                rule = rule.name(),
                missing = ?available.missing_for(required),
                "rule excluded by capability filter"
            );
            excluded.push(ExcludedRule {
                rule_name: rule.name().to_string(),
                missing: available.missing_for(required),
            });
        }
    }
    (runnable, excluded)
}
