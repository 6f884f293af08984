use crate::core::finding::{Finding, Savings};

/// Per-rule-run builder through which a rule appends findings.
///
/// The provider borrows the engine-run-wide identifier counter, seeded
/// with the running total from all previously-run rules in the same
/// invocation. Identifiers are therefore globally unique and strictly
/// increasing across the whole run, which lets consumers reference a
/// specific finding across a filtered/unfiltered pair of result sets
/// produced from the same run.
pub struct ResultProvider<'a> {
    rule_name: &'a str,
    findings: &'a mut Vec<Finding>,
    next_id: &'a mut u64,
}

impl<'a> ResultProvider<'a> {
    pub(crate) fn new(
        rule_name: &'a str,
        findings: &'a mut Vec<Finding>,
        next_id: &'a mut u64,
    ) -> Self {
        Self {
            rule_name,
            findings,
            next_id,
        }
    }

    /// Appends a new finding stamped with the next free identifier and
    /// returns it for the rule to fill in.
    pub fn new_result(&mut self) -> &mut Finding {
        let id = *self.next_id;
        *self.next_id += 1;
        self.findings.push(Finding {
            id,
            rule_name: self.rule_name.to_string(),
            resource_urls: Vec::new(),
            savings: Savings::default(),
            details: None,
        });
        self.findings.last_mut().expect("finding was just pushed")
    }

    pub fn result_count(&self) -> usize {
        self.findings.len()
    }
}
