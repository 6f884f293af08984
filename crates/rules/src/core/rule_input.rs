use once_cell::sync::OnceCell;

use crate::core::input::InputSet;
use crate::redirects::RedirectRegistry;

/// Read-only view rules analyze through: the frozen input set plus
/// lazily-built derived indices shared across all rules of a run.
///
/// Derived data is computed at most once per run, on first request, so
/// rules that never ask for it cost nothing and rules that share it do
/// not recompute it.
pub struct RuleContext<'a> {
    input: &'a InputSet,
    redirects: OnceCell<RedirectRegistry>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context over a frozen input set. Passing an unfrozen
    /// set is a programming error in the caller.
    pub fn new(input: &'a InputSet) -> Self {
        assert!(
            input.is_frozen(),
            "RuleContext requires a frozen input set"
        );
        Self {
            input,
            redirects: OnceCell::new(),
        }
    }

    pub fn input(&self) -> &InputSet {
        self.input
    }

    /// Redirect chains of the input, built on first access.
    pub fn redirect_registry(&self) -> &RedirectRegistry {
        self.redirects
            .get_or_init(|| RedirectRegistry::build(self.input))
    }
}
