//! The built-in audit rules.

pub mod avoid_bad_requests;
pub mod enable_gzip_compression;
pub mod minimize_redirects;

pub use avoid_bad_requests::AvoidBadRequests;
pub use enable_gzip_compression::EnableGzipCompression;
pub use minimize_redirects::MinimizeRedirects;

use crate::core::rule::Rule;

/// Every built-in rule, in the canonical registration order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MinimizeRedirects),
        Box::new(AvoidBadRequests),
        Box::new(EnableGzipCompression),
    ]
}
