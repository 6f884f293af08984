//! Localization seam. The engine and the rules only ever hand template
//! strings plus typed arguments downstream; turning those into display
//! text is the renderer's job, through an injected [`Localizer`].

use serde::{Deserialize, Serialize};

/// A string destined for end users, carried unlocalized until render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFacingString(pub String);

impl UserFacingString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Marks a string that is intentionally not translated (rule names,
/// URLs, engineering-facing text).
pub fn not_localized(s: &str) -> UserFacingString {
    UserFacingString(s.to_string())
}

const BYTES_PER_KIB: u64 = 1 << 10;
const BYTES_PER_MIB: u64 = 1 << 20;

/// Turns templates and typed argument values into localized text.
pub trait Localizer {
    fn locale(&self) -> &str;

    /// Localizes a template string. The template's `{KEY}` placeholders
    /// are substituted by the renderer after this call.
    fn localize_string(&self, s: &UserFacingString) -> String;

    fn format_int(&self, value: i64) -> String {
        value.to_string()
    }

    fn format_bytes(&self, bytes: u64) -> String {
        if bytes < BYTES_PER_KIB {
            format!("{bytes}B")
        } else if bytes < BYTES_PER_MIB {
            format!("{:.1}KiB", bytes as f64 / BYTES_PER_KIB as f64)
        } else {
            format!("{:.1}MiB", bytes as f64 / BYTES_PER_MIB as f64)
        }
    }

    fn format_duration(&self, millis: u64) -> String {
        if millis < 1_000 {
            format!("{millis}ms")
        } else if millis < 60_000 {
            format!("{:.1}s", millis as f64 / 1_000.0)
        } else {
            let minutes = millis / 60_000;
            let seconds = (millis % 60_000) / 1_000;
            format!("{minutes}m{seconds}s")
        }
    }

    fn format_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Identity localizer: English templates pass through untranslated.
#[derive(Debug, Default)]
pub struct BasicLocalizer;

impl Localizer for BasicLocalizer {
    fn locale(&self) -> &str {
        "en"
    }

    fn localize_string(&self, s: &UserFacingString) -> String {
        s.0.clone()
    }
}
