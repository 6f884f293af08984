//! Plain-text renderer for formatted results.
//!
//! Localization happens here, not upstream: templates arrive with typed
//! arguments, and each argument is formatted through the injected
//! [`Localizer`] before being substituted into its `{KEY}` placeholder.

use crate::formatter::{FormatArgument, FormatString, FormattedResults, RuleSection};
use crate::l10n::Localizer;

pub struct TextRenderer<'a> {
    localizer: &'a dyn Localizer,
}

impl<'a> TextRenderer<'a> {
    pub fn new(localizer: &'a dyn Localizer) -> Self {
        Self { localizer }
    }

    pub fn render(&self, results: &FormattedResults) -> String {
        let mut out = String::new();
        if let Some(score) = results.overall_score {
            out.push_str(&format!("Overall score: {score}/100\n\n"));
        }
        for section in &results.sections {
            self.render_section(section, &mut out);
            out.push('\n');
        }
        if !results.error_rules.is_empty() {
            out.push_str("Sections that could not be rendered:\n");
            for name in &results.error_rules {
                out.push_str(&format!("  {name}\n"));
            }
        }
        out
    }

    fn render_section(&self, section: &RuleSection, out: &mut String) {
        let header = self.localizer.localize_string(&section.header);
        match section.score {
            Some(score) => out.push_str(&format!("{header} (score: {score})\n")),
            None => out.push_str(&format!("{header}\n")),
        }
        for block in &section.url_blocks {
            out.push_str("  ");
            out.push_str(&self.render_format_string(&block.label));
            out.push('\n');
            for entry in &block.entries {
                out.push_str("    ");
                out.push_str(&self.render_format_string(&entry.text));
                out.push('\n');
                for detail in &entry.details {
                    out.push_str("      ");
                    out.push_str(&self.render_format_string(detail));
                    out.push('\n');
                }
            }
        }
    }

    fn render_format_string(&self, fs: &FormatString) -> String {
        let mut text = self.localizer.localize_string(&fs.template);
        for arg in &fs.args {
            match arg {
                FormatArgument::Int { key, value } => {
                    substitute(&mut text, key, &self.localizer.format_int(*value));
                }
                FormatArgument::Bytes { key, value } => {
                    substitute(&mut text, key, &self.localizer.format_bytes(*value));
                }
                FormatArgument::Duration { key, millis } => {
                    substitute(&mut text, key, &self.localizer.format_duration(*millis));
                }
                FormatArgument::String { key, value } => {
                    substitute(&mut text, key, value);
                }
                FormatArgument::Url { key, value } => {
                    substitute(&mut text, key, &self.localizer.format_url(value));
                }
                FormatArgument::Hyperlink { key, href } => {
                    // Plain text carries no links; the closing marker
                    // becomes a parenthesized target instead.
                    substitute(&mut text, &format!("BEGIN_{key}"), "");
                    substitute(&mut text, &format!("END_{key}"), &format!(" ({href})"));
                }
                FormatArgument::SnapshotRect {
                    key,
                    snapshot_index,
                    left,
                    top,
                    width,
                    height,
                } => {
                    substitute(
                        &mut text,
                        key,
                        &format!("[snapshot {snapshot_index}: {width}x{height} at ({left},{top})]"),
                    );
                }
            }
        }
        text
    }
}

fn substitute(text: &mut String, key: &str, replacement: &str) {
    let placeholder = format!("{{{key}}}");
    if text.contains(&placeholder) {
        *text = text.replace(&placeholder, replacement);
    } else {
        tracing::warn!(key, "format argument has no matching placeholder");
    }
}
