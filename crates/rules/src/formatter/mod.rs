//! The formatter tree: the capability-typed structure rules populate with
//! headers, URL blocks, per-URL findings, and detail lines.
//!
//! Each addition immediately materializes a node carrying an unlocalized
//! template plus a typed argument list; localization happens only at
//! render time. Builder handles borrow their parent node, so a child can
//! never outlive the tree it belongs to, and the per-URL handle is a leaf
//! type with no child-adding operations at all.

use serde::{Deserialize, Serialize};

use crate::l10n::{not_localized, UserFacingString};

/// Typed argument slotted into a template's `{KEY}` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatArgument {
    Int {
        key: String,
        value: i64,
    },
    Bytes {
        key: String,
        value: u64,
    },
    Duration {
        key: String,
        millis: u64,
    },
    String {
        key: String,
        value: String,
    },
    Url {
        key: String,
        value: String,
    },
    /// Turns the span between `{BEGIN_KEY}` and `{END_KEY}` into a link.
    Hyperlink {
        key: String,
        href: String,
    },
    /// Reference to a rectangle within a render snapshot.
    SnapshotRect {
        key: String,
        snapshot_index: u32,
        left: i32,
        top: i32,
        width: u32,
        height: u32,
    },
}

pub fn int_argument(key: &str, value: i64) -> FormatArgument {
    FormatArgument::Int { key: key.to_string(), value }
}

pub fn bytes_argument(key: &str, value: u64) -> FormatArgument {
    FormatArgument::Bytes { key: key.to_string(), value }
}

pub fn duration_argument(key: &str, millis: u64) -> FormatArgument {
    FormatArgument::Duration { key: key.to_string(), millis }
}

pub fn string_argument(key: &str, value: &str) -> FormatArgument {
    FormatArgument::String { key: key.to_string(), value: value.to_string() }
}

pub fn url_argument(key: &str, value: &str) -> FormatArgument {
    FormatArgument::Url { key: key.to_string(), value: value.to_string() }
}

pub fn hyperlink_argument(key: &str, href: &str) -> FormatArgument {
    FormatArgument::Hyperlink { key: key.to_string(), href: href.to_string() }
}

/// An unlocalized template paired with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatString {
    pub template: UserFacingString,
    pub args: Vec<FormatArgument>,
}

impl FormatString {
    pub fn new(template: UserFacingString, args: Vec<FormatArgument>) -> Self {
        Self { template, args }
    }
}

/// Detail line attached to a URL entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlEntryNode {
    pub text: FormatString,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finding_id: Option<u64>,
    pub details: Vec<FormatString>,
}

/// A block grouping findings about a set of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlBlockNode {
    pub label: FormatString,
    pub entries: Vec<UrlEntryNode>,
}

/// One rule's section of the report: header data plus its URL blocks.
/// Present even when the rule produced no findings, so a report always
/// lists every declared rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSection {
    pub rule_name: String,
    pub header: UserFacingString,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub impact: Option<f64>,
    pub url_blocks: Vec<UrlBlockNode>,
}

/// Root of one formatted report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedResults {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub overall_score: Option<i32>,
    pub sections: Vec<RuleSection>,
    /// Rule names whose sections could not be rendered (no registered
    /// rule instance). Non-empty means the format operation partially
    /// failed while still rendering everything else.
    pub error_rules: Vec<String>,
}

impl FormattedResults {
    pub fn is_complete(&self) -> bool {
        self.error_rules.is_empty()
    }
}

/// Builder handle for one rule's section.
pub struct RuleSectionFormatter<'a> {
    section: &'a mut RuleSection,
}

impl<'a> RuleSectionFormatter<'a> {
    pub(crate) fn new(section: &'a mut RuleSection) -> Self {
        Self { section }
    }

    pub fn add_url_block(
        &mut self,
        template: UserFacingString,
        args: Vec<FormatArgument>,
    ) -> UrlBlockFormatter<'_> {
        self.section.url_blocks.push(UrlBlockNode {
            label: FormatString::new(template, args),
            entries: Vec::new(),
        });
        UrlBlockFormatter {
            block: self.section.url_blocks.last_mut().expect("block was just pushed"),
        }
    }
}

/// Builder handle for a URL block.
pub struct UrlBlockFormatter<'a> {
    block: &'a mut UrlBlockNode,
}

impl<'a> UrlBlockFormatter<'a> {
    pub fn add_url_result(
        &mut self,
        template: UserFacingString,
        args: Vec<FormatArgument>,
    ) -> UrlEntryFormatter<'_> {
        self.block.entries.push(UrlEntryNode {
            text: FormatString::new(template, args),
            finding_id: None,
            details: Vec::new(),
        });
        UrlEntryFormatter {
            entry: self.block.entries.last_mut().expect("entry was just pushed"),
        }
    }

    /// Convenience for the common case of an entry that is just a URL.
    pub fn add_url(&mut self, url: &str) -> UrlEntryFormatter<'_> {
        self.add_url_result(not_localized("{URL}"), vec![url_argument("URL", url)])
    }
}

/// Leaf builder handle: a URL entry accepts detail lines and a finding
/// reference, nothing deeper.
pub struct UrlEntryFormatter<'a> {
    entry: &'a mut UrlEntryNode,
}

impl<'a> UrlEntryFormatter<'a> {
    pub fn add_detail(&mut self, template: UserFacingString, args: Vec<FormatArgument>) {
        self.entry.details.push(FormatString::new(template, args));
    }

    pub fn set_finding_id(&mut self, id: u64) {
        self.entry.finding_id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_materialize_nested_nodes() {
        let mut section = RuleSection {
            rule_name: "TestRule".to_string(),
            header: not_localized("Test rule"),
            score: Some(80),
            impact: Some(24.0),
            url_blocks: Vec::new(),
        };

        {
            let mut formatter = RuleSectionFormatter::new(&mut section);
            let mut block = formatter.add_url_block(
                not_localized("Problems found in {COUNT} resources:"),
                vec![int_argument("COUNT", 2)],
            );
            let mut entry = block.add_url("http://www.example.com/a.js");
            entry.set_finding_id(7);
            entry.add_detail(
                not_localized("Could save {SIZE}"),
                vec![bytes_argument("SIZE", 2048)],
            );
            block.add_url("http://www.example.com/b.js");
        }

        assert_eq!(section.url_blocks.len(), 1);
        let block = &section.url_blocks[0];
        assert_eq!(block.entries.len(), 2);
        assert_eq!(block.entries[0].finding_id, Some(7));
        assert_eq!(block.entries[0].details.len(), 1);
        assert_eq!(block.entries[1].finding_id, None);
    }

    #[test]
    fn formatted_tree_round_trips_through_json() {
        let results = FormattedResults {
            overall_score: Some(90),
            sections: vec![RuleSection {
                rule_name: "R".to_string(),
                header: not_localized("R header"),
                score: Some(90),
                impact: None,
                url_blocks: vec![],
            }],
            error_rules: vec![],
        };
        let json = serde_json::to_string(&results).unwrap();
        let restored: FormattedResults = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, results);
    }
}
