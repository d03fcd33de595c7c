//! Warning tag parser
//!
//! Warning segments annotate their hazards with `LABEL...VALUE` lines such
//! as `HAIL...1.00IN` or `TORNADO...RADAR INDICATED`. Only the fixed label
//! catalog is scanned; absence of any given tag is normal and unknown
//! labels are ignored.

use crate::constants::TAG_LABELS;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn tag_regexes() -> &'static Vec<(&'static str, Regex)> {
    static REGEXES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        TAG_LABELS
            .iter()
            .filter_map(|&label| {
                Regex::new(&format!(r"(?m)^{}\.\.\.(.+)$", regex::escape(label)))
                    .ok()
                    .map(|re| (label, re))
            })
            .collect()
    })
}

/// Scan a segment for catalog tags, returning a label-to-value mapping.
///
/// Keys are unique; when a label appears twice the first occurrence wins.
pub fn parse_tags(text: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    for (label, regex) in tag_regexes() {
        if let Some(captures) = regex.captures(text) {
            let value = captures[1].trim().to_string();
            if !value.is_empty() {
                tags.entry(label.to_string()).or_insert(value);
            }
        }
    }

    tags
}
