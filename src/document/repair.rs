//! Collapses doubly wrapped CDATA blocks left behind by earlier exports.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static NESTED_CDATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[\s*<!\[CDATA\[(.*?)\]\]>\s*\]\]>").expect("valid regex")
});

/// Rewrites `<![CDATA[<![CDATA[body]]>]]>` as `<![CDATA[body]]>`, once over
/// the whole text.
pub fn repair(text: &str) -> Cow<'_, str> {
    let repaired = NESTED_CDATA.replace_all(text, "<![CDATA[${1}]]>");
    if let Cow::Owned(_) = repaired {
        tracing::debug!("collapsed nested CDATA blocks");
    }
    repaired
}
