//! Plain text <-> TestLink rich-text markup.
//!
//! `encode` produces the minimal markup TestLink renders for long-text fields:
//! one `<p>` per non-blank line, and an `<ol>` of `<li><p>` items for each run
//! of lines starting with the bullet glyph `・`.
//!
//! `decode` goes the other way for whatever markup a document carries. It is a
//! small scanner that understands exactly five tag families (paragraph, line
//! break, list, list item, anything else) and never fails: unknown or broken
//! markup degrades to its text content.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Line prefix marking a list item in plain text.
pub const BULLET: char = '・';

/// Markup for an empty long-text field.
pub const EMPTY_PARAGRAPH: &str = "<p></p>";

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Block nesting beyond this depth is read as plain text.
const MAX_NESTING: usize = 64;

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").expect("valid regex"));

// ============================================================================
// ENCODING
// ============================================================================

/// Converts plain multi-line text to markup.
pub fn encode(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_PARAGRAPH.to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in text.split('\n') {
        let line = line.trim();
        if let Some(item) = line.strip_prefix(BULLET) {
            if !in_list {
                parts.push("<ol>".to_string());
                in_list = true;
            }
            parts.push(format!("<li><p>{}</p></li>", escape(item.trim())));
            continue;
        }
        if in_list {
            parts.push("</ol>".to_string());
            in_list = false;
        }
        if !line.is_empty() {
            parts.push(format!("<p>{}</p>", escape(line)));
        }
    }
    if in_list {
        parts.push("</ol>".to_string());
    }

    if parts.is_empty() {
        return EMPTY_PARAGRAPH.to_string();
    }
    parts.join("\n")
}

/// Escapes the five markup-significant characters.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ============================================================================
// DECODING
// ============================================================================

/// Converts markup back to plain text. Best effort; never fails.
pub fn decode(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let unwrapped = strip_cdata(markup);
    let text = decode_fragment(&unwrapped, 0);
    let text = decode_entities(&text);
    normalize_whitespace(&text)
}

/// Removes CDATA wrappers, keeping their bodies. Nested wrappers are removed
/// layer by layer.
pub fn strip_cdata(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);
    while current.contains(CDATA_OPEN) {
        let next = strip_cdata_once(&current);
        if next.len() == current.len() {
            break;
        }
        current = Cow::Owned(next);
    }
    current
}

fn strip_cdata_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(CDATA_OPEN) {
        let body_start = open + CDATA_OPEN.len();
        let Some(close) = rest[body_start..].find(CDATA_CLOSE) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[body_start..body_start + close]);
        rest = &rest[body_start + close + CDATA_CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Paragraph,
    LineBreak,
    List,
    ListItem,
    Other,
}

impl Family {
    fn of(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" => Family::Paragraph,
            "br" => Family::LineBreak,
            "ul" | "ol" => Family::List,
            "li" => Family::ListItem,
            _ => Family::Other,
        }
    }
}

/// One `<...>` token.
#[derive(Debug, Clone, Copy)]
struct TagToken {
    family: Family,
    closing: bool,
    self_closing: bool,
    /// Byte index just past the closing `>`.
    end: usize,
}

/// Reads the tag starting at `at` (which must hold `<`). `None` means the `<`
/// is literal text.
fn read_tag(input: &str, at: usize) -> Option<TagToken> {
    let rest = &input[at + 1..];

    // Comments, declarations and processing instructions.
    if rest.starts_with('!') || rest.starts_with('?') {
        let gt = rest.find('>')?;
        return Some(TagToken {
            family: Family::Other,
            closing: false,
            self_closing: true,
            end: at + 1 + gt + 1,
        });
    }

    let closing = rest.starts_with('/');
    let name_start = if closing { 1 } else { 0 };
    let name_len = rest[name_start..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-' | '.')))
        .unwrap_or(rest.len() - name_start);
    let name = &rest[name_start..name_start + name_len];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let after_name = name_start + name_len;
    if !rest[after_name..].starts_with(|c: char| c.is_whitespace() || c == '/' || c == '>') {
        return None;
    }
    let gt = after_name + rest[after_name..].find('>')?;

    Some(TagToken {
        family: Family::of(name),
        closing,
        self_closing: rest[..gt].ends_with('/'),
        end: at + 1 + gt + 1,
    })
}

/// Finds the close tag matching an already-opened `family` element whose body
/// starts at `from`. Returns (body end, index past the close tag).
fn find_close(input: &str, from: usize, family: Family) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut pos = from;
    while let Some(rel) = input[pos..].find('<') {
        let lt = pos + rel;
        let Some(tag) = read_tag(input, lt) else {
            pos = lt + 1;
            continue;
        };
        if tag.family == family {
            if tag.closing {
                if depth == 0 {
                    return Some((lt, tag.end));
                }
                depth -= 1;
            } else if !tag.self_closing {
                depth += 1;
            }
        }
        pos = tag.end;
    }
    None
}

/// Replaces recognized tags with their text layout; entities are untouched.
/// `depth` counts the enclosing block elements.
fn decode_fragment(input: &str, depth: usize) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(rel) = input[pos..].find('<') {
        let lt = pos + rel;
        out.push_str(&input[pos..lt]);
        pos = match read_tag(input, lt) {
            Some(tag) => decode_tag(input, tag, depth, &mut out),
            None => {
                out.push('<');
                lt + 1
            }
        };
    }
    out.push_str(&input[pos..]);
    out
}

/// Writes the decoded form of `tag` (and its body, for block tags) and
/// returns where scanning resumes.
fn decode_tag(input: &str, tag: TagToken, depth: usize, out: &mut String) -> usize {
    if tag.closing {
        return tag.end;
    }
    if depth >= MAX_NESTING && tag.family != Family::LineBreak {
        return tag.end;
    }
    match tag.family {
        Family::LineBreak => {
            out.push('\n');
            tag.end
        }
        Family::Other => tag.end,
        _ if tag.self_closing => tag.end,
        family => {
            let Some((body_end, resume)) = find_close(input, tag.end, family) else {
                return tag.end;
            };
            let body = &input[tag.end..body_end];
            match family {
                Family::Paragraph => {
                    out.push_str(decode_fragment(body, depth + 1).trim());
                    out.push('\n');
                }
                Family::List => out.push_str(&decode_list(body, depth + 1)),
                _ => {
                    out.push(BULLET);
                    out.push_str(decode_fragment(body, depth + 1).trim());
                    out.push('\n');
                }
            }
            resume
        }
    }
}

/// Turns a list body into bullet lines, one per non-blank item line.
fn decode_list(body: &str, depth: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(rel) = body[pos..].find('<') {
        let lt = pos + rel;
        let Some(tag) = read_tag(body, lt) else {
            pos = lt + 1;
            continue;
        };
        pos = tag.end;
        if tag.family != Family::ListItem || tag.closing || tag.self_closing {
            continue;
        }
        let Some((item_end, resume)) = find_close(body, tag.end, Family::ListItem) else {
            continue;
        };
        let item = decode_fragment(&body[tag.end..item_end], depth + 1);
        lines.extend(
            item.trim()
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| format!("{BULLET}{line}")),
        );
        pos = resume;
    }

    if lines.is_empty() {
        return "\n".to_string();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Decodes the recognized entities in a single pass.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let replacement = candidate.find(';').and_then(|semi| {
            let decoded = match &candidate[1..semi] {
                "lt" => '<',
                "gt" => '>',
                "amp" => '&',
                "quot" => '"',
                "#39" | "apos" => '\'',
                "nbsp" => ' ',
                _ => return None,
            };
            Some((decoded, semi + 1))
        });
        match replacement {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn normalize_whitespace(text: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}
