//! Content resolution: turning a node's content reference into clean text.
//!
//! Resolved text never contains markup or blank lines, and every line is
//! trimmed. Resolution failures are returned as
//! [`SplitterError::ContentExtraction`]; callers log them and carry on with
//! an empty string.
//!
//! An href with a `#fragment` resolves to the section of its markup
//! document that starts at the element with that id and runs up to the next
//! anchor the outline points at. An href without a fragment stops at the
//! first such anchor, so outline entries sharing one file never repeat each
//! other's text.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Result, SplitterError};
use crate::outline::OutlineDocument;
use crate::types::{ContentRef, NavNode};

/// Elements whose text is never part of the readable content.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "title"];

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAMED_ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("valid regex"));

/// Resolves content references to cleaned text.
pub trait ContentResolver {
    /// Resolve a reference to text with markup and blank lines removed.
    fn resolve(&self, content: &ContentRef) -> Result<String>;
}

impl<T: ContentResolver + ?Sized> ContentResolver for &T {
    fn resolve(&self, content: &ContentRef) -> Result<String> {
        (**self).resolve(content)
    }
}

/// Resolver backed by a loaded [`OutlineDocument`].
///
/// Looks hrefs up in the document's inline content units first, then reads
/// them from files relative to the outline's directory.
pub struct DocumentContentResolver<'a> {
    document: &'a OutlineDocument,
    /// Fragment ids the outline points at, per content unit.
    anchors: HashMap<String, HashSet<String>>,
}

impl<'a> DocumentContentResolver<'a> {
    /// Create a resolver for a loaded outline document.
    #[must_use]
    pub fn new(document: &'a OutlineDocument) -> Self {
        Self {
            document,
            anchors: outline_anchors(&document.outline().entries),
        }
    }

    /// Fetch the raw, uncleaned content unit for an href.
    fn raw_content(&self, content: &ContentRef) -> Result<String> {
        let href = content.document();

        if let Some(text) = self.document.inline_document(href) {
            return Ok(text.to_string());
        }

        let relative = Path::new(href);
        let escapes_base = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if href.is_empty() || escapes_base {
            return Err(SplitterError::ContentExtraction {
                reference: content.to_string(),
                reason: "reference must be a relative path inside the outline directory"
                    .to_string(),
            });
        }

        let path = self.document.base_dir().join(relative);
        fs::read_to_string(&path).map_err(|e| SplitterError::ContentExtraction {
            reference: content.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

impl ContentResolver for DocumentContentResolver<'_> {
    fn resolve(&self, content: &ContentRef) -> Result<String> {
        let raw = self.raw_content(content)?;

        // Fragments only address markup; plain text is taken whole
        if !looks_like_markup(&raw) {
            return Ok(normalize_lines(&raw));
        }

        let extraction_error = |reason: String| SplitterError::ContentExtraction {
            reference: content.to_string(),
            reason,
        };
        let fragment = content.fragment();
        let section = extract_section(&raw, fragment, self.anchors.get(content.document()))
            .map_err(|e| extraction_error(format!("invalid markup: {e}")))?
            .ok_or_else(|| {
                extraction_error(format!(
                    "no element with id '{}'",
                    fragment.unwrap_or_default()
                ))
            })?;

        Ok(normalize_lines(&section))
    }
}

/// Collect every fragment id the outline references, keyed by content unit.
fn outline_anchors(entries: &[NavNode]) -> HashMap<String, HashSet<String>> {
    let mut anchors: HashMap<String, HashSet<String>> = HashMap::new();
    let mut stack: Vec<&NavNode> = entries.iter().collect();

    while let Some(node) = stack.pop() {
        if let Some(content) = node.content() {
            if let Some(fragment) = content.fragment() {
                anchors
                    .entry(content.document().to_string())
                    .or_default()
                    .insert(fragment.to_string());
            }
        }
        stack.extend(node.children());
    }

    anchors
}

/// Whether raw content should be parsed as markup.
fn looks_like_markup(raw: &str) -> bool {
    raw.trim_start().starts_with('<')
}

/// Extract the readable text of an (X)HTML or XML fragment.
///
/// Text inside `head`, `script`, `style` and `title` is dropped. Block
/// elements start a new line.
pub fn strip_markup(markup: &str) -> std::result::Result<String, roxmltree::Error> {
    with_parsed(markup, |doc| {
        collect_text(doc.root(), None, None).unwrap_or_default()
    })
}

/// Extract the text of one section of a markup document.
///
/// The section starts at the element whose id is `start`, or at the
/// beginning of the document when `start` is `None`, and ends before the
/// next element whose id is in `boundaries`. Returns `None` when no element
/// has the `start` id.
pub fn extract_section(
    markup: &str,
    start: Option<&str>,
    boundaries: Option<&HashSet<String>>,
) -> std::result::Result<Option<String>, roxmltree::Error> {
    with_parsed(markup, |doc| collect_text(doc.root(), start, boundaries))
}

fn parsing_options<'a>() -> ParsingOptions<'a> {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// Parse markup and hand the document to `f`.
///
/// XHTML content often uses HTML named entities that XML does not define.
/// Those are decoded and the parse retried.
fn with_parsed<T>(
    markup: &str,
    f: impl Fn(&Document<'_>) -> T,
) -> std::result::Result<T, roxmltree::Error> {
    match Document::parse_with_options(markup, parsing_options()) {
        Ok(doc) => Ok(f(&doc)),
        Err(roxmltree::Error::UnknownEntityReference(name, _)) => {
            tracing::debug!(entity = %name, "decoding HTML entities before parsing");
            let decoded = replace_html_entities(markup);
            let doc = Document::parse_with_options(&decoded, parsing_options())?;
            Ok(f(&doc))
        }
        Err(e) => Err(e),
    }
}

/// Rewrite HTML named entities as numeric character references.
///
/// The five XML entities are kept. Unknown names are escaped so they
/// survive as literal text.
fn replace_html_entities(markup: &str) -> Cow<'_, str> {
    NAMED_ENTITY_PATTERN.replace_all(markup, |caps: &Captures<'_>| {
        let name = &caps[1];
        match name {
            "amp" | "lt" | "gt" | "quot" | "apos" => format!("&{name};"),
            _ => html_entity(name).map_or_else(
                || format!("&amp;{name};"),
                |code| format!("&#{code};"),
            ),
        }
    })
}

/// Code point of a common HTML named entity.
fn html_entity(name: &str) -> Option<u32> {
    let code = match name {
        "nbsp" => 0xA0,
        "iexcl" => 0xA1,
        "cent" => 0xA2,
        "pound" => 0xA3,
        "yen" => 0xA5,
        "sect" => 0xA7,
        "copy" => 0xA9,
        "laquo" => 0xAB,
        "shy" => 0xAD,
        "reg" => 0xAE,
        "deg" => 0xB0,
        "plusmn" => 0xB1,
        "para" => 0xB6,
        "middot" => 0xB7,
        "raquo" => 0xBB,
        "frac14" => 0xBC,
        "frac12" => 0xBD,
        "frac34" => 0xBE,
        "iquest" => 0xBF,
        "Agrave" => 0xC0,
        "Aacute" => 0xC1,
        "Auml" => 0xC4,
        "Ccedil" => 0xC7,
        "Egrave" => 0xC8,
        "Eacute" => 0xC9,
        "Ouml" => 0xD6,
        "times" => 0xD7,
        "Uuml" => 0xDC,
        "szlig" => 0xDF,
        "agrave" => 0xE0,
        "aacute" => 0xE1,
        "acirc" => 0xE2,
        "auml" => 0xE4,
        "aring" => 0xE5,
        "aelig" => 0xE6,
        "ccedil" => 0xE7,
        "egrave" => 0xE8,
        "eacute" => 0xE9,
        "ecirc" => 0xEA,
        "euml" => 0xEB,
        "iacute" => 0xED,
        "icirc" => 0xEE,
        "iuml" => 0xEF,
        "ntilde" => 0xF1,
        "oacute" => 0xF3,
        "ocirc" => 0xF4,
        "ouml" => 0xF6,
        "divide" => 0xF7,
        "oslash" => 0xF8,
        "uacute" => 0xFA,
        "ucirc" => 0xFB,
        "uuml" => 0xFC,
        "oelig" => 0x153,
        "ensp" => 0x2002,
        "emsp" => 0x2003,
        "thinsp" => 0x2009,
        "zwnj" => 0x200C,
        "zwj" => 0x200D,
        "ndash" => 0x2013,
        "mdash" => 0x2014,
        "lsquo" => 0x2018,
        "rsquo" => 0x2019,
        "sbquo" => 0x201A,
        "ldquo" => 0x201C,
        "rdquo" => 0x201D,
        "bdquo" => 0x201E,
        "dagger" => 0x2020,
        "Dagger" => 0x2021,
        "bull" => 0x2022,
        "hellip" => 0x2026,
        "prime" => 0x2032,
        "Prime" => 0x2033,
        "lsaquo" => 0x2039,
        "rsaquo" => 0x203A,
        "euro" => 0x20AC,
        "trade" => 0x2122,
        _ => return None,
    };
    Some(code)
}

/// Collect text under a node without recursing on the call stack.
///
/// Only text between the `start` element and the next `boundaries`
/// element is kept; see [`extract_section`].
fn collect_text(
    root: Node<'_, '_>,
    start: Option<&str>,
    boundaries: Option<&HashSet<String>>,
) -> Option<String> {
    let mut text = String::new();
    let mut capturing = start.is_none();
    let mut found = start.is_none();
    // (node, leaving)
    let mut stack = vec![(root, false)];

    while let Some((node, leaving)) = stack.pop() {
        if node.is_text() {
            if capturing {
                text.push_str(node.text().unwrap_or_default());
            }
            continue;
        }

        let name = node.tag_name().name().to_ascii_lowercase();
        let is_block = node.is_element() && BLOCK_ELEMENTS.contains(&name.as_str());

        if leaving {
            if is_block && capturing {
                text.push('\n');
            }
            continue;
        }

        if node.is_element() && SKIPPED_ELEMENTS.contains(&name.as_str()) {
            continue;
        }

        if let Some(id) = node.attribute("id") {
            if start == Some(id) {
                capturing = true;
                found = true;
            } else if capturing && boundaries.is_some_and(|b| b.contains(id)) {
                break;
            }
        }

        if is_block && capturing {
            text.push('\n');
        }
        stack.push((node, true));
        for child in node.children().rev() {
            stack.push((child, false));
        }
    }

    found.then_some(text)
}

/// Trim every line, drop blank lines and join with single newlines.
///
/// # Examples
/// ```
/// use outline_splitter::content::normalize_lines;
///
/// assert_eq!(normalize_lines("  a  \n\n \n b\r\n"), "a\nb");
/// ```
#[must_use]
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
