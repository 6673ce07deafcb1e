//! Inline markup formatting for section text.
//!
//! Section paragraphs and summary lines carry two kinds of inline spans:
//! - `**text**` marks a bold run
//! - `{{text}}` marks a highlighted run (rendered as a soft badge)
//!
//! The formatter splits a raw string into an ordered list of [`Fragment`]s.
//! It never fails: an opening delimiter without a closing partner on the same
//! line is kept as literal text. Spans do not nest, and there is no escape
//! syntax for literal `**` or `{{`.
//!
//! ```rust
//! use retrospective::markup::{format_inline, Fragment};
//!
//! let fragments = format_inline("I am **careful** and {{gentle}}");
//! assert_eq!(
//!     fragments,
//!     vec![
//!         Fragment::plain("I am "),
//!         Fragment::bold("careful"),
//!         Fragment::plain(" and "),
//!         Fragment::highlight("gentle"),
//!     ]
//! );
//! ```

const BOLD: (&str, &str) = ("**", "**");
const HIGHLIGHT: (&str, &str) = ("{{", "}}");

/// Style of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Plain,
    Bold,
    Highlight,
}

impl FragmentKind {
    fn delimiters(self) -> Option<(&'static str, &'static str)> {
        match self {
            FragmentKind::Plain => None,
            FragmentKind::Bold => Some(BOLD),
            FragmentKind::Highlight => Some(HIGHLIGHT),
        }
    }
}

/// A styled run of text produced by [`format_inline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Fragment {
            kind: FragmentKind::Plain,
            text: text.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Fragment {
            kind: FragmentKind::Bold,
            text: text.into(),
        }
    }

    pub fn highlight(text: impl Into<String>) -> Self {
        Fragment {
            kind: FragmentKind::Highlight,
            text: text.into(),
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Tries to match a span opened by `open` at the start of `rest`.
/// Returns the span body and the number of bytes consumed, delimiters included.
fn match_span<'a>(rest: &'a str, open: &str, close: &str) -> Option<(&'a str, usize)> {
    let after_open = rest.strip_prefix(open)?;
    let line_end = after_open
        .find(is_line_terminator)
        .unwrap_or(after_open.len());
    let body_len = after_open[..line_end].find(close)?;
    Some((
        &after_open[..body_len],
        open.len() + body_len + close.len(),
    ))
}

/// Splits `raw` into plain, bold and highlighted fragments, left to right.
///
/// Empty plain runs (for example between two adjacent spans) are dropped,
/// while empty spans such as `****` yield a fragment with empty text.
/// An empty input yields no fragments.
pub fn format_inline(raw: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < raw.len() {
        let rest = &raw[pos..];
        let matched = match_span(rest, HIGHLIGHT.0, HIGHLIGHT.1)
            .map(|(body, len)| (FragmentKind::Highlight, body, len))
            .or_else(|| {
                match_span(rest, BOLD.0, BOLD.1).map(|(body, len)| (FragmentKind::Bold, body, len))
            });

        match matched {
            Some((kind, body, consumed)) => {
                if plain_start < pos {
                    fragments.push(Fragment::plain(&raw[plain_start..pos]));
                }
                fragments.push(Fragment {
                    kind,
                    text: body.to_string(),
                });
                pos += consumed;
                plain_start = pos;
            }
            None => {
                // Advance by one full character so slicing stays on UTF-8 boundaries.
                pos += rest.chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
    }

    if plain_start < raw.len() {
        fragments.push(Fragment::plain(&raw[plain_start..]));
    }
    fragments
}

/// Rebuilds the markup source from fragments, re-wrapping spans in their delimiters.
///
/// `to_markup(&format_inline(s)) == s` holds for every input string.
pub fn to_markup(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment.kind.delimiters() {
            Some((open, close)) => {
                out.push_str(open);
                out.push_str(&fragment.text);
                out.push_str(close);
            }
            None => out.push_str(&fragment.text),
        }
    }
    out
}

/// Concatenates fragment texts without any delimiters.
pub fn plain_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect()
}

/// Reports whether formatting left delimiter sequences in plain text.
///
/// Such input is still rendered (the delimiters show up literally); this is
/// only used to surface a warning during validation.
pub fn has_unbalanced_delimiters(raw: &str) -> bool {
    format_inline(raw).iter().any(|f| {
        f.kind == FragmentKind::Plain
            && (f.text.contains(BOLD.0) || f.text.contains(HIGHLIGHT.0) || f.text.contains(HIGHLIGHT.1))
    })
}
