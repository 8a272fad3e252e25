//! Marker location and replacement inside the host document.
//!
//! The host embeds a fallback copy of the table as
//!
//! ```text
//! let STATE_TAX_RATES = [ ... ];
//! let RATES_LAST_UPDATED = "2025-01-15";
//! let RATES_TAX_YEAR = 2025;
//! ```
//!
//! The array declaration must exist. The two scalar declarations are replaced
//! in place when present and inserted right after the array block otherwise.
//! A scalar that is declared but cannot be read as one statement is an error,
//! never a second declaration. Everything else in the document is left
//! untouched.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

use crate::render::{
    LAST_UPDATED_IDENT, RATES_IDENT, TAX_YEAR_IDENT, render_block, render_last_updated,
    render_tax_year,
};
use crate::table::RateTable;

// Non-greedy: stops at the first `];` after the declaration.
static RATES_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\b(let|const|var)\s+STATE_TAX_RATES\s*=\s*\[.*?\];")
        .expect("valid STATE_TAX_RATES pattern")
});

// Whole scalar statement: string literals (either quote, escapes allowed) or a
// bare value, up to the terminating `;`.
fn scalar_statement(ident: &str) -> Regex {
    Regex::new(&format!(
        r#"\b(let|const|var)\s+{ident}\s*=\s*(?:"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|[^;"'\n]*?)\s*;"#
    ))
    .expect("valid scalar statement pattern")
}

// Any declaration of the identifier, readable or not.
fn scalar_declaration(ident: &str) -> Regex {
    Regex::new(&format!(r"\b(?:let|const|var)\s+{ident}\b"))
        .expect("valid scalar declaration pattern")
}

static LAST_UPDATED_RE: LazyLock<(Regex, Regex)> = LazyLock::new(|| {
    (
        scalar_statement(LAST_UPDATED_IDENT),
        scalar_declaration(LAST_UPDATED_IDENT),
    )
});

static TAX_YEAR_RE: LazyLock<(Regex, Regex)> = LazyLock::new(|| {
    (
        scalar_statement(TAX_YEAR_IDENT),
        scalar_declaration(TAX_YEAR_IDENT),
    )
});

/// Why the host document could not be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerError {
    /// No `STATE_TAX_RATES` array declaration.
    Missing(&'static str),
    /// A scalar marker is declared but not as a single `name = value;` statement.
    Unreadable(&'static str),
}

/// Result of applying a table to a host document.
#[derive(Debug, Clone)]
pub struct HostRewrite {
    pub content: String,
    /// Scalar markers that were absent and got inserted after the array block.
    pub inserted: Vec<&'static str>,
}

impl HostRewrite {
    pub fn changed(&self, original: &str) -> bool {
        self.content != original
    }
}

/// Rewrites `host` so its embedded markers reflect `table`.
pub fn apply_rates(host: &str, table: &RateTable) -> Result<HostRewrite, MarkerError> {
    let block = RATES_BLOCK_RE
        .captures(host)
        .ok_or(MarkerError::Missing(RATES_IDENT))?;
    let block_range = block.get(0).map(|m| m.range()).unwrap_or_default();
    let keyword = block.get(1).map_or("let", |m| m.as_str());
    let indent = line_indent(host, block_range.start);

    debug!(
        keyword,
        start = block_range.start,
        end = block_range.end,
        "Found rates block"
    );

    let mut block_text = render_block(keyword, indent, table);
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut inserted = Vec::new();

    let render_scalar = |ident: &str, keyword: &str| match ident {
        LAST_UPDATED_IDENT => render_last_updated(keyword, &table.updated),
        _ => render_tax_year(keyword, table.year),
    };

    for (ident, (statement, declaration)) in [
        (LAST_UPDATED_IDENT, &*LAST_UPDATED_RE),
        (TAX_YEAR_IDENT, &*TAX_YEAR_RE),
    ] {
        let outside_block = |range: Range<usize>| !overlaps(&range, &block_range);

        let found = statement
            .captures_iter(host)
            .find(|c| c.get(0).is_some_and(|m| outside_block(m.range())));

        match found.as_ref().and_then(|c| Some((c.get(0)?, c.get(1)?))) {
            // existing declarations keep their own keyword
            Some((whole, kw)) => edits.push((whole.range(), render_scalar(ident, kw.as_str()))),
            None if declaration
                .find_iter(host)
                .any(|m| outside_block(m.range())) =>
            {
                return Err(MarkerError::Unreadable(ident));
            }
            None => {
                block_text.push('\n');
                block_text.push_str(indent);
                block_text.push_str(&render_scalar(ident, keyword));
                inserted.push(ident);
            }
        }
    }

    edits.push((block_range, block_text));
    edits.sort_by_key(|(range, _)| range.start);

    let mut content = String::with_capacity(host.len());
    let mut cursor = 0;
    for (range, text) in edits {
        content.push_str(&host[cursor..range.start]);
        content.push_str(&text);
        cursor = range.end;
    }
    content.push_str(&host[cursor..]);

    Ok(HostRewrite { content, inserted })
}

/// Leading whitespace of the line containing `pos`, if only whitespace
/// precedes `pos` on that line.
fn line_indent(text: &str, pos: usize) -> &str {
    let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..pos];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix
    } else {
        ""
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
