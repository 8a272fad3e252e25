//! Rendering of rate tables as script literals for the host document.

use serde_json::Value;

use crate::table::{PLACEHOLDER_ABBR, PLACEHOLDER_NAME, RateTable, StateRate};

pub const RATES_IDENT: &str = "STATE_TAX_RATES";
pub const LAST_UPDATED_IDENT: &str = "RATES_LAST_UPDATED";
pub const TAX_YEAR_IDENT: &str = "RATES_TAX_YEAR";

/// Formats a rate: integral values get one decimal place (`10` -> `10.0`),
/// anything else is written as-is (`4.95`).
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{rate:.1}")
    } else {
        rate.to_string()
    }
}

/// Quotes `s` as a script string literal.
///
/// JSON string syntax is valid in scripts; `</` is additionally escaped so the
/// value cannot terminate an enclosing `<script>` element.
pub fn string_literal(s: &str) -> String {
    Value::from(s).to_string().replace("</", "<\\/")
}

/// Renders a single entry, e.g. `{ abbr: "AL", name: "Alabama", rate: 5.0 }`.
pub fn render_entry(state: &StateRate) -> String {
    format!(
        "{{ abbr: {}, name: {}, rate: {} }}",
        string_literal(&state.abbr),
        string_literal(&state.name),
        format_rate(state.rate)
    )
}

/// The unselected entry that always heads the rendered list.
pub fn placeholder_entry() -> String {
    format!(
        "{{ abbr: {}, name: {}, rate: 0 }}",
        string_literal(PLACEHOLDER_ABBR),
        string_literal(PLACEHOLDER_NAME)
    )
}

/// All rendered entries in output order, placeholder first.
pub fn render_entries(table: &RateTable) -> Vec<String> {
    std::iter::once(placeholder_entry())
        .chain(table.states.iter().map(render_entry))
        .collect()
}

/// Renders the full `STATE_TAX_RATES` declaration, terminated by `];`.
///
/// `indent` is the leading whitespace of the declaration line; entries are
/// indented two spaces further and the closing bracket lines up with it.
pub fn render_block(keyword: &str, indent: &str, table: &RateTable) -> String {
    let body = render_entries(table)
        .iter()
        .map(|entry| format!("{indent}  {entry}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("{keyword} {RATES_IDENT} = [\n{body}\n{indent}];")
}

pub fn render_last_updated(keyword: &str, updated: &str) -> String {
    format!("{keyword} {LAST_UPDATED_IDENT} = {};", string_literal(updated))
}

pub fn render_tax_year(keyword: &str, year: u32) -> String {
    format!("{keyword} {TAX_YEAR_IDENT} = {year};")
}
