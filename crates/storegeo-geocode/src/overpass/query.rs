//! Overpass QL query construction.

use storegeo_core::Coordinate;

/// Escapes a value for use inside a double-quoted Overpass QL string.
pub(crate) fn escape_ql(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Nodes whose `name` tag equals `name`.
pub(crate) fn exact_filter(name: &str) -> String {
    format!("node[\"name\"=\"{}\"]", escape_ql(name))
}

/// Nodes whose `name` tag matches the regular expression `pattern` and that
/// carry a `shop` tag.
pub(crate) fn fuzzy_filter(pattern: &str) -> String {
    format!("node[\"name\"~\"{}\"][\"shop\"]", escape_ql(pattern))
}

pub(crate) fn build_query(filter: &str, center: Coordinate, radius_m: u32) -> String {
    format!(
        "[out:json];\n{filter}(around:{radius_m},{},{});\nout body;\n",
        center.latitude, center.longitude
    )
}
