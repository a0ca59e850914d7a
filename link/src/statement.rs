//! `${name}` variable substitution for statement text.

use crate::models::Variables;

/// Replace every `${name}` whose name is present in `variables`.
///
/// Unknown placeholders are left as-is and substituted values are not
/// scanned again, so a value containing `${...}` is inserted literally.
pub fn substitute_variables(sql: &str, variables: &Variables) -> String {
    if variables.is_empty() || !sql.contains("${") {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match variables.get(name.trim()) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            },
        }
    }
    out.push_str(rest);
    out
}

/// Shorten a statement for log output.
pub(crate) fn preview(sql: &str) -> String {
    let flat = sql.trim().replace('\n', " ");
    match flat.char_indices().nth(80) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
