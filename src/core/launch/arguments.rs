// ─── Arguments ───
// Rule-filtered argument groups and `${name}` substitution.

use std::collections::HashMap;

use crate::core::manifest::ArgumentGroup;
use crate::core::rules::{Gated, Platform};

/// Replace every `${name}` found in `variables`. Unknown names and
/// unterminated placeholders stay as literal text. Substituted values are
/// not scanned again.
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match variables.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Tokens of every group allowed on `platform`, in manifest order, with
/// variables substituted.
pub fn resolve_arguments(
    groups: &[ArgumentGroup],
    variables: &HashMap<String, String>,
    platform: Platform,
) -> Vec<String> {
    groups
        .iter()
        .filter(|group| group.is_allowed_on(platform))
        .flat_map(|group| group.values.iter())
        .map(|token| substitute(token, variables))
        .collect()
}

/// Join tokens into one command-line string, quoting tokens that contain
/// whitespace or quotes.
pub fn join_arguments(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| quote(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if !raw.chars().any(|ch| ch.is_whitespace() || ch == '"') {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
