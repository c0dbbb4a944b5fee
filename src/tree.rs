use crate::ast::{Expr, ExprKind, Member};
use crate::truth::{OrderedMap, TokenMap};
use serde::{Deserialize, Serialize};

/// The statically known part of an object literal, as plain nested data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenTree {
    Leaf(String),
    Group(OrderedMap<TokenTree>),
}

/// The key that stands for its parent group's bare name.
pub const DEFAULT_KEY: &str = "DEFAULT";

/// Recovers the literal value of an expression.
///
/// Strings, static templates and numbers become leaves and object literals
/// become groups. Spreads, computed keys and anything dynamic contribute
/// nothing.
pub fn materialize(expr: &Expr) -> Option<TokenTree> {
    match &expr.kind {
        ExprKind::String(s) | ExprKind::Template(s) => Some(TokenTree::Leaf(s.clone())),
        ExprKind::Number(n) => Some(TokenTree::Leaf(js_number_string(*n))),
        ExprKind::Object(members) => {
            let mut group = OrderedMap::new();
            for member in members {
                let Member::Pair(pair) = member else {
                    continue;
                };
                let Some(key) = &pair.key else {
                    continue;
                };
                if let Some(value) = materialize(&pair.value) {
                    group.insert(key.clone(), value);
                }
            }
            Some(TokenTree::Group(group))
        }
        ExprKind::Array(_) | ExprKind::Dynamic(_) => None,
    }
}

/// Flattens a token group into dash-joined keys.
///
/// `{ primary: { DEFAULT: "#00f", light: "#88f" } }` becomes
/// `primary -> #00f, primary-light -> #88f`.
pub fn flatten(group: &OrderedMap<TokenTree>) -> TokenMap {
    let mut out = TokenMap::new();
    flatten_into(group, None, &mut out);
    out
}

fn flatten_into(group: &OrderedMap<TokenTree>, parent: Option<&str>, out: &mut TokenMap) {
    for (key, value) in group.iter() {
        let flat_key = match (parent, key) {
            (Some(parent), DEFAULT_KEY) => parent.to_string(),
            (Some(parent), key) => format!("{parent}-{key}"),
            (None, key) => key.to_string(),
        };
        match value {
            TokenTree::Leaf(literal) => {
                out.insert(flat_key, literal.clone());
            }
            TokenTree::Group(children) => flatten_into(children, Some(&flat_key), out),
        }
    }
}

/// Formats a number the way JavaScript's `String(n)` does for the values that
/// show up in configuration files.
pub fn js_number_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        // Also turns -0 into "0"
        format!("{:.0}", n + 0.0)
    } else {
        format!("{n}")
    }
}
