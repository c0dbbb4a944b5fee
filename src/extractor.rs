use crate::ast::{Expr, ExprKind, Member};
use crate::error::{TraversalError, TruthError};
use crate::options::Options;
use crate::parser::Parser;
use crate::tree::{flatten, materialize, TokenTree};
use crate::truth::{ExtractedTruth, Family, Origin};
use miette::NamedSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Stands in for a computed key in an ancestry path. It can never equal a
// real property name on the allow-list.
const COMPUTED_KEY: &str = "[computed]";

/// Finds the configuration file for a project.
///
/// # Errors
/// Returns `TruthError::ConfigNotFound` when none of `options.config_files`
/// exists under `root`.
pub fn find_config(root: &Path, options: &Options) -> Result<PathBuf, TruthError> {
    for name in &options.config_files {
        let candidate = root.join(name);
        if candidate.is_file() {
            log::debug!("using configuration {}", candidate.display());
            return Ok(candidate);
        }
    }
    Err(TruthError::ConfigNotFound {
        root: root.to_path_buf(),
        candidates: options.config_files.join(", "),
    })
}

/// Locates, reads and extracts the configuration of the project at `root`.
///
/// # Errors
/// Returns a `TruthError` if the file is missing, unreadable or malformed.
pub fn extract_from_project(root: &Path, options: &Options) -> Result<ExtractedTruth, TruthError> {
    let path = find_config(root, options)?;
    let source = read_config(&path)?;
    extract(&source, &path.to_string_lossy(), options)
}

/// # Errors
/// Returns `TruthError::Read` if the file cannot be read as UTF-8 text.
pub fn read_config(path: &Path) -> Result<String, TruthError> {
    std::fs::read_to_string(path).map_err(|err| TruthError::Read {
        path: path.to_path_buf(),
        source: Arc::new(err),
    })
}

/// Extracts the declared colors and spacing from configuration source text.
///
/// Only `theme.colors`, `theme.spacing`, `theme.extend.colors` and
/// `theme.extend.spacing` are read; a family declared more than once merges
/// into the same bucket with later keys winning.
///
/// # Errors
/// Returns `TruthError::Parser` if the source cannot be parsed and
/// `TruthError::Traversal` if the object nesting exceeds `options.max_depth`.
pub fn extract(source: &str, file_name: &str, options: &Options) -> Result<ExtractedTruth, TruthError> {
    let mut parser = Parser::new_with_name(source, file_name.to_string())?;
    let document = parser.parse_document()?;

    let walk = Walk {
        source,
        file_name,
        max_depth: options.max_depth,
    };
    let mut declarations = Vec::new();
    for root in &document.roots {
        declarations.extend(walk.collect(root, &[], None)?);
    }

    let mut truth = ExtractedTruth::default();
    for declaration in declarations {
        let Some(TokenTree::Group(group)) = materialize(declaration.value) else {
            log::debug!(
                "skipping non-literal {} declaration at byte {}",
                declaration.family.as_str(),
                declaration.value.pos_start
            );
            continue;
        };
        let tokens = flatten(&group);
        log::debug!(
            "{:?} {}: {} token(s)",
            declaration.origin,
            declaration.family.as_str(),
            tokens.len()
        );
        truth
            .bucket_mut(declaration.origin)
            .family_mut(declaration.family)
            .overlay(&tokens);
    }
    Ok(truth)
}

/// A `colors` or `spacing` property found at an allowed ancestry.
#[derive(Debug)]
struct Declaration<'e> {
    origin: Origin,
    family: Family,
    value: &'e Expr,
}

struct Walk<'s> {
    source: &'s str,
    file_name: &'s str,
    max_depth: usize,
}

impl Walk<'_> {
    /// Collects declarations under `expr` in document order. `ancestry` holds
    /// the names of the object properties enclosing `expr`. `theme_depth` is
    /// the object nesting below a root `theme` property, and `None` outside of
    /// one, where nesting is not limited.
    fn collect<'e>(
        &self,
        expr: &'e Expr,
        ancestry: &[&'e str],
        theme_depth: Option<usize>,
    ) -> Result<Vec<Declaration<'e>>, TraversalError> {
        let mut found = Vec::new();
        match &expr.kind {
            ExprKind::Object(members) => {
                if theme_depth.is_some_and(|depth| depth >= self.max_depth) {
                    return Err(self.depth_exceeded(expr, ancestry));
                }
                let nested = theme_depth.map(|depth| depth + 1);
                for member in members {
                    match member {
                        Member::Pair(pair) => {
                            let key = pair.key.as_deref().unwrap_or(COMPUTED_KEY);
                            if let Some(family) = Family::from_key(key) {
                                if let Some(origin) = classify(ancestry) {
                                    found.push(Declaration {
                                        origin,
                                        family,
                                        value: &pair.value,
                                    });
                                }
                            }
                            let mut path = ancestry.to_vec();
                            path.push(key);
                            let depth = match nested {
                                None if path == ["theme"] => Some(0),
                                depth => depth,
                            };
                            found.extend(self.collect(&pair.value, &path, depth)?);
                        }
                        Member::Spread(inner) => {
                            found.extend(self.collect(inner, ancestry, nested)?);
                        }
                    }
                }
            }
            ExprKind::Array(items) | ExprKind::Dynamic(items) => {
                for item in items {
                    found.extend(self.collect(item, ancestry, theme_depth)?);
                }
            }
            ExprKind::String(_) | ExprKind::Number(_) | ExprKind::Template(_) => {}
        }
        Ok(found)
    }

    fn depth_exceeded(&self, expr: &Expr, ancestry: &[&str]) -> TraversalError {
        TraversalError::DepthExceeded {
            path: ancestry.join("."),
            limit: self.max_depth,
            src: NamedSource::new(self.file_name, self.source.to_string()),
            span: expr.get_source_span(),
        }
    }
}

/// Maps the ancestry of a `colors`/`spacing` property to its origin. Anything
/// besides `theme` and `theme.extend` is not a token declaration.
fn classify(ancestry: &[&str]) -> Option<Origin> {
    match ancestry {
        ["theme"] => Some(Origin::Override),
        ["theme", "extend"] => Some(Origin::Extend),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TruthErrorKind;

    fn extract_ok(source: &str) -> ExtractedTruth {
        match extract(source, "tailwind.config.js", &Options::default()) {
            Ok(truth) => truth,
            Err(err) => panic!("{:?}", miette::Report::new(err)),
        }
    }

    fn keys(map: &crate::truth::TokenMap) -> Vec<&str> {
        map.keys().collect()
    }

    #[test]
    fn splits_override_and_extend() {
        let truth = extract_ok(
            r#"
module.exports = {
  content: ['./src/**/*.{js,jsx}'],
  theme: {
    colors: { primary: '#0af', secondary: { DEFAULT: '#333', light: '#999' } },
    spacing: { 1: '4px', 2: '8px' },
    extend: {
      colors: { accent: '#f0a' },
      spacing: { '18': '4.5rem' },
    },
  },
}
"#,
        );
        assert_eq!(
            keys(&truth.overrides.colors),
            vec!["primary", "secondary", "secondary-light"]
        );
        assert_eq!(keys(&truth.overrides.spacing), vec!["1", "2"]);
        assert_eq!(keys(&truth.extend.colors), vec!["accent"]);
        assert_eq!(keys(&truth.extend.spacing), vec!["18"]);
    }

    #[test]
    fn ignores_same_named_keys_elsewhere() {
        let truth = extract_ok(
            r#"
const palette = { colors: { nope: '#000' } };
module.exports = {
  plugins: { colors: { nope: '#000' } },
  theme: {
    screens: { colors: { nope: '#000' } },
    extend: { typography: { colors: { nope: '#000' } } },
  },
};
"#,
        );
        assert_eq!(truth, ExtractedTruth::default());
    }

    #[test]
    fn reads_through_define_config_and_typescript() {
        let truth = extract_ok(
            r#"
import type { Config } from 'tailwindcss'
import { defineConfig } from 'some-helper'

export default defineConfig({
  theme: {
    extend: {
      colors: { brand: `#123456` },
    },
  },
}) satisfies Config
"#,
        );
        assert_eq!(truth.extend.colors.get("brand").map(String::as_str), Some("#123456"));
    }

    #[test]
    fn dynamic_values_are_skipped() {
        let truth = extract_ok(
            r#"
const base = require('./base');
module.exports = {
  theme: {
    colors: {
      ...base.colors,
      fixed: '#fff',
      mixed: `#${hex}`,
      called: color('red'),
      nested: { ok: '#010101', bad: base.x },
    },
    spacing: require('./spacing'),
  },
};
"#,
        );
        assert_eq!(keys(&truth.overrides.colors), vec!["fixed", "nested-ok"]);
        assert!(truth.overrides.spacing.is_empty());
    }

    #[test]
    fn numbers_are_coerced_to_strings() {
        let truth = extract_ok("module.exports = { theme: { spacing: { 0.5: 2, 4: 16 } } }");
        assert_eq!(truth.overrides.spacing.get("0.5").map(String::as_str), Some("2"));
        assert_eq!(truth.overrides.spacing.get("4").map(String::as_str), Some("16"));
    }

    #[test]
    fn repeated_declarations_merge_last_write_wins() {
        let truth = extract_ok(
            r#"
module.exports = { theme: { colors: { red: '#f00', blue: '#00f' } } };
module.exports.other = { theme: { colors: { red: '#e00' } } };
"#,
        );
        assert_eq!(keys(&truth.overrides.colors), vec!["red", "blue"]);
        assert_eq!(truth.overrides.colors.get("red").map(String::as_str), Some("#e00"));
    }

    #[test]
    fn quoted_theme_keys_count() {
        let truth = extract_ok(r#"module.exports = { 'theme': { "extend": { 'colors': { a: 'b' } } } }"#);
        assert_eq!(keys(&truth.extend.colors), vec!["a"]);
    }

    #[test]
    fn parse_failure_is_malformed() {
        let err = extract("module.exports = { theme: { ", "bad.js", &Options::default()).unwrap_err();
        assert!(matches!(err, TruthError::Parser(_)));
        assert_eq!(err.kind(), TruthErrorKind::Malformed);
    }

    #[test]
    fn deep_nesting_is_a_traversal_failure() {
        let depth = 40;
        let source = format!(
            "module.exports = {{ theme: {{ colors: {}'x'{} }} }}",
            "{ a: ".repeat(depth),
            " }".repeat(depth)
        );
        let err = extract(&source, "deep.js", &Options::default()).unwrap_err();
        assert!(matches!(err, TruthError::Traversal(_)));
        assert_eq!(err.kind(), TruthErrorKind::Malformed);
    }

    #[test]
    fn deep_objects_outside_theme_are_not_limited() {
        let depth = 40;
        let source = format!(
            "const data = {}'x'{};\nmodule.exports = {{ plugins: [{}1{}], theme: {{ extend: {{ colors: {{ brand: '#f60' }} }} }} }}",
            "{ a: ".repeat(depth),
            " }".repeat(depth),
            "{ b: ".repeat(depth),
            " }".repeat(depth)
        );
        let truth = extract_ok(&source);
        assert_eq!(truth.extend.colors.get("brand").map(String::as_str), Some("#f60"));
    }

    #[test]
    fn depth_is_counted_from_the_theme_object() {
        let options = Options {
            max_depth: 2,
            ..Options::default()
        };
        let source = "module.exports = { a: { b: { c: { theme: { colors: { x: '#000' } } } } } }";
        assert!(extract(source, "wrapped.js", &options).is_ok());

        let source = "module.exports = { theme: { colors: { x: { y: '#000' } } } }";
        let err = extract(source, "deep.js", &options).unwrap_err();
        let TruthError::Traversal(TraversalError::DepthExceeded { path, .. }) = &err else {
            panic!("expected a depth error, got {err:?}");
        };
        assert_eq!(path, "theme.colors.x");
    }

    #[test]
    fn missing_config_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_config(dir.path(), &Options::default()).unwrap_err();
        assert!(matches!(err, TruthError::ConfigNotFound { .. }));
        assert_eq!(err.kind(), TruthErrorKind::Unavailable);
    }

    #[test]
    fn discovery_follows_candidate_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tailwind.config.cjs"), "module.exports = {}").unwrap();
        std::fs::write(dir.path().join("tailwind.config.ts"), "export default {}").unwrap();

        let found = find_config(dir.path(), &Options::default()).unwrap();
        assert_eq!(found, dir.path().join("tailwind.config.ts"));
    }

    #[test]
    fn extracts_from_project_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tailwind.config.mjs"),
            "export default { theme: { extend: { spacing: { 13: '3.25rem' } } } }",
        )
        .unwrap();

        let truth = extract_from_project(dir.path(), &Options::default()).unwrap();
        assert_eq!(keys(&truth.extend.spacing), vec!["13"]);
    }
}
